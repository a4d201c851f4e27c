//! Tiered matching of classified line items against the canonical catalog.
//!
//! Candidates are restricted to the item's section before any tier runs; a
//! dog item is never matched to a cat product, not even as a fallback. Tiers
//! then run strongest first and the first catalog entry (in stored order)
//! satisfying a tier wins.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use barfer_core::{CanonicalProduct, Section};
use serde::Serialize;

use crate::classify::ClassifiedItem;
use crate::normalize::{is_weight_token, normalize_label};
use crate::quantity::{option_token, WeightBasis};

/// Strategy level at which an item was resolved; lower is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// `"<label> <option weight>"` equals the entry's full identifier.
    Exact = 1,
    /// Option weight equals the entry's weight class and every name word is
    /// in the label.
    OptionAnchored = 2,
    /// Label equals the entry's name; weight not considered.
    NameExact = 3,
    /// Name tokens are substrings of the label and the entry's weight class,
    /// if any, appears as a token of the label or option.
    Partial = 4,
    /// Name tokens are substrings of the label; weight ignored.
    Flexible = 5,
}

impl MatchTier {
    /// 1 (strongest) through 5 (weakest).
    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchTier::Exact => "exact",
            MatchTier::OptionAnchored => "option_anchored",
            MatchTier::NameExact => "name_exact",
            MatchTier::Partial => "partial",
            MatchTier::Flexible => "flexible",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogMatch {
    pub product: CanonicalProduct,
    pub tier: MatchTier,
}

/// `None` means unresolved; the matcher never guesses past its tiers.
pub type MatchResult = Option<CatalogMatch>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Run tier 5. When off, items that only match flexibly stay unresolved.
    pub flexible_fallback: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            flexible_fallback: true,
        }
    }
}

/// Comparison keys derived once per item.
struct ItemKeys {
    section: Section,
    label: String,
    label_words: Vec<String>,
    /// Canonical weight token of the item: the fixed family size when the
    /// label names one, otherwise the option label's descriptor.
    option_weight: Option<String>,
    /// Label and option words together, weight descriptors canonicalised.
    haystack_words: Vec<String>,
}

impl ItemKeys {
    fn new(item: &ClassifiedItem) -> Self {
        let label = normalize_label(&item.item.product_label);
        let option = normalize_label(&item.item.option_label);
        let label_words = split_words(&label);
        let mut haystack_words: Vec<String> = label_words.clone();

        // A fixed-size family overrides whatever size the option states, so
        // the option's own weight tokens must not steer the match.
        let option_weight = if item.weight.basis == WeightBasis::FixedFamily {
            haystack_words.extend(
                split_words(&option)
                    .into_iter()
                    .filter(|word| !is_weight_token(word)),
            );
            haystack_words.extend(item.weight.token.iter().cloned());
            item.weight.token.clone()
        } else {
            haystack_words.extend(split_words(&option));
            option_token(&item.item.option_label)
        };

        Self {
            section: item.section,
            option_weight,
            label,
            label_words,
            haystack_words,
        }
    }

    fn has_words(&self, words: &[String]) -> bool {
        !words.is_empty() && words.iter().all(|w| self.label_words.contains(w))
    }

    fn contains_all(&self, tokens: &[String]) -> bool {
        !tokens.is_empty() && tokens.iter().all(|t| self.label.contains(t.as_str()))
    }
}

/// Comparison keys derived once per catalog entry.
struct EntryKeys<'a> {
    product: &'a CanonicalProduct,
    name: String,
    name_words: Vec<String>,
    /// Name words with pack descriptors (`X50`, `200GRS`) removed.
    bare_name: String,
    weight: Option<String>,
    full_id: String,
}

impl<'a> EntryKeys<'a> {
    fn new(product: &'a CanonicalProduct) -> Self {
        let name = normalize_label(&product.name);
        let weight = product
            .weight_class
            .as_deref()
            .map(|w| normalize_label(w).replace(' ', ""))
            .filter(|w| !w.is_empty());
        let full_id = match &weight {
            Some(weight) => format!("{name} {weight}"),
            None => name.clone(),
        };
        let name_words = split_words(&name);
        let bare_name = name_words
            .iter()
            .filter(|w| !is_weight_token(w))
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            product,
            name,
            name_words,
            bare_name,
            weight,
            full_id,
        }
    }
}

type TierPredicate = fn(&ItemKeys, &EntryKeys<'_>) -> bool;

/// Tiers in precedence order.
const TIERS: &[(MatchTier, TierPredicate)] = &[
    (MatchTier::Exact, exact),
    (MatchTier::OptionAnchored, option_anchored),
    (MatchTier::NameExact, name_exact),
    (MatchTier::Partial, partial),
    (MatchTier::Flexible, flexible),
];

fn exact(item: &ItemKeys, entry: &EntryKeys<'_>) -> bool {
    let item_id = match &item.option_weight {
        Some(weight) => format!("{} {weight}", item.label),
        None => item.label.clone(),
    };
    item_id == entry.full_id
}

/// Raw treats are keyed by name and pack size jointly, so for them the
/// entry's identifier is rebuilt from its bare name plus the option weight;
/// this holds whether the pack size is stored in the weight class or in the
/// name itself.
fn option_anchored(item: &ItemKeys, entry: &EntryKeys<'_>) -> bool {
    let Some(option_weight) = &item.option_weight else {
        return false;
    };
    if item.section == Section::Raw {
        let bare_words = split_words(&entry.bare_name);
        return format!("{} {option_weight}", entry.bare_name) == entry.full_id
            && item.has_words(&bare_words);
    }
    entry.weight.as_ref() == Some(option_weight) && item.has_words(&entry.name_words)
}

fn name_exact(item: &ItemKeys, entry: &EntryKeys<'_>) -> bool {
    !item.label.is_empty() && item.label == entry.name
}

/// Weight classes are compared as whole tokens so `5KG` is not found inside
/// `15KG`.
fn partial(item: &ItemKeys, entry: &EntryKeys<'_>) -> bool {
    if !item.contains_all(&entry.name_words) {
        return false;
    }
    match &entry.weight {
        Some(weight) => item.haystack_words.contains(weight),
        None => true,
    }
}

fn flexible(item: &ItemKeys, entry: &EntryKeys<'_>) -> bool {
    item.contains_all(&entry.name_words)
}

/// Finds the canonical product a classified item refers to.
///
/// Never fails: an item no tier accepts yields `None`.
#[must_use]
pub fn match_item(
    item: &ClassifiedItem,
    catalog: &[CanonicalProduct],
    config: &MatcherConfig,
) -> MatchResult {
    let keys = ItemKeys::new(item);
    let candidates: Vec<EntryKeys<'_>> = catalog
        .iter()
        .filter(|product| product.section == keys.section)
        .map(EntryKeys::new)
        .collect();

    TIERS
        .iter()
        .filter(|(tier, _)| config.flexible_fallback || *tier != MatchTier::Flexible)
        .find_map(|(tier, predicate)| {
            candidates
                .iter()
                .find(|entry| predicate(&keys, entry))
                .map(|entry| CatalogMatch {
                    product: entry.product.clone(),
                    tier: *tier,
                })
        })
}

/// Runs a single tier in isolation. Useful when auditing which items a tier
/// accepts.
#[must_use]
pub fn match_at_tier(
    item: &ClassifiedItem,
    catalog: &[CanonicalProduct],
    tier: MatchTier,
) -> MatchResult {
    let keys = ItemKeys::new(item);
    let (_, predicate) = TIERS.iter().find(|(t, _)| *t == tier)?;
    catalog
        .iter()
        .filter(|product| product.section == keys.section)
        .map(EntryKeys::new)
        .find(|entry| predicate(&keys, entry))
        .map(|entry| CatalogMatch {
            product: entry.product.clone(),
            tier,
        })
}

/// Catalog entries the matcher cannot tell apart: same section and the same
/// identifier once labels are normalized (`HÍGADO 100 GR` and `HIGADO 100GRS`).
///
/// Each pair is `(first, shadowed)` in stored order; the shadowed entry can
/// never win a tier.
#[must_use]
pub fn indistinct_entries(catalog: &[CanonicalProduct]) -> Vec<(&CanonicalProduct, &CanonicalProduct)> {
    let mut seen: BTreeMap<(Section, String), &CanonicalProduct> = BTreeMap::new();
    let mut clashes = Vec::new();
    for product in catalog {
        let keys = EntryKeys::new(product);
        match seen.entry((product.section, keys.full_id)) {
            Entry::Occupied(first) => clashes.push((*first.get(), product)),
            Entry::Vacant(slot) => {
                slot.insert(product);
            }
        }
    }
    clashes
}

fn split_words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
