//! Section and subcategory classification of order line items.
//!
//! Classification is an ordered rule chain ([`RULES`]); the first rule that
//! recognises the item decides it. Items nobody recognises land in
//! `Other/Generic`.

use barfer_core::{RawLineItem, Section};
use serde::Serialize;

use crate::normalize::normalize_label;
use crate::quantity::{
    contains_phrase, extract_weight, has_pack_descriptor, WeightReading, ACCESSORY_FAMILIES,
};

/// Protein a box or treat is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Chicken,
    Beef,
    Pork,
    Lamb,
    Fish,
}

impl Flavor {
    /// Spanish keyword → flavor, in detection order.
    const KEYWORDS: &'static [(&'static str, Flavor)] = &[
        ("POLLO", Flavor::Chicken),
        ("VACA", Flavor::Beef),
        ("CARNE", Flavor::Beef),
        ("RES", Flavor::Beef),
        ("CERDO", Flavor::Pork),
        ("CORDERO", Flavor::Lamb),
        ("PESCADO", Flavor::Fish),
    ];

    fn label(self) -> &'static str {
        match self {
            Flavor::Chicken => "POLLO",
            Flavor::Beef => "VACA",
            Flavor::Pork => "CERDO",
            Flavor::Lamb => "CORDERO",
            Flavor::Fish => "PESCADO",
        }
    }
}

/// Reporting bucket an item is classified into. The section follows from the
/// variant; see [`Subcategory::section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "flavor", rename_all = "snake_case")]
pub enum Subcategory {
    Dog(Option<Flavor>),
    /// Bulk dog pack family. Kept apart from [`Subcategory::Dog`] even for
    /// the same flavor.
    BigDog(Option<Flavor>),
    Cat(Option<Flavor>),
    MeatyBones,
    Complements,
    RawTreat,
    Generic,
}

impl Subcategory {
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            Subcategory::Dog(_) | Subcategory::BigDog(_) => Section::Dog,
            Subcategory::Cat(_) => Section::Cat,
            Subcategory::MeatyBones | Subcategory::Complements | Subcategory::Generic => {
                Section::Other
            }
            Subcategory::RawTreat => Section::Raw,
        }
    }
}

impl std::fmt::Display for Subcategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (base, flavor) = match self {
            Subcategory::Dog(flavor) => ("PERRO", *flavor),
            Subcategory::BigDog(flavor) => ("BIG DOG", *flavor),
            Subcategory::Cat(flavor) => ("GATO", *flavor),
            Subcategory::MeatyBones => ("HUESOS CARNOSOS", None),
            Subcategory::Complements => ("COMPLEMENTOS", None),
            Subcategory::RawTreat => ("RAW", None),
            Subcategory::Generic => ("OTROS", None),
        };
        match flavor {
            Some(flavor) => write!(f, "{base} {}", flavor.label()),
            None => write!(f, "{base}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub section: Section,
    pub subcategory: Subcategory,
}

impl From<Subcategory> for Classification {
    fn from(subcategory: Subcategory) -> Self {
        Self {
            section: subcategory.section(),
            subcategory,
        }
    }
}

/// A line item with its classification and physical size attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedItem {
    pub section: Section,
    pub subcategory: Subcategory,
    pub item: RawLineItem,
    pub weight: WeightReading,
}

const CAT_KEYWORDS: &[&str] = &["GATO", "GATOS", "CAT", "FELINO"];
const DOG_KEYWORDS: &[&str] = &["PERRO", "PERROS", "DOG", "CANINO", "BOX"];
const BULK_DOG_FAMILY: &str = "BIG DOG";
const BONE_KEYWORDS: &[&str] = &["HUESO", "HUESOS"];
const BONE_EXCLUSIONS: &[&str] = &["RECREATIVO", "RECREATIVOS", "CALDO"];

/// Normalized view of the two labels shared by every rule.
struct Labels {
    product: String,
    option: String,
}

impl Labels {
    fn product_words(&self) -> Vec<&str> {
        self.product.split(' ').collect()
    }

    fn product_has_any(&self, keywords: &[&str]) -> bool {
        self.product_words().iter().any(|w| keywords.contains(w))
    }

    /// First flavor named in the product label, else in the option label.
    fn flavor(&self) -> Option<Flavor> {
        [&self.product, &self.option].into_iter().find_map(|label| {
            let words: Vec<&str> = label.split(' ').collect();
            Flavor::KEYWORDS
                .iter()
                .find(|(keyword, _)| words.contains(keyword))
                .map(|(_, flavor)| *flavor)
        })
    }
}

type Rule = fn(&Labels) -> Option<Subcategory>;

/// Classification rules in precedence order.
const RULES: &[(&str, Rule)] = &[
    ("cat", cat_rule),
    ("dog", dog_rule),
    ("meaty_bones", meaty_bones_rule),
    ("complements", complements_rule),
    ("raw_treat", raw_treat_rule),
];

fn cat_rule(labels: &Labels) -> Option<Subcategory> {
    labels
        .product_has_any(CAT_KEYWORDS)
        .then(|| Subcategory::Cat(labels.flavor()))
}

fn dog_rule(labels: &Labels) -> Option<Subcategory> {
    if contains_phrase(&labels.product_words(), BULK_DOG_FAMILY) {
        return Some(Subcategory::BigDog(labels.flavor()));
    }
    labels
        .product_has_any(DOG_KEYWORDS)
        .then(|| Subcategory::Dog(labels.flavor()))
}

fn meaty_bones_rule(labels: &Labels) -> Option<Subcategory> {
    (labels.product_has_any(BONE_KEYWORDS) && !labels.product_has_any(BONE_EXCLUSIONS))
        .then_some(Subcategory::MeatyBones)
}

fn complements_rule(labels: &Labels) -> Option<Subcategory> {
    labels
        .product_has_any(ACCESSORY_FAMILIES)
        .then_some(Subcategory::Complements)
}

/// Raw treats are told apart from boxed goods by unit of measure, not name.
fn raw_treat_rule(labels: &Labels) -> Option<Subcategory> {
    has_pack_descriptor(&labels.option).then_some(Subcategory::RawTreat)
}

/// Assigns a section and subcategory to a line item's labels.
#[must_use]
pub fn classify(product_label: &str, option_label: &str) -> Classification {
    let labels = Labels {
        product: normalize_label(product_label),
        option: normalize_label(option_label),
    };

    RULES
        .iter()
        .find_map(|(name, rule)| {
            rule(&labels).inspect(|subcategory| {
                tracing::trace!(rule = name, %subcategory, "classification rule matched");
            })
        })
        .unwrap_or(Subcategory::Generic)
        .into()
}

/// Classifies a line item and extracts its physical size.
#[must_use]
pub fn classify_line(item: &RawLineItem) -> ClassifiedItem {
    let Classification {
        section,
        subcategory,
    } = classify(&item.product_label, &item.option_label);
    ClassifiedItem {
        section,
        subcategory,
        item: item.clone(),
        weight: extract_weight(&item.product_label, &item.option_label),
    }
}
