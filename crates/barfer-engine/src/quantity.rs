//! Weight/unit extraction from product and option labels.
//!
//! Bulk boxes are measured in kilograms. Gram-denominated packs and
//! multiplier-coded packs (`X50`) are measured in units and are never
//! converted to kilograms.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::normalize::{
    gram_pattern, kilogram_pattern, multiplier_pattern, normalize_label, parse_number,
};

/// Product families whose name implies a fixed box size, in kilograms.
pub(crate) const FIXED_SIZE_FAMILIES: &[(&str, u32)] = &[("BIG DOG", 15)];

/// Product families that are accessories rather than food; they are counted
/// per item and never contribute kilograms.
pub(crate) const ACCESSORY_FAMILIES: &[&str] = &[
    "COMPLEMENTO",
    "COMPLEMENTOS",
    "ACCESORIO",
    "ACCESORIOS",
    "COMEDERO",
    "JUGUETE",
    "BOLSA",
];

/// A physical quantity. Kilograms and units are never summed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResolvedQuantity {
    Kilograms(Decimal),
    Units(u64),
}

impl ResolvedQuantity {
    #[must_use]
    pub fn kilograms(&self) -> Decimal {
        match self {
            ResolvedQuantity::Kilograms(kg) => *kg,
            ResolvedQuantity::Units(_) => Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn units(&self) -> u64 {
        match self {
            ResolvedQuantity::Kilograms(_) => 0,
            ResolvedQuantity::Units(n) => *n,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            ResolvedQuantity::Kilograms(kg) => kg.is_zero(),
            ResolvedQuantity::Units(n) => *n == 0,
        }
    }

    /// Multiplies the magnitude by an ordered quantity. `None` on overflow.
    #[must_use]
    pub fn checked_scaled(&self, factor: u32) -> Option<Self> {
        match self {
            ResolvedQuantity::Kilograms(kg) => kg
                .checked_mul(Decimal::from(factor))
                .map(ResolvedQuantity::Kilograms),
            ResolvedQuantity::Units(n) => n
                .checked_mul(u64::from(factor))
                .map(ResolvedQuantity::Units),
        }
    }
}

/// Which extraction rule produced a [`WeightReading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBasis {
    /// The product label names a fixed-size family (e.g. `BIG DOG`).
    FixedFamily,
    /// Accessory family: counted per item, excluded from kilogram totals.
    Accessory,
    OptionKilograms,
    /// Gram packs: one unit per pack, never converted to kilograms.
    OptionGrams,
    /// `X<n>` multiplier: `n` units per item.
    Multiplier,
    /// Nothing matched; the item has no determinable physical size.
    Undetermined,
}

/// Result of [`extract_weight`] for a single ordered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightReading {
    /// Magnitude for one ordered item; see [`WeightReading::total`].
    pub per_item: ResolvedQuantity,
    pub basis: WeightBasis,
    /// Canonical descriptor the magnitude came from, e.g. `10KG`, `200GRS`, `X50`.
    pub token: Option<String>,
}

impl WeightReading {
    fn new(per_item: ResolvedQuantity, basis: WeightBasis, token: Option<String>) -> Self {
        Self {
            per_item,
            basis,
            token,
        }
    }

    /// Physical quantity for `quantity` ordered items, or `None` when the
    /// label carried a magnitude too large to multiply out.
    #[must_use]
    pub fn total(&self, quantity: u32) -> Option<ResolvedQuantity> {
        self.per_item.checked_scaled(quantity)
    }

    /// `false` when no rule could size the item.
    #[must_use]
    pub fn is_determined(&self) -> bool {
        self.basis != WeightBasis::Undetermined
    }
}

/// Extracts the physical size of one item of a line.
///
/// Rules, first match wins:
/// 1. Fixed-size family in the product label → that family's kilograms,
///    whatever the option says.
/// 2. Accessory family in the product label → one unit, no kilograms.
/// 3. `<n> KG` in the option label → `n` kilograms.
/// 4. `<n> GRS` in the option label → one unit (pack count).
/// 5. `X<n>` in the option label → `n` units.
/// 6. Rules 3–5 against the product label, when the option label is blank
///    or carries no descriptor at all.
/// 7. Otherwise `Units(0)` with [`WeightBasis::Undetermined`].
///
/// Never fails.
#[must_use]
pub fn extract_weight(product_label: &str, option_label: &str) -> WeightReading {
    let product = normalize_label(product_label);
    let words: Vec<&str> = product.split(' ').collect();

    for (family, kilograms) in FIXED_SIZE_FAMILIES {
        if contains_phrase(&words, family) {
            return WeightReading::new(
                ResolvedQuantity::Kilograms(Decimal::from(*kilograms)),
                WeightBasis::FixedFamily,
                Some(format!("{kilograms}KG")),
            );
        }
    }

    // One unit per item rather than zero: accessories carry no weight but
    // still show up in unit counts.
    if words.iter().any(|w| ACCESSORY_FAMILIES.contains(w)) {
        return WeightReading::new(ResolvedQuantity::Units(1), WeightBasis::Accessory, None);
    }

    let option = normalize_label(option_label);
    read_descriptor(&option)
        .or_else(|| read_descriptor(&product))
        .unwrap_or_else(|| {
            WeightReading::new(ResolvedQuantity::Units(0), WeightBasis::Undetermined, None)
        })
}

/// The canonical quantity token of an option label (`10KG`, `200GRS`, `X50`),
/// using the same precedence as [`extract_weight`] rules 3–5.
#[must_use]
pub fn option_token(option_label: &str) -> Option<String> {
    read_descriptor(&normalize_label(option_label)).and_then(|reading| reading.token)
}

/// `true` when the label carries a gram or `X<n>` descriptor, the mark of
/// raw single-ingredient treats.
#[must_use]
pub fn has_pack_descriptor(label: &str) -> bool {
    let canonical = normalize_label(label);
    gram_pattern().is_match(&canonical) || multiplier_pattern().is_match(&canonical)
}

/// Applies rules 3–5 to an already canonical label.
fn read_descriptor(canonical: &str) -> Option<WeightReading> {
    if let Some(caps) = kilogram_pattern().captures(canonical) {
        if let Some(kg) = parse_number(&caps[1]).filter(|kg| !kg.is_sign_negative()) {
            return Some(WeightReading::new(
                ResolvedQuantity::Kilograms(kg),
                WeightBasis::OptionKilograms,
                Some(caps[0].to_string()),
            ));
        }
    }

    if let Some(caps) = gram_pattern().captures(canonical) {
        return Some(WeightReading::new(
            ResolvedQuantity::Units(1),
            WeightBasis::OptionGrams,
            Some(caps[0].to_string()),
        ));
    }

    if let Some(caps) = multiplier_pattern().captures(canonical) {
        if let Ok(count) = caps[1].parse::<u64>() {
            return Some(WeightReading::new(
                ResolvedQuantity::Units(count),
                WeightBasis::Multiplier,
                Some(caps[0].to_string()),
            ));
        }
    }

    None
}

/// `true` when the space-separated `phrase` occurs as consecutive `words`.
pub(crate) fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    !needle.is_empty() && words.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kg(n: i64) -> ResolvedQuantity {
        ResolvedQuantity::Kilograms(Decimal::from(n))
    }

    #[test]
    fn fixed_family_overrides_option() {
        let reading = extract_weight("BIG DOG POLLO", "15KG");
        assert_eq!(reading.per_item, kg(15));
        assert_eq!(reading.basis, WeightBasis::FixedFamily);
    }

    #[test]
    fn fixed_family_ignores_conflicting_option() {
        let reading = extract_weight("Big Dog Vaca", "10 KG");
        assert_eq!(reading.per_item, kg(15));
        assert_eq!(reading.token.as_deref(), Some("15KG"));
    }

    #[test]
    fn accessory_counts_one_unit_and_no_kilograms() {
        let reading = extract_weight("COMPLEMENTOS", "5KG");
        assert_eq!(reading.basis, WeightBasis::Accessory);
        assert_eq!(reading.per_item, ResolvedQuantity::Units(1));
        assert_eq!(reading.per_item.kilograms(), Decimal::ZERO);
    }

    #[test]
    fn option_kilograms() {
        let reading = extract_weight("BOX PERRO POLLO", "10KG");
        assert_eq!(reading.per_item, kg(10));
        assert_eq!(reading.basis, WeightBasis::OptionKilograms);
        assert_eq!(reading.token.as_deref(), Some("10KG"));
    }

    #[test]
    fn option_kilograms_with_space_and_decimal_comma() {
        let reading = extract_weight("GATO POLLO", "2,5 kg");
        assert_eq!(
            reading.per_item,
            ResolvedQuantity::Kilograms(Decimal::new(25, 1))
        );
        assert_eq!(reading.token.as_deref(), Some("2.5KG"));
    }

    #[test]
    fn option_grams_are_one_unit_per_pack() {
        let reading = extract_weight("CORNALITOS", "200GRS");
        assert_eq!(reading.per_item, ResolvedQuantity::Units(1));
        assert_eq!(reading.basis, WeightBasis::OptionGrams);
        assert_eq!(reading.total(3), Some(ResolvedQuantity::Units(3)));
    }

    #[test]
    fn multiplier_is_units_per_item() {
        let reading = extract_weight("OREJA", "X50");
        assert_eq!(reading.per_item, ResolvedQuantity::Units(50));
        assert_eq!(reading.total(2), Some(ResolvedQuantity::Units(100)));
    }

    #[test]
    fn option_is_authoritative_over_product_label() {
        let reading = extract_weight("POLLO 5KG", "10KG");
        assert_eq!(reading.per_item, kg(10));
    }

    #[test]
    fn product_label_used_when_option_has_no_descriptor() {
        let reading = extract_weight("HUESOS CARNOSOS 5KG", "");
        assert_eq!(reading.per_item, kg(5));
    }

    #[test]
    fn nothing_matches_is_undetermined_zero_units() {
        let reading = extract_weight("CALDO DE HUESOS", "GRANDE");
        assert_eq!(reading.per_item, ResolvedQuantity::Units(0));
        assert!(!reading.is_determined());
    }

    #[test]
    fn kilograms_scale_with_quantity() {
        assert_eq!(kg(15).checked_scaled(3), Some(kg(45)));
    }

    #[test]
    fn oversized_kilograms_do_not_scale() {
        let reading = extract_weight("BOX PERRO POLLO", "79228162514264337593543950335KG");
        assert_eq!(reading.per_item, ResolvedQuantity::Kilograms(Decimal::MAX));
        assert_eq!(reading.total(1), Some(ResolvedQuantity::Kilograms(Decimal::MAX)));
        assert!(reading.total(2).is_none());
        assert!(ResolvedQuantity::Units(u64::MAX).checked_scaled(2).is_none());
    }

    #[test]
    fn quantity_accessors_are_exclusive() {
        assert_eq!(kg(10).units(), 0);
        assert_eq!(ResolvedQuantity::Units(4).kilograms(), Decimal::ZERO);
    }

    #[test]
    fn option_token_prefers_kilograms() {
        assert_eq!(option_token("10 kg x2").as_deref(), Some("10KG"));
        assert_eq!(option_token("x 50").as_deref(), Some("X50"));
        assert!(option_token("grande").is_none());
    }

    #[test]
    fn pack_descriptor_detection() {
        assert!(has_pack_descriptor("200grs"));
        assert!(has_pack_descriptor("X50"));
        assert!(!has_pack_descriptor("10KG"));
        assert!(!has_pack_descriptor(""));
    }

    #[test]
    fn phrase_must_be_consecutive_words() {
        let words = ["BIG", "DOG", "POLLO"];
        assert!(contains_phrase(&words, "BIG DOG"));
        assert!(!contains_phrase(&words, "DOG BIG"));
        assert!(!contains_phrase(&["BIGDOG"], "BIG DOG"));
    }
}
