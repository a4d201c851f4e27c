//! `resolve` and `catalog check` commands.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use barfer_core::{AppConfig, CatalogFile, RawLineItem, Section};
use barfer_engine::{
    indistinct_entries, normalize_label, resolve_line, MatcherConfig, ResolvedQuantity,
};
use rust_decimal::Decimal;

fn load_catalog(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<CatalogFile> {
    let path = path.unwrap_or(config.catalog_path.as_path());
    barfer_core::load_catalog(path)
        .with_context(|| format!("loading catalog from {}", path.display()))
}

/// Print every resolution stage for one product/option pair.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) fn run_resolve(
    config: &AppConfig,
    product: &str,
    option: &str,
    catalog_path: Option<&Path>,
    no_fallback: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(config, catalog_path)?;
    let matcher = MatcherConfig {
        flexible_fallback: config.match_flexible_fallback && !no_fallback,
    };

    let item = RawLineItem::new(product, option, 1, Decimal::ZERO);
    let resolved = resolve_line(&item, &catalog.products, &matcher);
    let classified = &resolved.classified;

    println!("product:     {}", normalize_label(product));
    println!("option:      {}", normalize_label(option));
    println!("section:     {}", classified.section);
    println!("category:    {}", classified.subcategory);
    println!(
        "size:        {} ({:?}{})",
        describe_quantity(&classified.weight.per_item),
        classified.weight.basis,
        classified
            .weight
            .token
            .as_deref()
            .map(|t| format!(", from {t}"))
            .unwrap_or_default()
    );
    match &resolved.matched {
        Some(found) => println!(
            "match:       {} (tier {} {})",
            found.product,
            found.tier.level(),
            found.tier
        ),
        None => println!("match:       unresolved"),
    }

    Ok(())
}

/// Validate the catalog and print entry counts per section.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, fails validation, or
/// holds entries the matcher cannot tell apart.
pub(crate) fn run_catalog_check(config: &AppConfig, catalog_path: Option<&Path>) -> anyhow::Result<()> {
    let catalog = load_catalog(config, catalog_path)?;

    let clashes = indistinct_entries(&catalog.products);
    for (first, shadowed) in &clashes {
        eprintln!("  {shadowed} is indistinct from {first}");
    }
    if !clashes.is_empty() {
        anyhow::bail!("{} catalog entries are shadowed by earlier ones", clashes.len());
    }

    let counts = section_counts(&catalog);

    println!("catalog ok: {} products", catalog.products.len());
    for (section, count) in counts {
        println!("  {section:<6} {count}");
    }
    Ok(())
}

fn section_counts(catalog: &CatalogFile) -> BTreeMap<Section, usize> {
    let mut counts = BTreeMap::new();
    for product in &catalog.products {
        *counts.entry(product.section).or_insert(0) += 1;
    }
    counts
}

fn describe_quantity(quantity: &ResolvedQuantity) -> String {
    match quantity {
        ResolvedQuantity::Kilograms(kg) => format!("{} kg", kg.normalize()),
        ResolvedQuantity::Units(n) => format!("{n} units"),
    }
}

#[cfg(test)]
mod tests {
    use barfer_core::CanonicalProduct;

    use super::*;

    #[test]
    fn counts_entries_per_section() {
        let catalog = CatalogFile {
            products: vec![
                CanonicalProduct::new(Section::Dog, "POLLO", Some("10KG")),
                CanonicalProduct::new(Section::Dog, "VACA", Some("10KG")),
                CanonicalProduct::new(Section::Raw, "OREJA", Some("X50")),
            ],
        };
        let counts = section_counts(&catalog);
        assert_eq!(counts.get(&Section::Dog), Some(&2));
        assert_eq!(counts.get(&Section::Raw), Some(&1));
        assert_eq!(counts.get(&Section::Cat), None);
    }

    #[test]
    fn quantities_read_naturally() {
        assert_eq!(
            describe_quantity(&ResolvedQuantity::Kilograms(Decimal::new(25, 1))),
            "2.5 kg"
        );
        assert_eq!(describe_quantity(&ResolvedQuantity::Units(50)), "50 units");
    }
}
