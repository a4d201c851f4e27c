//! Batch pass wiring classifier, extractor, matcher and aggregator together.

use std::collections::BTreeMap;

use barfer_core::{AppConfig, CanonicalProduct, Order, PeriodGranularity, RawLineItem};
use serde::Serialize;

use crate::aggregate::{AggregationOptions, AggregationReport, Period};
use crate::classify::{classify_line, ClassifiedItem};
use crate::error::EngineError;
use crate::matcher::{indistinct_entries, match_item, MatchResult, MatcherConfig};

/// A line item after classification, extraction and matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLine {
    pub classified: ClassifiedItem,
    pub matched: MatchResult,
}

impl ResolvedLine {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.matched.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub matcher: MatcherConfig,
    pub aggregation: AggregationOptions,
}

impl EngineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            matcher: MatcherConfig {
                flexible_fallback: config.match_flexible_fallback,
            },
            aggregation: AggregationOptions {
                granularity: config.report_period,
                group_by: config.report_group_by,
                by_point_of_sale: config.report_by_point_of_sale,
            },
        }
    }
}

/// Runs one line item through every resolution stage.
#[must_use]
pub fn resolve_line(
    item: &RawLineItem,
    catalog: &[CanonicalProduct],
    config: &MatcherConfig,
) -> ResolvedLine {
    let classified = classify_line(item);
    let matched = match_item(&classified, catalog, config);

    match &matched {
        Some(found) => tracing::debug!(
            product = %item.product_label,
            option = %item.option_label,
            section = %classified.section,
            subcategory = %classified.subcategory,
            tier = %found.tier,
            matched = %found.product,
            "line item resolved"
        ),
        None => tracing::debug!(
            product = %item.product_label,
            option = %item.option_label,
            section = %classified.section,
            "line item unresolved"
        ),
    }

    ResolvedLine {
        classified,
        matched,
    }
}

/// Resolves and aggregates every line of `orders`.
///
/// # Errors
///
/// Returns [`EngineError::EmptyCatalog`] when `catalog` is empty. No per-item
/// condition is an error: unmatched lines are reported, not raised.
pub fn run_batch(
    orders: &[Order],
    catalog: &[CanonicalProduct],
    options: &EngineOptions,
) -> Result<AggregationReport, EngineError> {
    if catalog.is_empty() {
        return Err(EngineError::EmptyCatalog);
    }
    for (first, shadowed) in indistinct_entries(catalog) {
        tracing::warn!(%first, %shadowed, "catalog entry can never be matched");
    }

    let mut report = AggregationReport::new(options.aggregation);
    let mut line_count = 0_usize;

    for order in orders {
        let ctx = order.context();
        for item in &order.items {
            let resolved = resolve_line(item, catalog, &options.matcher);
            if !resolved.is_resolved() {
                tracing::warn!(
                    order_id = %order.id,
                    product = %item.product_label,
                    option = %item.option_label,
                    "unresolved line item; counted in revenue only"
                );
            } else if !resolved.classified.weight.is_determined()
                || resolved.classified.weight.total(item.quantity).is_none()
            {
                tracing::warn!(
                    order_id = %order.id,
                    product = %item.product_label,
                    option = %item.option_label,
                    "no physical size found for matched line item"
                );
            }
            report.record(&ctx, &resolved);
            line_count += 1;
        }
    }

    tracing::info!(
        orders = orders.len(),
        lines = line_count,
        unresolved = report.unresolved().len(),
        size_gaps = report.size_gaps().len(),
        buckets = report.buckets().len(),
        "batch aggregated"
    );

    Ok(report)
}

/// Splits orders into at most `partitions` groups, keeping every order of a
/// period together. Periods are dealt round-robin in chronological order, so
/// the split is deterministic.
#[must_use]
pub fn partition_by_period(
    orders: Vec<Order>,
    granularity: PeriodGranularity,
    partitions: usize,
) -> Vec<Vec<Order>> {
    let partitions = partitions.max(1);
    let mut by_period: BTreeMap<Period, Vec<Order>> = BTreeMap::new();
    for order in orders {
        by_period
            .entry(Period::of(granularity, order.placed_at))
            .or_default()
            .push(order);
    }

    let mut groups: Vec<Vec<Order>> = vec![Vec::new(); partitions.min(by_period.len())];
    for (idx, (_, period_orders)) in by_period.into_iter().enumerate() {
        let slot = idx % groups.len();
        groups[slot].extend(period_orders);
    }
    groups
}

#[cfg(test)]
mod tests {
    use barfer_core::{Channel, Section};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::matcher::MatchTier;

    fn order(id: &str, month: u32, items: Vec<RawLineItem>) -> Order {
        Order {
            id: id.to_string(),
            channel: Channel::Retail,
            placed_at: Utc.with_ymd_and_hms(2024, month, 1, 10, 0, 0).unwrap(),
            point_of_sale: None,
            items,
        }
    }

    fn catalog() -> Vec<CanonicalProduct> {
        vec![CanonicalProduct::new(Section::Dog, "POLLO", Some("10KG"))]
    }

    #[test]
    fn resolve_line_reports_tier() {
        let item = RawLineItem::new("BARFER BOX PERRO POLLO", "10KG", 1, Decimal::from(100));
        let resolved = resolve_line(&item, &catalog(), &MatcherConfig::default());
        assert!(resolved.is_resolved());
        assert_eq!(
            resolved.matched.map(|m| m.tier),
            Some(MatchTier::OptionAnchored)
        );
    }

    #[test]
    fn run_batch_rejects_empty_catalog() {
        let orders = vec![order("o-1", 1, Vec::new())];
        let err = run_batch(&orders, &[], &EngineOptions::default()).unwrap_err();
        assert_eq!(err, EngineError::EmptyCatalog);
    }

    #[test]
    fn run_batch_with_no_orders_is_empty_report() {
        let report = run_batch(&[], &catalog(), &EngineOptions::default()).unwrap();
        assert!(report.buckets().is_empty());
        assert_eq!(report.totals().revenue, Decimal::ZERO);
    }

    #[test]
    fn run_batch_keeps_unresolved_revenue() {
        let orders = vec![order(
            "o-1",
            1,
            vec![
                RawLineItem::new("BOX PERRO POLLO", "10KG", 1, Decimal::from(100)),
                RawLineItem::new("BOX GATO POLLO", "10KG", 1, Decimal::from(80)),
            ],
        )];
        let report = run_batch(&orders, &catalog(), &EngineOptions::default()).unwrap();
        let totals = report.totals();
        assert_eq!(totals.revenue, Decimal::from(180));
        assert_eq!(totals.unresolved_lines, 1);
        assert_eq!(totals.kilograms, Decimal::from(10));
    }

    #[test]
    fn partitions_keep_periods_together() {
        let orders = vec![
            order("a", 1, Vec::new()),
            order("b", 2, Vec::new()),
            order("c", 1, Vec::new()),
            order("d", 3, Vec::new()),
        ];
        let groups = partition_by_period(orders, PeriodGranularity::Month, 2);
        assert_eq!(groups.len(), 2);
        let ids: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| g.iter().map(|o| o.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "c", "d"], vec!["b"]]);
    }

    #[test]
    fn partitions_never_exceed_period_count() {
        let orders = vec![order("a", 1, Vec::new()), order("b", 1, Vec::new())];
        let groups = partition_by_period(orders, PeriodGranularity::Month, 8);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn partitions_of_nothing_is_empty() {
        assert!(partition_by_period(Vec::new(), PeriodGranularity::Day, 4).is_empty());
    }

    #[test]
    fn options_follow_app_config() {
        let config = AppConfig {
            env: barfer_core::Environment::Test,
            log_level: "debug".to_string(),
            catalog_path: "catalog.yaml".into(),
            report_period: PeriodGranularity::Week,
            report_group_by: barfer_core::GroupBy::Product,
            report_by_point_of_sale: true,
            match_flexible_fallback: false,
            report_workers: 2,
        };
        let options = EngineOptions::from_config(&config);
        assert!(!options.matcher.flexible_fallback);
        assert_eq!(options.aggregation.granularity, PeriodGranularity::Week);
        assert_eq!(options.aggregation.group_by, barfer_core::GroupBy::Product);
        assert!(options.aggregation.by_point_of_sale);
    }
}
