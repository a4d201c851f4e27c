//! Bucketed accumulation of resolved line items.
//!
//! Buckets are keyed by `(period, channel, point of sale, category)`. Every
//! operation here is a sum or a set union, so folding lines in any order, or
//! folding partitions separately and merging, gives the same report.

use std::collections::{BTreeMap, BTreeSet};

use barfer_core::{CanonicalProduct, Channel, GroupBy, OrderContext, PeriodGranularity};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::classify::{ClassifiedItem, Subcategory};
use crate::pipeline::ResolvedLine;
use crate::quantity::ResolvedQuantity;

/// Time bucket an order falls into, derived from its UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Day(NaiveDate),
    /// ISO 8601 week; `year` is the ISO week-numbering year.
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl Period {
    #[must_use]
    pub fn of(granularity: PeriodGranularity, at: DateTime<Utc>) -> Self {
        match granularity {
            PeriodGranularity::Day => Period::Day(at.date_naive()),
            PeriodGranularity::Week => {
                let iso = at.iso_week();
                Period::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            PeriodGranularity::Month => Period::Month {
                year: at.year(),
                month: at.month(),
            },
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Week { year, week } => write!(f, "{year}-W{week:02}"),
            Period::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

/// What a bucket groups by. Unmatched lines always go to
/// [`CategoryKey::Unresolved`], whatever the grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    Category(Subcategory),
    Product(CanonicalProduct),
    Unresolved,
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKey::Category(subcategory) => write!(f, "{subcategory}"),
            CategoryKey::Product(product) => write!(f, "{product}"),
            CategoryKey::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub period: Period,
    pub channel: Channel,
    /// Only set when the report is split by point of sale.
    pub point_of_sale: Option<String>,
    pub category: CategoryKey,
}

/// One line's contribution to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution<'a> {
    pub order_id: &'a str,
    /// `None` for unresolved lines: they add revenue but no physical quantity.
    pub quantity: Option<ResolvedQuantity>,
    pub revenue: Decimal,
}

/// Running totals for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationBucket {
    order_ids: BTreeSet<String>,
    pub line_count: u64,
    pub revenue: Decimal,
    pub kilograms: Decimal,
    pub units: u64,
}

impl AggregationBucket {
    /// Distinct source orders, not line items.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.order_ids.len()
    }

    #[must_use]
    pub fn order_ids(&self) -> &BTreeSet<String> {
        &self.order_ids
    }

    /// Returns the bucket with `contribution` folded in.
    #[must_use]
    pub fn accumulate(mut self, contribution: &Contribution<'_>) -> Self {
        self.add(contribution);
        self
    }

    /// In-place form of [`AggregationBucket::accumulate`], for buckets owned
    /// by the caller's aggregation pass.
    pub fn add(&mut self, contribution: &Contribution<'_>) {
        if !self.order_ids.contains(contribution.order_id) {
            self.order_ids.insert(contribution.order_id.to_string());
        }
        self.line_count += 1;
        self.revenue = self.revenue.saturating_add(contribution.revenue);
        match contribution.quantity {
            Some(ResolvedQuantity::Kilograms(kg)) => {
                self.kilograms = self.kilograms.saturating_add(kg);
            }
            Some(ResolvedQuantity::Units(n)) => self.units = self.units.saturating_add(n),
            None => {}
        }
    }

    pub fn merge(&mut self, other: &AggregationBucket) {
        self.order_ids.extend(other.order_ids.iter().cloned());
        self.line_count += other.line_count;
        self.revenue = self.revenue.saturating_add(other.revenue);
        self.kilograms = self.kilograms.saturating_add(other.kilograms);
        self.units = self.units.saturating_add(other.units);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    pub granularity: PeriodGranularity,
    pub group_by: GroupBy,
    pub by_point_of_sale: bool,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            granularity: PeriodGranularity::Month,
            group_by: GroupBy::Category,
            by_point_of_sale: false,
        }
    }
}

/// A line set aside for operator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedLine {
    pub order_id: String,
    pub item: ClassifiedItem,
}

/// One flattened bucket, as handed to report renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub period: String,
    pub channel: Channel,
    pub point_of_sale: Option<String>,
    pub category: String,
    pub orders: usize,
    pub lines: u64,
    pub revenue: Decimal,
    pub kilograms: Decimal,
    pub units: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub orders: usize,
    pub lines: u64,
    pub revenue: Decimal,
    pub kilograms: Decimal,
    pub units: u64,
    pub unresolved_lines: usize,
    pub unresolved_revenue: Decimal,
    pub size_gaps: usize,
}

/// Output of an aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationReport {
    options: AggregationOptions,
    buckets: BTreeMap<BucketKey, AggregationBucket>,
    unresolved: Vec<FlaggedLine>,
    size_gaps: Vec<FlaggedLine>,
}

impl AggregationReport {
    #[must_use]
    pub fn new(options: AggregationOptions) -> Self {
        Self {
            options,
            buckets: BTreeMap::new(),
            unresolved: Vec::new(),
            size_gaps: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    #[must_use]
    pub fn buckets(&self) -> &BTreeMap<BucketKey, AggregationBucket> {
        &self.buckets
    }

    #[must_use]
    pub fn bucket(&self, key: &BucketKey) -> Option<&AggregationBucket> {
        self.buckets.get(key)
    }

    /// Lines no matcher tier accepted.
    #[must_use]
    pub fn unresolved(&self) -> &[FlaggedLine] {
        &self.unresolved
    }

    /// Matched lines whose physical size could not be determined.
    #[must_use]
    pub fn size_gaps(&self) -> &[FlaggedLine] {
        &self.size_gaps
    }

    /// Folds one resolved line of the order described by `ctx` into the report.
    pub fn record(&mut self, ctx: &OrderContext, line: &ResolvedLine) {
        let classified = &line.classified;
        let (category, quantity) = match &line.matched {
            Some(found) => {
                let category = match self.options.group_by {
                    GroupBy::Category => CategoryKey::Category(classified.subcategory),
                    GroupBy::Product => CategoryKey::Product(found.product.clone()),
                };
                // A magnitude that overflows when multiplied out is malformed
                // free text: the line keeps its revenue and is reviewed like
                // an unsized one.
                let quantity = classified.weight.total(classified.item.quantity);
                if quantity.is_none() || !classified.weight.is_determined() {
                    self.size_gaps.push(flag(ctx, classified));
                }
                (category, quantity)
            }
            None => {
                self.unresolved.push(flag(ctx, classified));
                (CategoryKey::Unresolved, None)
            }
        };

        let key = BucketKey {
            period: Period::of(self.options.granularity, ctx.placed_at),
            channel: ctx.channel,
            point_of_sale: if self.options.by_point_of_sale {
                ctx.point_of_sale.clone()
            } else {
                None
            },
            category,
        };

        self.buckets.entry(key).or_default().add(&Contribution {
            order_id: &ctx.order_id,
            quantity,
            revenue: classified.item.revenue(),
        });
    }

    /// Combines a report built over a disjoint slice of the input.
    ///
    /// Review lists are re-sorted by order id so the result does not depend
    /// on merge order.
    pub fn merge(&mut self, other: AggregationReport) {
        for (key, bucket) in other.buckets {
            self.buckets.entry(key).or_default().merge(&bucket);
        }
        self.unresolved.extend(other.unresolved);
        self.size_gaps.extend(other.size_gaps);
        self.unresolved.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        self.size_gaps.sort_by(|a, b| a.order_id.cmp(&b.order_id));
    }

    /// Buckets flattened in key order.
    #[must_use]
    pub fn rows(&self) -> Vec<ReportRow> {
        self.buckets
            .iter()
            .map(|(key, bucket)| ReportRow {
                period: key.period.to_string(),
                channel: key.channel,
                point_of_sale: key.point_of_sale.clone(),
                category: key.category.to_string(),
                orders: bucket.order_count(),
                lines: bucket.line_count,
                revenue: bucket.revenue,
                kilograms: bucket.kilograms,
                units: bucket.units,
            })
            .collect()
    }

    /// Report-wide totals. `orders` counts each source order once even when
    /// its lines span several buckets.
    #[must_use]
    pub fn totals(&self) -> ReportTotals {
        let mut order_ids: BTreeSet<&str> = BTreeSet::new();
        let mut totals = ReportTotals::default();
        for bucket in self.buckets.values() {
            order_ids.extend(bucket.order_ids.iter().map(String::as_str));
            totals.lines += bucket.line_count;
            totals.revenue = totals.revenue.saturating_add(bucket.revenue);
            totals.kilograms = totals.kilograms.saturating_add(bucket.kilograms);
            totals.units = totals.units.saturating_add(bucket.units);
        }
        totals.orders = order_ids.len();
        totals.unresolved_lines = self.unresolved.len();
        totals.unresolved_revenue = self
            .unresolved
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.item.item.revenue()));
        totals.size_gaps = self.size_gaps.len();
        totals
    }
}

fn flag(ctx: &OrderContext, classified: &ClassifiedItem) -> FlaggedLine {
    FlaggedLine {
        order_id: ctx.order_id.clone(),
        item: classified.clone(),
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
