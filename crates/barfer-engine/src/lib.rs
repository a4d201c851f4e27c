//! Product identity resolution and weight/revenue aggregation for Barfer
//! order reporting.
//!
//! Data flows one way: a [`RawLineItem`](barfer_core::RawLineItem) is
//! normalized ([`normalize`]), classified and sized ([`classify`],
//! [`quantity`]), matched to a canonical catalog entry ([`matcher`]) and
//! folded into report buckets ([`aggregate`]). [`pipeline::run_batch`] runs
//! the whole chain over a slice of orders.
//!
//! Everything here is synchronous and free of I/O.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod quantity;

pub use aggregate::{
    AggregationBucket, AggregationOptions, AggregationReport, BucketKey, CategoryKey,
    Contribution, FlaggedLine, Period, ReportRow, ReportTotals,
};
pub use classify::{classify, classify_line, Classification, ClassifiedItem, Flavor, Subcategory};
pub use error::EngineError;
pub use matcher::{
    indistinct_entries, match_at_tier, match_item, CatalogMatch, MatchResult, MatchTier,
    MatcherConfig,
};
pub use normalize::{normalize, normalize_label};
pub use pipeline::{partition_by_period, resolve_line, run_batch, EngineOptions, ResolvedLine};
pub use quantity::{extract_weight, ResolvedQuantity, WeightBasis, WeightReading};
