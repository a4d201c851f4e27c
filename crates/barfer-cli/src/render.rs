//! Text and JSON rendering of aggregation reports.

use std::fmt::Write as _;

use barfer_engine::{AggregationReport, FlaggedLine, ReportRow, ReportTotals};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    period: String,
    group_by: String,
    rows: Vec<ReportRow>,
    totals: ReportTotals,
    unresolved: &'a [FlaggedLine],
    size_gaps: &'a [FlaggedLine],
}

/// Serialize the full report, review lists included.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn render_json(report: &AggregationReport) -> anyhow::Result<String> {
    let document = ReportDocument {
        period: report.options().granularity.to_string(),
        group_by: report.options().group_by.to_string(),
        rows: report.rows(),
        totals: report.totals(),
        unresolved: report.unresolved(),
        size_gaps: report.size_gaps(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Fixed-width table of report rows followed by totals and review lists.
pub(crate) fn render_table(report: &AggregationReport) -> String {
    let rows = report.rows();
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("no line items to report\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<11}{:<11}{:<14}{:<30}{:>7}{:>15}{:>11}{:>8}",
        "PERIOD", "CHANNEL", "POS", "CATEGORY", "ORDERS", "REVENUE", "KG", "UNITS"
    );
    for row in &rows {
        let _ = writeln!(
            out,
            "{:<11}{:<11}{:<14}{:<30}{:>7}{:>15}{:>11}{:>8}",
            row.period,
            row.channel.to_string(),
            row.point_of_sale.as_deref().unwrap_or("-"),
            truncate(&row.category, 29),
            row.orders,
            fmt_decimal(row.revenue),
            fmt_decimal(row.kilograms),
            row.units
        );
    }

    let totals = report.totals();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "orders: {}  lines: {}  revenue: {}  kg: {}  units: {}",
        totals.orders,
        totals.lines,
        fmt_decimal(totals.revenue),
        fmt_decimal(totals.kilograms),
        totals.units
    );

    if totals.unresolved_lines > 0 {
        let _ = writeln!(
            out,
            "unresolved: {} lines, revenue {}",
            totals.unresolved_lines,
            fmt_decimal(totals.unresolved_revenue)
        );
        for line in report.unresolved() {
            let _ = writeln!(out, "  {}", describe(line));
        }
    }
    if totals.size_gaps > 0 {
        let _ = writeln!(out, "no physical size: {} lines", totals.size_gaps);
        for line in report.size_gaps() {
            let _ = writeln!(out, "  {}", describe(line));
        }
    }

    out
}

fn describe(line: &FlaggedLine) -> String {
    let item = &line.item.item;
    format!(
        "{}: {} / {} x{} ({})",
        line.order_id, item.product_label, item.option_label, item.quantity, line.item.section
    )
}

fn fmt_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use barfer_core::{CanonicalProduct, Channel, OrderContext, RawLineItem, Section};
    use barfer_engine::{resolve_line, AggregationOptions, MatcherConfig};
    use chrono::{TimeZone, Utc};

    use super::*;

    fn report_with(lines: &[(&str, &str, u32, i64)]) -> AggregationReport {
        let catalog = vec![CanonicalProduct::new(Section::Dog, "POLLO", Some("10KG"))];
        let ctx = OrderContext {
            order_id: "o-1".to_string(),
            channel: Channel::Retail,
            placed_at: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
            point_of_sale: None,
        };
        let mut report = AggregationReport::new(AggregationOptions::default());
        for (product, option, quantity, price) in lines {
            let item = RawLineItem::new(product, option, *quantity, Decimal::from(*price));
            report.record(&ctx, &resolve_line(&item, &catalog, &MatcherConfig::default()));
        }
        report
    }

    #[test]
    fn empty_report_says_so() {
        let report = report_with(&[]);
        assert_eq!(render_table(&report), "no line items to report\n");
    }

    #[test]
    fn table_lists_rows_and_totals() {
        let report = report_with(&[("BOX PERRO POLLO", "10KG", 2, 15_000)]);
        let table = render_table(&report);
        assert!(table.starts_with("PERIOD"));
        assert!(table.contains("2024-03"));
        assert!(table.contains("PERRO POLLO"));
        assert!(table.contains("revenue: 30000"));
        assert!(table.contains("kg: 20"));
        assert!(!table.contains("unresolved"));
    }

    #[test]
    fn table_lists_unresolved_lines() {
        let report = report_with(&[("GIFT CARD", "", 1, 5_000)]);
        let table = render_table(&report);
        assert!(table.contains("UNRESOLVED"));
        assert!(table.contains("unresolved: 1 lines, revenue 5000"));
        assert!(table.contains("o-1: GIFT CARD /  x1 (other)"));
    }

    #[test]
    fn json_carries_rows_and_totals() {
        let report = report_with(&[("BOX PERRO POLLO", "10KG", 1, 20_000)]);
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["period"], "month");
        assert_eq!(value["rows"][0]["category"], "PERRO POLLO");
        assert_eq!(value["rows"][0]["channel"], "retail");
        assert_eq!(value["totals"]["orders"], 1);
        assert!(value["unresolved"].as_array().unwrap().is_empty());
    }

    #[test]
    fn long_categories_are_truncated() {
        assert_eq!(truncate("ABCDEFGHIJ", 8), "ABCDE...");
        assert_eq!(truncate("ABC", 8), "ABC");
    }
}
