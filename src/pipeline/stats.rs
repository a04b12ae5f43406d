use crate::types::{SummaryStats, TransformedRecord};
use std::collections::HashSet;

/// Aggregate a transformed dataset. Pure; the caller decides whether a dataset exists.
pub fn summarize(records: &[TransformedRecord]) -> SummaryStats {
    let total_records = records.len();
    let total_revenue: f64 = records.iter().map(|r| r.revenue).sum();
    let avg_revenue = if total_records == 0 {
        0.0
    } else {
        total_revenue / total_records as f64
    };

    let date_range = match (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "n/a".to_string(),
    };

    SummaryStats {
        total_records,
        total_revenue,
        avg_revenue,
        date_range,
        unique_products: records
            .iter()
            .map(|r| r.product_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        unique_customers: records.iter().map(|r| r.customer_id).collect::<HashSet<_>>().len(),
        regions: records.iter().map(|r| r.region).collect::<HashSet<_>>().len(),
    }
}
