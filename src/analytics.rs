//! Report data derived from a finished pipeline.
//!
//! Everything here is a pure read over the pipeline's exposed state. A dashboard or any other
//! renderer consumes these shapes; nothing in this module draws or formats charts.

use crate::pipeline::{LogEntry, Pipeline};
use crate::types::{LoadResult, PriceCategory, Region, SummaryStats, TransformedRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Revenue total for one group key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueBucket<K> {
    pub key: K,
    pub revenue: f64,
}

/// Status row for one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStatus {
    pub stage: &'static str,
    pub complete: bool,
    pub records: usize,
}

/// count/mean/min/max for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Row filter for data previews. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub region: Option<Region>,
    pub product_name: Option<String>,
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn matches(&self, record: &TransformedRecord) -> bool {
        self.region.map_or(true, |r| record.region == r)
            && self
                .product_name
                .as_deref()
                .map_or(true, |p| record.product_name == p)
    }

    pub fn apply<'a>(&self, records: &'a [TransformedRecord]) -> Vec<&'a TransformedRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

pub fn revenue_by_region(records: &[TransformedRecord]) -> Vec<RevenueBucket<Region>> {
    group_revenue(records, |r| r.region)
}

pub fn revenue_by_price_category(
    records: &[TransformedRecord],
) -> Vec<RevenueBucket<PriceCategory>> {
    group_revenue(records, |r| r.price_category)
}

/// Daily totals ordered by date
pub fn daily_revenue(records: &[TransformedRecord]) -> Vec<RevenueBucket<NaiveDate>> {
    group_revenue(records, |r| r.date)
}

/// Quarterly totals labelled `Q1`..`Q4`, in quarter order
pub fn revenue_by_quarter(records: &[TransformedRecord]) -> Vec<RevenueBucket<String>> {
    group_revenue(records, |r| r.quarter)
        .into_iter()
        .map(|b| RevenueBucket {
            key: format!("Q{}", b.key),
            revenue: b.revenue,
        })
        .collect()
}

/// The `n` products with the highest revenue, highest first. Ties keep name order.
pub fn top_products(records: &[TransformedRecord], n: usize) -> Vec<RevenueBucket<String>> {
    let mut buckets = group_revenue(records, |r| r.product_name.clone());
    buckets.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    buckets.truncate(n);
    buckets
}

/// Sums revenue per key; output is ordered by key
fn group_revenue<K, F>(records: &[TransformedRecord], key_fn: F) -> Vec<RevenueBucket<K>>
where
    K: Ord,
    F: Fn(&TransformedRecord) -> K,
{
    let mut totals: BTreeMap<K, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(key_fn(record)).or_insert(0.0) += record.revenue;
    }
    totals
        .into_iter()
        .map(|(key, revenue)| RevenueBucket { key, revenue })
        .collect()
}

/// Extract / Transform / Load rows for the overview table
pub fn stage_statuses(pipeline: &Pipeline) -> Vec<StageStatus> {
    let extracted = pipeline.extracted_data().map(<[_]>::len);
    let transformed = pipeline.transformed_data().map(<[_]>::len);
    let loaded = pipeline
        .load_result()
        .filter(|r| r.is_success())
        .map(|r| r.records_loaded);

    vec![
        StageStatus {
            stage: "Extract",
            complete: extracted.is_some(),
            records: extracted.unwrap_or(0),
        },
        StageStatus {
            stage: "Transform",
            complete: transformed.is_some(),
            records: transformed.unwrap_or(0),
        },
        StageStatus {
            stage: "Load",
            complete: loaded.is_some(),
            records: loaded.unwrap_or(0),
        },
    ]
}

/// Column statistics for the numeric columns of `records`
pub fn column_stats(records: &[&TransformedRecord]) -> Vec<ColumnStats> {
    let columns: [(&'static str, fn(&TransformedRecord) -> f64); 7] = [
        ("product_id", |r| r.product_id as f64),
        ("quantity", |r| r.quantity as f64),
        ("price", |r| r.price),
        ("customer_id", |r| r.customer_id as f64),
        ("revenue", |r| r.revenue),
        ("month", |r| r.month as f64),
        ("quarter", |r| r.quarter as f64),
    ];

    columns
        .into_iter()
        .map(|(column, value)| {
            let values: Vec<f64> = records.iter().map(|r| value(r)).collect();
            let count = values.len();
            let (mean, min, max) = if count == 0 {
                (0.0, 0.0, 0.0)
            } else {
                (
                    values.iter().sum::<f64>() / count as f64,
                    values.iter().copied().fold(f64::INFINITY, f64::min),
                    values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            };
            ColumnStats {
                column,
                count,
                mean,
                min,
                max,
            }
        })
        .collect()
}

/// Everything a report view needs from one pipeline, in one serializable value
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub summary: Option<SummaryStats>,
    pub stages: Vec<StageStatus>,
    pub load_result: Option<LoadResult>,
    pub revenue_by_region: Vec<RevenueBucket<Region>>,
    pub revenue_by_price_category: Vec<RevenueBucket<PriceCategory>>,
    pub daily_revenue: Vec<RevenueBucket<NaiveDate>>,
    pub top_products: Vec<RevenueBucket<String>>,
    pub revenue_by_quarter: Vec<RevenueBucket<String>>,
    pub logs: Vec<LogEntry>,
}

impl ReportData {
    pub const TOP_PRODUCTS: usize = 10;

    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        let records = pipeline.transformed_data().unwrap_or(&[]);
        Self {
            summary: pipeline.get_summary_stats(),
            stages: stage_statuses(pipeline),
            load_result: pipeline.load_result().cloned(),
            revenue_by_region: revenue_by_region(records),
            revenue_by_price_category: revenue_by_price_category(records),
            daily_revenue: daily_revenue(records),
            top_products: top_products(records, Self::TOP_PRODUCTS),
            revenue_by_quarter: revenue_by_quarter(records),
            logs: pipeline.logs().entries().to_vec(),
        }
    }
}
