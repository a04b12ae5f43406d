use crate::types::{PriceCategory, Region, SalesRecord, TransformedRecord};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Output of the transform stage before it is stored on the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub records: Vec<TransformedRecord>,
    pub duplicates_removed: usize,
}

/// Full-row identity of an extracted record. Prices compare by bit pattern.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey<'a> {
    date: NaiveDate,
    product_id: Option<u32>,
    product_name: &'a str,
    quantity: Option<u32>,
    price_bits: Option<u64>,
    region: Region,
    customer_id: Option<u32>,
}

impl<'a> From<&'a SalesRecord> for RowKey<'a> {
    fn from(r: &'a SalesRecord) -> Self {
        Self {
            date: r.date,
            product_id: r.product_id,
            product_name: &r.product_name,
            quantity: r.quantity,
            price_bits: r.price.map(f64::to_bits),
            region: r.region,
            customer_id: r.customer_id,
        }
    }
}

/// Derive calculated fields, drop exact duplicate rows (first occurrence wins) and zero-fill
/// missing numeric values. Input order is preserved.
pub fn transform_records(records: &[SalesRecord]) -> TransformOutput {
    let mut seen = HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    let mut duplicates_removed = 0;

    for record in records {
        if !seen.insert(RowKey::from(record)) {
            duplicates_removed += 1;
            continue;
        }
        out.push(derive(record));
    }

    TransformOutput {
        records: out,
        duplicates_removed,
    }
}

fn derive(record: &SalesRecord) -> TransformedRecord {
    let quantity = record.quantity.unwrap_or(0);
    let price = record.price.filter(|p| !p.is_nan()).unwrap_or(0.0);
    let month = record.date.month();

    TransformedRecord {
        date: record.date,
        product_id: record.product_id.unwrap_or(0),
        product_name: record.product_name.clone(),
        quantity,
        price,
        region: record.region,
        customer_id: record.customer_id.unwrap_or(0),
        revenue: revenue(quantity, price),
        price_category: PriceCategory::from_price(price),
        month,
        day_of_week: record.date.format("%A").to_string(),
        quarter: quarter_of(month),
    }
}

pub fn revenue(quantity: u32, price: f64) -> f64 {
    quantity as f64 * price
}

/// Calendar quarter (1-4) of a month number (1-12)
pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, quantity: Option<u32>, price: Option<f64>) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            product_id: Some(1042),
            product_name: "Product_2".to_string(),
            quantity,
            price,
            region: Region::East,
            customer_id: Some(7),
        }
    }

    #[test]
    fn test_derived_fields() {
        // 2024-05-03 is a Friday
        let out = transform_records(&[record(3, Some(4), Some(125.5))]);
        let r = &out.records[0];
        assert_eq!(r.revenue, 502.0);
        assert_eq!(r.price_category, PriceCategory::Medium);
        assert_eq!(r.month, 5);
        assert_eq!(r.day_of_week, "Friday");
        assert_eq!(r.quarter, 2);
        assert_eq!(out.duplicates_removed, 0);
    }

    #[test]
    fn test_exact_duplicates_removed_first_kept() {
        let a = record(1, Some(2), Some(10.0));
        let b = record(2, Some(2), Some(10.0));
        let out = transform_records(&[a.clone(), b.clone(), a.clone(), a]);
        assert_eq!(out.duplicates_removed, 2);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(out.records[1].date, b.date);
    }

    #[test]
    fn test_near_duplicates_are_kept() {
        let a = record(1, Some(2), Some(10.0));
        let mut b = a.clone();
        b.customer_id = Some(8);
        let out = transform_records(&[a, b]);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.duplicates_removed, 0);
    }

    #[test]
    fn test_missing_numerics_zero_filled() {
        let mut r = record(1, None, None);
        r.product_id = None;
        r.customer_id = None;
        let out = transform_records(&[r, record(2, Some(3), Some(f64::NAN))]);
        let first = &out.records[0];
        assert_eq!(first.quantity, 0);
        assert_eq!(first.price, 0.0);
        assert_eq!(first.product_id, 0);
        assert_eq!(first.customer_id, 0);
        assert_eq!(first.revenue, 0.0);
        assert_eq!(first.price_category, PriceCategory::Low);
        assert_eq!(out.records[1].price, 0.0);
        assert_eq!(out.records[1].revenue, 0.0);
    }

    #[test]
    fn test_quarters() {
        let quarters: Vec<u32> = (1..=12).map(quarter_of).collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }
}
