use crate::constants::{
    CSV_DESTINATION, HIGH_PRICE_MAX, LOW_PRICE_MAX, MEDIUM_PRICE_MAX, MEMORY_DESTINATION,
    SAMPLE_SOURCE,
};
use crate::error::EtlError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data sources the extract stage knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Seeded synthetic sales data
    Sample,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Sample => SAMPLE_SOURCE,
        }
    }
}

impl FromStr for Source {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SAMPLE_SOURCE => Ok(Source::Sample),
            other => Err(EtlError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Sinks the load stage can write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Memory,
    Csv,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Memory => MEMORY_DESTINATION,
            Destination::Csv => CSV_DESTINATION,
        }
    }
}

impl FromStr for Destination {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MEMORY_DESTINATION => Ok(Destination::Memory),
            CSV_DESTINATION => Ok(Destination::Csv),
            other => Err(EtlError::UnknownDestination(other.to_string())),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Sales region label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown region '{s}'"))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordinal price bucket derived from the unit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceCategory {
    Low,
    Medium,
    High,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 3] =
        [PriceCategory::Low, PriceCategory::Medium, PriceCategory::High];

    /// Bucket a unit price. Upper bounds are inclusive: 100.0 is Low, 300.0 is Medium.
    /// Prices are clamped into [0, 1000] first; NaN is treated as 0.
    pub fn from_price(price: f64) -> Self {
        let price = if price.is_nan() { 0.0 } else { price.clamp(0.0, HIGH_PRICE_MAX) };
        if price <= LOW_PRICE_MAX {
            PriceCategory::Low
        } else if price <= MEDIUM_PRICE_MAX {
            PriceCategory::Medium
        } else {
            PriceCategory::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceCategory::Low => "Low",
            PriceCategory::Medium => "Medium",
            PriceCategory::High => "High",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A sales record as produced by extraction.
///
/// Numeric columns are optional because a source may leave them blank; the transform stage
/// zero-fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product_id: Option<u32>,
    pub product_name: String,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
    pub region: Region,
    pub customer_id: Option<u32>,
}

/// A sales record after the transform stage. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedRecord {
    pub date: NaiveDate,
    pub product_id: u32,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub region: Region,
    pub customer_id: u32,
    pub revenue: f64,
    pub price_category: PriceCategory,
    pub month: u32,
    pub day_of_week: String,
    pub quarter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    Success,
    Failed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Success => f.pad("SUCCESS"),
            LoadStatus::Failed => f.pad("FAILED"),
        }
    }
}

/// Summary of a load attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    pub destination: String,
    pub records_loaded: usize,
    pub timestamp: DateTime<Utc>,
    pub status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        self.status == LoadStatus::Success
    }
}

/// Aggregates over the transformed dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_revenue: f64,
    pub avg_revenue: f64,
    pub date_range: String,
    pub unique_products: usize,
    pub unique_customers: usize,
    pub regions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_category_boundaries() {
        assert_eq!(PriceCategory::from_price(0.0), PriceCategory::Low);
        assert_eq!(PriceCategory::from_price(100.0), PriceCategory::Low);
        assert_eq!(PriceCategory::from_price(100.01), PriceCategory::Medium);
        assert_eq!(PriceCategory::from_price(300.0), PriceCategory::Medium);
        assert_eq!(PriceCategory::from_price(300.01), PriceCategory::High);
        assert_eq!(PriceCategory::from_price(1000.0), PriceCategory::High);
    }

    #[test]
    fn test_price_category_clamps_out_of_range() {
        assert_eq!(PriceCategory::from_price(-5.0), PriceCategory::Low);
        assert_eq!(PriceCategory::from_price(25_000.0), PriceCategory::High);
        assert_eq!(PriceCategory::from_price(f64::NAN), PriceCategory::Low);
    }

    #[test]
    fn test_price_category_is_monotonic() {
        let mut previous = PriceCategory::Low;
        for cents in 0..=100_000 {
            let category = PriceCategory::from_price(cents as f64 / 100.0);
            assert!(category >= previous);
            previous = category;
        }
    }

    #[test]
    fn test_selectors_parse() {
        assert_eq!("sample".parse::<Source>().unwrap(), Source::Sample);
        assert!(matches!(
            "postgres".parse::<Source>(),
            Err(EtlError::UnknownSource(s)) if s == "postgres"
        ));
        assert_eq!("memory".parse::<Destination>().unwrap(), Destination::Memory);
        assert_eq!("csv".parse::<Destination>().unwrap(), Destination::Csv);
        assert!(matches!(
            "s3".parse::<Destination>(),
            Err(EtlError::UnknownDestination(_))
        ));
    }

    #[test]
    fn test_region_parse_case_insensitive() {
        assert_eq!("north".parse::<Region>().unwrap(), Region::North);
        assert_eq!("WEST".parse::<Region>().unwrap(), Region::West);
        assert!("Central".parse::<Region>().is_err());
    }

    #[test]
    fn test_load_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&LoadStatus::Success).unwrap(), "\"SUCCESS\"");
        assert_eq!(LoadStatus::Failed.to_string(), "FAILED");
    }
}
