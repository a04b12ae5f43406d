/// Selector names accepted by the pipeline stages and the control surface.
/// Keeping them here avoids stray string literals across the CLI, session and pipeline code.

// Sources
pub const SAMPLE_SOURCE: &str = "sample";

// Destinations
pub const MEMORY_DESTINATION: &str = "memory";
pub const CSV_DESTINATION: &str = "csv";

// Synthetic generation defaults
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_RECORD_COUNT: usize = 100;

// Price category upper bounds (inclusive)
pub const LOW_PRICE_MAX: f64 = 100.0;
pub const MEDIUM_PRICE_MAX: f64 = 300.0;
pub const HIGH_PRICE_MAX: f64 = 1000.0;

/// Prefix of files written by the CSV destination
pub const CSV_OUTPUT_PREFIX: &str = "etl_output";

/// Width of the `=` banner lines framing a full pipeline run
pub const BANNER_WIDTH: usize = 50;

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![SAMPLE_SOURCE]
}

/// Get all supported destination names
pub fn get_supported_destinations() -> Vec<&'static str> {
    vec![MEMORY_DESTINATION, CSV_DESTINATION]
}
