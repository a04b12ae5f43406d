use crate::config::EtlConfig;
use crate::types::{Region, SalesRecord};
use chrono::{Duration, Local, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of distinct product names the sample source cycles through
const PRODUCT_NAME_CYCLE: usize = 10;

/// Seeded generator behind the `sample` source.
///
/// Columns are drawn one after another from a single ChaCha8 stream, so a given
/// (seed, record_count, end_date) always yields the same records.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    seed: u64,
    record_count: usize,
    end_date: NaiveDate,
}

impl SampleGenerator {
    pub fn new(seed: u64, record_count: usize, end_date: NaiveDate) -> Self {
        Self {
            seed,
            record_count,
            end_date,
        }
    }

    pub fn from_config(config: &EtlConfig) -> Self {
        let end_date = config
            .end_date
            .unwrap_or_else(|| Local::now().date_naive());
        Self::new(config.seed, config.record_count, end_date)
    }

    /// One record per day, ending on `end_date`
    pub fn generate(&self) -> Vec<SalesRecord> {
        let n = self.record_count;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let product_ids: Vec<u32> = (0..n).map(|_| rng.gen_range(1000..1100)).collect();
        let quantities: Vec<u32> = (0..n).map(|_| rng.gen_range(1..50)).collect();
        let prices: Vec<f64> = (0..n)
            .map(|_| round_cents(rng.gen_range(10.0..500.0)))
            .collect();
        let regions: Vec<Region> = (0..n)
            .map(|_| Region::ALL[rng.gen_range(0..Region::ALL.len())])
            .collect();
        let customer_ids: Vec<u32> = (0..n).map(|_| rng.gen_range(1..51)).collect();

        let start = self.end_date - Duration::days(n.saturating_sub(1) as i64);

        (0..n)
            .map(|i| SalesRecord {
                date: start + Duration::days(i as i64),
                product_id: Some(product_ids[i]),
                product_name: format!("Product_{}", i % PRODUCT_NAME_CYCLE),
                quantity: Some(quantities[i]),
                price: Some(prices[i]),
                region: regions[i],
                customer_id: Some(customer_ids[i]),
            })
            .collect()
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
