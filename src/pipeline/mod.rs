// Extract -> Transform -> Load pipeline over synthetic sales data

pub mod extract;
pub mod load;
pub mod run_log;
pub mod stats;
pub mod transform;

pub use extract::SampleGenerator;
pub use load::{sink_for, CsvFileSink, LoadSink, MemorySink};
pub use run_log::{LogEntry, RunLog};
pub use transform::{transform_records, TransformOutput};

use crate::config::EtlConfig;
use crate::constants::BANNER_WIDTH;
use crate::error::{EtlError, Result};
use crate::observability::metrics;
use crate::types::{
    Destination, LoadResult, LoadStatus, SalesRecord, Source, SummaryStats, TransformedRecord,
};
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Furthest stage whose output is currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Uninitialized,
    Extracted,
    Transformed,
    Loaded,
}

/// One pipeline instance: at most one extracted dataset, one transformed dataset and one load
/// result, plus the run log.
///
/// Stage outputs cascade: a successful extract clears the transformed data and load result, a
/// successful transform clears the load result. A failed stage leaves everything as it was.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: EtlConfig,
    extracted: Option<Vec<SalesRecord>>,
    transformed: Option<Vec<TransformedRecord>>,
    load_result: Option<LoadResult>,
    log: RunLog,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(EtlConfig::default())
    }

    pub fn with_config(config: EtlConfig) -> Self {
        Self {
            config,
            extracted: None,
            transformed: None,
            load_result: None,
            log: RunLog::new(),
        }
    }

    /// Pipeline whose extract stage already holds `records`
    #[cfg(test)]
    pub(crate) fn with_extracted(config: EtlConfig, records: Vec<SalesRecord>) -> Self {
        Self {
            extracted: Some(records),
            ..Self::with_config(config)
        }
    }

    /// Pull records from `source`. Only `sample` is supported.
    #[instrument(skip(self))]
    pub fn extract(&mut self, source: &str) -> Result<&[SalesRecord]> {
        self.log.info(format!("Starting extraction from {source}..."));
        let started = Instant::now();
        simulate_latency(self.config.stage_delay());

        let source = match source.parse::<Source>() {
            Ok(source) => source,
            Err(e) => {
                self.log.warn(e.to_string());
                metrics::stage::failed("extract");
                return Err(e);
            }
        };

        let records = match source {
            Source::Sample => SampleGenerator::from_config(&self.config).generate(),
        };

        self.log
            .info(format!("Extracted {} records successfully", records.len()));
        metrics::records::extracted(records.len());
        metrics::stage::duration_recorded("extract", started.elapsed().as_secs_f64());

        self.transformed = None;
        self.load_result = None;
        Ok(self.extracted.insert(records).as_slice())
    }

    /// Derive revenue, price category and calendar fields from the extracted data
    #[instrument(skip(self))]
    pub fn transform(&mut self) -> Result<&[TransformedRecord]> {
        let Some(extracted) = self.extracted.as_deref() else {
            let err = EtlError::NotExtracted;
            self.log.warn(format!("Error: {err}"));
            metrics::stage::failed("transform");
            return Err(err);
        };

        self.log.info("Starting transformation...");
        let started = Instant::now();
        simulate_latency(self.config.stage_delay());

        let TransformOutput {
            records,
            duplicates_removed,
        } = transform_records(extracted);

        if duplicates_removed > 0 {
            self.log
                .info(format!("Removed {duplicates_removed} duplicate records"));
        }
        self.log.info(format!(
            "Transformation complete. {} records transformed",
            records.len()
        ));
        metrics::records::transformed(records.len(), duplicates_removed);
        metrics::stage::duration_recorded("transform", started.elapsed().as_secs_f64());

        self.load_result = None;
        Ok(self.transformed.insert(records).as_slice())
    }

    /// Write the transformed data to `destination` (`memory` or `csv`)
    #[instrument(skip(self))]
    pub fn load(&mut self, destination: &str) -> Result<&LoadResult> {
        let Some(records) = self.transformed.as_deref() else {
            let err = EtlError::NotTransformed;
            self.log.warn(format!("Error: {err}"));
            metrics::stage::failed("load");
            return Err(err);
        };

        self.log.info(format!("Starting load to {destination}..."));
        let started = Instant::now();
        simulate_latency(self.config.stage_delay());

        let destination = match destination.parse::<Destination>() {
            Ok(destination) => destination,
            Err(e) => {
                self.log.warn(e.to_string());
                metrics::stage::failed("load");
                return Err(e);
            }
        };

        let sink = sink_for(destination, self.config.output_dir.clone());
        let label = sink.destination().as_str();
        match sink.write(records) {
            Ok(filename) => {
                let target = filename.as_deref().unwrap_or(label);
                self.log.info(format!(
                    "Successfully loaded {} records to {}",
                    records.len(),
                    target
                ));
                metrics::records::loaded(label, records.len());
                metrics::stage::duration_recorded("load", started.elapsed().as_secs_f64());

                let result = LoadResult {
                    destination: label.to_string(),
                    records_loaded: records.len(),
                    timestamp: Utc::now(),
                    status: LoadStatus::Success,
                    filename,
                    error: None,
                };
                Ok(self.load_result.insert(result))
            }
            Err(e) => {
                self.log.warn(format!(
                    "Error loading to {}: {}",
                    label.to_uppercase(),
                    e
                ));
                metrics::records::load_failed(label);
                metrics::stage::failed("load");

                self.load_result = Some(LoadResult {
                    destination: label.to_string(),
                    records_loaded: 0,
                    timestamp: Utc::now(),
                    status: LoadStatus::Failed,
                    filename: None,
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    /// Extract, transform and load in order, stopping at the first failing stage
    #[instrument(skip(self))]
    pub fn run_full_pipeline(&mut self, source: &str, destination: &str) -> Result<LoadResult> {
        self.banner();
        self.log.info("Starting full ETL pipeline");
        self.banner();
        metrics::pipeline::run_started();

        if let Err(e) = self.extract(source) {
            metrics::pipeline::run_failed();
            return Err(e);
        }
        if let Err(e) = self.transform() {
            metrics::pipeline::run_failed();
            return Err(e);
        }

        match self.load(destination).cloned() {
            Ok(result) => {
                self.banner();
                self.log.info("ETL Pipeline completed successfully!");
                self.banner();
                Ok(result)
            }
            Err(e) => {
                self.log.warn("ETL Pipeline failed during load phase");
                metrics::pipeline::run_failed();
                Err(e)
            }
        }
    }

    /// Aggregates over the transformed data; `None` before a successful transform
    pub fn get_summary_stats(&self) -> Option<SummaryStats> {
        self.transformed.as_deref().map(stats::summarize)
    }

    pub fn stage(&self) -> PipelineStage {
        match (&self.extracted, &self.transformed, &self.load_result) {
            (_, Some(_), Some(r)) if r.is_success() => PipelineStage::Loaded,
            (_, Some(_), _) => PipelineStage::Transformed,
            (Some(_), None, _) => PipelineStage::Extracted,
            (None, None, _) => PipelineStage::Uninitialized,
        }
    }

    pub fn extracted_data(&self) -> Option<&[SalesRecord]> {
        self.extracted.as_deref()
    }

    pub fn transformed_data(&self) -> Option<&[TransformedRecord]> {
        self.transformed.as_deref()
    }

    pub fn load_result(&self) -> Option<&LoadResult> {
        self.load_result.as_ref()
    }

    pub fn logs(&self) -> &RunLog {
        &self.log
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    fn banner(&mut self) {
        self.log.info("=".repeat(BANNER_WIDTH));
    }
}

fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
