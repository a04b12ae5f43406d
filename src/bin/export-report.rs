//! Report Export Binary
//!
//! Runs the pipeline and writes the report data (summary, stage table, revenue breakdowns, the
//! run log and the Prometheus text of the recorded metrics) as JSON for an external dashboard
//! to render.
//!
//! Usage:
//!   cargo run --bin export-report                 # memory destination, report.json
//!   cargo run --bin export-report csv out.json    # also writes the CSV file

use sales_etl::analytics::ReportData;
use sales_etl::constants::{MEMORY_DESTINATION, SAMPLE_SOURCE};
use sales_etl::{logging, observability, EtlConfig, Pipeline};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct ExportedReport {
    #[serde(flatten)]
    report: ReportData,
    metrics: Option<String>,
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    observability::init_metrics();

    let args: Vec<String> = env::args().collect();
    let destination = args.get(1).map(String::as_str).unwrap_or(MEMORY_DESTINATION);
    let output_path = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("report.json"));

    let mut pipeline = Pipeline::with_config(EtlConfig::default());
    let succeeded = pipeline.run_full_pipeline(SAMPLE_SOURCE, destination).is_ok();

    // A failed run still exports its log and whatever stages completed
    let exported = ExportedReport {
        report: ReportData::from_pipeline(&pipeline),
        metrics: observability::render_metrics(),
    };
    let json_string = serde_json::to_string_pretty(&exported)?;
    fs::write(&output_path, &json_string)?;

    if succeeded {
        eprintln!("✅ Report generated successfully!");
    } else {
        eprintln!("❌ Pipeline failed; report contains the partial run");
    }
    eprintln!("📄 Saved to: {}", output_path.display());

    if succeeded {
        Ok(())
    } else {
        Err(anyhow::anyhow!("pipeline run failed"))
    }
}
