use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use sales_etl::analytics::{self, RecordFilter};
use sales_etl::constants::{self, MEMORY_DESTINATION, SAMPLE_SOURCE};
use sales_etl::logging;
use sales_etl::observability;
use sales_etl::session::{ActionOutcome, ControlAction, SessionStore};
use sales_etl::types::{Region, SummaryStats};
use sales_etl::{EtlConfig, Pipeline};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sales_etl")]
#[command(about = "Extract-Transform-Load pipeline over synthetic sales data")]
#[command(version = "0.1.0")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, transform and load in sequence
    Run {
        /// Data source. Available: sample
        #[arg(long, default_value = SAMPLE_SOURCE)]
        source: String,
        /// Load destination. Available: memory, csv
        #[arg(long, default_value = MEMORY_DESTINATION)]
        destination: String,
        /// Directory for csv output (overrides the config file)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the run log after the summary
        #[arg(long)]
        show_log: bool,
        /// Print the recorded metrics in Prometheus text format
        #[arg(long)]
        metrics: bool,
    },
    /// Print revenue breakdowns for a run
    Report {
        #[arg(long, default_value = SAMPLE_SOURCE)]
        source: String,
        /// Number of products in the top list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print filtered transformed rows
    Preview {
        #[arg(long, default_value = SAMPLE_SOURCE)]
        source: String,
        /// Only rows from this region (North, South, East, West)
        #[arg(long)]
        region: Option<Region>,
        /// Only rows for this product name, e.g. Product_3
        #[arg(long)]
        product: Option<String>,
        /// Maximum rows to print
        #[arg(long, default_value_t = 50)]
        rows: usize,
        /// Also print column statistics for the filtered rows
        #[arg(long)]
        stats: bool,
    },
}

fn print_summary(stats: &SummaryStats) {
    println!("\n📊 Summary:");
    println!("   Total records:    {}", stats.total_records);
    println!("   Total revenue:    ${:.2}", stats.total_revenue);
    println!("   Average revenue:  ${:.2}", stats.avg_revenue);
    println!("   Date range:       {}", stats.date_range);
    println!("   Unique products:  {}", stats.unique_products);
    println!("   Unique customers: {}", stats.unique_customers);
    println!("   Regions:          {}", stats.regions);
}

/// Run the full pipeline into memory for the read-only subcommands
fn run_in_memory(config: EtlConfig, source: &str) -> anyhow::Result<Pipeline> {
    let mut pipeline = Pipeline::with_config(config);
    pipeline
        .run_full_pipeline(source, MEMORY_DESTINATION)
        .with_context(|| format!("pipeline run from '{source}' failed"))?;
    Ok(pipeline)
}

fn run_command(
    config: EtlConfig,
    source: String,
    destination: String,
    show_log: bool,
    show_metrics: bool,
) -> anyhow::Result<()> {
    println!("🚀 Running ETL pipeline ({source} → {destination})...");

    let mut store = SessionStore::new(config);
    let session = store.open();
    let outcome = store.dispatch(
        session,
        ControlAction::Run {
            source,
            destination,
        },
    )?;
    let state = store
        .get(session)
        .ok_or_else(|| anyhow!("session {session} disappeared"))?;

    if let Some(stats) = state.pipeline.get_summary_stats() {
        print_summary(&stats);
    }

    println!("\n📋 Stages:");
    for stage in analytics::stage_statuses(&state.pipeline) {
        let mark = if stage.complete { "✅" } else { "❌" };
        println!("   {mark} {:<10} {} records", stage.stage, stage.records);
    }

    if show_log {
        println!("\n📝 Run log:");
        for line in state.pipeline.logs().lines() {
            println!("   {line}");
        }
    }

    if show_metrics {
        println!("\n📈 Metrics:");
        match observability::render_metrics() {
            Some(text) => print!("{text}"),
            None => println!("   (no metrics recorder installed)"),
        }
    }

    match outcome {
        ActionOutcome::Succeeded(result) => {
            info!("Pipeline finished");
            println!("\n✅ Pipeline completed successfully!");
            println!("   Status:      {}", result.status);
            println!("   Destination: {}", result.destination);
            println!("   Records:     {}", result.records_loaded);
            println!("   Timestamp:   {}", result.timestamp.format("%Y-%m-%d %H:%M:%S"));
            if let Some(filename) = &result.filename {
                println!("   File:        {filename}");
            }
            Ok(())
        }
        ActionOutcome::Failed(e) => {
            error!("Pipeline failed: {}", e);
            println!("\n❌ Pipeline failed!");
            Err(e.into())
        }
        ActionOutcome::Reset => Ok(()),
    }
}

fn report_command(config: EtlConfig, source: &str, top: usize) -> anyhow::Result<()> {
    let pipeline = run_in_memory(config, source)?;
    let records = pipeline.transformed_data().unwrap_or(&[]);

    if let Some(stats) = pipeline.get_summary_stats() {
        print_summary(&stats);
    }

    println!("\n🌍 Revenue by region:");
    for bucket in analytics::revenue_by_region(records) {
        println!("   {:<8} ${:>12.2}", bucket.key, bucket.revenue);
    }

    println!("\n🏷️  Revenue by price category:");
    for bucket in analytics::revenue_by_price_category(records) {
        println!("   {:<8} ${:>12.2}", bucket.key, bucket.revenue);
    }

    println!("\n📅 Revenue by quarter:");
    for bucket in analytics::revenue_by_quarter(records) {
        println!("   {:<8} ${:>12.2}", bucket.key, bucket.revenue);
    }

    println!("\n🏆 Top {top} products:");
    for (rank, bucket) in analytics::top_products(records, top).iter().enumerate() {
        println!("   {:>2}. {:<12} ${:>12.2}", rank + 1, bucket.key, bucket.revenue);
    }

    Ok(())
}

fn preview_command(
    config: EtlConfig,
    source: &str,
    filter: RecordFilter,
    show_stats: bool,
) -> anyhow::Result<()> {
    let pipeline = run_in_memory(config, source)?;
    let records = pipeline.transformed_data().unwrap_or(&[]);
    let rows = filter.apply(records);

    println!(
        "{:<10} {:>6} {:<10} {:>4} {:>8} {:<6} {:>4} {:>10} {:<7} {:<9} {:>2}",
        "date", "prod", "name", "qty", "price", "region", "cust", "revenue", "bucket", "weekday", "q"
    );
    for r in &rows {
        println!(
            "{:<10} {:>6} {:<10} {:>4} {:>8.2} {:<6} {:>4} {:>10.2} {:<7} {:<9} {:>2}",
            r.date,
            r.product_id,
            r.product_name,
            r.quantity,
            r.price,
            r.region,
            r.customer_id,
            r.revenue,
            r.price_category,
            r.day_of_week,
            r.quarter
        );
    }
    println!("\n{} of {} rows shown", rows.len(), records.len());

    if show_stats {
        println!("\n📈 Column statistics:");
        for col in analytics::column_stats(&rows) {
            println!(
                "   {:<12} count={:<4} mean={:>10.2} min={:>10.2} max={:>10.2}",
                col.column, col.count, col.mean, col.min, col.max
            );
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    observability::init_metrics();

    let cli = Cli::parse();
    let config = EtlConfig::load_or_default(cli.config.as_deref())?;
    info!(
        sources = ?constants::get_supported_sources(),
        destinations = ?constants::get_supported_destinations(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Run {
            source,
            destination,
            output_dir,
            show_log,
            metrics,
        } => {
            let config = match output_dir {
                Some(dir) => config.with_output_dir(dir),
                None => config,
            };
            run_command(config, source, destination, show_log, metrics)
        }
        Commands::Report { source, top } => report_command(config, &source, top),
        Commands::Preview {
            source,
            region,
            product,
            rows,
            stats,
        } => preview_command(
            config,
            &source,
            RecordFilter {
                region,
                product_name: product,
                limit: Some(rows),
            },
            stats,
        ),
    }
}
