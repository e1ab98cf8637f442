use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cricket_tables::config::{Config, USAGE};
use cricket_tables::export::export_tables;
use cricket_tables::pipeline;
use cricket_tables::report::TracingReporter;

fn main() -> Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "-h" || arg == "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = Config::from_env_and_args()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "starting transform"
    );

    let reporter = TracingReporter;
    let output = pipeline::run(&config, &reporter).context("transform match files")?;
    let report = export_tables(&output.tables, &output.summary, &config, &reporter)
        .context("export tables")?;

    let summary = &output.summary;
    println!("Transform complete");
    println!(
        "Files: {} found, {} failed",
        summary.files_discovered, summary.files_failed
    );
    println!(
        "Matches: {} flattened, {} uncategorized, {} duplicate ids",
        summary.flatten.flattened, summary.flatten.unrecognized, summary.flatten.duplicates
    );
    println!(
        "Rows: tests={} odis={} t20s={} deliveries={}",
        summary.tables.tests, summary.tables.odis, summary.tables.t20s, summary.tables.deliveries
    );
    for path in &report.files {
        println!("  - {}", path.display());
    }

    Ok(())
}
