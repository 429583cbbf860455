use anyhow::{Context, Result};
use clap::Parser;
use fuzzstat::{artifacts, cli::Cli, config::ExperimentConfig, pipeline};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let mut config = ExperimentConfig::from_file(&args.config)?;
    args.apply_overrides(&mut config);

    let report = pipeline::run_pipeline(&config).context("Pipeline failed")?;

    if report.groups.is_empty() {
        anyhow::bail!(
            "All {} groups failed; no artifacts written",
            report.failures.len()
        );
    }

    let written = artifacts::write_all(&report, &config)
        .with_context(|| format!("Failed to write artifacts to {}", config.out_dir.display()))?;

    print!("{}", report.to_report_string());
    println!();
    println!("Stats report: {}", written.stats_report.display());
    println!("Plot data:    {}", written.overall_plot.display());

    Ok(())
}
