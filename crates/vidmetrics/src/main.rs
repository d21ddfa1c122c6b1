use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidmetrics_core::collector::run_collector;
use vidmetrics_core::pipeline::{run_all, run_feature_builder, FeatureSummary};
use vidmetrics_core::PipelineConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Video metadata collection and feature engineering", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./vidmetrics.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan metadata documents into the intermediate table
    Collect(CollectArgs),
    /// Clean the intermediate table and derive feature columns
    Features(FeaturesArgs),
    /// Run collect then features
    Run(CollectArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Default)]
struct CollectArgs {
    /// Directory containing the metadata documents
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Intermediate table to write
    #[arg(long)]
    output: Option<PathBuf>,
    /// Oldest upload date to keep (YYYY-MM-DD)
    #[arg(long)]
    cutoff: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
struct FeaturesArgs {
    /// Intermediate table to read
    #[arg(long)]
    input: Option<PathBuf>,
    /// Feature table to write
    #[arg(long)]
    output: Option<PathBuf>,
    /// Oldest upload date to keep (YYYY-MM-DD)
    #[arg(long)]
    cutoff: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::resolve(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Collect(args) => {
            apply_collect_args(&mut config, args);
            config.validate()?;
            let summary = run_collector(&config).context("collector failed")?;
            info!(
                files_found = summary.files_found,
                retained = summary.retained,
                "collect finished"
            );
        }
        Command::Features(args) => {
            apply_features_args(&mut config, args);
            config.validate()?;
            let summary = run_feature_builder(&config).context("feature builder failed")?;
            log_feature_summary(&summary);
        }
        Command::Run(args) => {
            if let Some(cutoff) = args.cutoff {
                config.features.cutoff_date = cutoff;
            }
            apply_collect_args(&mut config, args);
            config.validate()?;
            let summary = run_all(&config).context("pipeline run failed")?;
            info!(
                files_found = summary.collection.files_found,
                retained = summary.collection.retained,
                "collect finished"
            );
            log_feature_summary(&summary.features);
        }
        Command::Config => {
            let text = toml::to_string_pretty(&config).context("failed to render configuration")?;
            println!("{text}");
        }
    }

    Ok(())
}

fn apply_collect_args(config: &mut PipelineConfig, args: CollectArgs) {
    if let Some(dir) = args.input_dir {
        config.collector.input_dir = dir;
    }
    if let Some(output) = args.output {
        config.collector.output_path = output;
    }
    if let Some(cutoff) = args.cutoff {
        config.collector.cutoff_date = cutoff;
    }
}

fn apply_features_args(config: &mut PipelineConfig, args: FeaturesArgs) {
    if let Some(input) = args.input {
        config.features.input_path = input;
    }
    if let Some(output) = args.output {
        config.features.output_path = output;
    }
    if let Some(cutoff) = args.cutoff {
        config.features.cutoff_date = cutoff;
    }
}

fn log_feature_summary(summary: &FeatureSummary) {
    info!(
        encoding = %summary.encoding,
        loaded = summary.cleaning.loaded_rows,
        retained = summary.output_rows,
        columns = summary.output_columns,
        path = %summary.output_path.display(),
        "features finished"
    );
}
