//! petal-train: fit the Iris decision tree and write the model artifact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use petal_config::DEFAULT_MODEL_PATH;
use petal_train::{accuracy, fit, Dataset, TrainParams};
use tracing::info;

#[derive(Parser)]
#[command(name = "petal-train")]
#[command(about = "Fit a decision tree on labelled measurements and write the model artifact")]
#[command(version)]
struct Cli {
    /// Training data (CSV with a header row)
    #[arg(short, long, default_value = "data/iris.csv")]
    data: PathBuf,

    /// Output artifact file
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Maximum tree depth
    #[arg(long, default_value_t = TrainParams::default().max_depth)]
    max_depth: usize,

    /// Minimum number of samples required to split a node
    #[arg(long, default_value_t = TrainParams::default().min_samples_split)]
    min_samples_split: usize,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    let dataset = Dataset::from_csv_path(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;
    info!(
        "Loaded {} rows across {} classes from {}",
        dataset.len(),
        dataset.labels.len(),
        cli.data.display()
    );

    let params = TrainParams::default()
        .with_max_depth(cli.max_depth)
        .with_min_samples_split(cli.min_samples_split);
    let model = fit(&dataset, &params)?;

    let acc = accuracy(&model, &dataset)?;
    info!("Training accuracy: {:.2}%", acc * 100.0);

    model.save(&cli.output)?;
    info!("Model written to {}", cli.output.display());

    Ok(())
}
