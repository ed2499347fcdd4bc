//! petal-client: send a batch of specimens to the prediction service.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use petal_client::{default_samples, load_inputs, run_batch, ErrorPolicy, PredictClient};
use tracing::info;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "petal-client")]
#[command(about = "Classify a batch of Iris measurements against a running petal-server")]
#[command(version)]
struct Cli {
    /// Service base URL (defaults to PETAL_URL, then http://127.0.0.1:8000)
    #[arg(short, long)]
    url: Option<String>,

    /// JSON file holding an array of [sepal_length, sepal_width, petal_length, petal_width] arrays
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Stop at the first failed prediction instead of reporting it and continuing
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    let url = cli.url.unwrap_or_else(petal_config::service_url);
    let inputs = match &cli.input {
        Some(path) => load_inputs(path)?,
        None => default_samples(),
    };
    let policy = if cli.fail_fast { ErrorPolicy::FailFast } else { ErrorPolicy::Continue };

    info!("Sending {} items to {}", inputs.len(), url);
    let client = PredictClient::new(url);
    let report = run_batch(&client, &inputs, policy).await;

    for outcome in &report.outcomes {
        println!("{}", outcome);
    }
    println!("{}", report);

    if report.failed() > 0 {
        bail!("{} of {} predictions failed", report.failed(), inputs.len());
    }
    Ok(())
}
