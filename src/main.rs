//! Spendview main entry point

use anyhow::Context;
use clap::Parser;
use spendview_api::start_server;
use spendview_config::Config;
use spendview_core::TransactionView;
use spendview_ledger::{Dataset, InMemoryLedger};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "spendview")]
#[command(author = "Spendview Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Expense transaction viewer with employee filtering and approvals", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = if args.config.exists() {
        Config::load(&args.config)
            .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?
    } else {
        Config::default()
    };
    config.validate().context("Invalid configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    if !args.config.exists() {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let dataset_path = config.dataset_path();
    log::info!("Looking for dataset: {}", dataset_path.display());

    let dataset = Dataset::load(&dataset_path)
        .await
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;

    let ledger = InMemoryLedger::new(dataset)
        .with_page_size(config.pagination.page_size)
        .with_latency(Duration::from_millis(config.transport.latency_ms));
    let view = Arc::new(TransactionView::new(Arc::new(ledger)));

    if config.view.load_on_start {
        // a failure here is already on the view and rendered with a retry
        if let Err(e) = view.load_all_transactions().await {
            log::warn!("Initial load failed: {}", e);
        }
    }

    start_server(config, view).await.context("Server error")
}
