mod app;
mod dashboard;
mod engine;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;

use dashboard::{Catalog, DEFAULT_SEED_COUNT, Dashboard};
use engine::ProcessGateway;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Analytics engine executable, spoken to over stdin/stdout.
    #[arg(long, default_value = "network-engine")]
    engine: String,

    /// Extra argument passed to the engine (repeatable).
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Dataset to start loading right away.
    #[arg(long)]
    dataset: Option<String>,

    /// JSON catalog replacing the built-in metric and distribution list.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Initial value of the best-seeds count field.
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    seed_count: i64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    info!(
        "catalog: {} metric(s), {} distribution(s)",
        catalog.metrics.len(),
        catalog.distributions.len()
    );

    let gateway = ProcessGateway::spawn(&args.engine, &args.engine_args)?;
    info!("engine {} started", gateway.program());

    let mut dashboard = Dashboard::new(Arc::new(gateway), catalog);
    if let Some(path) = &args.dataset {
        dashboard.submit_dataset_path(path)?;
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let seed_count = args.seed_count;
    eframe::run_native(
        "network-analyzer",
        options,
        Box::new(move |cc| Ok(Box::new(app::AnalyzerApp::new(cc, dashboard, seed_count)))),
    )
    .map_err(|error| anyhow!("failed to run the UI: {error}"))
}
