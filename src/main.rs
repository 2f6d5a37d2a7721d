mod analysis;
mod app;
mod config;
mod error;
mod summary;
mod utils;

use analysis::{AnalyzerApi, HttpAnalyzerClient};
use anyhow::{anyhow, Context, Result};
use app::ZipAnalyzer;
use config::Config;
use eframe::CreationContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn log_level() -> Level {
    match std::env::var("RUST_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ZIP project analyzer v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::load_or_init()?,
    };
    info!(
        server_url = %config.server_url,
        poll_interval_ms = config.poll_interval_ms,
        max_poll_attempts = ?config.max_poll_attempts,
        "Loaded configuration"
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let api: Arc<dyn AnalyzerApi> =
        Arc::new(HttpAnalyzerClient::new(&config).context("failed to create HTTP client")?);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ZIP Project Analyzer",
        options,
        Box::new(move |_cc: &CreationContext| Box::new(ZipAnalyzer::new(config, runtime, api))),
    )
    .map_err(|e| anyhow!("failed to run window: {}", e))?;

    Ok(())
}
