mod app;
mod config;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;


use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::infra::sqlite::repo::SqliteSource;
use crate::ui::state::app_state::AppServices;
use crate::usecase::ports::source::DataSource;
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::query_service::QueryService;

fn init_tracing(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("tabledesk.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tabledesk=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn build_services(config: AppConfig, config_dir: &Path, data_dir: &Path) -> Result<AppServices> {
    let registry = config
        .load_registry(config_dir)
        .context("failed to load table registry")?;
    tracing::info!(tables = registry.len(), "table registry loaded");

    let source: Arc<dyn DataSource> = Arc::new(SqliteSource::new(data_dir));
    Ok(AppServices {
        config: Arc::new(config),
        registry: Arc::new(registry),
        query: Arc::new(QueryService::new(source.clone())),
        edit: Arc::new(EditService::new(source)),
    })
}

fn main() -> Result<()> {
    let data_dir = config::default_data_dir()?;
    init_tracing(&data_dir)?;

    let config_dir = config::default_config_dir()?;
    let app_config = AppConfig::load(&config_dir);
    let services = build_services(app_config, &config_dir, &data_dir)?;
    let webview_data_dir = config::ensure_webview_data_dir(&data_dir)?;

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("TableDesk"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(services)
        .launch(app::App);
    Ok(())
}
