use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::domain::entities::table_config::TableRegistry;
use crate::usecase::ports::source::ConnectParams;

/// Table metadata shipped with the binary.
const DEFAULT_TABLES: &str = include_str!("../config/tables.toml");

pub const DEFAULT_PAGE_SIZE: i64 = 50;

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_connection() -> ConnectParams {
    ConnectParams {
        host: "127.0.0.1".to_string(),
        port: 1433,
        user: String::new(),
        password: String::new(),
        database: "tabledesk.sqlite".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_connection")]
    pub connection: ConnectParams,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Replaces the embedded table registry when set.
    #[serde(default)]
    pub tables_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection: default_connection(),
            page_size: DEFAULT_PAGE_SIZE,
            tables_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(text).context("failed to parse config")?;
        if config.page_size <= 0 {
            tracing::warn!(page_size = config.page_size, "invalid page_size, using default");
            config.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(config)
    }

    /// Reads `config.toml` from the config dir, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            return Self::default();
        }

        let loaded = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))
            .and_then(|text| Self::from_toml_str(&text));
        match loaded {
            Ok(config) => {
                tracing::info!(path = %config_path.display(), "loaded config");
                config
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::error!(error = %message, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_registry(&self, config_dir: &Path) -> Result<TableRegistry> {
        match &self.tables_file {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    config_dir.join(path)
                };
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read table registry: {}", path.display()))?;
                TableRegistry::from_toml_str(&text)
            }
            None => TableRegistry::from_toml_str(DEFAULT_TABLES),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "tabledesk", "tabledesk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_local_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;
    Ok(data_dir)
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}
