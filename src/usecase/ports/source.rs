use serde::Deserialize;
use thiserror::Error;

use crate::domain::entities::row_set::RowSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("{0}")]
    Connection(String),
    #[error("未連接資料庫")]
    NotConnected,
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Update(String),
    #[error("無效的識別字: {0}")]
    InvalidIdentifier(String),
    #[error("背景工作中斷: {0}")]
    Interrupted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// The relational store behind the browser. Every call may block; callers run
/// them off the UI thread.
pub trait DataSource: Send + Sync {
    fn connect(&self, params: &ConnectParams) -> Result<(), SourceError>;
    fn disconnect(&self);

    fn list_tables(&self) -> Result<Vec<String>, SourceError>;
    fn fetch_page(&self, table: &str, page: i64, page_size: i64) -> Result<RowSet, SourceError>;

    /// Returns the number of rows the write touched.
    fn update_field(
        &self,
        table: &str,
        pk_column: &str,
        pk_value: &str,
        column: &str,
        value: &str,
    ) -> Result<u64, SourceError>;
}
