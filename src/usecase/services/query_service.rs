use std::sync::Arc;

use crate::domain::entities::row_set::{PageQuery, RowSet};
use crate::usecase::ports::source::{ConnectParams, DataSource, SourceError};

pub struct QueryService {
    source: Arc<dyn DataSource>,
}

impl QueryService {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Connects and returns the tables the source exposes.
    pub fn connect(&self, params: &ConnectParams) -> Result<Vec<String>, SourceError> {
        self.source.connect(params)?;
        tracing::info!(host = %params.host, database = %params.database, "connected");
        self.list_tables()
    }

    pub fn disconnect(&self) {
        self.source.disconnect();
        tracing::info!("disconnected");
    }

    pub fn list_tables(&self) -> Result<Vec<String>, SourceError> {
        let tables = self.source.list_tables()?;
        tracing::debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    pub fn fetch_page(&self, query: &PageQuery) -> Result<RowSet, SourceError> {
        self.source
            .fetch_page(&query.table, query.page, query.page_size)
    }
}
