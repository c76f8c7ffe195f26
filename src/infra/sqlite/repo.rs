use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::domain::entities::row_set::RowSet;
use crate::infra::sqlite::queries::{fetch_page, list_tables, update_field};
use crate::infra::sqlite::schema::{is_valid_identifier, open_connection, QualifiedName};
use crate::usecase::ports::source::{ConnectParams, DataSource, SourceError};

/// [`DataSource`] over a SQLite database file. `ConnectParams::database` names
/// the file; relative paths resolve against `data_dir`.
pub struct SqliteSource {
    data_dir: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn resolve_path(&self, database: &str) -> PathBuf {
        let path = Path::new(database);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn table_name(table: &str) -> Result<QualifiedName, SourceError> {
        QualifiedName::parse(table).ok_or_else(|| SourceError::InvalidIdentifier(table.to_string()))
    }
}

impl DataSource for SqliteSource {
    fn connect(&self, params: &ConnectParams) -> Result<(), SourceError> {
        let db_path = self.resolve_path(&params.database);
        tracing::debug!(
            path = %db_path.display(),
            host = %params.host,
            port = params.port,
            "host, port and credentials are not used by the SQLite source"
        );
        let conn = open_connection(&db_path)
            .map_err(|err| SourceError::Connection(format!("資料庫連線失敗: {err:#}")))?;
        *self.lock() = Some(conn);
        Ok(())
    }

    fn disconnect(&self) {
        self.lock().take();
    }

    fn list_tables(&self) -> Result<Vec<String>, SourceError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(SourceError::NotConnected)?;
        list_tables(conn)
            .map_err(|err| SourceError::Fetch(format!("查詢資料表失敗: {err:#}")))
    }

    fn fetch_page(&self, table: &str, page: i64, page_size: i64) -> Result<RowSet, SourceError> {
        let name = Self::table_name(table)?;
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(SourceError::NotConnected)?;
        fetch_page(conn, &name, page, page_size)
            .map_err(|err| SourceError::Fetch(format!("查詢資料失敗: {err:#}")))
    }

    fn update_field(
        &self,
        table: &str,
        pk_column: &str,
        pk_value: &str,
        column: &str,
        value: &str,
    ) -> Result<u64, SourceError> {
        let name = Self::table_name(table)?;
        for identifier in [pk_column, column] {
            if !is_valid_identifier(identifier) {
                return Err(SourceError::InvalidIdentifier(identifier.to_string()));
            }
        }
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(SourceError::NotConnected)?;
        update_field(conn, &name, pk_column, pk_value, column, value)
            .map_err(|err| SourceError::Update(format!("更新失敗: {err:#}")))
    }
}
