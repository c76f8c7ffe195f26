use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::row_set::{CellValue, ColumnDescriptor, Row, RowSet};
use crate::infra::sqlite::schema::{quote_identifier, QualifiedName};

pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name ASC",
        )
        .context("failed to prepare table list query")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("failed to query table list")?
        .map(|name| name.map(|name| format!("main.{name}")))
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect table list")?;
    Ok(tables)
}

pub fn load_columns(conn: &Connection, name: &QualifiedName) -> Result<Vec<ColumnDescriptor>> {
    let pragma_sql = format!(
        "PRAGMA {}.table_info({})",
        quote_identifier(&name.schema),
        quote_identifier(&name.table)
    );
    let mut stmt = conn
        .prepare(&pragma_sql)
        .context("failed to prepare column query")?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnDescriptor {
                name: row.get(1)?,
                data_type: row.get(2)?,
            })
        })
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;
    Ok(columns)
}

/// Tables carrying this column are paged newest first.
const EXCHANGE_TIME_COLUMN: &str = "exchangeTime";

fn primary_key_columns(conn: &Connection, name: &QualifiedName) -> Result<Vec<String>> {
    let pragma_sql = format!(
        "PRAGMA {}.table_info({})",
        quote_identifier(&name.schema),
        quote_identifier(&name.table)
    );
    let mut stmt = conn
        .prepare(&pragma_sql)
        .context("failed to prepare primary key query")?;
    let mut keys = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(5)?, row.get::<_, String>(1)?)))
        .context("failed to query primary key")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect primary key")?;
    keys.retain(|(position, _)| *position > 0);
    keys.sort_by_key(|(position, _)| *position);
    Ok(keys.into_iter().map(|(_, column)| column).collect())
}

fn is_without_rowid(conn: &Connection, name: &QualifiedName) -> Result<bool> {
    let sql = format!(
        "SELECT sql FROM {}.sqlite_master WHERE type = 'table' AND name = ?1",
        quote_identifier(&name.schema)
    );
    let create_sql: Option<Option<String>> = conn
        .query_row(&sql, params![name.table], |row| row.get(0))
        .optional()
        .context("failed to read table definition")?;
    Ok(create_sql
        .flatten()
        .is_some_and(|sql| sql.to_ascii_uppercase().contains("WITHOUT ROWID")))
}

/// `ORDER BY` body for paging: `exchangeTime` descending when present, then
/// rowid, or the declared primary key for WITHOUT ROWID tables.
fn page_order(
    conn: &Connection,
    name: &QualifiedName,
    columns: &[ColumnDescriptor],
) -> Result<String> {
    let mut terms = Vec::new();
    if columns.iter().any(|column| column.name == EXCHANGE_TIME_COLUMN) {
        terms.push(format!("{} DESC", quote_identifier(EXCHANGE_TIME_COLUMN)));
    }

    let keys = if is_without_rowid(conn, name)? {
        primary_key_columns(conn, name)?
    } else {
        Vec::new()
    };
    if keys.is_empty() {
        terms.push("rowid".to_string());
    } else {
        terms.extend(keys.iter().map(|column| quote_identifier(column)));
    }
    Ok(terms.join(", "))
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(value) => CellValue::Integer(value),
        ValueRef::Real(value) => CellValue::Real(value),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            CellValue::Text(bytes.iter().map(|b| format!("{b:02x}")).collect())
        }
    }
}

/// Reads one 1-based page in [`page_order`].
pub fn fetch_page(
    conn: &Connection,
    name: &QualifiedName,
    page: i64,
    page_size: i64,
) -> Result<RowSet> {
    if page < 1 {
        anyhow::bail!("page must be at least 1, got {page}");
    }
    if page_size <= 0 {
        anyhow::bail!("page_size must be greater than zero");
    }

    let columns = load_columns(conn, name)?;
    if columns.is_empty() {
        anyhow::bail!("table not found: {}.{}", name.schema, name.table);
    }

    let table_sql = name.quoted();
    let total: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table_sql}"), [], |row| {
            row.get(0)
        })
        .context("failed to query row count")?;

    let column_list = columns
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let order = page_order(conn, name, &columns)?;
    let offset = (page - 1).saturating_mul(page_size);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {column_list} FROM {table_sql} ORDER BY {order} LIMIT ?1 OFFSET ?2"
        ))
        .context("failed to prepare page query")?;

    let width = columns.len();
    let rows = stmt
        .query_map(params![page_size, offset], |row| {
            (0..width)
                .map(|idx| row.get_ref(idx).map(cell_from_sql))
                .collect::<rusqlite::Result<Row>>()
        })
        .context("failed to query page rows")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect page rows")?;

    Ok(RowSet {
        columns,
        rows,
        total,
    })
}

pub fn update_field(
    conn: &Connection,
    name: &QualifiedName,
    pk_column: &str,
    pk_value: &str,
    column: &str,
    value: &str,
) -> Result<u64> {
    let sql = format!(
        "UPDATE {} SET {} = ?1 WHERE {} = ?2",
        name.quoted(),
        quote_identifier(column),
        quote_identifier(pk_column)
    );
    let affected = conn
        .execute(&sql, params![value, pk_value])
        .with_context(|| format!("failed to update column {column}"))?;
    Ok(affected as u64)
}
