use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::entities::row_set::ColumnDescriptor;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfig {
    pub field: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableConfig {
    pub title: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

/// A column that is actually shown, joined with its position in the fetched
/// column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayColumn {
    pub field: String,
    pub label: String,
    pub editable: bool,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    tables: BTreeMap<String, TableConfig>,
}

/// Declared per-table metadata keyed by qualified table name (`schema.table`).
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRegistry {
    tables: BTreeMap<String, TableConfig>,
}

impl TableRegistry {
    pub fn new(tables: BTreeMap<String, TableConfig>) -> Self {
        Self { tables }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: RegistryFile =
            toml::from_str(text).context("failed to parse table registry")?;
        Ok(Self::new(file.tables))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, table: &str) -> Option<&TableConfig> {
        self.tables.get(table)
    }

    pub fn title(&self, table: &str) -> Option<&str> {
        self.tables.get(table).map(|config| config.title.as_str())
    }

    /// Title shown for a table, falling back to its qualified name.
    pub fn display_title(&self, table: &str) -> String {
        self.title(table).unwrap_or(table).to_string()
    }

    /// Keeps only tables with a declared configuration, in source order.
    pub fn configured_tables(&self, available: &[String]) -> Vec<TableEntry> {
        available
            .iter()
            .filter_map(|name| {
                self.title(name).map(|title| TableEntry {
                    name: name.clone(),
                    title: title.to_string(),
                })
            })
            .collect()
    }

    pub fn resolve(&self, table: &str, columns: &[ColumnDescriptor]) -> Vec<DisplayColumn> {
        resolve_display_columns(columns, self.get(table))
    }
}

/// Merges declared configuration with the fetched columns.
///
/// With a configuration, entries keep their declared order and are dropped
/// when hidden or when no fetched column carries their field name. Without
/// one, every column except the leading primary key is shown under its own
/// name and is editable.
pub fn resolve_display_columns(
    columns: &[ColumnDescriptor],
    config: Option<&TableConfig>,
) -> Vec<DisplayColumn> {
    match config {
        Some(config) => config
            .columns
            .iter()
            .filter(|entry| entry.visible)
            .filter_map(|entry| {
                columns
                    .iter()
                    .position(|column| column.name == entry.field)
                    .map(|index| DisplayColumn {
                        field: entry.field.clone(),
                        label: entry.label.clone(),
                        editable: entry.editable,
                        index,
                    })
            })
            .collect(),
        None => columns
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, column)| DisplayColumn {
                field: column.name.clone(),
                label: column.name.clone(),
                editable: true,
                index,
            })
            .collect(),
    }
}
