use std::collections::BTreeMap;

use crate::domain::entities::row_set::{ColumnDescriptor, Row, RowSet};
use crate::domain::entities::table_config::DisplayColumn;

/// A single-column write addressed by the row's leading column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub table: String,
    pub pk_column: String,
    pub pk_value: String,
    pub column: String,
    pub value: String,
}

/// Text copy of one row taken when its detail view opens.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSnapshot {
    columns: Vec<ColumnDescriptor>,
    original: Row,
    values: BTreeMap<String, String>,
}

impl EditSnapshot {
    /// Captures every cell of the row, editable or not, keyed by column name.
    pub fn capture(row_set: &RowSet, row_index: usize) -> Option<Self> {
        let row = row_set.rows.get(row_index)?;
        let values = row_set
            .columns
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column.name.clone(), cell.to_text()))
            .collect();

        Some(Self {
            columns: row_set.columns.clone(),
            original: row.clone(),
            values,
        })
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, field: &str, text: impl Into<String>) {
        self.values.insert(field.to_string(), text.into());
    }

    pub fn pk_column(&self) -> Option<&str> {
        self.columns.first().map(|column| column.name.as_str())
    }

    pub fn pk_value(&self) -> String {
        self.original
            .first()
            .map(|cell| cell.to_text())
            .unwrap_or_default()
    }

    /// One request per editable display column whose text differs from the
    /// original cell.
    pub fn changes(&self, table: &str, display_columns: &[DisplayColumn]) -> Vec<UpdateRequest> {
        let Some(pk_column) = self.pk_column() else {
            return Vec::new();
        };
        let pk_value = self.pk_value();

        display_columns
            .iter()
            .filter(|column| column.editable)
            .filter_map(|column| {
                let before = self
                    .original
                    .get(column.index)
                    .map(|cell| cell.to_text())
                    .unwrap_or_default();
                let after = self.value(&column.field);
                (after != before).then(|| UpdateRequest {
                    table: table.to_string(),
                    pk_column: pk_column.to_string(),
                    pk_value: pk_value.clone(),
                    column: column.field.clone(),
                    value: after.to_string(),
                })
            })
            .collect()
    }
}
