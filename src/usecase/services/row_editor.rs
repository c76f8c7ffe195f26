use crate::domain::entities::edit::{EditSnapshot, UpdateRequest};
use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::table_config::DisplayColumn;
use crate::usecase::ports::source::SourceError;

/// Updates to send for one save, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub table: String,
    pub requests: Vec<UpdateRequest>,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { written: usize },
    Failed(String),
    /// The editor was closed or reopened while the writes were running.
    Discarded,
}

#[derive(Debug, Default)]
pub struct RowEditor {
    snapshot: Option<EditSnapshot>,
    saving: bool,
    error: Option<String>,
    seq: u64,
}

impl RowEditor {
    /// Refused while a save is in flight.
    pub fn open(&mut self, row_set: &RowSet, row_index: usize) -> bool {
        if self.saving {
            return false;
        }
        let Some(snapshot) = EditSnapshot::capture(row_set, row_index) else {
            return false;
        };
        self.close();
        self.snapshot = Some(snapshot);
        true
    }

    pub fn is_open(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn value(&self, field: &str) -> &str {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.value(field))
            .unwrap_or("")
    }

    pub fn set_field(&mut self, field: &str, text: impl Into<String>) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.set_field(field, text);
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn close(&mut self) {
        self.snapshot = None;
        self.saving = false;
        self.error = None;
        self.seq += 1;
    }

    pub fn begin_save(&mut self, table: &str, columns: &[DisplayColumn]) -> Option<SavePlan> {
        if self.saving {
            return None;
        }
        let snapshot = self.snapshot.as_ref()?;
        let requests = snapshot.changes(table, columns);
        self.saving = true;
        self.error = None;
        self.seq += 1;
        Some(SavePlan {
            table: table.to_string(),
            requests,
            seq: self.seq,
        })
    }

    /// A failed save keeps the snapshot and its edits so nothing typed is lost.
    pub fn finish_save(
        &mut self,
        plan: &SavePlan,
        result: Result<usize, SourceError>,
    ) -> SaveOutcome {
        if !self.saving || plan.seq != self.seq {
            return SaveOutcome::Discarded;
        }
        match result {
            Ok(written) => {
                self.close();
                SaveOutcome::Saved { written }
            }
            Err(err) => {
                let message = err.to_string();
                self.saving = false;
                self.error = Some(message.clone());
                SaveOutcome::Failed(message)
            }
        }
    }
}
