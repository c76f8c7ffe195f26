use std::sync::Arc;

use chrono::Local;

use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::table_config::{DisplayColumn, TableRegistry};
use crate::domain::filter::{visible_rows, FilterState, VisibleRow};
use crate::usecase::ports::source::SourceError;
use crate::usecase::services::page_loader::{LoadOutcome, LoadTicket, PageLoader};
use crate::usecase::services::row_editor::{RowEditor, SaveOutcome, SavePlan};

/// Browsing state of the selected table: page, filters and the detail editor.
///
/// Every method runs to completion without suspending, so a table switch is
/// observed as a single step. Fetches and writes are issued by the caller with
/// the returned tickets and plans, and their results are fed back through
/// [`TableBrowser::finish_load`] and [`TableBrowser::finish_save`].
#[derive(Debug)]
pub struct TableBrowser {
    registry: Arc<TableRegistry>,
    loader: PageLoader,
    filters: FilterState,
    editor: RowEditor,
    notice: Option<String>,
}

impl TableBrowser {
    pub fn new(registry: Arc<TableRegistry>, page_size: i64) -> Self {
        Self {
            registry,
            loader: PageLoader::new(page_size),
            filters: FilterState::default(),
            editor: RowEditor::default(),
            notice: None,
        }
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn editor(&self) -> &RowEditor {
        &self.editor
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.loader.table()
    }

    pub fn title(&self) -> String {
        self.selected_table()
            .map(|table| self.registry.display_title(table))
            .unwrap_or_default()
    }

    pub fn row_set(&self) -> Option<&RowSet> {
        self.loader.row_set()
    }

    pub fn select_table(&mut self, table: &str) -> LoadTicket {
        self.editor.close();
        self.filters.reset();
        self.notice = None;
        tracing::info!(table, "table selected");
        self.loader.select(table)
    }

    pub fn clear(&mut self) {
        self.editor.close();
        self.filters.reset();
        self.notice = None;
        self.loader.clear();
    }

    pub fn display_columns(&self) -> Vec<DisplayColumn> {
        match (self.selected_table(), self.loader.row_set()) {
            (Some(table), Some(rows)) => self.registry.resolve(table, &rows.columns),
            _ => Vec::new(),
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        self.loader
            .row_set()
            .map(|rows| visible_rows(rows, self.filters.applied()))
            .unwrap_or_default()
    }

    pub fn next_page(&mut self) -> Option<LoadTicket> {
        if self.editor.is_saving() {
            return None;
        }
        self.loader.next()
    }

    pub fn previous_page(&mut self) -> Option<LoadTicket> {
        if self.editor.is_saving() {
            return None;
        }
        self.loader.previous()
    }

    pub fn retry(&mut self) -> Option<LoadTicket> {
        if self.editor.is_saving() {
            return None;
        }
        self.loader.reload()
    }

    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<RowSet, SourceError>,
    ) -> LoadOutcome {
        let outcome = self.loader.finish(ticket, result);
        match outcome {
            LoadOutcome::Applied => tracing::debug!(
                table = %ticket.table,
                page = ticket.page,
                rows = self.loader.row_set().map(|rows| rows.rows.len()).unwrap_or(0),
                "page loaded"
            ),
            LoadOutcome::Failed => tracing::warn!(
                table = %ticket.table,
                page = ticket.page,
                error = self.loader.error().unwrap_or(""),
                "page load failed"
            ),
            LoadOutcome::Stale => {}
        }
        outcome
    }

    pub fn set_draft_filter(&mut self, field: &str, pattern: impl Into<String>) {
        self.filters.set_draft(field, pattern);
    }

    pub fn apply_filters(&mut self) {
        self.filters.apply();
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    pub fn open_detail(&mut self, row_index: usize) -> bool {
        match self.loader.row_set() {
            Some(rows) => self.editor.open(rows, row_index),
            None => false,
        }
    }

    pub fn set_field(&mut self, field: &str, text: impl Into<String>) {
        self.editor.set_field(field, text);
    }

    pub fn cancel_detail(&mut self) {
        self.editor.close();
    }

    pub fn begin_save(&mut self) -> Option<SavePlan> {
        let table = self.selected_table()?.to_string();
        let columns = self.display_columns();
        let plan = self.editor.begin_save(&table, &columns)?;
        tracing::info!(table = %plan.table, changes = plan.requests.len(), "saving row");
        Some(plan)
    }

    /// Applies the result of a save. On success the current page is re-issued
    /// so the table shows what the store now holds.
    pub fn finish_save(
        &mut self,
        plan: &SavePlan,
        result: Result<usize, SourceError>,
    ) -> (SaveOutcome, Option<LoadTicket>) {
        if self.selected_table() != Some(plan.table.as_str()) {
            return (SaveOutcome::Discarded, None);
        }
        let outcome = self.editor.finish_save(plan, result);
        let reload = match &outcome {
            SaveOutcome::Saved { written } => {
                self.notice = Some(format!(
                    "儲存成功（{written} 個欄位，{}）",
                    Local::now().format("%H:%M:%S")
                ));
                self.loader.reload()
            }
            SaveOutcome::Failed(message) => {
                tracing::warn!(table = %plan.table, error = %message, "save failed");
                None
            }
            SaveOutcome::Discarded => None,
        };
        (outcome, reload)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
