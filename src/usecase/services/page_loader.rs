use crate::domain::entities::row_set::{total_pages, PageQuery, RowSet};
use crate::usecase::ports::source::SourceError;

/// Identifies one issued fetch. Only the most recent ticket for the selected
/// table is allowed to change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub table: String,
    pub page: i64,
    pub page_size: i64,
    seq: u64,
}

impl LoadTicket {
    pub fn query(&self) -> PageQuery {
        PageQuery {
            table: self.table.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug)]
pub struct PageLoader {
    table: Option<String>,
    page: i64,
    page_size: i64,
    row_set: Option<RowSet>,
    status: LoadStatus,
    error: Option<String>,
    issued: u64,
}

impl PageLoader {
    pub fn new(page_size: i64) -> Self {
        Self {
            table: None,
            page: 1,
            page_size: page_size.max(1),
            row_set: None,
            status: LoadStatus::Idle,
            error: None,
            issued: 0,
        }
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn row_set(&self) -> Option<&RowSet> {
        self.row_set.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn is_blocking(&self) -> bool {
        self.is_loading() && self.row_set.is_none()
    }

    pub fn total_pages(&self) -> i64 {
        self.row_set
            .as_ref()
            .map(|rows| total_pages(rows.total, self.page_size))
            .unwrap_or(0)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Switches to `table`, dropping the previous table's rows, and issues the
    /// fetch of its first page.
    pub fn select(&mut self, table: &str) -> LoadTicket {
        self.table = Some(table.to_string());
        self.row_set = None;
        self.begin(1)
    }

    pub fn clear(&mut self) {
        self.table = None;
        self.page = 1;
        self.row_set = None;
        self.status = LoadStatus::Idle;
        self.error = None;
        self.issued += 1;
    }

    pub fn load_page(&mut self, page: i64) -> Option<LoadTicket> {
        if page < 1 || self.table.is_none() {
            return None;
        }
        Some(self.begin(page))
    }

    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.load_page(self.page)
    }

    pub fn next(&mut self) -> Option<LoadTicket> {
        if !self.has_next() {
            return None;
        }
        self.load_page(self.page + 1)
    }

    pub fn previous(&mut self) -> Option<LoadTicket> {
        if !self.has_previous() {
            return None;
        }
        self.load_page(self.page - 1)
    }

    fn begin(&mut self, page: i64) -> LoadTicket {
        self.issued += 1;
        self.page = page;
        self.status = LoadStatus::Loading;
        self.error = None;
        LoadTicket {
            table: self.table.clone().unwrap_or_default(),
            page,
            page_size: self.page_size,
            seq: self.issued,
        }
    }

    pub fn finish(
        &mut self,
        ticket: &LoadTicket,
        result: Result<RowSet, SourceError>,
    ) -> LoadOutcome {
        if self.table.as_deref() != Some(ticket.table.as_str()) || ticket.seq != self.issued {
            tracing::debug!(
                table = %ticket.table,
                page = ticket.page,
                "ignoring superseded page response"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(rows) => {
                self.row_set = Some(rows);
                self.status = LoadStatus::Loaded;
                LoadOutcome::Applied
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.status = LoadStatus::Failed;
                LoadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(total: i64) -> RowSet {
        RowSet {
            total,
            ..RowSet::default()
        }
    }

    #[test]
    fn pager_bounds_follow_total() {
        let mut loader = PageLoader::new(50);
        let ticket = loader.select("main.t");
        assert_eq!(loader.finish(&ticket, Ok(rows(120))), LoadOutcome::Applied);

        assert_eq!(loader.total_pages(), 3);
        assert!(!loader.has_previous());
        assert!(loader.previous().is_none());

        let ticket = loader.load_page(3).expect("page 3 should load");
        loader.finish(&ticket, Ok(rows(120)));
        assert!(!loader.has_next());
        assert!(loader.next().is_none());
        assert!(loader.has_previous());
    }

    #[test]
    fn previous_rows_stay_visible_while_reloading() {
        let mut loader = PageLoader::new(10);
        let ticket = loader.select("main.t");
        assert!(loader.is_blocking());
        loader.finish(&ticket, Ok(rows(30)));

        let next = loader.next().expect("second page exists");
        assert!(loader.is_loading());
        assert!(!loader.is_blocking());
        assert_eq!(loader.row_set().map(|r| r.total), Some(30));
        assert_eq!(next.page, 2);
    }

    #[test]
    fn failure_keeps_rows_and_message() {
        let mut loader = PageLoader::new(10);
        let ticket = loader.select("main.t");
        loader.finish(&ticket, Ok(rows(30)));

        let ticket = loader.reload().expect("reload should issue");
        let failure = SourceError::Fetch("查詢資料失敗: boom".into());
        let outcome = loader.finish(&ticket, Err(failure));

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(loader.error(), Some("查詢資料失敗: boom"));
        assert!(loader.row_set().is_some(), "prior rows should be retained");

        let retry = loader.reload().expect("retry should issue");
        assert!(loader.error().is_none(), "entering loading clears the error");
        assert_eq!(retry.page, 1);
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut loader = PageLoader::new(10);
        let first = loader.select("main.a");
        let second = loader.select("main.b");

        assert_eq!(loader.finish(&first, Ok(rows(99))), LoadOutcome::Stale);
        assert!(loader.row_set().is_none());

        let newer = loader.load_page(1).expect("reload should issue");
        assert_eq!(loader.finish(&second, Ok(rows(5))), LoadOutcome::Stale);
        assert_eq!(loader.finish(&newer, Ok(rows(7))), LoadOutcome::Applied);
        assert_eq!(loader.row_set().map(|r| r.total), Some(7));
    }
}
