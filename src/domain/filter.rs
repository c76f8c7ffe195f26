use std::collections::BTreeMap;

use crate::domain::entities::row_set::{Row, RowSet};

pub type FilterSet = BTreeMap<String, String>;

/// Case-insensitive subsequence match: every pattern character must appear in
/// `target`, in order, not necessarily adjacent.
pub fn fuzzy_match(target: &str, pattern: &str) -> bool {
    let target = target.to_lowercase();
    let mut remaining = target.chars();
    pattern
        .to_lowercase()
        .chars()
        .all(|wanted| remaining.by_ref().any(|ch| ch == wanted))
}

fn is_blank(pattern: &str) -> bool {
    pattern.trim().is_empty()
}

/// A row of the loaded page that passed the applied filters, with its
/// position in the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow<'a> {
    pub index: usize,
    pub row: &'a Row,
}

/// Rows of the page matching every non-blank pattern. Patterns naming a
/// column the page does not have impose no constraint.
pub fn visible_rows<'a>(row_set: &'a RowSet, applied: &FilterSet) -> Vec<VisibleRow<'a>> {
    let constraints: Vec<(usize, &str)> = applied
        .iter()
        .filter(|(_, pattern)| !is_blank(pattern))
        .filter_map(|(field, pattern)| {
            row_set
                .column_index(field)
                .map(|idx| (idx, pattern.as_str()))
        })
        .collect();

    row_set
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            constraints.iter().all(|(idx, pattern)| {
                let text = row.get(*idx).map(|cell| cell.to_text()).unwrap_or_default();
                fuzzy_match(&text, pattern)
            })
        })
        .map(|(index, row)| VisibleRow { index, row })
        .collect()
}

/// Typed filter text and the committed copy that actually filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    draft: FilterSet,
    applied: FilterSet,
}

impl FilterState {
    pub fn draft(&self, field: &str) -> &str {
        self.draft.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set_draft(&mut self, field: &str, pattern: impl Into<String>) {
        self.draft.insert(field.to_string(), pattern.into());
    }

    pub fn applied(&self) -> &FilterSet {
        &self.applied
    }

    pub fn apply(&mut self) {
        self.applied = self.draft.clone();
    }

    pub fn reset(&mut self) {
        self.draft.clear();
        self.applied.clear();
    }

    pub fn has_active_draft(&self) -> bool {
        self.draft.values().any(|pattern| !is_blank(pattern))
    }

    pub fn has_active_filter(&self) -> bool {
        self.applied.values().any(|pattern| !is_blank(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::row_set::{CellValue, ColumnDescriptor};

    fn page() -> RowSet {
        RowSet {
            columns: vec![
                ColumnDescriptor::new("id", "INTEGER"),
                ColumnDescriptor::new("code", "TEXT"),
                ColumnDescriptor::new("owner", "TEXT"),
            ],
            rows: vec![
                vec![CellValue::Integer(1), CellValue::from("ABC-123"), CellValue::from("Alice")],
                vec![CellValue::Integer(2), CellValue::from("XYZ-900"), CellValue::from("Bob")],
                vec![CellValue::Integer(3), CellValue::from("BCD-100"), CellValue::Null],
            ],
            total: 3,
        }
    }

    fn indices(rows: &[VisibleRow<'_>]) -> Vec<usize> {
        rows.iter().map(|row| row.index).collect()
    }

    #[test]
    fn fuzzy_match_requires_order_but_not_adjacency() {
        assert!(fuzzy_match("ABC-123", "b1"));
        assert!(!fuzzy_match("ABC-123", "1b"));
        assert!(fuzzy_match("ABC-123", ""));
        assert!(fuzzy_match("", ""));
        assert!(!fuzzy_match("", "a"));
        assert!(!fuzzy_match("ab", "abb"));
    }

    #[test]
    fn rows_must_match_every_constrained_column() {
        let rows = page();
        let mut applied = FilterSet::new();
        applied.insert("code".to_string(), "b1".to_string());
        assert_eq!(indices(&visible_rows(&rows, &applied)), vec![0, 2]);

        applied.insert("owner".to_string(), "al".to_string());
        assert_eq!(indices(&visible_rows(&rows, &applied)), vec![0]);
    }

    #[test]
    fn blank_and_unknown_patterns_impose_nothing() {
        let rows = page();
        let mut applied = FilterSet::new();
        applied.insert("code".to_string(), "   ".to_string());
        applied.insert("nope".to_string(), "zzz".to_string());

        assert_eq!(indices(&visible_rows(&rows, &applied)), vec![0, 1, 2]);
    }

    #[test]
    fn drafts_only_filter_after_apply() {
        let rows = page();
        let mut filters = FilterState::default();
        filters.set_draft("owner", "bob");

        assert!(filters.has_active_draft());
        assert!(!filters.has_active_filter());
        assert_eq!(visible_rows(&rows, filters.applied()).len(), 3);

        filters.apply();
        let first = indices(&visible_rows(&rows, filters.applied()));
        filters.apply();
        let second = indices(&visible_rows(&rows, filters.applied()));
        assert_eq!(first, vec![1]);
        assert_eq!(first, second, "applying twice should be idempotent");

        filters.reset();
        assert_eq!(filters.draft("owner"), "");
        assert_eq!(visible_rows(&rows, filters.applied()).len(), 3);
    }
}
