use std::sync::Arc;

use crate::domain::entities::edit::UpdateRequest;
use crate::usecase::ports::source::{DataSource, SourceError};

pub struct EditService {
    source: Arc<dyn DataSource>,
}

impl EditService {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Sends the requests one after another and stops at the first failure.
    /// Writes that already went through are not rolled back.
    pub fn submit(&self, requests: &[UpdateRequest]) -> Result<usize, SourceError> {
        for (done, request) in requests.iter().enumerate() {
            let affected = self
                .source
                .update_field(
                    &request.table,
                    &request.pk_column,
                    &request.pk_value,
                    &request.column,
                    &request.value,
                )
                .inspect_err(|err| {
                    tracing::warn!(
                        table = %request.table,
                        column = %request.column,
                        written = done,
                        error = %err,
                        "field update failed"
                    );
                })?;

            if affected != 1 {
                tracing::warn!(
                    table = %request.table,
                    pk_column = %request.pk_column,
                    pk_value = %request.pk_value,
                    affected,
                    "update did not touch exactly one row"
                );
            } else {
                tracing::debug!(table = %request.table, column = %request.column, "field updated");
            }
        }
        Ok(requests.len())
    }
}
