use crate::usecase::ports::source::SourceError;

/// Runs a data source call on the blocking pool so the UI keeps handling
/// events until the result comes back.
pub async fn run_blocking<F, T>(f: F) -> Result<T, SourceError>
where
    F: FnOnce() -> Result<T, SourceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap_or_else(|err| {
        tracing::error!(error = %err, "blocking task did not complete");
        Err(SourceError::Interrupted(err.to_string()))
    })
}
