//! Storing multipart files through the `MediaStorage` port.

use domains::{DomainError, Upload};

use super::error::ApiResult;
use super::AppState;

/// Stores every file sent under `field`. Files under any other name are
/// rejected. On failure the files already written are removed again.
pub(crate) async fn store_uploads(
    state: &AppState,
    files: Vec<Upload>,
    field: &str,
) -> ApiResult<Vec<String>> {
    if let Some(other) = files.iter().find(|f| f.field_name != field) {
        return Err(DomainError::validation(format!(
            "unexpected file field '{}', expected '{field}'",
            other.field_name
        ))
        .into());
    }
    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        match state.media.store(file).await {
            Ok(stored) => paths.push(stored.path),
            Err(err) => {
                discard(state, &paths).await;
                return Err(err.into());
            }
        }
    }
    Ok(paths)
}

/// Passes `result` through, removing the stored `paths` when it failed.
pub(crate) async fn keep_if_ok<T>(
    state: &AppState,
    paths: &[String],
    result: domains::Result<T>,
) -> ApiResult<T> {
    if result.is_err() {
        discard(state, paths).await;
    }
    Ok(result?)
}

async fn discard(state: &AppState, paths: &[String]) {
    for path in paths {
        if let Err(err) = state.media.remove(path).await {
            tracing::warn!(path = %path, error = %err, "failed to remove orphaned upload");
        }
    }
}
