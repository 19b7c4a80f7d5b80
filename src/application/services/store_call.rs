//! Bounded store calls.

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Runs a store operation with an upper bound on its duration.
///
/// A call that does not finish within `limit` is abandoned and reported as
/// [`AppError::StoreUnavailable`], never as `NotFound` or a validation error.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Link store call timed out"
            );
            Err(AppError::store_unavailable(
                "Storage temporarily unavailable",
                json!({}),
            ))
        }
    }
}
