//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::header_safe_target;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the link by code
/// 2. Spawn the click increment in the background
/// 3. Return 302 Found with the target in `Location`
///
/// 302 rather than 301 so clients come back through this endpoint on
/// every visit and each one is counted.
///
/// # Errors
///
/// Responses are plain text, since they are read by browsers:
///
/// - 404 `Link not found` for an unknown code
/// - 503 if the store is unavailable, 500 for anything else
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.link_service.resolve_and_record(&code).await {
        Ok(visit) => (
            StatusCode::FOUND,
            [(header::LOCATION, header_safe_target(&visit.target_url))],
        )
            .into_response(),
        Err(AppError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "Link not found").into_response()
        }
        Err(e) if e.is_store_failure() => {
            (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
        }
        Err(e) => {
            tracing::error!(code, error = %e, "Redirect failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
