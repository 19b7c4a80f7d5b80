//! Handlers for link management endpoints (create, list, get, delete).

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, CreatedLinkResponse, DeletedResponse, LinkResponse, ListLinksQuery,
};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://example.com/a/b", "customCode": "promo24" }
/// ```
///
/// `customCode` is optional; a 6-character code is generated when it is
/// absent or empty.
///
/// # Response
///
/// 201 Created:
///
/// ```json
/// {
///   "code": "aZ3k9Q",
///   "target_url": "https://example.com/a/b",
///   "clicks": 0,
///   "last_clicked": null,
///   "created_at": "2025-01-01T12:00:00Z",
///   "persisted": true
/// }
/// ```
///
/// In degraded mode a store failure answers 202 Accepted with
/// `"persisted": false`; that link does not exist in the store.
///
/// # Errors
///
/// - 400 `invalid_url`, `invalid_code_format` or `invalid_request`
/// - 409 `code_conflict` if the code is taken
/// - 503 `store_unavailable`
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedLinkResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Request body must be a JSON object",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    let (long_url, custom_code) = payload.into_parts()?;

    let allocation = state
        .shorten_service
        .create_link(long_url, custom_code)
        .await?;

    let status = if allocation.is_persisted() {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };

    Ok((status, Json(allocation.into())))
}

/// Lists all links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?search=example`
///
/// No pagination. If the store is unavailable the response is still
/// 200 with an empty array.
///
/// # Errors
///
/// Returns 400 Bad Request if the query string cannot be parsed or `search`
/// exceeds 2048 characters.
pub async fn list_links_handler(
    State(state): State<AppState>,
    query: Result<Query<ListLinksQuery>, QueryRejection>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        AppError::bad_request(
            "Invalid query string",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    query.validate()?;

    let links = state.link_service.list_links(query.search).await;

    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// Returns a single link with its click statistics.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;

    Ok(Json(link.into()))
}

/// Permanently deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Response
///
/// ```json
/// { "deleted": true }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist (including a second
/// delete of the same code).
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, AppError> {
    let removed = state.link_service.delete_link(&code).await?;

    if removed == 0 {
        return Err(AppError::not_found(
            "Link not found",
            json!({ "code": code }),
        ));
    }

    Ok(Json(DeletedResponse { deleted: true }))
}
