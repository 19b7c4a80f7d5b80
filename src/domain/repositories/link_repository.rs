//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the link store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with `clicks = 0` and `created_at = now()`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeConflict`] if the code already exists
    /// (primary-key violation).
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists all links, newest first.
    ///
    /// When `search` is set, only links whose code or target URL contains it
    /// (case-insensitive) are returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn list(&self, search: Option<String>) -> Result<Vec<Link>, AppError>;

    /// Records one visit: `clicks = clicks + 1`, `last_clicked = now()`.
    ///
    /// The increment is relative, never a write-back of a previously read
    /// value, so concurrent visits are not lost.
    ///
    /// Returns `Ok(false)` if the code no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn record_click(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes a link by code, returning the number of removed rows (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn delete(&self, code: &str) -> Result<u64, AppError>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if it is not.
    async fn ping(&self) -> Result<(), AppError>;
}
