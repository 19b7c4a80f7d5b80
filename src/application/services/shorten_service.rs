//! Short code allocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::application::services::store_call::bounded;
use crate::domain::entities::{Allocation, Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_code};
use crate::utils::url_validator::validate_target_url;

/// Service that allocates short codes and persists new links.
///
/// Uniqueness is enforced twice: a lookup before the insert rejects taken
/// codes without a write, and the primary key on `links.code` rejects the
/// ones that race past the lookup. Both surface as [`AppError::CodeConflict`].
pub struct ShortenService {
    link_repository: Arc<dyn LinkRepository>,
    store_timeout: Duration,
    allow_unpersisted: bool,
}

impl ShortenService {
    /// Creates a new shorten service. Degraded mode is off.
    pub fn new(link_repository: Arc<dyn LinkRepository>, store_timeout: Duration) -> Self {
        Self {
            link_repository,
            store_timeout,
            allow_unpersisted: false,
        }
    }

    /// Enables or disables degraded mode.
    ///
    /// When enabled, a store failure during allocation yields an
    /// [`Allocation::Provisional`] link instead of an error. Intended for
    /// local development without a database.
    pub fn with_unpersisted_fallback(mut self, enabled: bool) -> Self {
        self.allow_unpersisted = enabled;
        self
    }

    /// Creates a short link.
    ///
    /// # Arguments
    ///
    /// - `long_url` - The target URL (`http` or `https`)
    /// - `custom_code` - Optional caller-chosen code; empty means "generate one"
    ///
    /// # Store access
    ///
    /// One read and one write on success, one read and no write on conflict,
    /// nothing at all when validation fails.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the URL is malformed or not http(s)
    /// - [`AppError::InvalidCodeFormat`] if the code is not 6-8 alphanumerics
    /// - [`AppError::CodeConflict`] if the code is taken
    /// - [`AppError::StoreUnavailable`] if the store fails and degraded mode is off
    pub async fn create_link(
        &self,
        long_url: String,
        custom_code: Option<String>,
    ) -> Result<Allocation, AppError> {
        let target_url = validate_target_url(&long_url)?;

        let code = custom_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(generate_code);

        validate_code(&code)?;

        let new_link = NewLink { code, target_url };

        match self.persist(new_link.clone()).await {
            Ok(link) => {
                metrics::counter!("links_created_total").increment(1);
                tracing::info!(code = %link.code, "Link created");
                Ok(Allocation::Persisted(link))
            }
            Err(e) if e.is_store_failure() && self.allow_unpersisted => {
                tracing::warn!(
                    code = %new_link.code,
                    "Link store unavailable, returning unpersisted link"
                );
                Ok(Allocation::Provisional(Link::unvisited(new_link, Utc::now())))
            }
            Err(e) => Err(e),
        }
    }

    async fn persist(&self, new_link: NewLink) -> Result<Link, AppError> {
        let code = new_link.code.clone();

        let existing = bounded(
            self.store_timeout,
            "find_by_code",
            self.link_repository.find_by_code(&code),
        )
        .await?;

        if existing.is_some() {
            return Err(conflict(&code));
        }

        bounded(
            self.store_timeout,
            "create",
            self.link_repository.create(new_link),
        )
        .await
        .map_err(|e| match e {
            AppError::CodeConflict { .. } => conflict(&code),
            other => other,
        })
    }
}

fn conflict(code: &str) -> AppError {
    AppError::code_conflict("Code already exists", json!({ "code": code }))
}
