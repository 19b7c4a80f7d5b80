//! Link resolution, visit counting, lookup, listing and deletion.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tokio_util::task::TaskTracker;

use crate::application::services::store_call::bounded;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Upper bound between two attempts to record a visit.
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A resolved short code.
///
/// `recording` tracks the background task that increments the click
/// counter. Handlers drop it so the redirect never waits on the write;
/// callers that need the counter settled can await it.
#[derive(Debug)]
pub struct Visit {
    pub target_url: String,
    pub recording: JoinHandle<()>,
}

/// Service that resolves codes and manages existing links.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    store_timeout: Duration,
    click_retry_attempts: usize,
    recordings: TaskTracker,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        store_timeout: Duration,
        click_retry_attempts: usize,
    ) -> Self {
        Self {
            link_repository,
            store_timeout,
            click_retry_attempts,
            recordings: TaskTracker::new(),
        }
    }

    /// Resolves a code to its target URL and records the visit.
    ///
    /// # Request Flow
    ///
    /// 1. Look up the link (awaited, bounded by the store timeout)
    /// 2. Spawn the click increment (`clicks = clicks + 1`, `last_clicked = now()`)
    /// 3. Return the target without waiting for the increment
    ///
    /// Increments that could not be sent are retried with jittered
    /// exponential backoff; other failures are logged once. None of them
    /// turn into an error for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code. Nothing is
    /// mutated in that case.
    /// Returns [`AppError::StoreUnavailable`] if the lookup fails.
    pub async fn resolve_and_record(&self, code: &str) -> Result<Visit, AppError> {
        let link = self.get_link(code).await?;

        let recording = self.recordings.spawn(record_visit(
            self.link_repository.clone(),
            link.code,
            self.store_timeout,
            self.click_retry_attempts,
        ));

        metrics::counter!("redirects_total").increment(1);

        Ok(Visit {
            target_url: link.target_url,
            recording,
        })
    }

    /// Retrieves a link by code without modifying it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::StoreUnavailable`] on store errors.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        bounded(
            self.store_timeout,
            "find_by_code",
            self.link_repository.find_by_code(code),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "code": code })))
    }

    /// Deletes a link, returning the number of removed rows (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on store errors.
    pub async fn delete_link(&self, code: &str) -> Result<u64, AppError> {
        let removed = bounded(
            self.store_timeout,
            "delete",
            self.link_repository.delete(code),
        )
        .await?;

        if removed > 0 {
            metrics::counter!("links_deleted_total").increment(1);
            tracing::info!(code, "Link deleted");
        }

        Ok(removed)
    }

    /// Lists links newest first, optionally filtered by a search term.
    ///
    /// Store failures degrade to an empty list. This keeps read-heavy
    /// dashboards rendering while the store is down, at the cost of
    /// showing "no links" instead of an error.
    pub async fn list_links(&self, search: Option<String>) -> Vec<Link> {
        match self.try_list_links(search).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(error = %e, "Listing links failed, returning empty list");
                Vec::new()
            }
        }
    }

    /// Lists links newest first, reporting store failures to the caller.
    ///
    /// A blank `search` means no filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on store errors.
    pub async fn try_list_links(&self, search: Option<String>) -> Result<Vec<Link>, AppError> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        bounded(
            self.store_timeout,
            "list",
            self.link_repository.list(search),
        )
        .await
    }

    /// Waits for visit recordings that are still in flight.
    ///
    /// Called on shutdown before the pool is closed. Visits resolved after
    /// this point are still recorded, but nothing waits for them.
    pub async fn drain(&self) {
        self.recordings.close();
        self.recordings.wait().await;
    }

    /// Checks that the link store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if it is not.
    pub async fn ping(&self) -> Result<(), AppError> {
        bounded(self.store_timeout, "ping", self.link_repository.ping()).await
    }
}

/// Increments the click counter for `code`.
///
/// Only failures where the `UPDATE` never reached the database are retried;
/// after any other error the increment may already be committed, and
/// running it again would count the visit twice. The whole sequence shares
/// one deadline, and single attempts are never cut short for the same
/// reason.
async fn record_visit(
    link_repository: Arc<dyn LinkRepository>,
    code: String,
    store_timeout: Duration,
    retry_attempts: usize,
) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(retry_attempts);

    let deadline = recording_deadline(store_timeout, retry_attempts);

    let attempt = RetryIf::spawn(
        strategy,
        || {
            let link_repository = link_repository.clone();
            let code = code.clone();
            async move { link_repository.record_click(&code).await }
        },
        AppError::is_safe_to_retry,
    );

    match bounded(deadline, "record_click", attempt).await {
        Ok(true) => tracing::debug!(code, "Visit recorded"),
        Ok(false) => tracing::debug!(code, "Link removed before its visit was recorded"),
        Err(e) => {
            metrics::counter!("click_record_failures_total").increment(1);
            tracing::error!(code, error = %e, "Failed to record visit");
        }
    }
}

/// Time allowed for one attempt per try plus one backoff delay.
fn recording_deadline(store_timeout: Duration, retry_attempts: usize) -> Duration {
    let tries = u32::try_from(retry_attempts).unwrap_or(u32::MAX).saturating_add(1);

    store_timeout
        .saturating_mul(tries)
        .saturating_add(MAX_RETRY_DELAY)
}
