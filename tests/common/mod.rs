#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tinylink::application::services::{LinkService, ShortenService};
use tinylink::domain::entities::{Link, NewLink};
use tinylink::domain::repositories::LinkRepository;
use tinylink::error::AppError;
use tinylink::routes::router;
use tinylink::state::AppState;

/// In-memory link store with switches for simulating store failures.
///
/// Behaves like the `links` table: codes are unique, increments are
/// relative, and listing is newest first.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, (u64, Link)>>,
    sequence: AtomicU64,
    unavailable: AtomicBool,
    clicks_unavailable: AtomicBool,
    latency_ms: AtomicU64,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl InMemoryLinkRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every operation fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes only click recording fail.
    pub fn set_clicks_unavailable(&self, unavailable: bool) {
        self.clicks_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every operation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn insert(&self, code: &str, target_url: &str) -> Link {
        let link = Link::unvisited(
            NewLink {
                code: code.to_string(),
                target_url: target_url.to_string(),
            },
            Utc::now(),
        );
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.links
            .lock()
            .unwrap()
            .insert(code.to_string(), (seq, link.clone()));
        link
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links
            .lock()
            .unwrap()
            .get(code)
            .map(|(_, link)| link.clone())
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    async fn enter(&self) -> Result<(), AppError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store_unavailable(
                "Storage temporarily unavailable",
                json!({}),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.enter().await?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.code) {
            return Err(AppError::code_conflict("Code already exists", json!({})));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let link = Link::unvisited(new_link, Utc::now());
        links.insert(link.code.clone(), (seq, link.clone()));

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.enter().await?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        Ok(self.get(code))
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Link>, AppError> {
        self.enter().await?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let needle = search.map(|s| s.to_lowercase());
        let mut rows: Vec<(u64, Link)> = self
            .links
            .lock()
            .unwrap()
            .values()
            .filter(|(_, link)| match &needle {
                Some(n) => {
                    link.code.to_lowercase().contains(n)
                        || link.target_url.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then(b.0.cmp(&a.0)));

        Ok(rows.into_iter().map(|(_, link)| link).collect())
    }

    async fn record_click(&self, code: &str) -> Result<bool, AppError> {
        self.enter().await?;

        if self.clicks_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store_unavailable(
                "Storage temporarily unavailable",
                json!({}),
            ));
        }

        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut links = self.links.lock().unwrap();
        match links.get_mut(code) {
            Some((_, link)) => {
                link.clicks += 1;
                link.last_clicked = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, code: &str) -> Result<u64, AppError> {
        self.enter().await?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(self.links.lock().unwrap().remove(code).map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.enter().await
    }
}

pub fn create_test_state(repo: Arc<InMemoryLinkRepository>) -> AppState {
    create_test_state_with(repo, Duration::from_secs(1), false)
}

pub fn create_test_state_with(
    repo: Arc<InMemoryLinkRepository>,
    store_timeout: Duration,
    allow_unpersisted: bool,
) -> AppState {
    let shorten_service = ShortenService::new(repo.clone(), store_timeout)
        .with_unpersisted_fallback(allow_unpersisted);
    let link_service = LinkService::new(repo, store_timeout, 2);

    AppState::new(Arc::new(shorten_service), Arc::new(link_service))
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

/// Waits until the background click recording has brought `code` to `expected`.
pub async fn wait_for_clicks(repo: &InMemoryLinkRepository, code: &str, expected: i64) -> Link {
    for _ in 0..100 {
        if let Some(link) = repo.get(code) {
            if link.clicks >= expected {
                return link;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("clicks for {code} never reached {expected}");
}
