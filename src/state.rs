//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{LinkService, ShortenService};

/// Services shared by all request handlers.
///
/// Cloning is cheap: every field is an [`Arc`]. The underlying connection
/// pool lives inside the repositories the services were built with.
#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,
    pub link_service: Arc<LinkService>,
}

impl AppState {
    pub fn new(shorten_service: Arc<ShortenService>, link_service: Arc<LinkService>) -> Self {
        Self {
            shorten_service,
            link_service,
        }
    }
}
