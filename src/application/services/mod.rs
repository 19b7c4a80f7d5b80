//! Business logic services for the application layer.

pub mod link_service;
pub mod shorten_service;
pub mod store_call;

pub use link_service::{LinkService, Visit};
pub use shorten_service::ShortenService;
