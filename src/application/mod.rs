//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and error mapping, and
//! give HTTP handlers and the admin CLI a single API to work against.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Code allocation and link creation
//! - [`services::link_service::LinkService`] - Redirect resolution, click counting,
//!   lookup, listing and deletion

pub mod services;
