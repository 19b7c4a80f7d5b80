//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization; query parameters are checked
//! with `validator`.

pub mod health;
pub mod link;
