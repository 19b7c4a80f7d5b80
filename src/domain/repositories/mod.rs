//! Repository trait definitions for the domain layer.
//!
//! - [`LinkRepository`] - Link storage, lookup, click recording and deletion
//!
//! The PostgreSQL implementation lives in `crate::infrastructure::persistence`.
//! A mock is generated via `mockall` for unit tests.

pub mod link_repository;

pub use link_repository::LinkRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
