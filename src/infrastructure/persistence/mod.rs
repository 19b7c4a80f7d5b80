//! PostgreSQL repository implementations.
//!
//! - [`PgLinkRepository`] - Link storage, lookup, click recording and deletion

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
