//! Core domain entities.
//!
//! - [`Link`] - A persisted short code → target URL mapping with its click counter
//! - [`NewLink`] - Input for creating a link
//! - [`Allocation`] - Result of allocating a code, persisted or provisional

pub mod link;

pub use link::{Allocation, Link, NewLink};
