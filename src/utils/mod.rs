//! Utility functions for code generation, URL validation, and error classification.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Target URL validation and header-safe rendering
//! - [`db_error`] - Database error classification

pub mod code_generator;
pub mod db_error;
pub mod url_validator;
