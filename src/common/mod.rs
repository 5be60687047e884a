//! Shared error and result types

/// Crate-wide error type
pub mod error;
/// Result alias and context helpers
pub mod result;
