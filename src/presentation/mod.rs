//! User-facing entry points

/// Command line interface
pub mod cli;
