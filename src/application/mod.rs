//! Application layer: use cases that drive the infrastructure
/// Use cases
pub mod use_cases;
