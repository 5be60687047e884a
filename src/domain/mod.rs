//! Domain layer: validated configuration and value objects

/// Configuration of one publish run
pub mod entities;
/// Validated names: branches and repository slugs
pub mod value_objects;
