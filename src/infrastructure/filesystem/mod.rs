//! Working-tree replacement: sanitize the checkout, then mirror the source into it

/// Copy the source tree into the checkout
pub mod mirror;
/// Remove everything but `.git` from the checkout
pub mod working_tree;

/// Name of the git metadata directory, never touched by cleaning or mirroring
pub const METADATA_DIR: &str = ".git";

pub use mirror::{mirror_directory, MirrorSummary};
pub use working_tree::clean_working_tree;
