//! Infrastructure layer modules
//!
//! This layer provides concrete implementations for external system interactions:
//! - Git operations through libgit2 (clone or orphan init, stage, commit, push)
//! - File system operations (working-tree cleaning, directory mirroring)

pub mod filesystem;
/// Git operations through libgit2
pub mod git;

// Re-export commonly used types
pub use filesystem::{clean_working_tree, mirror_directory, MirrorSummary};
pub use git::{BranchAcquirer, Checkout, GitCredentials};
