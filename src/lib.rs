//! # publish-directory - Publish a directory to a git branch
//!
//! `publish-directory` replaces the entire content of one branch of a remote
//! git repository with the contents of a local directory, commits the result
//! and pushes it. It is meant to run once per CI job, typically to publish a
//! generated site or build artifacts.
//!
//! ## Features
//!
//! - **Orphan Branches**: A missing target branch is created without history
//! - **Full Replacement**: Files absent from the directory are deleted from the branch
//! - **Idempotent Runs**: Identical content produces no commit and no push
//! - **Environment Configuration**: Every option is read from `INPUT_*` / `GITHUB_*` variables
//!
//! ## Quick Start
//!
//! ```bash
//! INPUT_BRANCH=gh-pages INPUT_FOLDER=public GITHUB_REPOSITORY=octo/site \
//!   GITHUB_TOKEN=... publish-directory
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Validated configuration and value objects
//! - [`application`]: The publish workflow
//! - [`infrastructure`]: Git and file system operations
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared utilities and error handling
//!
//! ## Domain Model
//!
//! - [`domain::entities::publish_config::PublishConfig`]: Immutable configuration of one run
//! - [`domain::value_objects::branch_name::BranchName`]: Type-safe branch name representation
//! - [`domain::value_objects::repository_slug::RepositorySlug`]: `owner/name` repository identifier
//!
//! ## Infrastructure
//!
//! - [`infrastructure::git`]: Clone-or-create, staging, commit and push using libgit2
//! - [`infrastructure::filesystem`]: Working-tree cleaning and directory mirroring
//!
//! ## Error Handling
//!
//! - [`common::error::PublishError`]: Main error type with detailed context
//! - [`common::result::PublishResult`]: Type alias for `Result<T, PublishError>`
//! - [`application::use_cases::publish_directory::PublishDirectoryError`]: Failure tagged with the step it happened in
//!
//! ## Examples
//!
//! ### Using the Library
//!
//! ```rust,no_run
//! use publish_directory::application::use_cases::publish_directory::PublishDirectoryUseCase;
//! use publish_directory::domain::entities::publish_config::{PublishConfig, RepositorySource};
//! use publish_directory::domain::value_objects::branch_name::BranchName;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PublishConfig::new(
//!     RepositorySource::new(Some("octo/site".to_string()), None),
//!     BranchName::new("gh-pages")?,
//!     "public",
//! );
//!
//! let outcome = PublishDirectoryUseCase::new(config).execute()?;
//! println!("Published: {}", outcome.is_published());
//! # Ok(())
//! # }
//! ```

// Documentation attributes
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::PublishError;
pub use crate::common::result::PublishResult as Result;
