/// Clone the target branch, or create it as an orphan
pub mod acquirer;
/// Token credentials for the remote
pub mod auth;
/// Stage, commit and push in a checkout
pub mod checkout;

/// Name under which the target remote is registered in every checkout
pub const ORIGIN: &str = "origin";

// Re-export main types for convenience
pub use acquirer::{
    AcquireOptions, AnyFailureMeansMissing, BranchAcquirer, CloneFailurePolicy,
    ReferenceNotFoundOnly,
};
pub use auth::GitCredentials;
pub use checkout::{ChangeSet, Checkout};
