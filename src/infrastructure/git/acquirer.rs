use super::{auth::GitCredentials, checkout::Checkout, ORIGIN};
use crate::common::error::PublishError;
use crate::common::result::{PublishResult, ResultExt};
use crate::domain::value_objects::branch_name::BranchName;
use git2::{build::RepoBuilder, ErrorClass, ErrorCode, FetchOptions, Repository as Git2Repository};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Decides whether a failed clone means the branch does not exist yet
///
/// A `true` answer makes the acquirer create the branch as an orphan; `false`
/// propagates the clone error.
pub trait CloneFailurePolicy: Send + Sync {
    /// Whether `error` means the branch is absent on the remote
    fn branch_missing(&self, error: &git2::Error) -> bool;
}

/// Every clone failure is read as "branch missing"
///
/// A transient network or authentication failure is therefore also answered
/// with a fresh orphan branch, whose push then fails or creates a spurious
/// branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyFailureMeansMissing;

impl CloneFailurePolicy for AnyFailureMeansMissing {
    fn branch_missing(&self, _error: &git2::Error) -> bool {
        true
    }
}

/// Only a "reference not found" failure is read as "branch missing"
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceNotFoundOnly;

impl CloneFailurePolicy for ReferenceNotFoundOnly {
    fn branch_missing(&self, error: &git2::Error) -> bool {
        error.code() == ErrorCode::NotFound
            && !matches!(
                error.class(),
                ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Os
            )
    }
}

/// Options for obtaining the checkout
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    /// History depth of the clone, `None` for full history
    ///
    /// Ignored for local remotes (plain paths and `file://` URLs), which are
    /// always cloned with full history.
    pub depth: Option<i32>,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self { depth: Some(1) }
    }
}

/// Obtains a checkout of the target branch, creating it when it is absent
pub struct BranchAcquirer {
    options: AcquireOptions,
    policy: Box<dyn CloneFailurePolicy>,
}

impl std::fmt::Debug for BranchAcquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchAcquirer")
            .field("options", &self.options)
            .field("policy", &"<dyn CloneFailurePolicy>")
            .finish()
    }
}

impl Default for BranchAcquirer {
    fn default() -> Self {
        Self::new(AcquireOptions::default())
    }
}

impl BranchAcquirer {
    /// Acquirer with the default clone-failure policy
    pub fn new(options: AcquireOptions) -> Self {
        Self {
            options,
            policy: Box::new(AnyFailureMeansMissing),
        }
    }

    /// Replace the clone-failure policy
    pub fn with_policy(mut self, policy: impl CloneFailurePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Clone options in use
    pub fn options(&self) -> &AcquireOptions {
        &self.options
    }

    /// Clone `branch` from `remote_url` into `local_path`, or create it
    ///
    /// The clone failure itself is the existence check; no separate round
    /// trip is made. When the policy reads the failure as "branch missing",
    /// a new repository is initialised with HEAD on the unborn branch and
    /// `remote_url` registered as `origin`.
    pub fn acquire(
        &self,
        remote_url: &str,
        branch: &BranchName,
        local_path: &Path,
        credentials: &GitCredentials,
    ) -> PublishResult<Checkout> {
        debug!(
            "Cloning {} (branch {}, depth {:?}) into {}",
            remote_url,
            branch,
            self.options.depth,
            local_path.display()
        );

        match self.clone_branch(remote_url, branch, local_path, credentials) {
            Ok(repo) => {
                info!("Cloned existing branch {}", branch);
                Ok(Checkout::new(repo, branch.clone(), false))
            }
            Err(error) => {
                if !self.policy.branch_missing(&error) {
                    return Err(PublishError::git_error_with_source(
                        format!("Failed to clone branch '{}'", branch),
                        error,
                    ));
                }

                warn!("Clone of branch {} failed, treating it as missing: {}", branch, error);
                discard_partial_clone(local_path)?;
                let repo = init_orphan(remote_url, branch, local_path)?;
                Ok(Checkout::new(repo, branch.clone(), true))
            }
        }
    }

    fn clone_branch(
        &self,
        remote_url: &str,
        branch: &BranchName,
        local_path: &Path,
        credentials: &GitCredentials,
    ) -> Result<Git2Repository, git2::Error> {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(credentials.remote_callbacks());
        match self.options.depth {
            Some(depth) if supports_shallow(remote_url) => {
                fetch_options.depth(depth);
            }
            Some(_) => debug!("Local remote {}, fetching full history", remote_url),
            None => {}
        }

        // Single-branch: only the target branch is fetched
        let refspec = branch.fetch_refspec(ORIGIN);

        let mut builder = RepoBuilder::new();
        builder
            .branch(branch.as_str())
            .fetch_options(fetch_options)
            .remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));

        builder.clone(remote_url, local_path)
    }
}

/// libgit2's local transport cannot serve shallow fetches
fn supports_shallow(remote_url: &str) -> bool {
    match Url::parse(remote_url) {
        Ok(url) => url.scheme() != "file",
        Err(_) => false,
    }
}

/// Remove whatever a failed clone left behind
fn discard_partial_clone(local_path: &Path) -> PublishResult<()> {
    if local_path.exists() {
        fs::remove_dir_all(local_path).with_filesystem_error(
            "Failed to remove partial clone",
            Some(local_path.to_path_buf()),
        )?;
    }
    Ok(())
}

/// New repository whose HEAD points at the unborn `branch`, with `origin` set
fn init_orphan(remote_url: &str, branch: &BranchName, local_path: &Path) -> PublishResult<Git2Repository> {
    let repo = Git2Repository::init(local_path).with_git_error("Failed to init repository")?;

    repo.set_head(&branch.reference_name())
        .with_git_error(format!("Failed to create branch '{}'", branch))?;

    repo.remote(ORIGIN, remote_url)
        .with_git_error("Failed to add remote")?;

    Ok(repo)
}
