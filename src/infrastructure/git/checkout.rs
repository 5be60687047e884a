use super::{auth::GitCredentials, ORIGIN};
use crate::common::error::PublishError;
use crate::common::result::{PublishResult, ResultExt};
use crate::domain::entities::publish_config::CommitIdentity;
use crate::domain::value_objects::branch_name::BranchName;
use chrono::{DateTime, Utc};
use git2::{
    Commit, Delta, ErrorCode, IndexAddOption, Oid, PushOptions, Repository as Git2Repository,
    Signature, Time,
};
use serde::Serialize;
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, info, trace};

/// Staged changes relative to the branch tip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Paths new on the branch
    pub added: usize,
    /// Paths whose content or mode changed
    pub modified: usize,
    /// Paths removed from the branch
    pub deleted: usize,
}

impl ChangeSet {
    /// Nothing to commit
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of changed paths
    pub fn total(&self) -> usize {
        self.added + self.modified + self.deleted
    }
}

/// Local checkout of the target branch, owned by one publish run
pub struct Checkout {
    repo: Git2Repository,
    branch: BranchName,
    created_branch: bool,
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("path", &self.repo.workdir())
            .field("branch", &self.branch)
            .field("created_branch", &self.created_branch)
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl Checkout {
    pub(crate) fn new(repo: Git2Repository, branch: BranchName, created_branch: bool) -> Self {
        Self {
            repo,
            branch,
            created_branch,
        }
    }

    /// Working directory root
    pub fn path(&self) -> &Path {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
    }

    /// Branch the checkout publishes to
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// True when the branch did not exist remotely and was created as an orphan
    pub fn created_branch(&self) -> bool {
        self.created_branch
    }

    /// Get the underlying git2 repository
    pub fn git2_repo(&self) -> &Git2Repository {
        &self.repo
    }

    /// Stage additions, modifications and deletions for the whole tree
    pub fn stage_all(&self) -> PublishResult<()> {
        let mut index = self.repo.index().with_git_error("Failed to open index")?;

        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .with_git_error("Failed to add files to index")?;
        index
            .update_all(["*"].iter(), None)
            .with_git_error("Failed to record removed files in index")?;
        index.write().with_git_error("Failed to write index")?;

        debug!("Staged {} entries", index.len());
        Ok(())
    }

    /// Compare the staged index with the branch tip
    ///
    /// On an unborn orphan branch every staged entry counts as added.
    pub fn staged_changes(&self) -> PublishResult<ChangeSet> {
        let index = self.repo.index().with_git_error("Failed to open index")?;
        let head_tree = match self.head_commit()? {
            Some(commit) => Some(commit.tree().with_git_error("Failed to read branch tip tree")?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)
            .with_git_error("Failed to compare index with branch tip")?;

        let mut changes = ChangeSet::default();
        for delta in diff.deltas() {
            match delta.status() {
                Delta::Added | Delta::Copied => changes.added += 1,
                Delta::Deleted => changes.deleted += 1,
                Delta::Unmodified | Delta::Ignored | Delta::Untracked => {}
                _ => changes.modified += 1,
            }
        }

        debug!(
            "Staged changes: {} added, {} modified, {} deleted",
            changes.added, changes.modified, changes.deleted
        );
        Ok(changes)
    }

    /// Commit the staged tree on top of the branch tip (or as a root commit)
    pub fn commit(
        &self,
        identity: &CommitIdentity,
        message: &str,
        when: DateTime<Utc>,
    ) -> PublishResult<Oid> {
        let time = Time::new(when.timestamp(), 0);
        let signature = Signature::new(&identity.name, &identity.email, &time)
            .with_git_error("Invalid commit identity")?;

        let mut index = self.repo.index().with_git_error("Failed to open index")?;
        let tree_id = index.write_tree().with_git_error("Failed to write tree")?;
        let tree = self.repo.find_tree(tree_id).with_git_error("Failed to find tree")?;

        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .with_git_error("Failed to create commit")?;

        info!("Created commit {} on {}", oid, self.branch);
        Ok(oid)
    }

    /// Push the branch to `origin`
    ///
    /// Remote progress messages are handed to `progress`. A reference the
    /// remote refuses to update (for example a non-fast-forward) is an error.
    pub fn push(
        &self,
        credentials: &GitCredentials,
        progress: &mut dyn FnMut(&str),
    ) -> PublishResult<()> {
        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .with_git_error("Failed to find remote 'origin'")?;

        let rejections: RefCell<Vec<String>> = RefCell::new(Vec::new());

        let mut callbacks = credentials.remote_callbacks();
        callbacks.sideband_progress(|data| {
            progress(&String::from_utf8_lossy(data));
            true
        });
        callbacks.push_transfer_progress(|current, total, bytes| {
            trace!("Push progress: {}/{} objects, {} bytes", current, total, bytes);
        });
        callbacks.push_update_reference(|reference, status| {
            match status {
                Some(message) => rejections
                    .borrow_mut()
                    .push(format!("{} rejected: {}", reference, message)),
                None => debug!("Remote updated {}", reference),
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = self.branch.push_refspec();
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .with_git_error(format!("Failed to push {}", self.branch))?;
        drop(push_options);

        let rejections = rejections.into_inner();
        if !rejections.is_empty() {
            return Err(PublishError::git_error(rejections.join("; ")));
        }

        info!("Pushed {} to {}", self.branch, ORIGIN);
        Ok(())
    }

    /// Branch tip, or `None` while the branch is unborn
    fn head_commit(&self) -> PublishResult<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head
                    .peel_to_commit()
                    .with_git_error("Failed to resolve branch tip")?;
                Ok(Some(commit))
            }
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(PublishError::git_error_with_source("Failed to resolve HEAD", e)),
        }
    }
}
