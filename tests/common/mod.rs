//! Common test utilities and helpers
//!
//! A [`PublishFixture`] owns a temporary root holding a bare "remote"
//! repository at `<root>/octo/site.git` and a source directory at
//! `<root>/public`. The server URL of every configuration points at the root
//! through a `file://` URL, so `octo/site` resolves to the bare repository.

#![allow(dead_code)]

use git2::{ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use publish_directory::application::use_cases::publish_directory::PublishDirectoryUseCase;
use publish_directory::domain::entities::publish_config::{PublishConfig, RepositorySource};
use publish_directory::domain::value_objects::branch_name::BranchName;
use publish_directory::infrastructure::git::{AcquireOptions, BranchAcquirer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;

pub const SLUG: &str = "octo/site";

/// Test fixture for one remote repository and one source directory
pub struct PublishFixture {
    root: TempDir,
    remote: PathBuf,
    source: PathBuf,
}

impl PublishFixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let remote = root.path().join("octo").join("site.git");
        Repository::init_bare(&remote).expect("Failed to init bare remote");
        let source = root.path().join("public");
        fs::create_dir_all(&source).expect("Failed to create source dir");

        Self {
            root,
            remote,
            source,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Write a file below the source directory, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().expect("relative path has a parent"))
            .expect("Failed to create parent dir");
        fs::write(&path, content).expect("Failed to write source file");
        path
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.source.join(relative)).expect("Failed to remove source file");
    }

    pub fn server_url(&self) -> Url {
        Url::from_directory_path(self.root.path()).expect("temp dir path is absolute")
    }

    /// Configuration targeting `octo/site` explicitly
    pub fn config(&self, branch: &str) -> PublishConfig {
        self.config_with_source(branch, RepositorySource::new(Some(SLUG.to_string()), None))
    }

    pub fn config_with_source(&self, branch: &str, repository: RepositorySource) -> PublishConfig {
        PublishConfig::new(
            repository,
            BranchName::new(branch).expect("valid branch name"),
            &self.source,
        )
        .with_server_url(self.server_url())
    }

    /// Use case with a full-depth acquirer; the local transport cannot serve shallow fetches
    pub fn use_case(&self, config: PublishConfig) -> PublishDirectoryUseCase {
        PublishDirectoryUseCase::new(config)
            .with_acquirer(BranchAcquirer::new(AcquireOptions { depth: None }))
            .with_progress(false)
    }

    pub fn remote_repo(&self) -> Repository {
        Repository::open_bare(&self.remote).expect("Failed to open bare remote")
    }

    pub fn branch_tip(&self, branch: &str) -> Option<Oid> {
        self.remote_repo()
            .find_reference(&format!("refs/heads/{}", branch))
            .ok()
            .and_then(|reference| reference.target())
    }

    /// Every blob on the branch tip as `path -> content`
    pub fn branch_files(&self, branch: &str) -> BTreeMap<String, String> {
        self.branch_entries(branch)
            .into_iter()
            .map(|(path, (content, _))| (path, content))
            .collect()
    }

    /// File mode of one path on the branch tip
    pub fn branch_file_mode(&self, branch: &str, path: &str) -> Option<i32> {
        self.branch_entries(branch).get(path).map(|(_, mode)| *mode)
    }

    /// Number of commits reachable from the branch tip
    pub fn commit_count(&self, branch: &str) -> usize {
        let repo = self.remote_repo();
        let Some(tip) = self.branch_tip(branch) else {
            return 0;
        };
        let mut walk = repo.revwalk().expect("Failed to create revwalk");
        walk.push(tip).expect("Failed to push tip");
        walk.count()
    }

    fn branch_entries(&self, branch: &str) -> BTreeMap<String, (String, i32)> {
        let repo = self.remote_repo();
        let tip = self.branch_tip(branch).expect("branch exists on remote");
        let tree = repo
            .find_commit(tip)
            .and_then(|commit| commit.tree())
            .expect("Failed to read tip tree");

        let mut entries = BTreeMap::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let blob = repo.find_blob(entry.id()).expect("Failed to read blob");
                let name = format!("{}{}", root, entry.name().unwrap_or_default());
                let content = String::from_utf8_lossy(blob.content()).into_owned();
                entries.insert(name, (content, entry.filemode()));
            }
            TreeWalkResult::Ok
        })
        .expect("Failed to walk tree");
        entries
    }
}

/// `BTreeMap` literal helper for expected trees
pub fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
}
