//! Immutable publish configuration.
//!
//! Raw values come from the command line or the environment as
//! [`PublishSettings`]; [`PublishConfig::from_settings`] validates them once at
//! process start. Nothing below this layer reads the environment.

use crate::common::error::PublishError;
use crate::common::result::{OptionExt, PublishResult};
use crate::domain::value_objects::{
    branch_name::BranchName,
    repository_slug::{RepositorySlug, RepositorySlugError},
};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Commit author used when none is configured
pub const DEFAULT_COMMIT_USERNAME: &str = "github-actions[bot]";

/// Commit email used when none is configured
pub const DEFAULT_COMMIT_EMAIL: &str = "github-actions[bot]@users.noreply.github.com";

/// Commit message used when none is configured
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: update branch from directory";

/// Server hosting the target repository when none is configured
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Username paired with the token for HTTPS basic authentication
pub const TOKEN_USERNAME: &str = "x-access-token";

/// Raw, unvalidated settings as read by the presentation layer
#[derive(Debug, Clone, Default)]
pub struct PublishSettings {
    /// Target repository as `owner/name`
    pub repository: Option<String>,
    /// Branch to replace
    pub branch: Option<String>,
    /// Directory whose contents are published
    pub folder: Option<PathBuf>,
    /// Author and committer name
    pub commit_username: Option<String>,
    /// Author and committer email
    pub commit_email: Option<String>,
    /// Commit message
    pub commit_message: Option<String>,
    /// Access token for clone and push
    pub token: Option<String>,
    /// Repository running the workflow, the fallback for `repository`
    pub current_repository: Option<String>,
    /// Base URL of the hosting server
    pub server_url: Option<String>,
}

/// Token used for both clone and push. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for handing to libgit2
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Author and committer of the published commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl CommitIdentity {
    /// Identity from a name and an email
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_USERNAME, DEFAULT_COMMIT_EMAIL)
    }
}

/// Why no target repository could be determined
#[derive(Debug, Error, PartialEq)]
pub enum RepositoryResolutionError {
    /// Neither source carries a value
    #[error("no repository configured and GITHUB_REPOSITORY is not set")]
    Unavailable,

    /// The chosen value is not an `owner/name` slug
    #[error(transparent)]
    InvalidSlug(#[from] RepositorySlugError),
}

/// Where the target repository identifier comes from
///
/// The ambient value is captured when the configuration is built, so
/// resolution never touches the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySource {
    /// Identifier given for this run
    pub explicit: Option<String>,
    /// Repository the workflow runs in
    pub ambient: Option<String>,
}

impl RepositorySource {
    /// Empty values count as unset
    pub fn new(explicit: Option<String>, ambient: Option<String>) -> Self {
        Self {
            explicit: non_empty(explicit),
            ambient: non_empty(ambient),
        }
    }

    /// The explicit identifier if set, the ambient one otherwise
    pub fn resolve(&self) -> Result<RepositorySlug, RepositoryResolutionError> {
        let raw = self
            .explicit
            .as_deref()
            .or(self.ambient.as_deref())
            .ok_or(RepositoryResolutionError::Unavailable)?;
        Ok(RepositorySlug::new(raw)?)
    }
}

/// Validated configuration for one publish run
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Where the target repository comes from
    pub repository: RepositorySource,
    /// Branch whose content is replaced
    pub branch: BranchName,
    /// Source directory
    pub folder: PathBuf,
    /// Author and committer of the commit
    pub identity: CommitIdentity,
    /// Commit message
    pub message: String,
    /// Token for clone and push, anonymous access when absent
    pub token: Option<AccessToken>,
    /// Base URL the remote URL is built on
    pub server_url: Url,
}

impl PublishConfig {
    /// Create a configuration with default identity, message and server
    pub fn new(repository: RepositorySource, branch: BranchName, folder: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            branch,
            folder: folder.into(),
            identity: CommitIdentity::default(),
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            token: None,
            server_url: default_server_url(),
        }
    }

    /// Set the commit author and committer
    pub fn with_identity(mut self, identity: CommitIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Set the commit message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Authenticate with a token
    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Point at another server
    pub fn with_server_url(mut self, server_url: Url) -> Self {
        self.server_url = server_url;
        self
    }

    /// Apply defaults and validate raw settings
    pub fn from_settings(settings: PublishSettings) -> PublishResult<Self> {
        let branch_raw = non_empty(settings.branch)
            .ok_or_validation_error("branch", "a target branch is required (INPUT_BRANCH)")?;
        let branch = BranchName::new(&branch_raw).map_err(|e| {
            PublishError::validation_error("branch", e.to_string(), Some(branch_raw.clone()))
        })?;

        let folder = settings
            .folder
            .filter(|f| !f.as_os_str().is_empty())
            .ok_or_validation_error("folder", "a source folder is required (INPUT_FOLDER)")?;
        validate_folder(&folder)?;

        let identity = CommitIdentity::new(
            non_empty(settings.commit_username).unwrap_or_else(|| DEFAULT_COMMIT_USERNAME.to_string()),
            non_empty(settings.commit_email).unwrap_or_else(|| DEFAULT_COMMIT_EMAIL.to_string()),
        );
        let message = non_empty(settings.commit_message)
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

        let server_url = match non_empty(settings.server_url) {
            Some(raw) => parse_server_url(&raw)?,
            None => default_server_url(),
        };

        let mut config = Self::new(
            RepositorySource::new(settings.repository, settings.current_repository),
            branch,
            folder,
        )
        .with_identity(identity)
        .with_message(message)
        .with_server_url(server_url);

        if let Some(token) = non_empty(settings.token) {
            config = config.with_token(AccessToken::new(token));
        }

        Ok(config)
    }
}

fn default_server_url() -> Url {
    Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid")
}

fn parse_server_url(raw: &str) -> PublishResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        PublishError::validation_error("server_url", e.to_string(), Some(raw.to_string()))
    })?;
    let valid = match url.scheme() {
        "https" | "http" => url.host_str().is_some(),
        // Repositories laid out as <root>/<owner>/<name>.git on local disk
        "file" => url.to_file_path().is_ok(),
        _ => false,
    };
    if !valid {
        return Err(PublishError::validation_error(
            "server_url",
            "must be an http(s) URL with a host or a file URL",
            Some(raw.to_string()),
        ));
    }
    Ok(url)
}

/// The source folder must exist and be a readable directory
fn validate_folder(folder: &Path) -> PublishResult<()> {
    let metadata = std::fs::metadata(folder).map_err(|_| {
        PublishError::validation_error(
            "folder",
            format!("folder '{}' does not exist", folder.display()),
            None,
        )
    })?;

    if !metadata.is_dir() {
        return Err(PublishError::validation_error(
            "folder",
            format!("'{}' is not a directory", folder.display()),
            None,
        ));
    }

    std::fs::read_dir(folder).map_err(|e| {
        PublishError::validation_error(
            "folder",
            format!("folder '{}' is not readable: {}", folder.display(), e),
            None,
        )
    })?;

    Ok(())
}

/// CI runners export unset inputs as empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
