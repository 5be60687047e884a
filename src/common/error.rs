use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error for validation, filesystem and git failures
///
/// The underlying libgit2 or I/O error is kept as the [`std::error::Error::source`]
/// so callers can print the whole chain.
#[derive(Error, Debug)]
pub enum PublishError {
    /// A libgit2 call failed or the remote rejected an update
    #[error("Git operation failed: {message}")]
    GitError {
        /// What was being attempted
        message: String,
        /// libgit2 error, when there is one
        #[source]
        source: Option<git2::Error>,
    },

    /// Reading, writing or removing a path failed
    #[error("File system operation failed: {message}{}", display_path(.path))]
    FileSystemError {
        /// What was being attempted
        message: String,
        /// Path the operation was working on
        path: Option<PathBuf>,
        /// I/O error, when there is one
        #[source]
        source: Option<std::io::Error>,
    },

    /// A configuration value was rejected
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Name of the offending setting
        field: String,
        /// Why it was rejected
        message: String,
        /// The rejected value, if it is safe to show
        value: Option<String>,
    },

    /// Broken internal assumption
    #[error("Internal error: {message}")]
    InternalError {
        /// Description of the assumption
        message: String,
    },
}

impl PublishError {
    /// Git error without an underlying libgit2 error
    pub fn git_error(message: impl Into<String>) -> Self {
        Self::GitError {
            message: message.into(),
            source: None,
        }
    }

    /// Git error wrapping a libgit2 error
    pub fn git_error_with_source(message: impl Into<String>, source: git2::Error) -> Self {
        Self::GitError {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Filesystem error without an underlying I/O error
    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Filesystem error wrapping an I/O error
    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    /// Rejected configuration value
    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    /// Broken internal assumption
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl From<git2::Error> for PublishError {
    fn from(error: git2::Error) -> Self {
        Self::git_error_with_source("Git operation failed", error)
    }
}

impl From<std::io::Error> for PublishError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_error_creation() {
        let error = PublishError::git_error("test message");
        assert!(matches!(error, PublishError::GitError { .. }));
        assert_eq!(error.to_string(), "Git operation failed: test message");
    }

    #[test]
    fn test_filesystem_error_with_path() {
        let path = PathBuf::from("/test/path");
        let error = PublishError::filesystem_error("test message", Some(path.clone()));
        if let PublishError::FileSystemError { path: Some(p), .. } = error {
            assert_eq!(p, path);
        } else {
            panic!("Expected FileSystemError with path");
        }
    }

    #[test]
    fn test_validation_error() {
        let error = PublishError::validation_error("branch", "must not be empty", None);
        assert_eq!(error.to_string(), "Validation error: branch - must not be empty");
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: PublishError = io_error.into();
        assert!(matches!(error, PublishError::FileSystemError { .. }));
    }

    #[test]
    fn test_filesystem_error_shows_path_and_keeps_cause() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = PublishError::filesystem_error_with_source(
            "Failed to copy file",
            Some(PathBuf::from("public/a.txt")),
            io_error,
        );

        assert_eq!(
            error.to_string(),
            "File system operation failed: Failed to copy file (public/a.txt)"
        );
        let cause = std::error::Error::source(&error).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("denied"));
    }

    #[test]
    fn test_git_error_keeps_cause() {
        let error: PublishError = git2::Error::from_str("boom").into();
        let cause = std::error::Error::source(&error).map(|e| e.to_string());
        assert!(cause.unwrap().contains("boom"));
        assert!(std::error::Error::source(&PublishError::git_error("no source")).is_none());
    }
}
