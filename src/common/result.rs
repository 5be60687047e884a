use crate::common::error::PublishError;

/// クレート全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use publish_directory::common::result::PublishResult;
/// use publish_directory::common::error::PublishError;
///
/// fn example_function() -> PublishResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> PublishResult<()> {
///     Err(PublishError::internal_error("Something went wrong"))
/// }
/// ```
pub type PublishResult<T> = Result<T, PublishError>;

/// Optionのエラー変換ヘルパー
pub trait OptionExt<T> {
    /// Option値をValidationErrorに変換する
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_directory::common::result::{PublishResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: PublishResult<String> = none_value.ok_or_validation_error("branch", "required");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> PublishResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> PublishResult<T> {
        self.ok_or_else(|| PublishError::validation_error(field, message, None))
    }
}

/// Resultのエラー変換ヘルパー
pub trait ResultExt<T, E> {
    /// git2のエラーにメッセージを付けてPublishResultに変換
    fn with_git_error(self, message: impl Into<String>) -> PublishResult<T>
    where
        E: Into<git2::Error>;

    /// ファイルシステムエラーとしてPublishResultに変換
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_directory::common::result::{PublishResult, ResultExt};
    /// use std::path::PathBuf;
    ///
    /// let result: Result<(), std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let mapped: PublishResult<()> =
    ///     result.with_filesystem_error("Failed to read", Some(PathBuf::from("a.txt")));
    /// assert!(mapped.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> PublishResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_git_error(self, message: impl Into<String>) -> PublishResult<T>
    where
        E: Into<git2::Error>,
    {
        self.map_err(|e| PublishError::git_error_with_source(message, e.into()))
    }

    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> PublishResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| PublishError::filesystem_error_with_source(message, path, e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_option_ext_ok_or_validation_error() {
        let none_value: Option<String> = None;
        let result = none_value.ok_or_validation_error("field", "required");

        if let Err(PublishError::ValidationError { field, message, .. }) = result {
            assert_eq!(field, "field");
            assert_eq!(message, "required");
        } else {
            panic!("Expected ValidationError");
        }

        let some_value = Some(3);
        assert_eq!(some_value.ok_or_validation_error("field", "required").unwrap(), 3);
    }

    #[test]
    fn test_result_ext_with_filesystem_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let result: Result<String, std::io::Error> = Err(io_error);
        let path = Some(PathBuf::from("/test/path"));

        match result.with_filesystem_error("test operation", path.clone()) {
            Err(PublishError::FileSystemError {
                message,
                path: p,
                source: Some(_),
            }) => {
                assert_eq!(message, "test operation");
                assert_eq!(p, path);
            }
            other => panic!("Expected FileSystemError, got {:?}", other),
        }
    }

    #[test]
    fn test_result_ext_with_git_error() {
        let result: Result<(), git2::Error> = Err(git2::Error::from_str("bad ref"));
        let mapped = result.with_git_error("failed to resolve HEAD");

        let error = mapped.unwrap_err();
        assert_eq!(error.to_string(), "Git operation failed: failed to resolve HEAD");
        let source = std::error::Error::source(&error).map(|e| e.to_string());
        assert!(source.unwrap().contains("bad ref"));
    }
}
