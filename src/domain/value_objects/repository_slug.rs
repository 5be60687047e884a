use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// RepositorySlug関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum RepositorySlugError {
    /// 空文字列
    #[error("Repository identifier cannot be empty")]
    Empty,

    /// `owner/name` の形になっていない
    #[error("Repository identifier must have the form 'owner/name': {0}")]
    InvalidFormat(String),

    /// `.` や `..` などの予約されたパス要素
    #[error("Reserved path component in repository identifier: {0}")]
    Reserved(String),
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<owner>[A-Za-z0-9][A-Za-z0-9_.-]*)/(?P<name>[A-Za-z0-9_.-]+)$")
            .expect("repository slug pattern is valid")
    })
}

/// `owner/name` 形式のリポジトリ識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    owner: String,
    name: String,
}

impl RepositorySlug {
    /// 新しいRepositorySlugインスタンスを作成
    ///
    /// 末尾の `.git` は取り除かれる。
    pub fn new(slug: &str) -> Result<Self, RepositorySlugError> {
        let trimmed = slug.trim();
        if trimmed.is_empty() {
            return Err(RepositorySlugError::Empty);
        }

        let without_suffix = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let captures = slug_pattern()
            .captures(without_suffix)
            .ok_or_else(|| RepositorySlugError::InvalidFormat(trimmed.to_string()))?;

        let owner = captures["owner"].to_string();
        let name = captures["name"].to_string();

        if matches!(name.as_str(), "." | "..") {
            return Err(RepositorySlugError::Reserved(trimmed.to_string()));
        }

        Ok(Self { owner, name })
    }

    /// オーナー（ユーザーまたは組織）名
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// リポジトリ名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `https://<host>/<owner>/<name>.git` 形式のリモートURLを生成
    pub fn remote_url(&self, server_url: &Url) -> Url {
        let mut remote = server_url.clone();
        let prefix = remote.path().trim_end_matches('/').to_string();
        remote.set_path(&format!("{}/{}/{}.git", prefix, self.owner, self.name));
        remote.set_query(None);
        remote.set_fragment(None);
        remote
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<&str> for RepositorySlug {
    type Error = RepositorySlugError;

    fn try_from(slug: &str) -> Result<Self, Self::Error> {
        RepositorySlug::new(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        let slug = RepositorySlug::new("kontrolplane/publish-directory").unwrap();
        assert_eq!(slug.owner(), "kontrolplane");
        assert_eq!(slug.name(), "publish-directory");
        assert_eq!(slug.to_string(), "kontrolplane/publish-directory");

        let with_suffix = RepositorySlug::new("octo/repo.git").unwrap();
        assert_eq!(with_suffix.name(), "repo");

        let dotted = RepositorySlug::new(" octo/my.site ").unwrap();
        assert_eq!(dotted.name(), "my.site");
    }

    #[test]
    fn test_invalid_slugs() {
        assert_eq!(RepositorySlug::new("  "), Err(RepositorySlugError::Empty));
        assert!(matches!(
            RepositorySlug::new("no-slash"),
            Err(RepositorySlugError::InvalidFormat(_))
        ));
        assert!(matches!(
            RepositorySlug::new("a/b/c"),
            Err(RepositorySlugError::InvalidFormat(_))
        ));
        assert!(matches!(
            RepositorySlug::new("https://github.com/a/b"),
            Err(RepositorySlugError::InvalidFormat(_))
        ));
        assert!(matches!(
            RepositorySlug::new("owner/.."),
            Err(RepositorySlugError::Reserved(_))
        ));
    }

    #[test]
    fn test_remote_url_on_github() {
        let slug = RepositorySlug::new("octo/repo").unwrap();
        let server = Url::parse("https://github.com").unwrap();
        assert_eq!(
            slug.remote_url(&server).as_str(),
            "https://github.com/octo/repo.git"
        );
    }

    #[test]
    fn test_remote_url_keeps_server_prefix() {
        let slug = RepositorySlug::new("octo/repo").unwrap();
        let server = Url::parse("https://git.example.com/ghe").unwrap();
        assert_eq!(
            slug.remote_url(&server).as_str(),
            "https://git.example.com/ghe/octo/repo.git"
        );
    }
}
