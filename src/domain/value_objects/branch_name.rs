use std::fmt;
use thiserror::Error;

/// BranchName関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum BranchNameError {
    /// 空文字列
    #[error("Branch name cannot be empty")]
    Empty,

    /// 255バイトを超える
    #[error("Branch name too long: {0} characters (max: 255)")]
    TooLong(usize),

    /// 空白・制御文字・git が禁止する記号を含む
    #[error("Invalid character in branch name: {0}")]
    InvalidCharacter(String),

    /// `-` で始まる
    #[error("Branch name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    /// `.lock` で終わる
    #[error("Branch name cannot end with '.lock': {0}")]
    EndsWithLock(String),

    /// `..` を含む
    #[error("Branch name contains consecutive dots: {0}")]
    ConsecutiveDots(String),

    /// 空のパス要素を含む（`a//b`、先頭・末尾の `/`）
    #[error("Branch name has an empty path component: {0}")]
    EmptyComponent(String),

    /// `HEAD` などの予約名
    #[error("Reserved branch name: {0}")]
    Reserved(String),

    /// libgit2 が参照名として受け付けない
    #[error("Not a valid git reference name: {0}")]
    InvalidReference(String),
}

/// 公開先ブランチ名の値オブジェクト
///
/// `release/demo` のようなスラッシュ区切りの名前も許可する。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName {
    /// 検証済みブランチ名
    name: String,
}

impl BranchName {
    /// 新しいBranchNameインスタンスを作成
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        Self::validate(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// ブランチ名の妥当性を検証
    fn validate(name: &str) -> Result<(), BranchNameError> {
        if name.is_empty() {
            return Err(BranchNameError::Empty);
        }

        if name.len() > 255 {
            return Err(BranchNameError::TooLong(name.len()));
        }

        if name.starts_with('-') {
            return Err(BranchNameError::StartsWithHyphen(name.to_string()));
        }

        if name.ends_with(".lock") {
            return Err(BranchNameError::EndsWithLock(name.to_string()));
        }

        if matches!(name, "HEAD" | "ORIG_HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
            return Err(BranchNameError::Reserved(name.to_string()));
        }

        // ASCII制御文字、スペース、~、^、:、?、*、[、\、DEL
        for ch in name.chars() {
            if ch.is_ascii_control()
                || ch == ' '
                || ch == '~'
                || ch == '^'
                || ch == ':'
                || ch == '?'
                || ch == '*'
                || ch == '['
                || ch == '\\'
                || ch == '\x7F'
            {
                return Err(BranchNameError::InvalidCharacter(ch.to_string()));
            }
        }

        if name.contains("..") {
            return Err(BranchNameError::ConsecutiveDots(name.to_string()));
        }

        // "a//b"、"/a"、"a/" は空のコンポーネントを含む
        if name.split('/').any(str::is_empty) {
            return Err(BranchNameError::EmptyComponent(name.to_string()));
        }

        // 残りのルール（"@{"、末尾の"."など）はlibgit2に任せる
        if !git2::Reference::is_valid_name(&format!("refs/heads/{}", name)) {
            return Err(BranchNameError::InvalidReference(name.to_string()));
        }

        Ok(())
    }

    /// ブランチ名を文字列として取得
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// 完全なリファレンス名（`refs/heads/<name>`）
    pub fn reference_name(&self) -> String {
        format!("refs/heads/{}", self.name)
    }

    /// 同名のリモートブランチへpushするためのrefspec
    pub fn push_refspec(&self) -> String {
        let reference = self.reference_name();
        format!("{}:{}", reference, reference)
    }

    /// 単一ブランチのみをfetchするためのrefspec
    pub fn fetch_refspec(&self, remote_name: &str) -> String {
        format!(
            "+refs/heads/{name}:refs/remotes/{remote}/{name}",
            name = self.name,
            remote = remote_name
        )
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = BranchNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        BranchName::new(name)
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        BranchName::new(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_branch_names() {
        let valid_names = [
            "main",
            "gh-pages",
            "release/demo",
            "release/1.0.0",
            "docs/site/v2",
            "branch_name",
            "branch.name",
            "123",
        ];

        for name in valid_names {
            assert!(BranchName::new(name).is_ok(), "Failed for: {}", name);
        }
    }

    #[test]
    fn test_invalid_branch_names() {
        let invalid_cases = [
            ("", BranchNameError::Empty),
            ("-branch", BranchNameError::StartsWithHyphen("-branch".to_string())),
            ("branch.lock", BranchNameError::EndsWithLock("branch.lock".to_string())),
            ("branch..name", BranchNameError::ConsecutiveDots("branch..name".to_string())),
            ("HEAD", BranchNameError::Reserved("HEAD".to_string())),
            ("branch name", BranchNameError::InvalidCharacter(" ".to_string())),
            ("branch:name", BranchNameError::InvalidCharacter(":".to_string())),
            ("release//demo", BranchNameError::EmptyComponent("release//demo".to_string())),
            ("release/", BranchNameError::EmptyComponent("release/".to_string())),
        ];

        for (name, expected_error) in invalid_cases {
            let result = BranchName::new(name);
            assert_eq!(result.unwrap_err(), expected_error, "Failed for: {}", name);
        }
    }

    #[test]
    fn test_libgit2_rules_applied() {
        assert!(matches!(
            BranchName::new("weird@{branch"),
            Err(BranchNameError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_refspecs() {
        let branch = BranchName::new("release/demo").unwrap();
        assert_eq!(branch.reference_name(), "refs/heads/release/demo");
        assert_eq!(
            branch.push_refspec(),
            "refs/heads/release/demo:refs/heads/release/demo"
        );
        assert_eq!(
            branch.fetch_refspec("origin"),
            "+refs/heads/release/demo:refs/remotes/origin/release/demo"
        );
    }

    #[test]
    fn test_branch_name_too_long() {
        let long_name = "a".repeat(256);
        let result = BranchName::new(&long_name);
        assert!(matches!(result, Err(BranchNameError::TooLong(256))));
    }
}
