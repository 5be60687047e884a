use crate::common::error::PublishError;
use crate::domain::entities::publish_config::{PublishConfig, RepositoryResolutionError};
use crate::infrastructure::filesystem::{clean_working_tree, mirror_directory};
use crate::infrastructure::git::{BranchAcquirer, ChangeSet, GitCredentials};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

/// 公開処理の各ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    /// 一時ディレクトリの作成
    CreateTempDir,
    /// クローン、または孤立ブランチの作成
    AcquireCheckout,
    /// `.git` 以外の作業ツリーの削除
    CleanWorkingTree,
    /// ソースディレクトリのコピー
    CopyDirectory,
    /// 全変更のステージ
    StageChanges,
    /// ステージ済み差分の集計
    ComputeStatus,
    /// コミットの作成
    Commit,
    /// リモートへのプッシュ
    Push,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            PublishStep::CreateTempDir => "create temporary directory",
            PublishStep::AcquireCheckout => "clone or create branch",
            PublishStep::CleanWorkingTree => "clean working tree",
            PublishStep::CopyDirectory => "copy directory",
            PublishStep::StageChanges => "stage changes",
            PublishStep::ComputeStatus => "compute status",
            PublishStep::Commit => "commit",
            PublishStep::Push => "push",
        };
        f.write_str(step)
    }
}

/// PublishDirectory関連のエラー
///
/// メッセージには失敗したステップのみを含め、原因は `source()` でたどる。
#[derive(Debug, Error)]
pub enum PublishDirectoryError {
    /// 対象リポジトリを決定できなかった
    #[error("failed to determine repository")]
    RepositoryUnresolved(#[from] RepositoryResolutionError),

    /// いずれかのステップが失敗した
    #[error("failed to {step}")]
    StepFailed {
        /// 失敗したステップ
        step: PublishStep,
        /// 原因
        #[source]
        source: PublishError,
    },
}

impl PublishDirectoryError {
    /// 失敗したステップ（リポジトリ解決の失敗は `None`）
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            PublishDirectoryError::RepositoryUnresolved(_) => None,
            PublishDirectoryError::StepFailed { step, .. } => Some(*step),
        }
    }
}

trait StepContext<T> {
    fn during(self, step: PublishStep) -> Result<T, PublishDirectoryError>;
}

impl<T, E: Into<PublishError>> StepContext<T> for Result<T, E> {
    fn during(self, step: PublishStep) -> Result<T, PublishDirectoryError> {
        self.map_err(|e| PublishDirectoryError::StepFailed {
            step,
            source: e.into(),
        })
    }
}

/// 公開処理の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// 新しいコミットを作成してプッシュした
    Published {
        /// `owner/name`
        repository: String,
        /// 公開先ブランチ
        branch: String,
        /// 作成したコミットのID
        commit: String,
        /// ブランチを新規作成したか
        created_branch: bool,
        /// ステージされた変更の件数
        changes: ChangeSet,
    },
    /// ソースとブランチの内容が同一だったため何もしなかった
    NoChanges {
        /// `owner/name`
        repository: String,
        /// 公開先ブランチ
        branch: String,
    },
}

impl PublishOutcome {
    /// 作成したコミットのID
    pub fn commit(&self) -> Option<&str> {
        match self {
            PublishOutcome::Published { commit, .. } => Some(commit),
            PublishOutcome::NoChanges { .. } => None,
        }
    }

    /// 新しいコミットをプッシュしたか
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// ディレクトリをブランチの唯一の内容として公開するユースケース
///
/// 1回の実行で以下を順に行う:
///
/// 1. 対象リポジトリを解決（明示指定、なければ `GITHUB_REPOSITORY`）
/// 2. 一時ディレクトリにブランチをクローン（存在しなければ孤立ブランチを作成）
/// 3. `.git` 以外の作業ツリーを削除し、ソースディレクトリをコピー
/// 4. 全変更をステージし、差分がなければコミットせずに終了
/// 5. コミットしてプッシュ
///
/// 一時ディレクトリはどの経路で終了しても削除される。
#[derive(Debug)]
pub struct PublishDirectoryUseCase {
    config: PublishConfig,
    acquirer: BranchAcquirer,
    progress: bool,
}

impl PublishDirectoryUseCase {
    /// 新しいユースケースインスタンスを作成
    pub fn new(config: PublishConfig) -> Self {
        Self {
            config,
            acquirer: BranchAcquirer::default(),
            progress: true,
        }
    }

    /// ブランチ取得の方法を差し替える
    pub fn with_acquirer(mut self, acquirer: BranchAcquirer) -> Self {
        self.acquirer = acquirer;
        self
    }

    /// 進捗メッセージを標準出力に表示するか
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// 実行する設定
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// 公開処理を実行
    pub fn execute(&self) -> Result<PublishOutcome, PublishDirectoryError> {
        let config = &self.config;

        // Fails before anything touches the network or the filesystem
        let slug = config.repository.resolve()?;
        let repository = slug.to_string();
        let branch = config.branch.clone();
        info!("Publishing {} to {}:{}", config.folder.display(), repository, branch);

        let temp_dir = tempfile::Builder::new()
            .prefix("publish-directory-")
            .tempdir()
            .during(PublishStep::CreateTempDir)?;
        let checkout_path = temp_dir.path().join("checkout");
        debug!("Working checkout at {}", checkout_path.display());

        let remote_url = slug.remote_url(&config.server_url);
        let credentials = GitCredentials::for_token(config.token.clone());

        let checkout = self
            .acquirer
            .acquire(remote_url.as_str(), &branch, &checkout_path, &credentials)
            .during(PublishStep::AcquireCheckout)?;
        if checkout.created_branch() {
            self.say(&format!(
                "Branch '{}' doesn't exist, creating new orphan branch",
                branch
            ));
        }

        let removed = clean_working_tree(checkout.path()).during(PublishStep::CleanWorkingTree)?;
        debug!("Removed {} entries from the working tree", removed);

        let summary =
            mirror_directory(&config.folder, checkout.path()).during(PublishStep::CopyDirectory)?;
        info!(
            "Copied {} files in {} directories ({} bytes)",
            summary.files, summary.directories, summary.bytes
        );

        checkout.stage_all().during(PublishStep::StageChanges)?;

        let changes = checkout.staged_changes().during(PublishStep::ComputeStatus)?;
        if changes.is_empty() {
            self.say("No changes to commit");
            return Ok(PublishOutcome::NoChanges { repository, branch: branch.to_string() });
        }

        let oid = checkout
            .commit(&config.identity, &config.message, Utc::now())
            .during(PublishStep::Commit)?;
        self.say(&format!("Created commit: {}", oid));

        let progress = self.progress;
        checkout
            .push(&credentials, &mut |message: &str| {
                if progress {
                    print!("{}", message);
                    let _ = std::io::stdout().flush();
                }
            })
            .during(PublishStep::Push)?;

        Ok(PublishOutcome::Published {
            repository,
            branch: branch.to_string(),
            commit: oid.to_string(),
            created_branch: checkout.created_branch(),
            changes,
        })
    }

    fn say(&self, message: &str) {
        if self.progress {
            println!("{}", message);
        }
    }
}
