use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

use crate::application::use_cases::publish_directory::{PublishDirectoryUseCase, PublishOutcome};
use crate::domain::entities::publish_config::{
    PublishConfig, PublishSettings, DEFAULT_COMMIT_EMAIL, DEFAULT_COMMIT_MESSAGE,
    DEFAULT_COMMIT_USERNAME, DEFAULT_SERVER_URL,
};

/// Output format of the final result
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ", ",
    env!("BUILD_TARGET"),
    ")"
);

/// publish-directory - Publish a directory as the sole content of a git branch
///
/// Every option can also be given through the environment variable shown in
/// its help; empty variables count as unset.
#[derive(Parser, Debug)]
#[command(name = "publish-directory")]
#[command(about = "Publish a directory as the sole content of a git branch")]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Target repository as owner/name (defaults to GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_REPOSITORY")]
    pub repository: Option<String>,

    /// Branch that receives the directory contents
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Directory to publish
    #[arg(long, env = "INPUT_FOLDER")]
    pub folder: Option<PathBuf>,

    /// Commit author and committer name
    #[arg(long, env = "INPUT_COMMIT_USERNAME", default_value = DEFAULT_COMMIT_USERNAME)]
    pub commit_username: String,

    /// Commit author and committer email
    #[arg(long, env = "INPUT_COMMIT_EMAIL", default_value = DEFAULT_COMMIT_EMAIL)]
    pub commit_email: String,

    /// Commit message
    #[arg(long, env = "INPUT_COMMIT_MESSAGE", default_value = DEFAULT_COMMIT_MESSAGE)]
    pub commit_message: String,

    /// Access token used for clone and push
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository running the workflow, used when --repository is not set
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub github_repository: Option<String>,

    /// Server hosting the repository
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Raw settings for [`PublishConfig::from_settings`]
    pub fn settings(&self) -> PublishSettings {
        PublishSettings {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            folder: self.folder.clone(),
            commit_username: Some(self.commit_username.clone()),
            commit_email: Some(self.commit_email.clone()),
            commit_message: Some(self.commit_message.clone()),
            token: self.token.clone(),
            current_repository: self.github_repository.clone(),
            server_url: Some(self.server_url.clone()),
        }
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    /// Parse the command line and environment, exiting with status 1 on errors
    pub fn new() -> Self {
        match Cli::try_parse() {
            Ok(cli) => Self { cli },
            Err(e) => {
                use clap::error::ErrorKind;
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    e.exit();
                }
                eprintln!("Failed to load configuration: {}", e);
                exit(1);
            }
        }
    }

    /// Runner for already parsed arguments
    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    /// Publish once and print the outcome
    ///
    /// Configuration and publish failures print the whole cause chain to
    /// stderr and exit with status 1.
    pub fn run(self) -> anyhow::Result<()> {
        // Set up colored output
        if self.cli.no_color {
            colored::control::set_override(false);
        }

        self.init_logging();

        let config = match PublishConfig::from_settings(self.cli.settings()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {:#}", anyhow::Error::new(e));
                exit(1);
            }
        };

        match self.publish(config) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Alternate form prints the whole cause chain
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    fn publish(&self, config: PublishConfig) -> anyhow::Result<()> {
        let use_case =
            PublishDirectoryUseCase::new(config).with_progress(self.cli.output == OutputFormat::Text);
        let outcome = use_case.execute()?;

        match self.cli.output {
            OutputFormat::Text => self.print_outcome(&outcome),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        }

        Ok(())
    }

    fn print_outcome(&self, outcome: &PublishOutcome) {
        if let PublishOutcome::Published { changes, .. } = outcome {
            if self.cli.verbose {
                println!(
                    "  {} added, {} modified, {} deleted",
                    changes.added.to_string().green(),
                    changes.modified.to_string().yellow(),
                    changes.deleted.to_string().red()
                );
            }
        }
        println!("{}", "Successfully published directory to branch".green());
    }

    /// Logs go to stderr so stdout carries only progress lines
    fn init_logging(&self) {
        let default_level = if self.cli.verbose { "debug" } else { "warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(!self.cli.no_color)
            .try_init();
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
