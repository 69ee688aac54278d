// drupal-issue: command line helper for working on drupal.org issues.
// Parses arguments, sets up logging, and dispatches to the commands.

mod cache;
mod commands;
mod config;
mod drupal;
mod error;
mod extension;
mod process;
mod prompt;
#[cfg(all(test, unix))]
mod test_support;
mod testing;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::CacheStore;
use crate::commands::Context;
use crate::commands::test::TestOptions;
use crate::config::{Config, DEFAULT_API_BASE};
use crate::drupal::DrupalClient;
use crate::error::Result;
use crate::prompt::Console;

#[derive(Debug, Parser)]
#[command(name = "drupal-issue", version, about)]
struct Cli {
    /// Root of the local Drupal checkout (defaults to the current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory for cached API responses and patches.
    #[arg(long, global = true, env = "DRUPAL_ISSUE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Base URL of the drupal.org REST API.
    #[arg(long, global = true, env = "DRUPAL_ISSUE_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Shows an issue's details and patches.
    Issue {
        /// A drupal.org issue number, found at the end of an issue's URL.
        issue_number: Option<String>,
    },
    /// Downloads and applies a patch given an issue number.
    #[command(visible_alias = "apply-patch")]
    Patch {
        /// A drupal.org issue number, found at the end of an issue's URL.
        issue_number: Option<String>,
    },
    /// Creates a new patch for a given issue.
    CreatePatch {
        /// A drupal.org issue number, found at the end of an issue's URL.
        issue_number: Option<String>,
    },
    /// Reviews changes in the context of a given project.
    Review {
        /// A project name.
        project: Option<String>,
    },
    /// Tests changes in the context of a given project.
    #[command(visible_alias = "run-test")]
    Test {
        /// A project name.
        project: Option<String>,
        /// The URL of your Drupal site.
        #[arg(long, env = "SIMPLETEST_BASE_URL")]
        url: Option<String>,
        /// A filter to pass to PHPUnit.
        #[arg(long)]
        filter: Option<String>,
    },
}

fn init_tracing(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = Config::new(root, cli.cache_dir, cli.api_base)?;
    let client = DrupalClient::new(CacheStore::new(&config.cache_dir), &config.api_base)?;
    let mut ctx = Context::new(config, client, Console::stdio());

    match cli.command {
        Commands::Issue { issue_number } => commands::issue::run(&mut ctx, issue_number).await,
        Commands::Patch { issue_number } => commands::patch::run(&mut ctx, issue_number).await,
        Commands::CreatePatch { issue_number } => {
            commands::create_patch::run(&mut ctx, issue_number).await
        }
        Commands::Review { project } => commands::review::run(&mut ctx, project).await,
        Commands::Test {
            project,
            url,
            filter,
        } => {
            commands::test::run(
                &mut ctx,
                TestOptions {
                    project,
                    url,
                    filter,
                },
            )
            .await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] {}", err);
            ExitCode::FAILURE
        }
    }
}
