// Test runner dispatch.
// Launches the right tool for a classified test with an explicit environment.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::config::TestEnv;
use crate::error::{IssueError, Result};
use crate::process;

use super::kind::TestKind;

/// Port chromedriver listens on for functional JavaScript tests.
pub const CHROMEDRIVER_PORT: u16 = 4444;

/// Arguments for the PhantomJS driver used by older functional JavaScript tests.
const PHANTOMJS_ARGS: &[&str] = &[
    "--ssl-protocol=any",
    "--ignore-ssl-errors=true",
    "vendor/jcalderonzumba/gastonjs/src/Client/main.js",
    "8510",
    "1024",
    "768",
];

/// Runs tests from the root of a Drupal checkout.
#[derive(Debug, Clone)]
pub struct TestRunner {
    root: PathBuf,
    env: TestEnv,
    filter: Option<String>,
}

impl TestRunner {
    pub fn new(root: impl Into<PathBuf>, env: TestEnv, filter: Option<String>) -> Self {
        Self {
            root: root.into(),
            env,
            filter: filter.filter(|filter| !filter.is_empty()),
        }
    }

    /// Classify and run a test given by its path relative to the root.
    pub async fn run(&self, test: &str) -> Result<()> {
        let kind =
            TestKind::classify(test).ok_or_else(|| IssueError::UnknownTestKind(test.to_string()))?;
        info!(test, kind = %kind, "running test");

        match kind {
            TestKind::FunctionalJavascript => self.run_functional_javascript(test).await,
            TestKind::Nightwatch => self.run_nightwatch(test).await,
            TestKind::PhpUnit => self.run_phpunit(test).await,
            TestKind::Simpletest => self.run_simpletest(test).await,
        }
    }

    /// Arguments passed to PHPUnit for a test.
    pub fn phpunit_args(&self, test: &str) -> Vec<String> {
        let mut args = vec!["-c".to_string(), "core".to_string(), test.to_string()];
        if let Some(filter) = &self.filter {
            args.push(format!("--filter={}", filter));
        }
        args
    }

    async fn run_phpunit(&self, test: &str) -> Result<()> {
        let phpunit = self.root.join("vendor/bin/phpunit");
        let mut command = self.command(&phpunit.to_string_lossy(), self.phpunit_args(test), &self.root);
        process::run(&mut command, "Test run failed. See output above for details.").await
    }

    async fn run_functional_javascript(&self, test: &str) -> Result<()> {
        self.stop_browser_drivers().await;

        process::spawn_detached(&mut self.command(
            "chromedriver",
            [format!("--port={}", CHROMEDRIVER_PORT)],
            &self.root,
        ))?;
        if let Err(err) =
            process::spawn_detached(&mut self.command("phantomjs", PHANTOMJS_ARGS, &self.root))
        {
            self.stop_browser_drivers().await;
            return Err(IssueError::CommandFailed(format!(
                "Error running the \"phantomjs\" command. Is PhantomJS installed? ({})",
                err
            )));
        }

        let result = self.run_phpunit(test).await;
        self.stop_browser_drivers().await;
        result
    }

    async fn run_nightwatch(&self, test: &str) -> Result<()> {
        let core = self.root.join("core");
        process::run(
            &mut self.command("yarn", ["install"], &core),
            "yarn install failed. See output above for details.",
        )
        .await?;
        process::run(
            &mut self.command("yarn", ["test:nightwatch".to_string(), format!("../{}", test)], &core),
            "Test run failed. See output above for details.",
        )
        .await
    }

    async fn run_simpletest(&self, test: &str) -> Result<()> {
        process::run(
            &mut self.command(
                "php",
                ["./core/scripts/run-tests.sh", "--file", test],
                &self.root,
            ),
            "Test run failed. See output above for details.",
        )
        .await
    }

    async fn stop_browser_drivers(&self) {
        for driver in ["phantomjs", "chromedriver"] {
            process::best_effort(&mut process::command("pkill", [driver], &self.root)).await;
        }
    }

    /// A command carrying the test environment.
    fn command<I, S>(&self, program: &str, args: I, dir: &Path) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut command = process::command(program, args, dir);
        command.envs(self.env.vars());
        command
    }
}
