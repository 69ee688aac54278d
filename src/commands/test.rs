// The `test` command.
// Runs a test that was added or changed in the current project.

use crate::config::TestEnv;
use crate::drupal::types::CORE_PROJECT;
use crate::error::{IssueError, Result};
use crate::testing::{TestRunner, changed_tests};

use super::Context;

/// Options for a test run.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub project: Option<String>,
    /// Base URL of the site under test.
    pub url: Option<String>,
    /// PHPUnit `--filter` expression.
    pub filter: Option<String>,
}

pub async fn run(ctx: &mut Context, options: TestOptions) -> Result<()> {
    let cache = ctx.client.cache().clone();

    let name = match options.project {
        Some(name) => name,
        None => {
            let default = cache
                .last_project()?
                .unwrap_or_else(|| CORE_PROJECT.to_string());
            ctx.prompt
                .ask("What project are you working on?", Some(default.as_str()))?
        }
    };
    cache.set_last_project(&name)?;

    let base_url = options
        .url
        .filter(|url| !url.is_empty())
        .ok_or(IssueError::MissingBaseUrl)?;
    let runner = TestRunner::new(ctx.root(), TestEnv::from_env(base_url), options.filter);

    let location = ctx.locate_by_name(&name)?;
    let tests = changed_tests(&ctx.staged_files(&location).await?);

    let test = match tests.len() {
        0 => {
            println!("You have not changed or added any tests.");
            return Ok(());
        }
        1 => &tests[0],
        _ => &tests[ctx.prompt.choose("What test would you like to run?", &tests)?],
    };

    let test = location.path.join(test);
    runner.run(&test.to_string_lossy()).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{checkout, context};
    use tempfile::TempDir;

    fn options(project: Option<&str>) -> TestOptions {
        TestOptions {
            project: project.map(String::from),
            url: Some("http://localhost:8888".to_string()),
            filter: None,
        }
    }

    fn site() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        checkout(
            temp_dir.path(),
            &[
                ("core/README.txt", "readme\n"),
                ("modules/token/token.info.yml", "name: Token\ntype: module\n"),
            ],
        );
        temp_dir
    }

    #[tokio::test]
    async fn test_project_defaults_to_last_project() {
        let temp_dir = site();
        let cache_dir = TempDir::new().unwrap();

        let mut ctx = context(temp_dir.path(), cache_dir.path(), "http://127.0.0.1:9", "\n");
        ctx.client.cache().set_last_project("token").unwrap();
        run(&mut ctx, options(None)).await.unwrap();
        assert_eq!(
            ctx.client.cache().last_project().unwrap(),
            Some("token".to_string())
        );

        let mut ctx = context(temp_dir.path(), cache_dir.path(), "http://127.0.0.1:9", "drupal\n");
        run(&mut ctx, options(None)).await.unwrap();
        assert_eq!(
            ctx.client.cache().last_project().unwrap(),
            Some("drupal".to_string())
        );
    }

    #[tokio::test]
    async fn test_first_run_defaults_to_core() {
        let temp_dir = site();
        let cache_dir = TempDir::new().unwrap();

        let mut ctx = context(temp_dir.path(), cache_dir.path(), "http://127.0.0.1:9", "\n");
        run(&mut ctx, options(None)).await.unwrap();

        assert_eq!(
            ctx.client.cache().last_project().unwrap(),
            Some(CORE_PROJECT.to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_base_url() {
        let temp_dir = site();
        let cache_dir = TempDir::new().unwrap();

        let mut ctx = context(temp_dir.path(), cache_dir.path(), "http://127.0.0.1:9", "");
        let err = run(
            &mut ctx,
            TestOptions {
                url: None,
                ..options(Some("token"))
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IssueError::MissingBaseUrl));
        assert_eq!(
            ctx.client.cache().last_project().unwrap(),
            Some("token".to_string())
        );
    }
}
