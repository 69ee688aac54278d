// Shared test fixtures.
// Stub tools on PATH, throwaway git checkouts, mocked issues, and scripted command contexts.

use std::env;
use std::fs;
use std::io::{self, Cursor};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use httpmock::{Method::GET, MockServer};
use serde_json::{Value, json};

use crate::cache::CacheStore;
use crate::commands::Context;
use crate::config::Config;
use crate::drupal::DrupalClient;
use crate::prompt::Console;

/// Stub tools. Each one works in its current directory, so tests using them stay apart.
const STUBS: &[(&str, &str)] = &[
    (
        "composer",
        r#"#!/bin/sh
echo "$@" >> composer.log
if [ -f install-to ]; then
  dir=$(cat install-to)
  name=$(basename "$dir")
  mkdir -p "$dir"
  printf 'name: %s\ntype: module\n' "$name" > "$dir/$name.info.yml"
fi
"#,
    ),
    ("interdiff", "#!/bin/sh\nprintf 'interdiff %s %s\\n' \"$1\" \"$2\"\n"),
    ("chromedriver", "#!/bin/sh\nexit 0\n"),
    ("pkill", "#!/bin/sh\necho \"$1\" >> pkill.log\n"),
];

/// Tools present on PATH that cannot be started.
const UNRUNNABLE: &[&str] = &["phantomjs"];

static STUB_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Put the stub tools first on PATH for the rest of the test run.
pub fn install_stubs() {
    STUB_DIR.get_or_init(|| {
        let dir = env::temp_dir().join(format!("drupal-issue-stubs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for (name, script) in STUBS {
            write_script(&dir.join(name), script);
        }
        for name in UNRUNNABLE {
            fs::write(dir.join(name), "#!/bin/sh\n").unwrap();
            fs::set_permissions(dir.join(name), fs::Permissions::from_mode(0o644)).unwrap();
        }

        let path = env::var_os("PATH").unwrap_or_default();
        let joined =
            env::join_paths(std::iter::once(dir.clone()).chain(env::split_paths(&path))).unwrap();
        // SAFETY: PATH is only ever extended, once per test process.
        unsafe { env::set_var("PATH", joined) };
        dir
    });
}

/// Write an executable shell script, creating parent directories.
pub fn write_script(path: &Path, script: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, script).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Write a file relative to `root`, creating parent directories.
pub fn write_file(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Run git in `dir` with a fixed identity.
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Make `dir` a git checkout with `files` committed.
pub fn checkout(dir: &Path, files: &[(&str, &str)]) {
    git(dir, &["init", "-q"]);
    for (path, contents) in files {
        write_file(dir, path, contents);
    }
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", "Initial commit"]);
}

/// Serve issue `nid` of `project` with the given comment ids and patches.
///
/// Each patch is `(file name, body, comment id)`.
pub fn mock_issue(
    server: &MockServer,
    nid: &str,
    project: &str,
    version: &str,
    comments: &[&str],
    patches: &[(&str, &str, &str)],
) {
    let files: Vec<Value> = patches
        .iter()
        .enumerate()
        .map(|(index, (name, body, cid))| {
            let file_path = format!("/file/{}", index + 1);
            let patch_path = format!("/files/{}", name);
            server.mock(|when, then| {
                when.method(GET).path(format!("{}.json", file_path));
                then.status(200)
                    .body(json!({"name": name, "url": server.url(&patch_path)}).to_string());
            });
            server.mock(|when, then| {
                when.method(GET).path(patch_path.clone());
                then.status(200).body(*body);
            });
            json!({"file": {"uri": server.url(&file_path), "cid": cid}, "display": "1"})
        })
        .collect();

    let node = json!({
        "nid": nid,
        "title": "Fix the thing",
        "type": "project_issue",
        "field_issue_version": version,
        "field_issue_status": "13",
        "field_project": {"uri": server.url(format!("/node/{}", project)), "machine_name": project},
        "field_issue_files": files,
        "comments": comments.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("/node/{}.json", nid));
        then.status(200).body(node.to_string());
    });
}

/// Serve a project node.
pub fn mock_project(server: &MockServer, project: &str, project_type: &str) {
    server.mock(|when, then| {
        when.method(GET).path(format!("/node/{}.json", project));
        then.status(200)
            .body(json!({"type": project_type, "title": project}).to_string());
    });
}

/// A command context whose prompts read `answers`.
pub fn context(root: &Path, cache_dir: &Path, api_base: &str, answers: &str) -> Context {
    let config = Config::new(
        root.to_path_buf(),
        Some(cache_dir.to_path_buf()),
        api_base.to_string(),
    )
    .unwrap();
    let client = DrupalClient::new(CacheStore::new(&config.cache_dir), &config.api_base).unwrap();
    let prompt = Console::new(
        Box::new(Cursor::new(answers.as_bytes().to_vec())),
        Box::new(io::sink()),
    );
    Context::new(config, client, prompt)
}
