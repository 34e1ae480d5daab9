//! Shared test utilities for integration and E2E tests.
//!
//! Tests that need remotes build them as local bare repositories under the
//! fixture directory and point `--git-host` at them with a `file://` URL, so
//! nothing here touches the network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = TestFixture::new()
//!         .with_repository_list("plugins.yml", &["forum-plugin-a"])
//!         .with_template("plugin-workflow-templates", "ci.yml", templates::CI)
//!         .with_remote("forum-plugin-a", &[(".github/workflows/ci.yml", "old")]);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::templates;
    #[allow(unused_imports)]
    pub use super::{git_available, git_env, ApiStub, TestFixture, OWNER};
}

/// Organisation the fixture remotes live under.
pub const OWNER: &str = "acme";

/// Workflow template snippets for testing.
#[allow(dead_code)]
pub mod templates {
    pub const CI: &str = "name: CI

on:
  push:
    branches: [main]

jobs:
  ci:
    uses: discourse/.github/.github/workflows/discourse-plugin.yml@v1
";

    pub const OLD_CI: &str = "name: CI

on: [push]

jobs:
  lint:
    runs-on: ubuntu-latest
";

    pub const DEPRECATED: &str = "name: Plugin Tests\n\non: [push]\n";
}

/// Environment that gives git an identity and keeps the user's own git
/// configuration out of the way.
pub fn git_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("GIT_AUTHOR_NAME", "Workflow Sync Tests"),
        ("GIT_AUTHOR_EMAIL", "tests@example.com"),
        ("GIT_COMMITTER_NAME", "Workflow Sync Tests"),
        ("GIT_COMMITTER_EMAIL", "tests@example.com"),
        ("GIT_CONFIG_GLOBAL", "/dev/null"),
        ("GIT_CONFIG_NOSYSTEM", "1"),
    ]
}

/// Whether a usable `git` binary is on the PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(git_env())
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A temporary root holding repository lists, template directories, bare
/// remotes and a scratch work directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().unwrap(),
        }
    }

    /// Root directory, suitable for `--root`.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write an arbitrary file under the root.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir.child(path).write_str(content).unwrap();
        self
    }

    /// Write a repository list file.
    pub fn with_repository_list(self, file_name: &str, names: &[&str]) -> Self {
        let mut yaml = String::from("repositories:\n");
        for name in names {
            yaml.push_str(&format!("  - {}\n", name));
        }
        self.temp_dir.child(file_name).write_str(&yaml).unwrap();
        self
    }

    /// Write a template into a template directory.
    pub fn with_template(self, dir: &str, file_name: &str, content: &str) -> Self {
        self.temp_dir
            .child(dir)
            .child(file_name)
            .write_str(content)
            .unwrap();
        self
    }

    /// Create a bare remote `<OWNER>/<name>` whose `main` holds `files`.
    pub fn with_remote(self, name: &str, files: &[(&str, &str)]) -> Self {
        let seed = self.temp_dir.child("seeds").child(name);
        seed.create_dir_all().unwrap();
        git(seed.path(), &["init", "-q"]);
        for (path, content) in files {
            seed.child(path).write_str(content).unwrap();
        }
        seed.child("README.md").write_str(&format!("# {}\n", name)).unwrap();
        git(seed.path(), &["add", "-A"]);
        git(seed.path(), &["commit", "-q", "-m", "Initial commit"]);
        git(seed.path(), &["branch", "-M", "main"]);

        let owner_dir = self.temp_dir.child("remotes").child(OWNER);
        owner_dir.create_dir_all().unwrap();
        let seed_path = seed.path().to_string_lossy().to_string();
        git(owner_dir.path(), &["clone", "-q", "--bare", &seed_path, name]);
        self
    }

    /// Base URL for `--git-host`.
    pub fn git_host(&self) -> String {
        format!("file://{}", self.temp_dir.child("remotes").path().display())
    }

    /// Scratch directory for `--work-dir`.
    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.child("work").path().to_path_buf()
    }

    fn remote_path(&self, name: &str) -> PathBuf {
        self.temp_dir.child("remotes").child(OWNER).child(name).path().to_path_buf()
    }

    /// Branch names present on a remote.
    pub fn remote_branches(&self, name: &str) -> Vec<String> {
        git(&self.remote_path(name), &["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Subject of the tip commit of `branch` on a remote.
    pub fn remote_subject(&self, name: &str, branch: &str) -> String {
        git(&self.remote_path(name), &["log", "-1", "--format=%s", branch])
            .trim()
            .to_string()
    }

    /// Content of `path` at `branch` on a remote, if the file exists there.
    pub fn remote_file(&self, name: &str, branch: &str, path: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["show", &format!("{}:{}", branch, path)])
            .current_dir(self.remote_path(name))
            .envs(git_env())
            .output()
            .expect("failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Leftover workspace directories in the work directory.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.work_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_name().to_string_lossy().starts_with("workflow-sync-"))
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Local stand-in for the pull request API, suitable for `--api-url`.
///
/// Every request gets the same canned response. Raw requests are recorded.
pub struct ApiStub {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ApiStub {
    pub fn start(status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let mut response = format!("HTTP/1.1 {} Stub\r\n", status);
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                recorded.lock().unwrap().push(read_request(&mut stream));
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { url, requests }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
        request.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
    request.push_str(&String::from_utf8_lossy(&body));
    request
}
