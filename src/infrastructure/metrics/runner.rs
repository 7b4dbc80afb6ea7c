//! Repository cloning and demo script execution

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Demo entry points recognised in a repository, matched case-insensitively
/// against tree paths
pub const DEMO_FILE_PATTERNS: [&str; 10] = [
    "demo.py",
    "example.py",
    "main.py",
    "run.py",
    "app.py",
    "examples/demo.py",
    "examples/example.py",
    "examples/main.py",
    "demo.sh",
    "run.sh",
];

/// How a demo script run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded,
    Failed(Option<i32>),
    TimedOut,
}

/// Clones repositories and runs scripts inside them
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepoRunner: Send + Sync + std::fmt::Debug {
    /// Shallow (depth 1) clone of `clone_url` into the existing empty directory `dest`
    async fn clone_shallow(&self, clone_url: &str, dest: &Path) -> Result<(), DomainError>;

    /// Run one script with `cwd` as working directory
    async fn run_script(&self, script: &Path, cwd: &Path) -> Result<ExecutionOutcome, DomainError>;
}

/// Runner backed by the `git` binary and local interpreters
///
/// Scripts run without dependency installation. A script still running at
/// the timeout is killed.
#[derive(Debug, Clone)]
pub struct ProcessRepoRunner {
    git_bin: String,
    python_bin: String,
    timeout: Duration,
    clone_timeout: Duration,
}

impl Default for ProcessRepoRunner {
    fn default() -> Self {
        Self {
            git_bin: "git".to_string(),
            python_bin: "python3".to_string(),
            timeout: Duration::from_secs(30),
            clone_timeout: Duration::from_secs(120),
        }
    }
}

impl ProcessRepoRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_git_bin(mut self, git_bin: impl Into<String>) -> Self {
        self.git_bin = git_bin.into();
        self
    }

    pub fn with_python_bin(mut self, python_bin: impl Into<String>) -> Self {
        self.python_bin = python_bin.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn interpreter_for(&self, script: &Path) -> Option<&str> {
        match script.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "py" => Some(self.python_bin.as_str()),
            "sh" | "bash" => Some("bash"),
            _ => None,
        }
    }
}

#[async_trait]
impl RepoRunner for ProcessRepoRunner {
    async fn clone_shallow(&self, clone_url: &str, dest: &Path) -> Result<(), DomainError> {
        debug!(clone_url, dest = %dest.display(), "Cloning repository");

        let output = Command::new(&self.git_bin)
            .args(["clone", "--depth", "1", "--quiet", clone_url])
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.clone_timeout, output)
            .await
            .map_err(|_| DomainError::execution(format!("Clone of {} timed out", clone_url)))?
            .map_err(|e| DomainError::execution(format!("Failed to start git: {}", e)))?;

        if !output.status.success() {
            return Err(DomainError::execution(format!(
                "git clone {} failed: {}",
                clone_url,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    async fn run_script(&self, script: &Path, cwd: &Path) -> Result<ExecutionOutcome, DomainError> {
        let interpreter = self.interpreter_for(script).ok_or_else(|| {
            DomainError::validation(format!("Unsupported script type: {}", script.display()))
        })?;

        let mut child = Command::new(interpreter)
            .arg(script)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::execution(format!("Failed to start {}: {}", interpreter, e)))?;

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(ExecutionOutcome::Succeeded),
            Ok(Ok(status)) => Ok(ExecutionOutcome::Failed(status.code())),
            Ok(Err(e)) => Err(DomainError::execution(format!(
                "Failed waiting for {}: {}",
                script.display(),
                e
            ))),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    debug!(script = %script.display(), error = %e, "Kill after timeout failed");
                }
                Ok(ExecutionOutcome::TimedOut)
            }
        }
    }
}

/// Demo scripts present in a cloned repository, most promising first
///
/// Matching ignores case, as in [`DEMO_FILE_PATTERNS`]. Nested patterns
/// match only at their exact relative path; bare file names match at any
/// depth. Candidates are ordered by whether the file name
/// mentions "demo", then "example", then by path length.
pub fn find_demo_candidates(root: &Path, limit: usize) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let Ok(relative) = entry.path().strip_prefix(root) else {
                return false;
            };
            let relative = relative.to_string_lossy().replace('\\', "/").to_lowercase();
            let file_name = entry.file_name().to_string_lossy().to_lowercase();

            DEMO_FILE_PATTERNS.iter().any(|pattern| {
                if pattern.contains('/') {
                    relative == *pattern
                } else {
                    file_name == *pattern
                }
            })
        })
        .map(|entry| entry.into_path())
        .collect();

    candidates.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        (
            !name.contains("demo"),
            !name.contains("example"),
            path.as_os_str().len(),
        )
    });
    candidates.truncate(limit);
    candidates
}
