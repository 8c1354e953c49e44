#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use extract_file::{ExtractConfig, Extractor, Git, TargetSpec};
use tempfile::TempDir;

/// A throwaway git repository on branch `main`.
pub struct TestRepo {
    dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("extract-file-test-")
            .tempdir()
            .expect("failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, contents: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create directory");
        }
        fs::write(&full, contents).expect("failed to write file");
    }

    pub fn remove(&self, path: &str) {
        fs::remove_file(self.path().join(path)).expect("failed to remove file");
    }

    /// Install an executable hook script under `.git/hooks`.
    pub fn hook(&self, name: &str, script: &str) {
        let path = self.path().join(".git/hooks").join(name);
        fs::create_dir_all(path.parent().expect("hook has a parent"))
            .expect("failed to create hooks directory");
        fs::write(&path, script).expect("failed to write hook");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to make hook executable");
    }

    /// Stage everything and commit, returning the new HEAD id.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.head()
    }

    /// Commit with an explicit author and author date.
    pub fn commit_as(&self, message: &str, author: &str, date: &str) -> String {
        self.git(&["add", "-A"]);
        let author = format!("--author={author}");
        let date = format!("--date={date}");
        self.git(&["commit", "-q", "-m", message, &author, &date]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tree(&self, rev: &str) -> String {
        self.git(&["rev-parse", &format!("{rev}^{{tree}}")])
    }

    /// Commits in `from..HEAD`, oldest first.
    pub fn commits_since(&self, from: &str) -> Vec<String> {
        self.git(&["rev-list", "--reverse", &format!("{from}..HEAD")])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn message(&self, rev: &str) -> String {
        self.git(&["log", "-1", "--format=%B", rev])
    }

    /// `Name <email> <raw date>` of the author.
    pub fn author(&self, rev: &str) -> String {
        self.git(&["log", "-1", "--date=raw", "--format=%an <%ae> %ad", rev])
    }

    /// Paths changed by a non-merge commit, sorted.
    pub fn changed_paths(&self, rev: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .git(&["diff-tree", "--no-commit-id", "--name-only", "--no-renames", "-r", rev])
            .lines()
            .map(str::to_string)
            .collect();
        paths.sort();
        paths
    }

    pub fn branches(&self, pattern: &str) -> Vec<String> {
        self.git(&["branch", "--list", "--format=%(refname:short)", pattern])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Run git, panicking on failure, and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = self.try_git(args);
        if !output.status.success() {
            panic!(
                "git {} failed:\nstderr: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn try_git(&self, args: &[&str]) -> Output {
        Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git")
    }

    pub fn extractor(&self, targets: &[&str]) -> Extractor {
        let git = Git::discover(self.path()).expect("not a repository");
        let targets = TargetSpec::new(targets).expect("empty target list");
        let config = ExtractConfig {
            run_id: "test".to_string(),
            debug: true,
        };
        Extractor::new(git, targets, config)
    }
}
