#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use git2::{
    build::CheckoutBuilder, ErrorClass, ErrorCode, IndexAddOption, Oid, Repository as GitRepository,
    Signature, Time,
};
use routewatch_core::{Error, Result};
use tempfile::TempDir;

const FIRST_COMMIT_TIME: i64 = 1_700_000_000;

/// Scratch git repository with a deterministic commit clock.
pub struct Fixture {
    dir: TempDir,
    repo: GitRepository,
    clock: Cell<i64>,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().expect("tempdir");
        let repo = GitRepository::init(dir.path())?;
        Ok(Self {
            dir,
            repo,
            clock: Cell::new(FIRST_COMMIT_TIME),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> &GitRepository {
        &self.repo
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path().join(relative);
        write_file(&path, contents);
        path
    }

    /// Stage the whole tree and commit it on top of `HEAD`.
    pub fn commit_all(&self, message: &str) -> Result<Oid> {
        let parents = match self.repo.head() {
            Ok(reference) => vec![reference.peel_to_commit()?],
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        ErrorClass::Reference,
                        ErrorCode::NotFound | ErrorCode::UnbornBranch
                    )
                ) =>
            {
                Vec::new()
            }
            Err(err) => return Err(Error::from(err)),
        };

        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.commit_with_parents(message, &parent_refs)
    }

    pub fn commit_with_parents(&self, message: &str, parents: &[&git2::Commit]) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let time = self.clock.get();
        self.clock.set(time + 60);
        let signature = Signature::new("Test User", "test@example.com", &Time::new(time, 0))?;

        Ok(self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, parents)?)
    }

    pub fn checkout_head_force(&self) -> Result<()> {
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        Ok(self.repo.checkout_head(Some(&mut checkout))?)
    }
}

pub fn write_file(path: impl AsRef<Path>, contents: &str) {
    fs::create_dir_all(
        path.as_ref()
            .parent()
            .expect("path should have a parent directory"),
    )
    .expect("create directories");
    fs::write(path, contents).expect("write file");
}

/// Whether a usable `git` binary is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
