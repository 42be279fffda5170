mod common;

use std::fs;

use common::Fixture;
use git2::Repository as GitRepository;
use routewatch_backend_api::{RevisionBackend, RevisionSpec};
use routewatch_core::repository::Repository;
use routewatch_core::{Error, Result};
use tempfile::TempDir;

#[test]
fn repository_open_discovers_from_nested_path() -> Result<()> {
    let fixture = Fixture::new()?;
    let nested = fixture.path().join("output/edge/filters");
    fs::create_dir_all(&nested).expect("nested dirs");

    let repo = Repository::open(&nested)?;
    let repo_root = repo.root().canonicalize().expect("canonical root");
    let expected_root = fixture.path().canonicalize().expect("canonical temp path");
    assert_eq!(repo_root, expected_root);

    Ok(())
}

#[test]
fn repository_open_rejects_bare_repository() {
    let temp = TempDir::new().expect("tempdir");
    let bare_path = temp.path().join("bare.git");
    GitRepository::init_bare(&bare_path).expect("bare repo");

    let err = Repository::open(&bare_path);
    assert!(matches!(err, Err(Error::BareRepository { .. })));
}

#[test]
fn repository_open_missing_path_is_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let err = Repository::open(temp.path().join("absent"));
    assert!(matches!(err, Err(Error::Io { .. })));
}

#[test]
fn log_skips_merge_that_keeps_one_parents_content() -> Result<()> {
    let fixture = Fixture::new()?;
    fixture.write("filters/A.conf", "10.0.0.0/8\n");
    fixture.commit_all("base")?;

    let main_branch = fixture
        .git()
        .head()?
        .shorthand()
        .unwrap_or("master")
        .to_string();
    let base_commit = fixture.git().head()?.peel_to_commit()?;

    fixture.write("filters/A.conf", "10.1.0.0/16\n");
    let update = fixture.commit_all("update A")?;
    let update_commit = fixture.git().find_commit(update)?;

    fixture.git().branch("side", &base_commit, false)?;
    fixture.git().set_head("refs/heads/side")?;
    fixture.checkout_head_force()?;
    fixture.write("README.md", "side work\n");
    let side = fixture.commit_all("side docs")?;
    let side_commit = fixture.git().find_commit(side)?;

    fixture
        .git()
        .set_head(&format!("refs/heads/{main_branch}"))?;
    fixture.checkout_head_force()?;
    fixture.write("README.md", "side work\n");
    fixture.commit_with_parents("merge side", &[&update_commit, &side_commit])?;

    let repo = Repository::open(fixture.path())?;
    let messages: Vec<_> = repo
        .log("filters/A.conf", 10)
        .expect("log")
        .into_iter()
        .map(|revision| revision.message)
        .collect();
    assert_eq!(messages, vec!["update A", "base"]);

    Ok(())
}

#[test]
fn show_reads_nested_paths_and_reports_absence() -> Result<()> {
    let fixture = Fixture::new()?;
    fixture.write("output/edge/filters/A.conf", "define A = [ 10.0.0.0/8 ];\n");
    let first = fixture.commit_all("add A")?;
    fs::remove_file(fixture.path().join("output/edge/filters/A.conf")).expect("remove");
    fixture.write("output/edge/filters/B.conf", "define B = [ 10.1.0.0/16 ];\n");
    fixture.commit_all("replace A with B")?;

    let repo = Repository::open(fixture.path())?;
    assert_eq!(repo.id(), "libgit2");
    assert!(repo.workdir().is_some());

    assert!(repo
        .show("output/edge/filters/A.conf", &RevisionSpec::Committed)
        .expect("show")
        .is_none());
    assert_eq!(
        repo.show("output/edge/filters/A.conf", &RevisionSpec::id(first.to_string()))
            .expect("show")
            .as_deref(),
        Some("define A = [ 10.0.0.0/8 ];\n")
    );
    assert!(repo
        .show("output/edge/filters", &RevisionSpec::Committed)
        .expect("show directory")
        .is_none());

    let history = repo.log("output/edge/filters/A.conf", 5).expect("log");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message, "replace A with B");
    assert_eq!(history[1].id, first.to_string());
    assert!(history[0].timestamp > history[1].timestamp);

    Ok(())
}

#[test]
fn show_unknown_revision_is_absent() -> Result<()> {
    let fixture = Fixture::new()?;
    fixture.write("A.conf", "10.0.0.0/8\n");
    fixture.commit_all("add A")?;

    let repo = Repository::open(fixture.path())?;
    let missing = RevisionSpec::id("0123456789abcdef0123456789abcdef01234567");
    assert!(repo.show("A.conf", &missing).expect("show").is_none());

    Ok(())
}
