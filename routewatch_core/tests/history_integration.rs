mod common;

use std::fs;
use std::path::Path;
use std::time::Duration;

use common::{git_available, Fixture};
use pretty_assertions::assert_eq;
use routewatch_backend_api::RevisionBackend;
use routewatch_backends::{GitCliBackend, NoHistoryBackend};
use routewatch_core::history::HistoryWalker;
use routewatch_core::repository::Repository;
use routewatch_core::revisions::{BackendKind, RevisionReader};
use routewatch_core::{HistoryEntry, LocalChanges, Result};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(30);
const ARTIFACT: &str = "output/edge/filters/DOWNSTREAM_AS64500.conf";

const V1: &str = "define DOWNSTREAM_AS64500 = [\n    10.0.0.0/8,\n    10.1.0.0/16\n];\n";
const V2: &str = "define DOWNSTREAM_AS64500 = [\n    10.1.0.0/16,\n    10.2.0.0/16\n];\n";
const WORKING: &str = "define DOWNSTREAM_AS64500 = [\n    10.2.0.0/16,\n    2001:db8::/32\n];\n";

/// Two committed versions of the artifact plus an uncommitted edit.
fn fixture_with_history() -> Result<(Fixture, Vec<String>)> {
    let fixture = Fixture::new()?;
    fixture.write(ARTIFACT, V1);
    let first = fixture.commit_all("generate filters")?;
    fixture.write("README.md", "unrelated\n");
    fixture.commit_all("docs")?;
    fixture.write(ARTIFACT, V2);
    let second = fixture.commit_all("refresh filters")?;
    fixture.write(ARTIFACT, WORKING);
    Ok((fixture, vec![second.to_string(), first.to_string()]))
}

fn walk(backend: Box<dyn RevisionBackend>, path: &Path, count: usize) -> Vec<HistoryEntry> {
    HistoryWalker::new(RevisionReader::new(backend)).build_history(path, count)
}

fn assert_expected_history(history: &[HistoryEntry], commits: &[String]) {
    let ids: Vec<_> = history.iter().map(|entry| entry.revision.id()).collect();
    assert_eq!(ids, vec![LocalChanges::ID, commits[0].as_str(), commits[1].as_str()]);

    let local = &history[0];
    assert!(local.revision.is_local());
    assert_eq!(local.revision.author(), LocalChanges::AUTHOR);
    assert_eq!(local.comparison.added, vec!["2001:db8::/32"]);
    assert_eq!(local.comparison.removed, vec!["10.1.0.0/16"]);
    assert_eq!(local.comparison.unchanged, vec!["10.2.0.0/16"]);

    assert_eq!(history[1].comparison, local.comparison);
    assert_eq!(history[1].revision.message(), "refresh filters");
    assert_eq!(history[1].revision.author(), "Test User");

    let oldest = &history[2].comparison;
    assert_eq!(oldest.added, vec!["10.2.0.0/16", "2001:db8::/32"]);
    assert_eq!(oldest.removed, vec!["10.0.0.0/8", "10.1.0.0/16"]);
    assert!(oldest.unchanged.is_empty());
    assert_eq!((oldest.old_count, oldest.new_count), (2, 2));
}

#[test]
fn libgit2_history_lists_local_then_commits_newest_first() -> Result<()> {
    let (fixture, commits) = fixture_with_history()?;
    let backend = Repository::open(fixture.path())?;

    let history = walk(Box::new(backend), &fixture.path().join(ARTIFACT), 5);
    assert_expected_history(&history, &commits);

    Ok(())
}

#[test]
fn git_cli_history_matches_libgit2() -> Result<()> {
    if !git_available() {
        eprintln!("skipping: git binary not available");
        return Ok(());
    }

    let (fixture, commits) = fixture_with_history()?;
    let path = fixture.path().join(ARTIFACT);

    let cli = GitCliBackend::discover(fixture.path().join("output"), TIMEOUT)
        .expect("discover repository");
    let from_cli = walk(Box::new(cli), &path, 5);
    assert_expected_history(&from_cli, &commits);

    let from_libgit2 = walk(Box::new(Repository::open(fixture.path())?), &path, 5);
    let strip_local = |history: &[HistoryEntry]| -> Vec<HistoryEntry> {
        history
            .iter()
            .filter(|entry| !entry.revision.is_local())
            .cloned()
            .collect()
    };
    assert_eq!(strip_local(&from_cli), strip_local(&from_libgit2));

    Ok(())
}

#[test]
fn revision_count_limits_real_entries_only() -> Result<()> {
    let (fixture, commits) = fixture_with_history()?;
    let history = walk(
        Box::new(Repository::open(fixture.path())?),
        &fixture.path().join(ARTIFACT),
        1,
    );

    let ids: Vec<_> = history.iter().map(|entry| entry.revision.id()).collect();
    assert_eq!(ids, vec![LocalChanges::ID, commits[0].as_str()]);

    Ok(())
}

#[test]
fn clean_working_tree_still_reports_local_entry() -> Result<()> {
    let (fixture, _) = fixture_with_history()?;
    fixture.write(ARTIFACT, V2);

    let history = walk(
        Box::new(Repository::open(fixture.path())?),
        &fixture.path().join(ARTIFACT),
        5,
    );

    assert!(history[0].revision.is_local());
    assert!(history[0].comparison.is_identical());
    assert!(history[1].comparison.is_identical());

    Ok(())
}

#[test]
fn uncommitted_artifact_has_no_history() -> Result<()> {
    let (fixture, _) = fixture_with_history()?;
    let fresh = fixture.write("output/edge/filters/NEW.conf", "10.9.0.0/16\n");

    let history = walk(Box::new(Repository::open(fixture.path())?), &fresh, 5);
    assert!(history.is_empty());

    Ok(())
}

#[test]
fn missing_artifact_has_no_history() -> Result<()> {
    let (fixture, _) = fixture_with_history()?;
    let history = walk(
        Box::new(Repository::open(fixture.path())?),
        &fixture.path().join("output/edge/filters/GONE.conf"),
        5,
    );
    assert!(history.is_empty());

    Ok(())
}

#[test]
fn artifact_outside_any_repository_has_no_history() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("A.conf");
    fs::write(&path, V1).expect("write artifact");

    let backend = BackendKind::Git.open_or_none(temp.path(), TIMEOUT);
    assert_eq!(backend.id(), NoHistoryBackend.id());
    assert!(walk(backend, &path, 5).is_empty());
}

#[test]
fn unreachable_git_binary_degrades_to_empty_history() -> Result<()> {
    let (fixture, _) = fixture_with_history()?;
    let missing_git = fixture.path().join("no-such-git");

    assert!(GitCliBackend::discover_with_binary(&missing_git, fixture.path(), TIMEOUT).is_err());

    let history = walk(
        Box::new(NoHistoryBackend),
        &fixture.path().join(ARTIFACT),
        5,
    );
    assert!(history.is_empty());

    Ok(())
}

#[test]
fn repository_removed_after_discovery_degrades_to_empty_history() -> Result<()> {
    if !git_available() {
        eprintln!("skipping: git binary not available");
        return Ok(());
    }

    let (fixture, _) = fixture_with_history()?;
    let backend = GitCliBackend::discover(fixture.path(), TIMEOUT).expect("discover repository");
    fs::rename(fixture.path().join(".git"), fixture.path().join("git-moved")).expect("move .git");

    let history = walk(Box::new(backend), &fixture.path().join(ARTIFACT), 5);
    assert!(history.is_empty());

    Ok(())
}
