// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! skip_without_git {
    () => {
        if !git_available() {
            eprintln!("skipping: git not available");
            return;
        }
    };
}

async fn init_repo(dir: &Path) {
    for args in [
        vec!["init", "-b", "main"],
        vec!["config", "user.email", "t@example.com"],
        vec!["config", "user.name", "t"],
        vec!["commit", "--allow-empty", "-m", "init"],
    ] {
        let out = tokio::process::Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(&args)
            .output()
            .await
            .unwrap();
        assert!(out.status.success(), "git {args:?} failed");
    }
}

#[tokio::test]
async fn clean_tree_reports_clean() {
    skip_without_git!();
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path()).await;

    let git = SystemGitCli::new();
    let status = git.worktree_status(dir.path()).await.unwrap();
    assert!(!status.dirty);
    assert!(!status.has_partial_work());
}

#[tokio::test]
async fn untracked_file_reports_dirty() {
    skip_without_git!();
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path()).await;
    std::fs::write(dir.path().join("scratch.txt"), "wip").unwrap();

    let git = SystemGitCli::new();
    let status = git.worktree_status(dir.path()).await.unwrap();
    assert!(status.dirty);
    assert!(status.has_partial_work());
}

#[tokio::test]
async fn no_upstream_reads_as_unknown_unpushed() {
    skip_without_git!();
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path()).await;

    let git = SystemGitCli::new();
    let status = git.worktree_status(dir.path()).await.unwrap();
    assert_eq!(status.unpushed, None);
}

#[tokio::test]
async fn default_branch_from_bare_repo() {
    skip_without_git!();
    let dir = tempfile::tempdir().unwrap();
    let bare = dir.path().join("repo.git");
    let out = tokio::process::Command::new("git")
        .args(["init", "--bare", "-b", "main"])
        .arg(&bare)
        .output()
        .await
        .unwrap();
    assert!(out.status.success());

    let git = SystemGitCli::new();
    assert_eq!(git.default_branch(&bare).await.unwrap(), "main");
}

#[tokio::test]
async fn is_tracked_distinguishes_files() {
    skip_without_git!();
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path()).await;
    std::fs::write(dir.path().join("tracked.txt"), "x").unwrap();
    let out = tokio::process::Command::new("git")
        .arg("-C")
        .arg(dir.path())
        .args(["add", "tracked.txt"])
        .output()
        .await
        .unwrap();
    assert!(out.status.success());
    std::fs::write(dir.path().join("untracked.txt"), "x").unwrap();

    let git = SystemGitCli::new();
    assert!(git.is_tracked(dir.path(), "tracked.txt").await.unwrap());
    assert!(!git.is_tracked(dir.path(), "untracked.txt").await.unwrap());
}

#[test]
fn gitdir_file_parses() {
    assert_eq!(
        parse_gitdir_file("gitdir: /town/gastown/.repo.git/worktrees/rig\n"),
        Some(PathBuf::from("/town/gastown/.repo.git/worktrees/rig"))
    );
    assert_eq!(parse_gitdir_file("gitdir:"), None);
    assert_eq!(parse_gitdir_file("not a gitdir file"), None);
    assert_eq!(parse_gitdir_file(""), None);
}
