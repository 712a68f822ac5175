// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::framework::Status;
use crate::test_helpers::ctx_fixture;
use gt_adapters::FakeGit;

fn write_git_file(tree: &std::path::Path, gitdir: &std::path::Path) {
    std::fs::create_dir_all(tree).unwrap();
    std::fs::write(
        tree.join(".git"),
        format!("gitdir: {}\n", gitdir.display()),
    )
    .unwrap();
}

#[tokio::test]
async fn healthy_worktrees_pass() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    let bare = ctx.town.bare_repo_dir("gastown");
    let gitdir = bare.join("worktrees/rig");
    std::fs::create_dir_all(&gitdir).unwrap();
    write_git_file(&ctx.town.witness_worktree("gastown"), &gitdir);

    let mut check = WorktreeGitdirCheck::new(FakeGit::new());
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok, "{:?}", result.details);
}

#[tokio::test]
async fn missing_worktree_entry_is_readdable() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    let bare = ctx.town.bare_repo_dir("gastown");
    std::fs::create_dir_all(&bare).unwrap();
    // gitdir target does not exist
    let tree = ctx.town.polecat_worktree("gastown", "Toast");
    write_git_file(&tree, &bare.join("worktrees/Toast"));

    let git = FakeGit::new();
    git.set_default_branch(&bare, "main");
    let mut check = WorktreeGitdirCheck::new(git.clone());

    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Error);
    assert!(result.details[0].contains("re-addable"), "{:?}", result.details);

    check.fix(&ctx).await.unwrap();
    // Stale .git file removed, worktree re-added on the default branch
    assert!(!tree.join(".git").exists());
    assert_eq!(
        git.added_worktrees(),
        vec![(bare.clone(), tree.clone(), "main".to_string())]
    );

    // Idempotent: nothing left to fix
    check.fix(&ctx).await.unwrap();
    assert_eq!(git.added_worktrees().len(), 1);
}

#[tokio::test]
async fn missing_bare_repo_is_not_auto_fixed() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    let bare = ctx.town.bare_repo_dir("gastown");
    let tree = ctx.town.witness_worktree("gastown");
    write_git_file(&tree, &bare.join("worktrees/rig"));

    let git = FakeGit::new();
    let mut check = WorktreeGitdirCheck::new(git.clone());
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Error);
    assert!(result.details[0].contains("reinstall"), "{:?}", result.details);

    check.fix(&ctx).await.unwrap();
    assert!(tree.join(".git").exists(), "not touched");
    assert!(git.added_worktrees().is_empty());
}

#[tokio::test]
async fn bare_repo_check_flags_dangling_references() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    let tree = ctx.town.witness_worktree("gastown");
    write_git_file(&tree, &ctx.town.bare_repo_dir("gastown").join("worktrees/rig"));

    let mut check = BareRepoCheck::new();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Error);

    std::fs::create_dir_all(ctx.town.bare_repo_dir("gastown")).unwrap();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok);
}

#[tokio::test]
async fn directories_without_git_files_are_ignored() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    std::fs::create_dir_all(ctx.town.witness_worktree("gastown")).unwrap();
    std::fs::create_dir_all(ctx.town.rig_dir("gastown").join("polecats/Toast")).unwrap();

    let mut check = WorktreeGitdirCheck::new(FakeGit::new());
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok);
}

#[tokio::test]
async fn sparse_checkout_is_detected_and_disabled() {
    let (_dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    let tree = ctx.town.witness_worktree("gastown");
    let gitdir = ctx.town.bare_repo_dir("gastown").join("worktrees/rig");
    std::fs::create_dir_all(&gitdir).unwrap();
    write_git_file(&tree, &gitdir);

    let git = FakeGit::new();
    git.set_sparse(&tree);
    let mut check = SparseCheckoutCheck::new(git.clone());

    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Warning);

    check.fix(&ctx).await.unwrap();
    assert_eq!(git.sparse_disabled(), vec![tree.clone()]);

    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok);
}

#[test]
fn rig_worktrees_enumerates_disk_state() {
    let (dir, ctx) = ctx_fixture(&[("gastown", "gt")]);
    std::fs::create_dir_all(dir.path().join("gastown/polecats/Toast")).unwrap();
    std::fs::create_dir_all(dir.path().join("gastown/crew/max")).unwrap();

    let trees = rig_worktrees(&ctx.town, "gastown");
    assert!(trees.contains(&ctx.town.witness_worktree("gastown")));
    assert!(trees.contains(&ctx.town.refinery_worktree("gastown")));
    assert!(trees.contains(&ctx.town.polecat_worktree("gastown", "Toast")));
    assert!(trees.contains(&ctx.town.crew_worktree("gastown", "max")));
}
