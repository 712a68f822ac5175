// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::framework::Status;
use crate::test_helpers::ctx_fixture;
use gt_storage::routes::read_routes;

fn write_beads_dir(ctx: &CheckContext, rel: &str) {
    std::fs::create_dir_all(ctx.town.root().join(rel).join(".beads")).unwrap();
}

#[tokio::test]
async fn direct_layout_rig_with_canonical_route_is_ok() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    write_beads_dir(&ctx, "myrig");
    write_routes(
        &ctx.town.routes_path(),
        &[
            Route::new("hq-", "."),
            Route::new("hq-cv-", "."),
            Route::new("mr-", "myrig"),
        ],
    )
    .unwrap();

    let mut check = RoutesCheck::new();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok, "{:?}", result.details);
}

#[tokio::test]
async fn fix_adds_exactly_the_canonical_route() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    write_beads_dir(&ctx, "myrig");
    write_routes(
        &ctx.town.routes_path(),
        &[Route::new("hq-", "."), Route::new("hq-cv-", ".")],
    )
    .unwrap();

    let mut check = RoutesCheck::new();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Error);

    check.fix(&ctx).await.unwrap();

    let routes = read_routes(&ctx.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "myrig")));
    // No spurious deep route
    assert!(!routes.iter().any(|r| r.path.contains("mayor")));

    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Ok, "{:?}", result.details);
}

#[tokio::test]
async fn redirect_is_walked_to_the_canonical_directory() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    // myrig/.beads/redirect -> elsewhere/store, which holds the real db
    write_beads_dir(&ctx, "myrig");
    std::fs::write(
        ctx.town.root().join("myrig/.beads/redirect"),
        "elsewhere/store\n",
    )
    .unwrap();
    write_beads_dir(&ctx, "elsewhere/store");

    write_routes(&ctx.town.routes_path(), &[]).unwrap();
    let mut check = RoutesCheck::new();
    check.run(&ctx).await;
    check.fix(&ctx).await.unwrap();

    let routes = read_routes(&ctx.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "elsewhere/store")));
}

#[tokio::test]
async fn stale_route_is_rewritten_only_when_canonical_db_exists() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    write_beads_dir(&ctx, "myrig");
    write_routes(
        &ctx.town.routes_path(),
        &[
            Route::new("hq-", "."),
            Route::new("hq-cv-", "."),
            Route::new("mr-", "old/location"),
        ],
    )
    .unwrap();

    let mut check = RoutesCheck::new();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Error);
    check.fix(&ctx).await.unwrap();

    let routes = read_routes(&ctx.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "myrig")));
    assert!(!routes.iter().any(|r| r.path == "old/location"));
}

#[tokio::test]
async fn mismatch_without_canonical_db_is_preserved() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    // No .beads anywhere under the canonical path
    write_routes(
        &ctx.town.routes_path(),
        &[
            Route::new("hq-", "."),
            Route::new("hq-cv-", "."),
            Route::new("mr-", "old/location"),
        ],
    )
    .unwrap();

    let mut check = RoutesCheck::new();
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Warning, "{:?}", result.details);

    check.fix(&ctx).await.unwrap();
    let routes = read_routes(&ctx.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "old/location")));
}

#[tokio::test]
async fn duplicate_prefix_is_never_rewritten() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    write_beads_dir(&ctx, "myrig");
    write_routes(
        &ctx.town.routes_path(),
        &[
            Route::new("hq-", "."),
            Route::new("hq-cv-", "."),
            Route::new("mr-", "somewhere"),
            Route::new("mr-", "elsewhere"),
        ],
    )
    .unwrap();

    let mut check = RoutesCheck::new();
    check.run(&ctx).await;
    check.fix(&ctx).await.unwrap();

    let routes = read_routes(&ctx.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "somewhere")));
    assert!(routes.contains(&Route::new("mr-", "elsewhere")));
}

#[tokio::test]
async fn fix_is_idempotent() {
    let (_dir, ctx) = ctx_fixture(&[("myrig", "mr")]);
    write_beads_dir(&ctx, "myrig");
    write_routes(&ctx.town.routes_path(), &[]).unwrap();

    let mut check = RoutesCheck::new();
    check.run(&ctx).await;
    check.fix(&ctx).await.unwrap();
    let after_first = read_routes(&ctx.town.routes_path()).unwrap();
    check.fix(&ctx).await.unwrap();
    let after_second = read_routes(&ctx.town.routes_path()).unwrap();
    assert_eq!(after_first, after_second);
}

#[test]
fn escaping_redirects_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let town = Town::new(dir.path());
    std::fs::create_dir_all(dir.path().join("rig/.beads")).unwrap();
    std::fs::write(dir.path().join("rig/.beads/redirect"), "../outside\n").unwrap();
    assert_eq!(canonical_beads_dir(&town, "rig"), None);

    std::fs::write(dir.path().join("rig/.beads/redirect"), "/abs/path\n").unwrap();
    assert_eq!(canonical_beads_dir(&town, "rig"), None);
}

#[test]
fn redirect_cycles_are_cut_off() {
    let dir = tempfile::tempdir().unwrap();
    let town = Town::new(dir.path());
    std::fs::create_dir_all(dir.path().join("a/.beads")).unwrap();
    std::fs::create_dir_all(dir.path().join("b/.beads")).unwrap();
    std::fs::write(dir.path().join("a/.beads/redirect"), "b\n").unwrap();
    std::fs::write(dir.path().join("b/.beads/redirect"), "a\n").unwrap();
    assert_eq!(canonical_beads_dir(&town, "a"), None);
}
