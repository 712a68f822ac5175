//! Doctor scenarios.

use crate::prelude::town_fixture;
use gt_adapters::{FakeMux, MuxCall, Multiplexer};
use gt_doctor::checks::routes::RoutesCheck;
use gt_doctor::checks::sessions::SessionNameFormatCheck;
use gt_doctor::{Check, CheckContext, Status};
use gt_storage::routes::{read_routes, write_routes, Route};

fn ctx_for(fixture: &crate::prelude::TownFixture) -> CheckContext {
    CheckContext::new(
        fixture.town.clone(),
        fixture.registry.clone(),
        fixture.rigs.clone(),
    )
}

/// A direct-layout rig (`.beads` at its root, no redirect) routes its
/// prefix to the rig directory itself; fixing a town that lacks the route
/// adds exactly that entry.
#[tokio::test]
async fn routes_fix_adds_the_direct_layout_route() {
    let fixture = town_fixture(&[("myrig", "mr")]);
    std::fs::create_dir_all(fixture.town.beads_dir("myrig")).unwrap();
    write_routes(
        &fixture.town.routes_path(),
        &[Route::new("hq-", "."), Route::new("hq-cv-", ".")],
    )
    .unwrap();
    let ctx = ctx_for(&fixture);

    let mut check = RoutesCheck::new();
    assert_eq!(check.run(&ctx).await.status, Status::Error);
    check.fix(&ctx).await.unwrap();

    let routes = read_routes(&fixture.town.routes_path()).unwrap();
    assert!(routes.contains(&Route::new("mr-", "myrig")));
    assert!(
        !routes.iter().any(|r| r.path == "myrig/mayor/rig"),
        "no spurious nested route"
    );
    assert_eq!(check.run(&ctx).await.status, Status::Ok);

    // Byte-exact line format survives the rewrite
    let raw = std::fs::read_to_string(fixture.town.routes_path()).unwrap();
    assert!(raw.contains("{\"prefix\":\"mr-\",\"path\":\"myrig\"}\n"));
}

/// The session-name fixer caches its findings between run and fix; when
/// the legacy session dies in between, the fix observes the absence and
/// renames nothing.
#[tokio::test]
async fn session_rename_fix_survives_a_raced_kill() {
    let fixture = town_fixture(&[("niflheim", "nif")]);
    let mux = FakeMux::new();
    mux.add_session("nif-niflheim-witness", "claude");
    let ctx = ctx_for(&fixture);

    let mut check = SessionNameFormatCheck::new(mux.clone());
    let result = check.run(&ctx).await;
    assert_eq!(result.status, Status::Warning);

    // The source session is killed between Run and Fix
    mux.drop_session("nif-niflheim-witness");
    check.fix(&ctx).await.unwrap();

    assert!(!mux.has_session("nif-witness").await.unwrap(), "target untouched");
    assert!(!mux
        .calls()
        .iter()
        .any(|c| matches!(c, MuxCall::Rename { .. })));
}
