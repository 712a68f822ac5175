// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Beads routing checks.
//!
//! Every rig's issue prefix must route to the directory that actually
//! holds its beads database. Rigs that moved their database leave a
//! `redirect` file behind; the canonical path is found by walking those,
//! refusing anything that escapes the town root.

use crate::context::CheckContext;
use crate::framework::{Category, Check, CheckResult, DoctorError};
use async_trait::async_trait;
use gt_core::Town;
use gt_storage::routes::{read_routes, write_routes, Route};

const NAME: &str = "routes";
const MAX_REDIRECT_DEPTH: usize = 5;

/// Follow `redirect` files from a rig's `.beads` to the directory that
/// really holds the database. Returns a town-root-relative path.
pub fn canonical_beads_dir(town: &Town, rig: &str) -> Option<String> {
    let mut current = rig.to_string();
    for _ in 0..MAX_REDIRECT_DEPTH {
        let redirect = town.root().join(&current).join(".beads").join("redirect");
        let content = match std::fs::read_to_string(&redirect) {
            Ok(content) => content,
            Err(_) => return Some(current),
        };
        let target = content.trim();
        if target.is_empty()
            || target.starts_with('/')
            || std::path::Path::new(target)
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            // Redirects may not escape the town
            return None;
        }
        current = target.to_string();
    }
    None
}

/// Routes the town must always carry.
fn town_routes() -> Vec<Route> {
    vec![Route::new("hq-", "."), Route::new("hq-cv-", ".")]
}

#[derive(Debug, Default)]
struct Findings {
    missing: Vec<Route>,
    /// `(prefix, canonical)` pairs whose existing route points elsewhere
    /// and whose canonical path has a real beads directory.
    rewrites: Vec<Route>,
    /// Mismatches preserved because the canonical side has no database or
    /// the prefix appears more than once.
    preserved: Vec<String>,
}

/// Routes file completeness and canonical-path agreement.
#[derive(Default)]
pub struct RoutesCheck {
    findings: Findings,
}

impl RoutesCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn detect(&self, ctx: &CheckContext) -> Result<Findings, DoctorError> {
        let mut findings = Findings::default();
        let existing = read_routes(&ctx.town.routes_path())?;

        let mut required = town_routes();
        for rig in ctx.rig_names() {
            let Some(prefix) = ctx.registry.prefix_for_rig(&rig) else {
                continue;
            };
            let Some(canonical) = canonical_beads_dir(&ctx.town, &rig) else {
                findings
                    .preserved
                    .push(format!("{rig}: redirect chain is unresolvable"));
                continue;
            };
            required.push(Route::new(format!("{prefix}-"), canonical));
        }

        for want in required {
            let matches: Vec<&Route> = existing
                .iter()
                .filter(|r| r.prefix == want.prefix)
                .collect();
            match matches.as_slice() {
                [] => findings.missing.push(want),
                [route] if route.path == want.path => {}
                [route] => {
                    let canonical_has_db =
                        ctx.town.root().join(&want.path).join(".beads").is_dir();
                    if canonical_has_db {
                        findings.rewrites.push(want);
                    } else {
                        findings.preserved.push(format!(
                            "{} points at {} but canonical {} has no beads directory",
                            route.prefix, route.path, want.path
                        ));
                    }
                }
                _ => {
                    // Ambiguous source; never rewrite duplicates
                    findings.preserved.push(format!(
                        "{} appears {} times, not rewriting",
                        want.prefix,
                        matches.len()
                    ));
                }
            }
        }

        Ok(findings)
    }
}

#[async_trait]
impl Check for RoutesCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "routes.jsonl carries the town routes and each rig's canonical beads path"
    }

    fn category(&self) -> Category {
        Category::Routes
    }

    fn can_fix(&self) -> bool {
        true
    }

    async fn run(&mut self, ctx: &CheckContext) -> CheckResult {
        self.findings = Findings::default();
        let findings = match self.detect(ctx) {
            Ok(findings) => findings,
            Err(e) => {
                return CheckResult::warning(NAME, Category::Routes, format!("detection failed: {e}"))
            }
        };

        let mut details: Vec<String> = findings
            .missing
            .iter()
            .map(|r| format!("missing route {} -> {}", r.prefix, r.path))
            .collect();
        details.extend(
            findings
                .rewrites
                .iter()
                .map(|r| format!("route {} should point at {}", r.prefix, r.path)),
        );
        details.extend(findings.preserved.iter().cloned());

        let result = if !findings.missing.is_empty() || !findings.rewrites.is_empty() {
            CheckResult::error(
                NAME,
                Category::Routes,
                format!(
                    "{} missing, {} stale route(s)",
                    findings.missing.len(),
                    findings.rewrites.len()
                ),
            )
            .with_details(details)
            .with_fix_hint("gt doctor --fix adds and rewrites routes")
        } else if !findings.preserved.is_empty() {
            CheckResult::warning(NAME, Category::Routes, "unresolvable route mismatches")
                .with_details(details)
        } else {
            CheckResult::ok(NAME, Category::Routes, "routes are canonical")
        };

        self.findings = findings;
        result
    }

    async fn fix(&mut self, ctx: &CheckContext) -> Result<(), DoctorError> {
        // Cheap detection: re-derive so fix-before-run still behaves
        if self.findings.missing.is_empty() && self.findings.rewrites.is_empty() {
            self.findings = self.detect(ctx)?;
        }

        let mut routes = read_routes(&ctx.town.routes_path())?;

        for rewrite in &self.findings.rewrites {
            let occurrences = routes.iter().filter(|r| r.prefix == rewrite.prefix).count();
            if occurrences != 1 {
                continue;
            }
            for route in routes.iter_mut() {
                if route.prefix == rewrite.prefix {
                    route.path = rewrite.path.clone();
                }
            }
        }

        for missing in &self.findings.missing {
            if routes.iter().any(|r| r.prefix == missing.prefix) {
                continue;
            }
            routes.push(missing.clone());
        }

        write_routes(&ctx.town.routes_path(), &routes)?;
        self.findings = Findings::default();
        Ok(())
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
