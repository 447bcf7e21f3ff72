//! Layering guardrails between the workspace crates.
//!
//! `polyemit_core` is pure vocabulary and has no dependencies. `polyemit_syntax` is the interchange model shared with
//! the external parser and may only depend on `polyemit_core` and `serde`. These tests scan the member manifests and
//! fail if either grows a dependency on the backend or its stack.

/// Dependency names listed in the `[dependencies]` table of a manifest.
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let deps = main_dependencies(include_str!("../crates/polyemit_core/Cargo.toml"));
    assert!(deps.is_empty(), "`polyemit_core` must stay dependency-free, found {:?}", deps);
}

#[test]
fn syntax_depends_only_on_core_and_serde() {
    let deps = main_dependencies(include_str!("../crates/polyemit_syntax/Cargo.toml"));
    for dep in &deps {
        assert!(
            dep == "polyemit_core" || dep == "serde",
            "`polyemit_syntax` must not depend on `{}`; keep backend concerns in the `polyemit` crate",
            dep
        );
    }
}

#[test]
fn backend_depends_on_both_members() {
    let deps = main_dependencies(include_str!("../Cargo.toml"));
    assert!(deps.iter().any(|d| d == "polyemit_core"));
    assert!(deps.iter().any(|d| d == "polyemit_syntax"));
}
