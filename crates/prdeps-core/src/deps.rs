//! Parsing of `deps:` override directives from PR bodies and comments.
//!
//! The block after a `deps:` marker holds one directive per line:
//!
//! ```text
//! deps:
//! use jitsi-utils alice/jitsi-utils fix-logging
//! use jicoco alice/jicoco fix-logging
//! ```
//!
//! Malformed lines are skipped with a warning; the rest still apply.

use tracing::{info, warn};

use crate::domain::overrides::{ComponentOverride, OverrideSet};

pub const DEPS_MARKER: &str = "deps:";
pub const USE_KEYWORD: &str = "use";

/// Return the text between the first `deps:` marker and the next one (or
/// the end of `text`). `None` when there is no marker.
pub fn extract_deps_block(text: &str) -> Option<&str> {
    let start = text.find(DEPS_MARKER)? + DEPS_MARKER.len();
    let rest = &text[start..];
    match rest.find(DEPS_MARKER) {
        Some(end) => Some(&rest[..end]),
        None => Some(rest),
    }
}

/// Parse one directive line. Errors carry a human-readable reason.
pub fn parse_line(line: &str) -> Result<ComponentOverride, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [keyword, component, repo, branch] if *keyword == USE_KEYWORD => {
            Ok(ComponentOverride::new(*component, *repo, *branch))
        }
        [keyword, _, _, _] => Err(format!("expected '{USE_KEYWORD}', found '{keyword}'")),
        _ => Err(format!(
            "expected 4 fields ({USE_KEYWORD} <component> <repo> <branch>), found {}",
            tokens.len()
        )),
    }
}

/// Parse every non-blank line of a deps block into an [`OverrideSet`].
pub fn parse_deps(block: &str) -> OverrideSet {
    let mut overrides = OverrideSet::new();
    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Ok(ov) => {
                info!(
                    "Will use branch {} from repo {} for component {}",
                    ov.branch, ov.repo, ov.component
                );
                overrides.insert(ov);
            }
            Err(reason) => warn!(line = %line, "invalid line: {reason}"),
        }
    }
    overrides
}

/// Find and parse the deps block in `text`. `None` when `text` has no
/// `deps:` marker at all.
pub fn parse_directive(text: &str) -> Option<OverrideSet> {
    let block = extract_deps_block(text)?;
    info!(deps = %block.trim(), "Got deps string");
    Some(parse_deps(block))
}
