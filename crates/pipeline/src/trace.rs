//! Bracketed error-path formatting.
//!
//! As a failure unwinds through nested graphs, every boundary prepends a
//! `[location]` tag to the message (see [`crate::TagError`] and the node
//! wrapping in [`crate::graph`]). [`format_error_path`] turns that
//! accumulated single-line trail into a readable multi-line report:
//!
//! ```text
//! Error Path:
//!   → Coordinator: classify_intent
//!   → IntentAgent: classify_intent
//!   → IntentTool.classify
//!   → OpenAiProvider.complete
//! Final Error: connection refused
//! ```

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("tag pattern is valid"));
static TAG_WITH_TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\s*").expect("tag pattern is valid"));

/// Renders the accumulated location tags of `message` as a multi-line
/// error-path report, listing each hop outermost call site first, followed
/// by the remaining free text as the final error.
///
/// A message with no bracketed tag is returned unchanged. Never fails.
pub fn format_error_path(message: &str) -> String {
    let hops: Vec<&str> = TAG
        .captures_iter(message)
        .filter_map(|captures| captures.get(1))
        .map(|hop| hop.as_str())
        .collect();

    if hops.is_empty() {
        return message.to_owned();
    }

    let final_error = TAG_WITH_TRAILING_SPACE.replace_all(message, "");
    let final_error = final_error.trim();

    let mut report = String::from("Error Path:\n");
    for hop in hops {
        report.push_str("  → ");
        report.push_str(hop);
        report.push('\n');
    }
    if !final_error.is_empty() {
        report.push_str("Final Error: ");
        report.push_str(final_error);
    }
    report
}
