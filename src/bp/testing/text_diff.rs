//! Line-based text diffing utilities for testing
//!
//! Formatter output is compared byte for byte; when it differs, a unified diff (via
//! `similar`) shows where. Whitespace-only changes are made visible by marking line
//! ends with `⏎`.

use similar::TextDiff;

fn visible(text: &str) -> String {
    text.replace('\n', "⏎\n")
}

/// Compare two strings and return a diff report without panicking
///
/// Returns `None` if the strings are equal, or `Some(diff_report)` if they differ.
pub fn diff_text(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }
    let (expected, actual) = (visible(expected), visible(actual));
    let diff = TextDiff::from_lines(&expected, &actual);
    Some(format!(
        "Text differs:\n{}",
        diff.unified_diff().context_radius(3).header("expected", "actual")
    ))
}

/// Assert that two strings are equal, with a unified diff on failure
///
/// # Panics
///
/// Panics if the strings are not equal.
pub fn assert_text_eq(expected: &str, actual: &str) {
    if let Some(report) = diff_text(expected, actual) {
        panic!("\n\nText comparison failed.\n{report}");
    }
}
