//! Code normalization and filename helpers shared by ingestion and extraction.

use crate::constants::utils::{HEARTBEATS_OPTION, PREAMBLE_PREFIXES};

/// Remove header lines (`import`, `set_option`, `open`) and zeroed heartbeat
/// options from a full proof file, then trim.
pub fn strip_preamble(text: &str) -> String {
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            if PREAMBLE_PREFIXES
                .iter()
                .any(|prefix| trimmed.starts_with(prefix))
            {
                return false;
            }
            !(trimmed.contains(HEARTBEATS_OPTION) && trimmed.contains('0'))
        })
        .collect();
    kept.join("\n").trim().to_string()
}

/// Make an identifier safe to use as a single path component.
pub fn sanitize_file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    match stem.as_str() {
        "" | "." | ".." => format!("_{stem}"),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_preamble_drops_headers_and_trims() {
        let text = "import Mathlib\nset_option maxHeartbeats 400000\nopen BigOperators Real\n\ntheorem t : 1 = 1 := by\n  rfl\n";
        assert_eq!(strip_preamble(text), "theorem t : 1 = 1 := by\n  rfl");
    }

    #[test]
    fn strip_preamble_drops_zeroed_heartbeats_inside_body() {
        let text = "theorem t : True := by\n  -- maxHeartbeats 0\n  trivial";
        assert_eq!(strip_preamble(text), "theorem t : True := by\n  trivial");
    }

    #[test]
    fn strip_preamble_keeps_indented_body_lines() {
        let text = "  theorem t : True := trivial";
        assert_eq!(strip_preamble(text), "theorem t : True := trivial");
        assert_eq!(strip_preamble(""), "");
    }

    #[test]
    fn sanitize_file_stem_replaces_separators() {
        assert_eq!(sanitize_file_stem("minif2f/test/p1"), "minif2f_test_p1");
        assert_eq!(sanitize_file_stem("a\\b"), "a_b");
        assert_eq!(sanitize_file_stem("plain_id"), "plain_id");
        assert_eq!(sanitize_file_stem(".."), "_..");
        assert_eq!(sanitize_file_stem(""), "_");
    }
}
