//! Audit trail constants and detail sanitization.
//!
//! This module lives in `core` (zero internal deps) so both the repository
//! layer and the API handlers can share the action vocabulary and the
//! free-text scrubbing applied before storage.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known action types for audit entries.
pub mod actions {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const DELETED: &str = "deleted";
    pub const SCANNED: &str = "scanned";
    pub const ASSIGNED: &str = "assigned";
    pub const UNASSIGNED: &str = "unassigned";
    pub const MAINTENANCE: &str = "maintenance";
    pub const AVAILABLE: &str = "available";
}

/// All valid audit actions.
///
/// Must match the CHECK constraint on `audit_entries.action`.
pub const ALL_ACTIONS: &[&str] = &[
    actions::CREATED,
    actions::UPDATED,
    actions::DELETED,
    actions::SCANNED,
    actions::ASSIGNED,
    actions::UNASSIGNED,
    actions::MAINTENANCE,
    actions::AVAILABLE,
];

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// Default audit retention window in days, overridable via configuration.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

// ---------------------------------------------------------------------------
// Detail sanitization
// ---------------------------------------------------------------------------

/// `http(s)://...` and `www....` URLs.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("static pattern compiles")
});

/// Bare `localhost` references with optional port and path.
static LOCALHOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blocalhost(?::\d+)?(?:/\S*)?").expect("static pattern compiles")
});

/// Absolute filesystem paths with at least two segments.
static ABS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)/[\w.-]+(?:/[\w.-]+)+").expect("static pattern compiles")
});

/// Strip URLs, host references, and absolute paths from free-text details.
///
/// Scan details may carry camera-decoded text or client-supplied location
/// strings that embed internal host/network information; those fragments
/// are removed before the entry is stored. Surrounding whitespace is
/// collapsed afterwards.
pub fn sanitize_details(details: &str) -> String {
    let cleaned = URL_RE.replace_all(details, "");
    let cleaned = LOCALHOST_RE.replace_all(&cleaned, "");
    let cleaned = ABS_PATH_RE.replace_all(&cleaned, " ");

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(
            sanitize_details("Scanned 'Dell Laptop' at Floor 2"),
            "Scanned 'Dell Laptop' at Floor 2"
        );
    }

    #[test]
    fn strips_http_url() {
        let out = sanitize_details("Scanned at http://intranet.corp:8080/scan?id=3 by jdoe");
        assert!(!out.contains("http"));
        assert!(!out.contains("intranet"));
        assert!(out.contains("by jdoe"));
    }

    #[test]
    fn strips_https_url() {
        let out = sanitize_details("see https://example.com/assets/42 for detail");
        assert_eq!(out, "see for detail");
    }

    #[test]
    fn strips_localhost_reference() {
        let out = sanitize_details("Scanned at localhost:5173/scanner");
        assert_eq!(out, "Scanned at");
    }

    #[test]
    fn strips_absolute_path() {
        let out = sanitize_details("image saved to /var/uploads/qr/asset-3.png today");
        assert_eq!(out, "image saved to today");
    }

    #[test]
    fn keeps_short_fragments() {
        // A lone slash or single-segment token is not treated as a path.
        assert_eq!(sanitize_details("room 3/4 east wing"), "room 3/4 east wing");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_details("  a   b  "), "a b");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize_details(""), "");
    }

    #[test]
    fn action_list_is_complete() {
        assert_eq!(ALL_ACTIONS.len(), 8);
        assert!(ALL_ACTIONS.contains(&actions::SCANNED));
        assert!(ALL_ACTIONS.contains(&actions::MAINTENANCE));
    }
}
