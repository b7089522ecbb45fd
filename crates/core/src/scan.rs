//! Scan identity generation and code parsing.
//!
//! Every asset carries a unique scan token bound to its current display
//! snapshot. The token is derived from the asset id plus a SHA-256 hash
//! over the snapshot and the generation instant, so tokens are not
//! enumerable from one another and a regenerated token can never collide
//! with (or resurrect) a previously issued one.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::status::AssetStatus;
use crate::types::{DbId, Timestamp};

/// Prefix shared by all scan tokens.
pub const TOKEN_PREFIX: &str = "AST";

/// Hex characters of the hash component embedded in a token.
const TOKEN_HASH_LEN: usize = 16;

/// The payload encoded into a scannable code.
///
/// Carries enough display context that a decoded code renders without a
/// second lookup; only `token` is consulted for resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPayload {
    pub token: String,
    pub asset_id: DbId,
    pub name: String,
    pub asset_type: String,
    pub location: String,
    pub status: String,
}

/// Derive the scan token for an asset's display snapshot.
///
/// `stamped_at` is the instant of (re)generation; including it means a
/// later edit that restores earlier field values still yields a fresh
/// token, keeping invalidated tokens unresolvable forever.
pub fn generate_token(
    id: DbId,
    name: &str,
    asset_type: &str,
    location: &str,
    status: AssetStatus,
    custodian_name: Option<&str>,
    stamped_at: Timestamp,
) -> String {
    let snapshot = format!(
        "{id}|{name}|{asset_type}|{location}|{}|{}|{}",
        status.as_str(),
        custodian_name.unwrap_or(""),
        stamped_at.timestamp_micros(),
    );
    let digest = Sha256::digest(snapshot.as_bytes());
    let hex = format!("{digest:x}");
    format!("{TOKEN_PREFIX}-{id}-{}", &hex[..TOKEN_HASH_LEN])
}

/// Build the scannable payload for an asset.
pub fn payload_for(
    token: &str,
    id: DbId,
    name: &str,
    asset_type: &str,
    location: &str,
    status: AssetStatus,
) -> ScanPayload {
    ScanPayload {
        token: token.to_string(),
        asset_id: id,
        name: name.to_string(),
        asset_type: asset_type.to_string(),
        location: location.to_string(),
        status: status.as_str().to_string(),
    }
}

/// Extract the token from a presented code.
///
/// Accepts either a raw token string or a JSON payload containing a
/// `"token"` field (the shape produced by [`payload_for`]). Returns
/// `None` when nothing usable is present.
pub fn extract_token(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
        return value
            .get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string);
    }

    Some(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn token_for(id: DbId, name: &str) -> String {
        generate_token(
            id,
            name,
            "Laptop",
            "Floor 1",
            AssetStatus::Available,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn token_has_expected_shape() {
        let token = token_for(42, "Dell Laptop");
        assert!(token.starts_with("AST-42-"));
        let hash = token.rsplit('-').next().unwrap();
        assert_eq!(hash.len(), TOKEN_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_assets_get_distinct_tokens() {
        let now = Utc::now();
        let a = generate_token(1, "X", "Laptop", "L", AssetStatus::Available, None, now);
        let b = generate_token(2, "X", "Laptop", "L", AssetStatus::Available, None, now);
        assert_ne!(a, b);
    }

    #[test]
    fn field_change_changes_token() {
        let now = Utc::now();
        let before = generate_token(1, "X", "Laptop", "Floor 1", AssetStatus::Available, None, now);
        let after = generate_token(1, "X", "Laptop", "Floor 2", AssetStatus::Available, None, now);
        assert_ne!(before, after);
    }

    #[test]
    fn custodian_change_changes_token() {
        let now = Utc::now();
        let before = generate_token(1, "X", "Laptop", "L", AssetStatus::InUse, Some("jdoe"), now);
        let after = generate_token(1, "X", "Laptop", "L", AssetStatus::InUse, Some("asmith"), now);
        assert_ne!(before, after);
    }

    #[test]
    fn regeneration_instant_changes_token() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::microseconds(1);
        let before = generate_token(1, "X", "Laptop", "L", AssetStatus::Available, None, t0);
        let after = generate_token(1, "X", "Laptop", "L", AssetStatus::Available, None, t1);
        assert_ne!(before, after);
    }

    #[test]
    fn extract_raw_token() {
        assert_eq!(
            extract_token("  AST-42-abcdef0123456789 ").as_deref(),
            Some("AST-42-abcdef0123456789")
        );
    }

    #[test]
    fn extract_token_from_payload_json() {
        let payload = payload_for(
            "AST-42-abcdef0123456789",
            42,
            "Dell Laptop",
            "Laptop",
            "Floor 1",
            AssetStatus::Available,
        );
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(extract_token(&json).as_deref(), Some("AST-42-abcdef0123456789"));
    }

    #[test]
    fn extract_rejects_empty_and_malformed_json() {
        assert_eq!(extract_token(""), None);
        assert_eq!(extract_token("   "), None);
        assert_eq!(extract_token("{not json"), None);
        assert_eq!(extract_token(r#"{"asset_id": 42}"#), None);
    }

    #[test]
    fn payload_round_trips() {
        let payload = payload_for("t", 1, "X", "Laptop", "L", AssetStatus::InUse);
        let json = serde_json::to_string(&payload).unwrap();
        let back: ScanPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.asset_id, 1);
        assert_eq!(back.status, "In Use");
    }
}
