//! Asset lifecycle status enumeration and canonicalization.
//!
//! Statuses are stored as one canonical string form per variant. Input is
//! accepted case-insensitively (with `-`/`_` treated as spaces) and mapped
//! to the canonical form at the boundary; anything else is a validation
//! error.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Reservable")]
    Reservable,
    #[serde(rename = "In Use")]
    InUse,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
}

impl AssetStatus {
    /// All canonical status strings, in display order.
    pub const ALL: &'static [&'static str] =
        &["Available", "Reservable", "In Use", "Under Maintenance"];

    /// Return the canonical string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reservable => "Reservable",
            Self::InUse => "In Use",
            Self::UnderMaintenance => "Under Maintenance",
        }
    }

    /// Canonicalize a status string.
    ///
    /// Matching is case-insensitive and tolerant of `-`/`_` and extra
    /// whitespace between words, so `"in_use"`, `"IN USE"` and `"in-use"`
    /// all map to `In Use`. Unknown values are a validation error listing
    /// the accepted forms.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let normalized = input
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "reservable" => Ok(Self::Reservable),
            "in use" => Ok(Self::InUse),
            "under maintenance" => Ok(Self::UnderMaintenance),
            _ => Err(CoreError::Validation(format!(
                "'{input}' is not a valid status. Valid statuses are: {}",
                Self::ALL.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms_round_trip() {
        for name in AssetStatus::ALL {
            assert_eq!(AssetStatus::parse(name).unwrap().as_str(), *name);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            AssetStatus::parse("AVAILABLE").unwrap(),
            AssetStatus::Available
        );
        assert_eq!(AssetStatus::parse("in use").unwrap(), AssetStatus::InUse);
        assert_eq!(
            AssetStatus::parse("uNdEr MaInTeNaNcE").unwrap(),
            AssetStatus::UnderMaintenance
        );
    }

    #[test]
    fn parse_tolerates_separators_and_whitespace() {
        assert_eq!(AssetStatus::parse("in_use").unwrap(), AssetStatus::InUse);
        assert_eq!(AssetStatus::parse("in-use").unwrap(), AssetStatus::InUse);
        assert_eq!(
            AssetStatus::parse("  under   maintenance ").unwrap(),
            AssetStatus::UnderMaintenance
        );
    }

    #[test]
    fn unknown_status_rejected() {
        let err = AssetStatus::parse("broken").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("Under Maintenance"));
    }

    #[test]
    fn empty_status_rejected() {
        assert!(AssetStatus::parse("").is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(AssetStatus::InUse.to_string(), "In Use");
        assert_eq!(AssetStatus::Reservable.to_string(), "Reservable");
    }

    #[test]
    fn serde_uses_canonical_forms() {
        let json = serde_json::to_string(&AssetStatus::UnderMaintenance).unwrap();
        assert_eq!(json, "\"Under Maintenance\"");
        let back: AssetStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssetStatus::UnderMaintenance);
    }
}
