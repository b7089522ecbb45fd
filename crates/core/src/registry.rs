//! Asset field validation and patch application.
//!
//! `validate_create` turns a raw creation request into a full, consistent
//! field set; `apply_patch` applies a partial update to the stored fields,
//! producing the replacement values together with a human-readable diff,
//! the semantic status transition (if any), and whether the scan identity
//! must be regenerated. Both enforce the custody invariant: a custodian is
//! present exactly when the status is `In Use`.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::audit::actions;
use crate::custody;
use crate::error::CoreError;
use crate::status::AssetStatus;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Field sets
// ---------------------------------------------------------------------------

/// The full mutable field set of an asset.
///
/// Produced by [`validate_create`] for inserts and by [`apply_patch`] as
/// the replacement values of a guarded update.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFields {
    pub name: String,
    pub asset_type: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub location: String,
    pub status: AssetStatus,
    pub custodian_id: Option<DbId>,
    pub custodian_name: Option<String>,
    pub last_custodian_name: Option<String>,
    pub date_assigned: Option<Timestamp>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub warranty: Option<String>,
    pub image_ref: Option<String>,
}

/// Raw creation request fields, before validation.
///
/// The required text fields default to empty strings on deserialization
/// so that a missing field surfaces as a field-level validation error
/// rather than a body-decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAssetFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// A partial update. `None` = field untouched. Nullable fields use a
/// double `Option`: an explicit JSON `null` is `Some(None)` and clears
/// the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub subcategory: Option<Option<String>>,
    pub location: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub custodian_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub warranty: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_ref: Option<Option<String>>,
}

/// The custodian portion of a patch, with the display name already
/// resolved against the user directory by the caller.
#[derive(Debug, Clone)]
pub enum CustodianPatch {
    /// Leave the custodian untouched.
    Keep,
    /// Clear the custodian.
    Clear,
    /// Set (or replace) the custodian.
    Set { user_id: DbId, username: String },
}

/// The semantic transition recorded alongside a generic `updated` entry.
#[derive(Debug, Clone)]
pub struct StatusAction {
    pub action: &'static str,
    pub details: String,
}

/// Result of applying a patch.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// Replacement values for every mutable column.
    pub fields: AssetFields,
    /// Human-readable per-field diff entries; empty means a no-op patch.
    pub changed: Vec<String>,
    /// True when a display-identity field changed and the scan token must
    /// be regenerated.
    pub identity_changed: bool,
    /// Semantic status transition, when the patch implies one.
    pub status_action: Option<StatusAction>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Validate a creation request into a consistent field set.
///
/// `custodian` is the resolved initial holder, if any. Status defaults to
/// `Available`, or `In Use` when a custodian is supplied; an explicit
/// status contradicting the custodian is a validation error.
pub fn validate_create(
    input: &CreateAssetFields,
    custodian: Option<(DbId, String)>,
    now: Timestamp,
) -> Result<AssetFields, CoreError> {
    let name = required_text(&input.name, "Asset name")?;
    let asset_type = required_text(&input.asset_type, "Asset type")?;
    let location = required_text(&input.location, "Asset location")?;

    let status = match input.status {
        Some(ref s) => AssetStatus::parse(s)?,
        None if custodian.is_some() => AssetStatus::InUse,
        None => AssetStatus::Available,
    };

    if custodian.is_some() && status != AssetStatus::InUse {
        return Err(CoreError::Validation(format!(
            "Status '{status}' cannot be combined with a custodian"
        )));
    }
    if custodian.is_none() && status == AssetStatus::InUse {
        return Err(CoreError::Validation(
            "Status 'In Use' requires a custodian".to_string(),
        ));
    }

    let date_assigned = custodian.is_some().then_some(now);
    let (custodian_id, custodian_name) = match custodian {
        Some((id, username)) => (Some(id), Some(username)),
        None => (None, None),
    };

    Ok(AssetFields {
        name,
        asset_type,
        category: optional_text(&input.category),
        subcategory: optional_text(&input.subcategory),
        location,
        status,
        custodian_id,
        custodian_name,
        last_custodian_name: None,
        date_assigned,
        serial_number: optional_text(&input.serial_number),
        purchase_date: input.purchase_date,
        purchase_price: input.purchase_price,
        warranty: optional_text(&input.warranty),
        image_ref: optional_text(&input.image_ref),
    })
}

// ---------------------------------------------------------------------------
// Patch application
// ---------------------------------------------------------------------------

/// Apply a partial update to the stored fields.
///
/// Only supplied fields change. Contradictory combinations (a custodian
/// with a non-`In Use` status, `In Use` without a custodian) are rejected.
/// Setting a non-`In Use` status on a held asset releases the custodian as
/// part of the same transition.
pub fn apply_patch(
    current: &AssetFields,
    patch: &AssetPatch,
    custodian: &CustodianPatch,
    now: Timestamp,
) -> Result<PatchOutcome, CoreError> {
    let mut next = current.clone();
    let mut changed: Vec<String> = Vec::new();

    if let Some(ref value) = patch.name {
        let value = required_text(value, "Asset name")?;
        if value != next.name {
            changed.push(format!("name: '{}' -> '{}'", next.name, value));
            next.name = value;
        }
    }
    if let Some(ref value) = patch.asset_type {
        let value = required_text(value, "Asset type")?;
        if value != next.asset_type {
            changed.push(format!("type: '{}' -> '{}'", next.asset_type, value));
            next.asset_type = value;
        }
    }
    if let Some(ref value) = patch.location {
        let value = required_text(value, "Asset location")?;
        if value != next.location {
            changed.push(format!("location: '{}' -> '{}'", next.location, value));
            next.location = value;
        }
    }

    if let Some(ref value) = patch.category {
        apply_text_patch(&mut next.category, value, "category", &mut changed);
    }
    if let Some(ref value) = patch.subcategory {
        apply_text_patch(&mut next.subcategory, value, "subcategory", &mut changed);
    }
    if let Some(ref value) = patch.serial_number {
        apply_text_patch(&mut next.serial_number, value, "serial_number", &mut changed);
    }
    if let Some(ref value) = patch.warranty {
        apply_text_patch(&mut next.warranty, value, "warranty", &mut changed);
    }
    if let Some(ref value) = patch.image_ref {
        apply_text_patch(&mut next.image_ref, value, "image_ref", &mut changed);
    }

    if let Some(ref value) = patch.purchase_date {
        if next.purchase_date != *value {
            changed.push(format!(
                "purchase_date: {} -> {}",
                fmt_opt_display(next.purchase_date.as_ref()),
                fmt_opt_display(value.as_ref()),
            ));
            next.purchase_date = *value;
        }
    }
    if let Some(ref value) = patch.purchase_price {
        if next.purchase_price != *value {
            changed.push(format!(
                "purchase_price: {} -> {}",
                fmt_opt_display(next.purchase_price.as_ref()),
                fmt_opt_display(value.as_ref()),
            ));
            next.purchase_price = *value;
        }
    }

    let requested_status = patch
        .status
        .as_deref()
        .map(AssetStatus::parse)
        .transpose()?;

    let prior_holder = current.custodian_name.clone();
    let mut custodian_set = false;
    let mut custodian_cleared = false;

    match custodian {
        CustodianPatch::Set { user_id, username } => {
            if let Some(status) = requested_status {
                if status != AssetStatus::InUse {
                    return Err(CoreError::Validation(format!(
                        "Status '{status}' cannot be combined with a custodian"
                    )));
                }
            }
            let already_held =
                current.custodian_id == Some(*user_id) && current.status == AssetStatus::InUse;
            if !already_held {
                custodian_set = true;
                changed.push(format!(
                    "custodian: {} -> '{username}'",
                    fmt_opt(current.custodian_name.as_deref())
                ));
                next.custodian_id = Some(*user_id);
                next.custodian_name = Some(username.clone());
                next.last_custodian_name = None;
                next.date_assigned = Some(now);
            }
            if current.status != AssetStatus::InUse {
                changed.push(status_diff(current.status, AssetStatus::InUse));
                next.status = AssetStatus::InUse;
            }
        }
        CustodianPatch::Clear => {
            if requested_status == Some(AssetStatus::InUse) {
                return Err(CoreError::Validation(
                    "Status 'In Use' requires a custodian".to_string(),
                ));
            }
            let target = requested_status.unwrap_or(AssetStatus::Available);
            if current.custodian_id.is_some() {
                custodian_cleared = true;
                changed.push(format!(
                    "custodian: {} -> (none)",
                    fmt_opt(current.custodian_name.as_deref())
                ));
                next.last_custodian_name = current
                    .custodian_name
                    .clone()
                    .or_else(|| current.last_custodian_name.clone());
                next.custodian_id = None;
                next.custodian_name = None;
                next.date_assigned = None;
            }
            if target != current.status {
                changed.push(status_diff(current.status, target));
                next.status = target;
            }
        }
        CustodianPatch::Keep => {
            if let Some(target) = requested_status {
                if target == AssetStatus::InUse && current.custodian_id.is_none() {
                    return Err(CoreError::Validation(
                        "Status 'In Use' requires a custodian".to_string(),
                    ));
                }
                if target != current.status {
                    changed.push(status_diff(current.status, target));
                    next.status = target;
                    if target != AssetStatus::InUse && current.custodian_id.is_some() {
                        custodian_cleared = true;
                        changed.push(format!(
                            "custodian: {} -> (none)",
                            fmt_opt(current.custodian_name.as_deref())
                        ));
                        next.last_custodian_name = current
                            .custodian_name
                            .clone()
                            .or_else(|| current.last_custodian_name.clone());
                        next.custodian_id = None;
                        next.custodian_name = None;
                        next.date_assigned = None;
                    }
                }
            }
        }
    }

    debug_assert!(custody::is_consistent(next.status, next.custodian_id));

    let status_action = if custodian_set {
        let holder = next.custodian_name.clone().unwrap_or_default();
        Some(StatusAction {
            action: actions::ASSIGNED,
            details: format!("Assigned '{}' to {holder}", next.name),
        })
    } else if next.status != current.status {
        match next.status {
            AssetStatus::UnderMaintenance => Some(StatusAction {
                action: actions::MAINTENANCE,
                details: match prior_holder {
                    Some(ref holder) => format!(
                        "Moved '{}' into maintenance, previously held by {holder}",
                        next.name
                    ),
                    None => format!("Moved '{}' into maintenance", next.name),
                },
            }),
            AssetStatus::Available if custodian_cleared => Some(StatusAction {
                action: actions::UNASSIGNED,
                details: match prior_holder {
                    Some(ref holder) => format!("Unassigned '{}' from {holder}", next.name),
                    None => format!("Unassigned '{}'", next.name),
                },
            }),
            AssetStatus::Available => Some(StatusAction {
                action: actions::AVAILABLE,
                details: format!("Marked '{}' as available", next.name),
            }),
            // Reservable carries no semantic action; the generic update
            // entry covers it. In Use is reached only through custodian_set.
            AssetStatus::Reservable | AssetStatus::InUse => None,
        }
    } else {
        None
    };

    let identity_changed = next.name != current.name
        || next.asset_type != current.asset_type
        || next.location != current.location
        || next.status != current.status
        || next.custodian_name != current.custodian_name;

    Ok(PatchOutcome {
        fields: next,
        changed,
        identity_changed,
        status_action,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Double-`Option` deserializer: an absent field stays `None` (via
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)`, a value
/// becomes `Some(Some(v))`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

fn required_text(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text value, mapping empty strings to `None`.
fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn apply_text_patch(
    target: &mut Option<String>,
    value: &Option<String>,
    field: &str,
    changed: &mut Vec<String>,
) {
    let next = value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if *target != next {
        changed.push(format!(
            "{field}: {} -> {}",
            fmt_opt(target.as_deref()),
            fmt_opt(next.as_deref()),
        ));
        *target = next;
    }
}

fn fmt_opt(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{v}'"),
        None => "(none)".to_string(),
    }
}

fn fmt_opt_display<T: std::fmt::Display>(value: Option<&T>) -> String {
    match value {
        Some(v) => format!("'{v}'"),
        None => "(none)".to_string(),
    }
}

fn status_diff(from: AssetStatus, to: AssetStatus) -> String {
    format!("status: '{from}' -> '{to}'")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn create_input(name: &str, asset_type: &str, location: &str) -> CreateAssetFields {
        CreateAssetFields {
            name: name.to_string(),
            asset_type: asset_type.to_string(),
            location: location.to_string(),
            ..CreateAssetFields::default()
        }
    }

    fn stored_available() -> AssetFields {
        validate_create(
            &create_input("Dell Laptop", "Laptop", "Floor 1"),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn stored_held() -> AssetFields {
        validate_create(
            &create_input("Dell Laptop", "Laptop", "Floor 1"),
            Some((7, "jdoe".to_string())),
            Utc::now(),
        )
        .unwrap()
    }

    // -- validate_create ------------------------------------------------------

    #[test]
    fn create_defaults_to_available() {
        let fields = stored_available();
        assert_eq!(fields.status, AssetStatus::Available);
        assert_eq!(fields.custodian_id, None);
        assert_eq!(fields.date_assigned, None);
    }

    #[test]
    fn create_with_custodian_is_in_use() {
        let fields = stored_held();
        assert_eq!(fields.status, AssetStatus::InUse);
        assert_eq!(fields.custodian_id, Some(7));
        assert_eq!(fields.custodian_name.as_deref(), Some("jdoe"));
        assert!(fields.date_assigned.is_some());
    }

    #[test]
    fn create_rejects_empty_required_fields() {
        for input in [
            create_input("", "Laptop", "Floor 1"),
            create_input("Dell", "  ", "Floor 1"),
            create_input("Dell", "Laptop", ""),
        ] {
            let err = validate_create(&input, None, Utc::now()).unwrap_err();
            assert_matches!(err, CoreError::Validation(_));
        }
    }

    #[test]
    fn create_trims_fields() {
        let fields = validate_create(
            &create_input("  Dell Laptop ", " Laptop ", " Floor 1 "),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(fields.name, "Dell Laptop");
        assert_eq!(fields.asset_type, "Laptop");
        assert_eq!(fields.location, "Floor 1");
    }

    #[test]
    fn create_canonicalizes_status() {
        let mut input = create_input("Dell", "Laptop", "Floor 1");
        input.status = Some("under_maintenance".to_string());
        let fields = validate_create(&input, None, Utc::now()).unwrap();
        assert_eq!(fields.status, AssetStatus::UnderMaintenance);
    }

    #[test]
    fn create_rejects_invalid_status() {
        let mut input = create_input("Dell", "Laptop", "Floor 1");
        input.status = Some("borrowed".to_string());
        assert_matches!(
            validate_create(&input, None, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn create_rejects_in_use_without_custodian() {
        let mut input = create_input("Dell", "Laptop", "Floor 1");
        input.status = Some("In Use".to_string());
        assert_matches!(
            validate_create(&input, None, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn create_rejects_custodian_with_contradictory_status() {
        let mut input = create_input("Dell", "Laptop", "Floor 1");
        input.status = Some("Available".to_string());
        assert_matches!(
            validate_create(&input, Some((7, "jdoe".to_string())), Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn create_blanks_optional_fields() {
        let mut input = create_input("Dell", "Laptop", "Floor 1");
        input.serial_number = Some("   ".to_string());
        input.category = Some("IT Equipment".to_string());
        let fields = validate_create(&input, None, Utc::now()).unwrap();
        assert_eq!(fields.serial_number, None);
        assert_eq!(fields.category.as_deref(), Some("IT Equipment"));
    }

    // -- apply_patch: plain fields --------------------------------------------

    #[test]
    fn empty_patch_is_noop() {
        let current = stored_available();
        let outcome = apply_patch(
            &current,
            &AssetPatch::default(),
            &CustodianPatch::Keep,
            Utc::now(),
        )
        .unwrap();
        assert!(outcome.changed.is_empty());
        assert!(!outcome.identity_changed);
        assert!(outcome.status_action.is_none());
        assert_eq!(outcome.fields, current);
    }

    #[test]
    fn name_change_diffs_and_marks_identity() {
        let current = stored_available();
        let patch = AssetPatch {
            name: Some("HP Laptop".to_string()),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.fields.name, "HP Laptop");
        assert_eq!(outcome.changed, vec!["name: 'Dell Laptop' -> 'HP Laptop'"]);
        assert!(outcome.identity_changed);
        assert!(outcome.status_action.is_none());
    }

    #[test]
    fn same_value_patch_is_noop() {
        let current = stored_available();
        let patch = AssetPatch {
            name: Some("Dell Laptop".to_string()),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert!(outcome.changed.is_empty());
        assert!(!outcome.identity_changed);
    }

    #[test]
    fn empty_name_patch_rejected() {
        let current = stored_available();
        let patch = AssetPatch {
            name: Some("  ".to_string()),
            ..AssetPatch::default()
        };
        assert_matches!(
            apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn nullable_field_cleared_by_explicit_null() {
        let mut current = stored_available();
        current.serial_number = Some("SN-1".to_string());
        let patch = AssetPatch {
            serial_number: Some(None),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.fields.serial_number, None);
        assert_eq!(outcome.changed, vec!["serial_number: 'SN-1' -> (none)"]);
        // Procurement fields are not part of the display identity.
        assert!(!outcome.identity_changed);
    }

    #[test]
    fn purchase_fields_diff() {
        let current = stored_available();
        let patch = AssetPatch {
            purchase_date: Some(Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())),
            purchase_price: Some(Some(849.99)),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.changed.len(), 2);
        assert!(outcome.changed[0].contains("2025-03-14"));
        assert!(outcome.changed[1].contains("849.99"));
    }

    // -- apply_patch: custody and status --------------------------------------

    #[test]
    fn setting_custodian_moves_to_in_use() {
        let current = stored_available();
        let now = Utc::now();
        let custodian = CustodianPatch::Set {
            user_id: 7,
            username: "jdoe".to_string(),
        };
        let outcome = apply_patch(&current, &AssetPatch::default(), &custodian, now).unwrap();
        assert_eq!(outcome.fields.status, AssetStatus::InUse);
        assert_eq!(outcome.fields.custodian_id, Some(7));
        assert_eq!(outcome.fields.date_assigned, Some(now));
        assert!(outcome.identity_changed);
        let action = outcome.status_action.unwrap();
        assert_eq!(action.action, actions::ASSIGNED);
        assert!(action.details.contains("jdoe"));
    }

    #[test]
    fn setting_same_custodian_is_noop() {
        let current = stored_held();
        let custodian = CustodianPatch::Set {
            user_id: 7,
            username: "jdoe".to_string(),
        };
        let outcome =
            apply_patch(&current, &AssetPatch::default(), &custodian, Utc::now()).unwrap();
        assert!(outcome.changed.is_empty());
        assert!(outcome.status_action.is_none());
    }

    #[test]
    fn clearing_custodian_returns_to_available() {
        let current = stored_held();
        let outcome = apply_patch(
            &current,
            &AssetPatch::default(),
            &CustodianPatch::Clear,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(outcome.fields.status, AssetStatus::Available);
        assert_eq!(outcome.fields.custodian_id, None);
        assert_eq!(outcome.fields.last_custodian_name.as_deref(), Some("jdoe"));
        assert_eq!(outcome.fields.date_assigned, None);
        let action = outcome.status_action.unwrap();
        assert_eq!(action.action, actions::UNASSIGNED);
        assert!(action.details.contains("jdoe"));
    }

    #[test]
    fn clearing_unassigned_custodian_is_noop() {
        let current = stored_available();
        let outcome = apply_patch(
            &current,
            &AssetPatch::default(),
            &CustodianPatch::Clear,
            Utc::now(),
        )
        .unwrap();
        assert!(outcome.changed.is_empty());
        assert!(outcome.status_action.is_none());
    }

    #[test]
    fn custodian_with_contradictory_status_rejected() {
        let current = stored_available();
        let patch = AssetPatch {
            status: Some("Available".to_string()),
            ..AssetPatch::default()
        };
        let custodian = CustodianPatch::Set {
            user_id: 7,
            username: "jdoe".to_string(),
        };
        assert_matches!(
            apply_patch(&current, &patch, &custodian, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn in_use_status_without_custodian_rejected() {
        let current = stored_available();
        let patch = AssetPatch {
            status: Some("In Use".to_string()),
            ..AssetPatch::default()
        };
        assert_matches!(
            apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            apply_patch(&current, &patch, &CustodianPatch::Clear, Utc::now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn status_change_to_maintenance_releases_holder() {
        let current = stored_held();
        let patch = AssetPatch {
            status: Some("Under Maintenance".to_string()),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.fields.status, AssetStatus::UnderMaintenance);
        assert_eq!(outcome.fields.custodian_id, None);
        assert_eq!(outcome.fields.last_custodian_name.as_deref(), Some("jdoe"));
        let action = outcome.status_action.unwrap();
        assert_eq!(action.action, actions::MAINTENANCE);
        assert!(action.details.contains("jdoe"));
    }

    #[test]
    fn status_change_to_reservable_has_no_semantic_action() {
        let current = stored_available();
        let patch = AssetPatch {
            status: Some("Reservable".to_string()),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.fields.status, AssetStatus::Reservable);
        assert!(outcome.status_action.is_none());
        assert_eq!(outcome.changed.len(), 1);
        assert!(outcome.identity_changed);
    }

    #[test]
    fn status_change_from_maintenance_to_available() {
        let mut current = stored_available();
        current.status = AssetStatus::UnderMaintenance;
        let patch = AssetPatch {
            status: Some("available".to_string()),
            ..AssetPatch::default()
        };
        let outcome = apply_patch(&current, &patch, &CustodianPatch::Keep, Utc::now()).unwrap();
        assert_eq!(outcome.fields.status, AssetStatus::Available);
        let action = outcome.status_action.unwrap();
        assert_eq!(action.action, actions::AVAILABLE);
    }

    #[test]
    fn reassignment_refreshes_date_assigned() {
        let current = stored_held();
        let now = Utc::now();
        let custodian = CustodianPatch::Set {
            user_id: 8,
            username: "asmith".to_string(),
        };
        let outcome = apply_patch(&current, &AssetPatch::default(), &custodian, now).unwrap();
        assert_eq!(outcome.fields.custodian_id, Some(8));
        assert_eq!(outcome.fields.date_assigned, Some(now));
        let action = outcome.status_action.unwrap();
        assert_eq!(action.action, actions::ASSIGNED);
        assert!(action.details.contains("asmith"));
    }

    #[test]
    fn custody_invariant_holds_after_any_patch() {
        let cases = [
            (stored_available(), CustodianPatch::Keep),
            (stored_available(), CustodianPatch::Clear),
            (
                stored_available(),
                CustodianPatch::Set {
                    user_id: 7,
                    username: "jdoe".to_string(),
                },
            ),
            (stored_held(), CustodianPatch::Keep),
            (stored_held(), CustodianPatch::Clear),
            (
                stored_held(),
                CustodianPatch::Set {
                    user_id: 8,
                    username: "asmith".to_string(),
                },
            ),
        ];
        for (current, custodian) in cases {
            let outcome =
                apply_patch(&current, &AssetPatch::default(), &custodian, Utc::now()).unwrap();
            assert!(custody::is_consistent(
                outcome.fields.status,
                outcome.fields.custodian_id
            ));
        }
    }

    // -- wire format ----------------------------------------------------------

    #[test]
    fn patch_deserializes_double_options() {
        let patch: AssetPatch =
            serde_json::from_str(r#"{"name": "X", "serial_number": null}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("X"));
        assert_eq!(patch.serial_number, Some(None));
        assert_eq!(patch.warranty, None);
    }

    #[test]
    fn patch_deserializes_custodian_states() {
        let absent: AssetPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.custodian_id, None);

        let cleared: AssetPatch = serde_json::from_str(r#"{"custodian_id": null}"#).unwrap();
        assert_eq!(cleared.custodian_id, Some(None));

        let set: AssetPatch = serde_json::from_str(r#"{"custodian_id": 7}"#).unwrap();
        assert_eq!(set.custodian_id, Some(Some(7)));
    }
}
