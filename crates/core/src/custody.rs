//! Custody transition planning.
//!
//! Pure functions deciding how assign/unassign/maintenance/release change
//! an asset's custody fields. Handlers load the current row, plan here,
//! then perform the guarded write; nothing in this module touches the
//! database.
//!
//! Invariant maintained by every plan: the custodian reference is
//! populated exactly when the status is `In Use`. When an asset leaves
//! custody, the holder's display name moves to `last_custodian_name` so
//! the dashboard can still show who had it.

use crate::audit::actions;
use crate::error::CoreError;
use crate::status::AssetStatus;
use crate::types::{DbId, Timestamp};

/// The custody-relevant fields of an asset as currently stored.
#[derive(Debug, Clone)]
pub struct CustodyState {
    pub status: AssetStatus,
    pub custodian_id: Option<DbId>,
    pub custodian_name: Option<String>,
    pub last_custodian_name: Option<String>,
}

/// A planned custody transition: replacement values for the custody
/// fields plus the audit entry describing the change.
#[derive(Debug, Clone)]
pub struct CustodyChange {
    pub status: AssetStatus,
    pub custodian_id: Option<DbId>,
    pub custodian_name: Option<String>,
    pub last_custodian_name: Option<String>,
    pub date_assigned: Option<Timestamp>,
    pub action: &'static str,
    pub details: String,
}

/// True when the status/custodian pair is internally consistent.
pub fn is_consistent(status: AssetStatus, custodian_id: Option<DbId>) -> bool {
    (status == AssetStatus::InUse) == custodian_id.is_some()
}

/// The display name to retain when the current holder leaves.
fn retained_name(cur: &CustodyState) -> Option<String> {
    cur.custodian_name
        .clone()
        .or_else(|| cur.last_custodian_name.clone())
}

/// Plan assigning `user` as the asset's custodian.
///
/// Rejects with a conflict only when the asset is already In Use by the
/// same user; assignment to a different user succeeds and refreshes
/// `date_assigned`.
pub fn plan_assign(
    cur: &CustodyState,
    asset_name: &str,
    user_id: DbId,
    username: &str,
    now: Timestamp,
) -> Result<CustodyChange, CoreError> {
    if cur.status == AssetStatus::InUse && cur.custodian_id == Some(user_id) {
        return Err(CoreError::Conflict(format!(
            "Asset '{asset_name}' is already assigned to {username}"
        )));
    }

    Ok(CustodyChange {
        status: AssetStatus::InUse,
        custodian_id: Some(user_id),
        custodian_name: Some(username.to_string()),
        last_custodian_name: None,
        date_assigned: Some(now),
        action: actions::ASSIGNED,
        details: format!("Assigned '{asset_name}' to {username}"),
    })
}

/// Plan clearing the asset's custodian and returning it to `Available`.
pub fn plan_unassign(cur: &CustodyState, asset_name: &str) -> Result<CustodyChange, CoreError> {
    if cur.status == AssetStatus::Available && cur.custodian_id.is_none() {
        return Err(CoreError::Conflict(format!(
            "Asset '{asset_name}' is not assigned"
        )));
    }

    let details = match cur.custodian_name {
        Some(ref holder) => format!("Unassigned '{asset_name}' from {holder}"),
        None => format!("Unassigned '{asset_name}'"),
    };

    Ok(CustodyChange {
        status: AssetStatus::Available,
        custodian_id: None,
        custodian_name: None,
        last_custodian_name: retained_name(cur),
        date_assigned: None,
        action: actions::UNASSIGNED,
        details,
    })
}

/// Plan moving the asset into maintenance.
///
/// Any active custodian reference is cleared; the prior holder's name is
/// retained for display.
pub fn plan_maintenance(cur: &CustodyState, asset_name: &str) -> Result<CustodyChange, CoreError> {
    if cur.status == AssetStatus::UnderMaintenance {
        return Err(CoreError::Conflict(format!(
            "Asset '{asset_name}' is already under maintenance"
        )));
    }

    let details = match cur.custodian_name {
        Some(ref holder) => {
            format!("Moved '{asset_name}' into maintenance, previously held by {holder}")
        }
        None => format!("Moved '{asset_name}' into maintenance"),
    };

    Ok(CustodyChange {
        status: AssetStatus::UnderMaintenance,
        custodian_id: None,
        custodian_name: None,
        last_custodian_name: retained_name(cur),
        date_assigned: None,
        action: actions::MAINTENANCE,
        details,
    })
}

/// Plan releasing the asset back into the available pool, from
/// maintenance or from use.
pub fn plan_release(cur: &CustodyState, asset_name: &str) -> Result<CustodyChange, CoreError> {
    if cur.status == AssetStatus::Available && cur.custodian_id.is_none() {
        return Err(CoreError::Conflict(format!(
            "Asset '{asset_name}' is already available"
        )));
    }

    Ok(CustodyChange {
        status: AssetStatus::Available,
        custodian_id: None,
        custodian_name: None,
        last_custodian_name: retained_name(cur),
        date_assigned: None,
        action: actions::AVAILABLE,
        details: format!("Released '{asset_name}' back to the available pool"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn unassigned() -> CustodyState {
        CustodyState {
            status: AssetStatus::Available,
            custodian_id: None,
            custodian_name: None,
            last_custodian_name: None,
        }
    }

    fn held_by(id: DbId, name: &str) -> CustodyState {
        CustodyState {
            status: AssetStatus::InUse,
            custodian_id: Some(id),
            custodian_name: Some(name.to_string()),
            last_custodian_name: None,
        }
    }

    // -- plan_assign ----------------------------------------------------------

    #[test]
    fn assign_available_asset() {
        let now = Utc::now();
        let change = plan_assign(&unassigned(), "Dell Laptop", 7, "jdoe", now).unwrap();
        assert_eq!(change.status, AssetStatus::InUse);
        assert_eq!(change.custodian_id, Some(7));
        assert_eq!(change.custodian_name.as_deref(), Some("jdoe"));
        assert_eq!(change.date_assigned, Some(now));
        assert_eq!(change.action, actions::ASSIGNED);
        assert!(change.details.contains("jdoe"));
        assert!(is_consistent(change.status, change.custodian_id));
    }

    #[test]
    fn assign_same_user_rejected() {
        let err = plan_assign(&held_by(7, "jdoe"), "Dell Laptop", 7, "jdoe", Utc::now())
            .unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[test]
    fn reassign_to_different_user_allowed() {
        let now = Utc::now();
        let change = plan_assign(&held_by(7, "jdoe"), "Dell Laptop", 8, "asmith", now).unwrap();
        assert_eq!(change.custodian_id, Some(8));
        assert_eq!(change.custodian_name.as_deref(), Some("asmith"));
        assert_eq!(change.date_assigned, Some(now));
    }

    #[test]
    fn assign_from_maintenance_allowed() {
        let cur = CustodyState {
            status: AssetStatus::UnderMaintenance,
            custodian_id: None,
            custodian_name: None,
            last_custodian_name: Some("jdoe".to_string()),
        };
        let change = plan_assign(&cur, "Projector", 8, "asmith", Utc::now()).unwrap();
        assert_eq!(change.status, AssetStatus::InUse);
        // A fresh holder supersedes the retained display name.
        assert_eq!(change.last_custodian_name, None);
    }

    // -- plan_unassign --------------------------------------------------------

    #[test]
    fn unassign_held_asset() {
        let change = plan_unassign(&held_by(7, "jdoe"), "Dell Laptop").unwrap();
        assert_eq!(change.status, AssetStatus::Available);
        assert_eq!(change.custodian_id, None);
        assert_eq!(change.custodian_name, None);
        assert_eq!(change.last_custodian_name.as_deref(), Some("jdoe"));
        assert_eq!(change.date_assigned, None);
        assert_eq!(change.action, actions::UNASSIGNED);
        assert!(is_consistent(change.status, change.custodian_id));
    }

    #[test]
    fn unassign_unassigned_rejected() {
        let err = plan_unassign(&unassigned(), "Dell Laptop").unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[test]
    fn unassign_from_maintenance_allowed() {
        let cur = CustodyState {
            status: AssetStatus::UnderMaintenance,
            custodian_id: None,
            custodian_name: None,
            last_custodian_name: Some("jdoe".to_string()),
        };
        let change = plan_unassign(&cur, "Projector").unwrap();
        assert_eq!(change.status, AssetStatus::Available);
        // Retained name survives transitions without an active holder.
        assert_eq!(change.last_custodian_name.as_deref(), Some("jdoe"));
    }

    // -- plan_maintenance -----------------------------------------------------

    #[test]
    fn maintenance_clears_custodian_but_keeps_name() {
        let change = plan_maintenance(&held_by(7, "jdoe"), "Dell Laptop").unwrap();
        assert_eq!(change.status, AssetStatus::UnderMaintenance);
        assert_eq!(change.custodian_id, None);
        assert_eq!(change.custodian_name, None);
        assert_eq!(change.last_custodian_name.as_deref(), Some("jdoe"));
        assert_eq!(change.action, actions::MAINTENANCE);
        assert!(change.details.contains("jdoe"));
        assert!(is_consistent(change.status, change.custodian_id));
    }

    #[test]
    fn maintenance_from_available_allowed() {
        let change = plan_maintenance(&unassigned(), "Dell Laptop").unwrap();
        assert_eq!(change.status, AssetStatus::UnderMaintenance);
        assert_eq!(change.last_custodian_name, None);
    }

    #[test]
    fn maintenance_twice_rejected() {
        let cur = CustodyState {
            status: AssetStatus::UnderMaintenance,
            custodian_id: None,
            custodian_name: None,
            last_custodian_name: None,
        };
        let err = plan_maintenance(&cur, "Dell Laptop").unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    // -- plan_release ---------------------------------------------------------

    #[test]
    fn release_from_maintenance() {
        let cur = CustodyState {
            status: AssetStatus::UnderMaintenance,
            custodian_id: None,
            custodian_name: None,
            last_custodian_name: Some("jdoe".to_string()),
        };
        let change = plan_release(&cur, "Dell Laptop").unwrap();
        assert_eq!(change.status, AssetStatus::Available);
        assert_eq!(change.action, actions::AVAILABLE);
        assert_eq!(change.last_custodian_name.as_deref(), Some("jdoe"));
    }

    #[test]
    fn release_held_asset() {
        let change = plan_release(&held_by(7, "jdoe"), "Dell Laptop").unwrap();
        assert_eq!(change.status, AssetStatus::Available);
        assert_eq!(change.custodian_id, None);
        assert!(is_consistent(change.status, change.custodian_id));
    }

    #[test]
    fn release_available_rejected() {
        let err = plan_release(&unassigned(), "Dell Laptop").unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    // -- is_consistent --------------------------------------------------------

    #[test]
    fn consistency_predicate() {
        assert!(is_consistent(AssetStatus::InUse, Some(1)));
        assert!(is_consistent(AssetStatus::Available, None));
        assert!(is_consistent(AssetStatus::Reservable, None));
        assert!(is_consistent(AssetStatus::UnderMaintenance, None));
        assert!(!is_consistent(AssetStatus::InUse, None));
        assert!(!is_consistent(AssetStatus::Available, Some(1)));
    }
}
