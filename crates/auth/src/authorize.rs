use serde::Serialize;
use thiserror::Error;

use crate::{Identity, Role};

/// Back-office actions that carry a stricter per-action requirement than the
/// gate's per-route check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    /// Read catalog records (stores, categories, coupons).
    View,
    /// Create or update catalog records.
    Edit,
    /// Delete catalog records.
    Delete,
    /// Manage accounts, roles and site settings.
    ManageUsers,
}

impl AdminAction {
    pub const ALL: [AdminAction; 4] = [
        AdminAction::View,
        AdminAction::Edit,
        AdminAction::Delete,
        AdminAction::ManageUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::View => "view",
            AdminAction::Edit => "edit",
            AdminAction::Delete => "delete",
            AdminAction::ManageUsers => "manage_users",
        }
    }

    fn permits(&self, role: Role) -> bool {
        match self {
            AdminAction::View | AdminAction::Edit => role.is_elevated(),
            AdminAction::Delete | AdminAction::ManageUsers => role == Role::Admin,
        }
    }
}

impl core::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: role may not '{0}'")]
    Forbidden(AdminAction),
}

/// Authorize a single action for an identity the gate already let through.
///
/// - No IO
/// - No panics
pub fn authorize(identity: &Identity, action: AdminAction) -> Result<(), AuthzError> {
    let role = match (identity.is_authenticated, identity.role) {
        (true, Some(role)) => role,
        _ => return Err(AuthzError::Unauthenticated),
    };

    if action.permits(role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(action))
    }
}
