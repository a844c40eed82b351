//! Users and per-object permissions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Object-level permission granted to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    CanView,
    CanEdit,
    CanAdmin,
    IsAuthor,
}

/// Body of the `permissions/` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PermissionsResponse {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl PermissionsResponse {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Editing concepts needs edit, admin or authorship.
    pub fn can_edit(&self) -> bool {
        self.permissions
            .iter()
            .any(|p| matches!(p, Permission::CanEdit | Permission::CanAdmin | Permission::IsAuthor))
    }
}
