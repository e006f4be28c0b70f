//! User domain types.

use serde::{Deserialize, Serialize};

use crate::id::{RoleId, UserId};

/// Named authorization grouping. Users reference roles, they never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A user's membership in a role.
///
/// `role` is populated when the credential store loads the role alongside the
/// assignment; a freshly built assignment only knows the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role_id: RoleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl RoleAssignment {
    pub fn new(role_id: RoleId) -> Self {
        Self {
            role_id,
            role: None,
        }
    }
}

impl From<Role> for RoleAssignment {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id,
            role: Some(role),
        }
    }
}

/// Identity record as held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
}

impl User {
    /// Names of the loaded roles, in assignment order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles
            .iter()
            .filter_map(|a| a.role.as_ref().map(|r| r.name.clone()))
            .collect()
    }
}

/// Registration candidate handed to the credential store.
///
/// Carries a password hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password_hash: String,
    pub roles: Vec<RoleAssignment>,
}
