//! Resolved caller identity.
//!
//! Authentication itself is an external collaborator; the core only
//! consumes an already-resolved user id and role.

use serde::{Deserialize, Serialize};

use common::UserId;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    #[default]
    Customer,

    /// Administrator: manages inventory, users, and order lifecycle.
    Admin,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Creates a customer identity.
    pub fn customer(id: UserId) -> Self {
        Self {
            id,
            role: Role::Customer,
        }
    }

    /// Creates an administrator identity.
    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_check() {
        let id = UserId::new();
        assert!(CurrentUser::admin(id).is_admin());
        assert!(!CurrentUser::customer(id).is_admin());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::Customer).unwrap(),
            "\"customer\""
        );
    }
}
