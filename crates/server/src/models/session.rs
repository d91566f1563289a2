//! Session-related types.
//!
//! The identity provider writes these into the shared session store when a
//! user signs in; this service only reads them.

use serde::{Deserialize, Serialize};

use bazaar_core::{UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID in the identity provider.
    pub id: UserId,
    /// What the user is allowed to do here.
    #[serde(default)]
    pub role: UserRole,
}

impl CurrentUser {
    /// A regular customer.
    #[must_use]
    pub const fn customer(id: UserId) -> Self {
        Self {
            id,
            role: UserRole::Customer,
        }
    }

    /// An administrator.
    #[must_use]
    pub const fn admin(id: UserId) -> Self {
        Self {
            id,
            role: UserRole::Admin,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
