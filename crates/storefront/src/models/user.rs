//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use afrovibz_core::{Email, UserId, UserRole};

/// A storefront user.
///
/// Credentials are held by the account repository and never leave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Customer or admin.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
