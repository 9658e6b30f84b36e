//! User domain types.

use chrono::NaiveDate;
use serde::Serialize;

use ezelectronics_core::{Role, Username};

/// A registered user (domain type).
///
/// Password material is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique username.
    pub username: Username,
    /// First name.
    pub name: String,
    /// Last name.
    pub surname: String,
    /// Permission level.
    pub role: Role,
    /// Postal address, set through a profile update.
    pub address: Option<String>,
    /// Birth date, set through a profile update.
    pub birthdate: Option<NaiveDate>,
}

impl User {
    /// Returns true if this user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
