//! The closed set of account roles.
//!
//! Stored in `users.role` as TEXT; the strings must match the CHECK
//! constraint in the `create_users` migration.

use crate::text_enum::text_enum;

text_enum! {
    /// Role of an account. Decides which route groups the account may reach.
    pub enum Role: "role" {
        /// Hotel front-desk staff: registers and checks out guests.
        Hotel => "Hotel",
        /// Police officer attached to exactly one station.
        Police => "Police",
        /// Regional administrator: provisions accounts and stations.
        RegionalAdmin => "RegionalAdmin",
    }
}

impl Role {
    /// Whether accounts with this role must reference a police station.
    pub fn requires_station(self) -> bool {
        matches!(self, Role::Police)
    }
}
