//! Access-log action names and message formats.

/// Known `access_logs.action` values.
pub mod action_types {
    pub const GUEST_SEARCH: &str = "Guest Search";
    pub const ALERT_CREATED: &str = "Alert Created";
}

/// Upper bound on rows returned by an access-log query.
pub const MAX_QUERY_ROWS: i64 = 500;

/// Reason recorded when an officer flags a guest.
pub fn alert_reason(guest_name: &str, reason: &str) -> String {
    format!("flagged guest {guest_name} for: {reason}")
}

/// Case-insensitive substring match, the in-process equivalent of
/// `ILIKE '%term%'`.
pub fn matches_term(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}
