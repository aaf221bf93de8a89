//! Guest stay lifecycle, police search criteria and alert status.

use rand::Rng;

use crate::error::CoreError;
use crate::text_enum::text_enum;

/// Prefix of every generated customer id (`G-1A2B3C`).
pub const CUSTOMER_ID_PREFIX: &str = "G-";

text_enum! {
    /// Stay status. The only permitted transition is `CheckedIn -> CheckedOut`.
    pub enum GuestStatus: "guest status" {
        CheckedIn => "CheckedIn",
        CheckedOut => "CheckedOut",
    }
}

text_enum! {
    /// Gender recorded for primary and accompanying guests.
    pub enum Gender: "gender" {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

text_enum! {
    /// Status of a police alert. `Resolved` is terminal.
    pub enum AlertStatus: "alert status" {
        Open => "Open",
        Resolved => "Resolved",
    }
}

text_enum! {
    /// Field a police search matches against.
    pub enum SearchBy: "search field" {
        Name => "name",
        Phone => "phone",
        Id => "id",
    }
}

pub const ALREADY_CHECKED_OUT: &str = "this guest has already been checked out";

/// Ensure a stay may be checked out.
pub fn ensure_can_check_out(status: GuestStatus) -> Result<(), CoreError> {
    match status {
        GuestStatus::CheckedIn => Ok(()),
        GuestStatus::CheckedOut => Err(CoreError::Validation(ALREADY_CHECKED_OUT.into())),
    }
}

pub const ALREADY_RESOLVED: &str = "this alert has already been resolved";

/// Ensure an alert may be resolved.
pub fn ensure_can_resolve(status: AlertStatus) -> Result<(), CoreError> {
    match status {
        AlertStatus::Open => Ok(()),
        AlertStatus::Resolved => Err(CoreError::Validation(ALREADY_RESOLVED.into())),
    }
}

/// Trim an officer's remark, rejecting a missing or blank one.
pub fn normalize_remark(text: Option<&str>) -> Result<String, CoreError> {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CoreError::Validation("remark text is required".into())),
    }
}

/// Generate a customer id: `G-` followed by six upper-case hex digits.
pub fn generate_customer_id() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!("{CUSTOMER_ID_PREFIX}{hex}")
}

/// A validated police search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestSearch {
    pub search_by: SearchBy,
    pub query: String,
    pub reason: String,
}

impl GuestSearch {
    /// Validate raw request fields. All three are mandatory.
    pub fn parse(query: &str, search_by: &str, reason: &str) -> Result<Self, CoreError> {
        let query = query.trim();
        let reason = reason.trim();
        if query.is_empty() || search_by.trim().is_empty() || reason.is_empty() {
            return Err(CoreError::Validation(
                "search query, type (search_by), and reason are required".into(),
            ));
        }
        let search_by = search_by.trim().parse::<SearchBy>().map_err(|_| {
            CoreError::Validation("invalid search_by value. use 'name', 'phone', or 'id'".into())
        })?;
        Ok(Self {
            search_by,
            query: query.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Search description stored in the access log, e.g. `id: G-AB12CD`.
    pub fn audit_query(&self) -> String {
        format!("{}: {}", self.search_by, self.query)
    }
}
