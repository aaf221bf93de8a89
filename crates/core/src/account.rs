//! Account status, credential policy and provisioning helpers.

use rand::Rng;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::text_enum::text_enum;

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Random bytes behind a provisioned temporary password (hex-encoded, so the
/// password is twice as long).
const TEMP_PASSWORD_BYTES: usize = 8;

text_enum! {
    /// Administrative state of an account.
    pub enum AccountStatus: "account status" {
        Active => "Active",
        Suspended => "Suspended",
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Active
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Emails and usernames are compared trimmed and lower-cased.
pub fn normalize_identity(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize and validate an email address.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = normalize_identity(email);
    if !email.as_str().validate_email() {
        return Err(CoreError::Validation(
            "please provide a valid email address".into(),
        ));
    }
    Ok(email)
}

/// Normalize and validate a username (non-empty, no whitespace).
pub fn normalize_username(username: &str) -> Result<String, CoreError> {
    let username = normalize_identity(username);
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "username must be non-empty and contain no spaces".into(),
        ));
    }
    Ok(username)
}

/// Generate the one-time password handed to a freshly provisioned account.
pub fn generate_temporary_password() -> String {
    let bytes: [u8; TEMP_PASSWORD_BYTES] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
