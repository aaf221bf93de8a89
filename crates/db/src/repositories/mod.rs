//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod access_log_repo;
pub mod alert_repo;
pub mod guest_repo;
pub mod notification_repo;
pub mod remark_repo;
pub mod station_repo;
pub mod user_repo;

pub use access_log_repo::AccessLogRepo;
pub use alert_repo::AlertRepo;
pub use guest_repo::GuestRepo;
pub use notification_repo::NotificationRepo;
pub use remark_repo::RemarkRepo;
pub use station_repo::StationRepo;
pub use user_repo::UserRepo;

/// Wrap `term` as an `ILIKE` substring pattern, escaping `%`, `_` and `\`
/// so user input matches literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
