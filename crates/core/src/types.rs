/// Primary keys are PostgreSQL BIGSERIAL columns.
pub type DbId = i64;

/// Every stored instant is UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Postal code as entered by hotel staff or station administrators.
pub type PostalCode = String;

/// Midnight UTC of the day containing `now`; the start of "today" for
/// registrations and dashboards.
pub fn start_of_day(now: Timestamp) -> Timestamp {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn start_of_day_truncates_to_midnight_utc() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 58).unwrap();
        let midnight = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(start_of_day(now), midnight);
        assert_eq!(start_of_day(midnight), midnight);
    }
}
