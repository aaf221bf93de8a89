//! Postal-code jurisdiction rules used to route cross-station notifications.

use crate::error::CoreError;
use crate::types::{DbId, PostalCode};

/// Derive a guest's postal code from a free-text address.
///
/// The postal code is the last token once the address is split on commas and
/// whitespace (`"12 MG Road, Bengaluru 560001"` -> `"560001"`). Trailing
/// punctuation on that token is ignored. Returns `None` for a blank address.
pub fn postal_code_from_address(address: &str) -> Option<PostalCode> {
    address
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|token| token.trim_matches(|c: char| c == '.' || c == ';' || c == '-'))
        .filter(|token| !token.is_empty())
        .last()
        .map(str::to_string)
}

/// Normalize a station's postal code list: trim, drop blanks, de-duplicate
/// (first occurrence wins). At least one code is required.
pub fn normalize_postal_codes<I, S>(codes: I) -> Result<Vec<PostalCode>, CoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<PostalCode> = Vec::new();
    for code in codes {
        let code = code.as_ref().trim();
        if !code.is_empty() && !out.iter().any(|c| c == code) {
            out.push(code.to_string());
        }
    }
    if out.is_empty() {
        return Err(CoreError::Validation(
            "name, city, and at least one postal code are required".into(),
        ));
    }
    Ok(out)
}

/// Split a comma-separated postal code list (`"560001, 560034"`).
pub fn split_postal_codes(raw: &str) -> Result<Vec<PostalCode>, CoreError> {
    normalize_postal_codes(raw.split(','))
}

/// Station that must be notified about a search, if any.
///
/// Only a search whose target station exists and differs from the searching
/// officer's own station crosses a jurisdiction boundary.
pub fn cross_jurisdiction_target(own_station: Option<DbId>, target: Option<DbId>) -> Option<DbId> {
    match target {
        Some(target) if own_station != Some(target) => Some(target),
        _ => None,
    }
}

/// A matched guest whose postal code lies in another station's jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JurisdictionHit {
    pub guest_name: String,
    pub postal_code: PostalCode,
}

/// Message delivered to each officer of a target station, covering every
/// match of one search that falls in that station's jurisdiction.
///
/// Repeated stays of the same guest under the same postal code are listed once.
pub fn cross_jurisdiction_message(
    officer_username: &str,
    officer_station: &str,
    hits: &[JurisdictionHit],
) -> String {
    let mut distinct: Vec<&JurisdictionHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if !distinct.contains(&hit) {
            distinct.push(hit);
        }
    }

    match distinct.as_slice() {
        [hit] => format!(
            "Officer {officer_username} of {officer_station} searched for guest {} \
             registered under postal code {} in your jurisdiction.",
            hit.guest_name, hit.postal_code
        ),
        many => {
            let listed: Vec<String> = many
                .iter()
                .map(|hit| format!("{} ({})", hit.guest_name, hit.postal_code))
                .collect();
            format!(
                "Officer {officer_username} of {officer_station} searched for guests \
                 registered in your jurisdiction: {}.",
                listed.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn postal_code_is_last_token() {
        assert_eq!(
            postal_code_from_address("14 80 Feet Rd, Koramangala, Bengaluru 560001").as_deref(),
            Some("560001")
        );
        assert_eq!(
            postal_code_from_address("Connaught Place, New Delhi,110001").as_deref(),
            Some("110001")
        );
    }

    #[test]
    fn trailing_punctuation_ignored() {
        assert_eq!(postal_code_from_address("Main St 560001.").as_deref(), Some("560001"));
    }

    #[test]
    fn blank_address_has_no_postal_code() {
        assert_eq!(postal_code_from_address("  , "), None);
        assert_eq!(postal_code_from_address(""), None);
    }

    #[test]
    fn postal_codes_are_trimmed_and_deduplicated() {
        let codes = normalize_postal_codes([" 560001", "560034 ", "", "560001"]).unwrap();
        assert_eq!(codes, vec!["560001", "560034"]);
    }

    #[test]
    fn empty_postal_code_list_rejected() {
        assert_matches!(normalize_postal_codes(Vec::<String>::new()), Err(CoreError::Validation(_)));
        assert_matches!(split_postal_codes(" , "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn comma_separated_codes_split() {
        assert_eq!(split_postal_codes("110001, 110002").unwrap(), vec!["110001", "110002"]);
    }

    #[test]
    fn same_station_is_not_a_target() {
        assert_eq!(cross_jurisdiction_target(Some(1), Some(1)), None);
        assert_eq!(cross_jurisdiction_target(Some(1), None), None);
    }

    #[test]
    fn other_station_is_a_target() {
        assert_eq!(cross_jurisdiction_target(Some(1), Some(2)), Some(2));
        assert_eq!(cross_jurisdiction_target(None, Some(2)), Some(2));
    }

    fn hit(name: &str, code: &str) -> JurisdictionHit {
        JurisdictionHit {
            guest_name: name.into(),
            postal_code: code.into(),
        }
    }

    #[test]
    fn message_names_officer_station_guest_and_postal_code() {
        let msg = cross_jurisdiction_message("raj", "Central", &[hit("Asha Rao", "560001")]);
        assert_eq!(
            msg,
            "Officer raj of Central searched for guest Asha Rao registered under postal code \
             560001 in your jurisdiction."
        );
    }

    #[test]
    fn repeated_stays_are_listed_once() {
        let stays = [hit("Asha Rao", "560001"), hit("Asha Rao", "560001")];
        assert_eq!(
            cross_jurisdiction_message("raj", "Central", &stays),
            cross_jurisdiction_message("raj", "Central", &stays[..1])
        );
    }

    #[test]
    fn several_matches_share_one_message() {
        let msg = cross_jurisdiction_message(
            "raj",
            "Central",
            &[hit("Asha Rao", "560001"), hit("Asha Rani", "560034")],
        );
        assert!(msg.starts_with("Officer raj of Central searched for guests"));
        assert!(msg.contains("Asha Rao (560001), Asha Rani (560034)"), "{msg}");
    }
}
