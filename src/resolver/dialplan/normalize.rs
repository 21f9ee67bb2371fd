//! Normalization helpers shared across the dialplan resolver (§3(e), §4.1).

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
static TEN_DIGIT_NANP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+?1?)?(\d{10})$").unwrap());
static E164_EXTERNAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{10,15}$").unwrap());

/// Strip non-alphanumerics and lowercase — used to compare domains and
/// user-facing identifiers in a way that tolerates punctuation/case drift
/// (§4.1 inter-domain guard, direct-SIP-client match).
pub fn normalize_identifier(value: &str) -> String {
    NON_ALPHANUMERIC.replace_all(value, "").to_lowercase()
}

/// Canonical DID form: leading `+1` for North-American numbers (§3(e)).
/// A bare 10-digit input is promoted; anything already in `+1XXXXXXXXXX`
/// form, or any other shape, passes through unchanged.
pub fn canonical_did(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("+1{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        format!("+{digits}")
    } else {
        value.to_string()
    }
}

/// Matches `^(\+?1?)?(\d{10})$` (§4.1 outbound PSTN) and returns the
/// captured 10-digit national number.
pub fn match_ten_digit_nanp(destination: &str) -> Option<&str> {
    TEN_DIGIT_NANP
        .captures(destination)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
}

/// Matches `^\+?\d{10,15}$` (§4.1 external dial-out from internal).
pub fn is_external_dial_out(destination: &str) -> bool {
    E164_EXTERNAL.is_match(destination)
}

/// Strips a leading `+1` from a normalized number/name pair for inbound-DID
/// display purposes (§4.1 "Normalize both display-name and number (strip
/// leading \"+1\")").
pub fn strip_leading_plus_one(value: &str) -> String {
    value.strip_prefix("+1").map(str::to_string).unwrap_or_else(|| value.to_string())
}

/// The domain portion of a SIP channel name such as `sofia/internal/1001@b.example`.
pub fn domain_from_channel_name(channel_name: &str) -> Option<&str> {
    channel_name.rsplit_once('@').map(|(_, domain)| {
        domain.split(|c: char| c == '/' || c == ';' || c == ':').next().unwrap_or(domain)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_normalization_strips_punctuation_and_case() {
        assert_eq!(normalize_identifier("A.Example"), "aexample");
        assert_eq!(normalize_identifier("a-example"), "aexample");
    }

    #[test]
    fn canonical_did_promotes_bare_ten_digits() {
        assert_eq!(canonical_did("5125551234"), "+15125551234");
        assert_eq!(canonical_did("15125551234"), "+15125551234");
        assert_eq!(canonical_did("+15125551234"), "+15125551234");
    }

    #[test]
    fn ten_digit_nanp_matcher_captures_national_number() {
        assert_eq!(match_ten_digit_nanp("+15125559999"), Some("5125559999"));
        assert_eq!(match_ten_digit_nanp("15125559999"), Some("5125559999"));
        assert_eq!(match_ten_digit_nanp("5125559999"), Some("5125559999"));
        assert_eq!(match_ten_digit_nanp("1001"), None);
    }

    #[test]
    fn external_dial_out_matches_longer_international_numbers() {
        assert!(is_external_dial_out("+442071234567"));
        assert!(!is_external_dial_out("1001"));
    }

    #[test]
    fn channel_name_domain_extraction() {
        assert_eq!(domain_from_channel_name("sofia/internal/1001@b.example"), Some("b.example"));
        assert_eq!(domain_from_channel_name("sofia/internal/1001@b.example;transport=tcp"), Some("b.example"));
    }
}
