use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};

use crate::config::Passkey;

const COUNTRY_CODE: &str = "254";

/// Rewrites a Kenyan phone number into the `2547XXXXXXXX` shape Daraja expects.
///
/// Never fails: anything left after stripping separators gets the country code.
/// Use [`is_canonical`] to check the result.
pub fn canonicalize_phone(raw: &str) -> String {
    let phone: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '+')
        .collect();

    let phone = match phone.strip_prefix('0') {
        Some(rest) => format!("{COUNTRY_CODE}{rest}"),
        None => phone,
    };

    if phone.starts_with(COUNTRY_CODE) {
        phone
    } else {
        format!("{COUNTRY_CODE}{phone}")
    }
}

pub fn is_canonical(phone: &str) -> bool {
    phone.len() == 12 && phone.starts_with(COUNTRY_CODE) && phone.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYYMMDDHHMMSS` in UTC.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

pub fn derive_password(short_code: &str, passkey: &Passkey, timestamp: &str) -> String {
    STANDARD.encode(format!("{short_code}{}{timestamp}", passkey.secret()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SANDBOX_SHORT_CODE;
    use chrono::TimeZone;

    #[test]
    fn leading_zero_becomes_country_code() {
        assert_eq!(canonicalize_phone("0711000111"), "254711000111");
        assert_eq!(canonicalize_phone("0100200300"), "254100200300");
    }

    #[test]
    fn already_canonical_is_untouched() {
        let once = canonicalize_phone("254711000111");
        assert_eq!(once, "254711000111");
        assert_eq!(canonicalize_phone(&once), once);
    }

    #[test]
    fn separators_are_stripped_before_prefixing() {
        assert_eq!(
            canonicalize_phone("+254 711-000111"),
            canonicalize_phone("254711000111")
        );
        assert_eq!(canonicalize_phone(" 0711 000 111 "), "254711000111");
    }

    #[test]
    fn bare_subscriber_number_gets_prefix() {
        assert_eq!(canonicalize_phone("711000111"), "254711000111");
    }

    #[test]
    fn garbage_still_canonicalizes_but_fails_the_shape_check() {
        let phone = canonicalize_phone("call me");
        assert_eq!(phone, "254callme");
        assert!(!is_canonical(&phone));

        assert!(!is_canonical(&canonicalize_phone("07110001119")));
        assert!(is_canonical(&canonicalize_phone("0711000111")));
    }

    #[test]
    fn timestamp_is_fourteen_digits() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid date");
        assert_eq!(timestamp(at), "20240102030405");
    }

    #[test]
    fn password_is_base64_of_concatenation() {
        let passkey = Passkey::Live("passkey".into());
        assert_eq!(
            derive_password(SANDBOX_SHORT_CODE, &passkey, "20240102030405"),
            "MTc0Mzc5cGFzc2tleTIwMjQwMTAyMDMwNDA1"
        );
    }

    #[test]
    fn password_changes_with_each_input() {
        let passkey = Passkey::Live("passkey".into());
        let base = derive_password("174379", &passkey, "20240102030405");

        assert_eq!(base, derive_password("174379", &passkey, "20240102030405"));
        assert_ne!(base, derive_password("600000", &passkey, "20240102030405"));
        assert_ne!(
            base,
            derive_password("174379", &Passkey::Live("other".into()), "20240102030405")
        );
        assert_ne!(base, derive_password("174379", &passkey, "20240102030406"));
    }

    #[test]
    fn sandbox_password_uses_test_passkey() {
        let passkey = Passkey::resolve(SANDBOX_SHORT_CODE, Some(""));
        let expected = STANDARD.encode(format!(
            "{SANDBOX_SHORT_CODE}{}20240102030405",
            Passkey::Sandbox.secret()
        ));

        assert_eq!(
            derive_password(SANDBOX_SHORT_CODE, &passkey, "20240102030405"),
            expected
        );
    }
}
