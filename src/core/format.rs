//! Formatting and generation of authority-constrained strings.
//!
//! Every generator validates its own output against the pattern the tax
//! authority applies and returns an error instead of a malformed value.

use std::sync::LazyLock;

use chrono::NaiveTime;
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::DteError;

/// Shape the authority requires for `codigoGeneracion`.
pub static GENERATION_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-F0-9]{8}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{12}$")
        .expect("generation code pattern is valid")
});

/// Shape the authority requires for `horEmi` and other time fields.
pub static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").expect("time pattern is valid")
});

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Insert a hyphen in the middle of a phone number.
///
/// Empty input and input that already contains `-` are returned unchanged.
/// An odd length leaves the extra digit in the second half.
pub fn format_phone_number(raw: &str) -> String {
    if raw.is_empty() || raw.contains('-') {
        return raw.to_string();
    }
    let chars: Vec<char> = raw.chars().collect();
    let mid = chars.len() / 2;
    let first: String = chars[..mid].iter().collect();
    let second: String = chars[mid..].iter().collect();
    format!("{first}-{second}")
}

/// Format a 9-digit national ID (DUI) as `XXXXXXXX-X`.
pub fn format_national_id(raw: &str) -> Result<String, DteError> {
    if raw.len() != 9 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DteError::InvalidDocumentLength(raw.to_string()));
    }
    Ok(format!("{}-{}", &raw[..8], &raw[8..]))
}

/// Normalize a national ID that may already carry its hyphen.
pub(crate) fn normalize_national_id(raw: &str) -> Result<String, DteError> {
    let trimmed = raw.trim();
    if trimmed.len() == 10 && trimmed.as_bytes()[8] == b'-' {
        let digits: String = trimmed.chars().filter(|c| *c != '-').collect();
        return format_national_id(&digits);
    }
    format_national_id(trimmed)
}

/// Append an 8-character alphanumeric block and a 15-digit block to `base`.
///
/// With a `pattern`, a fixed `-01-` infix follows `base` and the result is
/// checked against it; a mismatch yields `None`.
pub fn generate_reference_code(base: &str, pattern: Option<&Regex>) -> Option<String> {
    let mut rng = rand::thread_rng();
    let alnum: String = (0..8)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
        .collect();
    let digits: String = (0..15)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    match pattern {
        None => Some(format!("{base}-{alnum}-{digits}")),
        Some(re) => {
            let code = format!("{base}-01-{alnum}-{digits}");
            re.is_match(&code).then_some(code)
        }
    }
}

/// Produce a fresh uppercase UUID-shaped generation code.
pub fn generate_generation_code() -> Result<String, DteError> {
    let code = Uuid::new_v4().hyphenated().to_string().to_uppercase();
    validate_generation_code(&code)?;
    Ok(code)
}

/// Check a generation code against the authority's pattern.
pub fn validate_generation_code(code: &str) -> Result<(), DteError> {
    if GENERATION_CODE_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(DteError::InvalidGenerationCode(code.to_string()))
    }
}

/// Format a time of day as 24-hour `HH:mm:ss`.
pub fn generate_time_string(instant: NaiveTime) -> Result<String, DteError> {
    let formatted = instant.format("%H:%M:%S").to_string();
    if TIME_PATTERN.is_match(&formatted) {
        Ok(formatted)
    } else {
        Err(DteError::TimePatternMismatch(formatted))
    }
}

/// Round half away from zero at `scale` digits.
pub fn round_decimal(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn phone_even_length() {
        assert_eq!(format_phone_number("22223333"), "2222-3333");
    }

    #[test]
    fn phone_odd_length_extra_digit_goes_right() {
        assert_eq!(format_phone_number("1234567"), "123-4567");
    }

    #[test]
    fn phone_passthrough() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("2222-3333"), "2222-3333");
    }

    #[test]
    fn national_id_formats() {
        assert_eq!(format_national_id("012345678").unwrap(), "01234567-8");
    }

    #[test]
    fn national_id_rejects_bad_input() {
        assert!(matches!(
            format_national_id("12345678"),
            Err(DteError::InvalidDocumentLength(_))
        ));
        assert!(matches!(
            format_national_id("12345678A"),
            Err(DteError::InvalidDocumentLength(_))
        ));
        assert!(format_national_id("01234567-8").is_err());
    }

    #[test]
    fn normalize_accepts_formatted_id() {
        assert_eq!(normalize_national_id("01234567-8").unwrap(), "01234567-8");
        assert_eq!(normalize_national_id("012345678").unwrap(), "01234567-8");
        assert!(normalize_national_id("0123456-78").is_err());
    }

    #[test]
    fn reference_code_without_pattern() {
        let code = generate_reference_code("DTE", None).unwrap();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "DTE");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 15);
        assert!(parts[2].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn reference_code_with_pattern() {
        let re = Regex::new(r"^DTE-01-[A-Z0-9]{8}-[0-9]{15}$").unwrap();
        let code = generate_reference_code("DTE", Some(&re)).unwrap();
        assert!(code.starts_with("DTE-01-"));
    }

    #[test]
    fn reference_code_pattern_mismatch_is_none() {
        let re = Regex::new(r"^XYZ-").unwrap();
        assert!(generate_reference_code("DTE", Some(&re)).is_none());
    }

    #[test]
    fn generation_code_shape() {
        let code = generate_generation_code().unwrap();
        assert_eq!(code.len(), 36);
        assert!(GENERATION_CODE_PATTERN.is_match(&code));
    }

    #[test]
    fn lowercase_generation_code_rejected() {
        assert!(validate_generation_code("0f8fad5b-d9cb-469f-a165-70867728950e").is_err());
    }

    #[test]
    fn time_string() {
        let t = NaiveTime::from_hms_opt(7, 5, 9).unwrap();
        assert_eq!(generate_time_string(t).unwrap(), "07:05:09");
        let t = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(generate_time_string(t).unwrap(), "23:59:59");
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_decimal(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_decimal(dec!(-2.345), 2), dec!(-2.35));
        assert_eq!(round_decimal(dec!(2.344), 2), dec!(2.34));
    }
}
