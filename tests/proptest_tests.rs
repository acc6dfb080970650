//! Property-based tests for the formatting, identifier and tax helpers.
//!
//! Run with: `cargo test --test proptest_tests`

use std::collections::HashSet;

use dte_sv::core::calc::{self, TaxTreatment};
use dte_sv::core::format::GENERATION_CODE_PATTERN;
use dte_sv::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #[test]
    fn phone_with_hyphen_is_unchanged(a in "[0-9]{0,6}", b in "[0-9]{0,6}") {
        let s = format!("{a}-{b}");
        prop_assert_eq!(format_phone_number(&s), s);
    }

    #[test]
    fn phone_formatting_is_idempotent(raw in "[0-9]{1,12}") {
        let once = format_phone_number(&raw);
        prop_assert_eq!(format_phone_number(&once), once.clone());
        prop_assert_eq!(once.replace('-', ""), raw);
    }

    #[test]
    fn national_id_round_trip(d in "[0-9]{9}") {
        let formatted = format_national_id(&d).unwrap();
        prop_assert_eq!(formatted.len(), 10);
        prop_assert_eq!(formatted.matches('-').count(), 1);
        prop_assert_eq!(formatted.find('-'), Some(8));
        prop_assert_eq!(formatted.replace('-', ""), d);
    }

    #[test]
    fn national_id_wrong_length_fails(d in "[0-9]{0,8}|[0-9]{10,14}") {
        prop_assert!(matches!(
            format_national_id(&d),
            Err(DteError::InvalidDocumentLength(_))
        ));
    }

    #[test]
    fn national_id_with_non_digit_fails(prefix in "[0-9]{0,8}", bad in "[A-Za-z -]") {
        let mut d = prefix.clone();
        d.push_str(&bad);
        while d.chars().count() < 9 {
            d.push('0');
        }
        prop_assert!(format_national_id(&d).is_err());
    }

    #[test]
    fn inclusive_split_adds_up(qty in 1u32..50, cents in 1u64..100_000) {
        let price = Decimal::new(cents as i64, 2);
        let l = calc::compute_line(Decimal::from(qty), price, TaxTreatment::Inclusive);
        prop_assert_eq!(l.sale_amount, l.line_total);
        prop_assert!(l.tax <= l.line_total);
        prop_assert_eq!(l.tax, l.tax.round_dp(2));
    }

    #[test]
    fn exclusive_split_adds_up(qty in 1u32..50, cents in 1u64..100_000) {
        let price = Decimal::new(cents as i64, 2);
        let l = calc::compute_line(Decimal::from(qty), price, TaxTreatment::Exclusive);
        prop_assert_eq!(l.sale_amount + l.tax, l.line_total);
        prop_assert_eq!(l.unit_price, l.unit_price.round_dp(2));
    }

    #[test]
    fn words_mention_cents_only_when_present(dollars in 0u64..1_000_000, cents in 0u64..100) {
        let amount = Decimal::from(dollars) + Decimal::new(cents as i64, 2);
        let words = amount_to_words(amount);
        prop_assert!(words.contains("DÓLARES"));
        prop_assert_eq!(words.contains("CENTAVOS"), cents > 0);
    }
}

#[test]
fn thousand_generation_codes_are_distinct_and_well_formed() {
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let code = generate_generation_code().unwrap();
        assert!(GENERATION_CODE_PATTERN.is_match(&code), "{code}");
        assert!(seen.insert(code));
    }
    assert_eq!(seen.len(), 1000);
}
