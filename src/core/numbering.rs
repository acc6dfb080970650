use std::sync::LazyLock;

use regex::Regex;

use super::error::DteError;
use super::types::DocumentType;

/// Shape the authority requires for `numeroControl`.
pub static CONTROL_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DTE-(01|03|04|05|06|07|08|09|11|14|15)-[A-Z0-9]{8}-[0-9]{15}$")
        .expect("control number pattern is valid")
});

const MAX_SEQUENCE: u64 = 999_999_999_999_999;

/// Sequential control number generator for one document series.
///
/// Generates control numbers in the format
/// `DTE-{tipoDte}-{establishment + point of sale}-{15 digit sequence}`,
/// e.g. "DTE-01-M001P001-000000000000001".
///
/// Each document type and point of sale runs its own gapless series.
#[derive(Debug, Clone)]
pub struct ControlNumberSequence {
    document_type: DocumentType,
    series: String,
    next_number: u64,
}

impl ControlNumberSequence {
    /// Create a new sequence starting at 1.
    ///
    /// `series` is the 8-character establishment + point-of-sale code.
    pub fn new(document_type: DocumentType, series: impl Into<String>) -> Result<Self, DteError> {
        Self::starting_at(document_type, series, 1)
    }

    /// Create a sequence continuing from a given number.
    pub fn starting_at(
        document_type: DocumentType,
        series: impl Into<String>,
        next_number: u64,
    ) -> Result<Self, DteError> {
        let series = series.into().to_uppercase();
        if series.len() != 8 || !series.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DteError::InvalidControlNumber(format!(
                "series '{series}' must be 8 alphanumeric characters"
            )));
        }
        if next_number == 0 || next_number > MAX_SEQUENCE {
            return Err(DteError::InvalidControlNumber(format!(
                "sequence number {next_number} is out of range"
            )));
        }
        Ok(Self {
            document_type,
            series,
            next_number,
        })
    }

    /// Generate the next control number.
    pub fn next_control_number(&mut self) -> Result<String, DteError> {
        let number = self.peek()?;
        self.next_number += 1;
        Ok(number)
    }

    /// Preview the next control number without consuming it.
    pub fn peek(&self) -> Result<String, DteError> {
        if self.next_number > MAX_SEQUENCE {
            return Err(DteError::InvalidControlNumber(format!(
                "series {} is exhausted",
                self.series
            )));
        }
        Ok(format!(
            "DTE-{}-{}-{:015}",
            self.document_type.code(),
            self.series,
            self.next_number
        ))
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Get the next number that will be issued (without prefix/formatting).
    pub fn next_raw(&self) -> u64 {
        self.next_number
    }
}

/// Check a control number's shape and that it belongs to `document_type`.
pub fn validate_control_number(number: &str, document_type: DocumentType) -> Result<(), DteError> {
    if !CONTROL_NUMBER_PATTERN.is_match(number) {
        return Err(DteError::InvalidControlNumber(format!(
            "'{number}' does not match DTE-XX-XXXXXXXX-XXXXXXXXXXXXXXX"
        )));
    }
    let type_code = &number[4..6];
    if type_code != document_type.code() {
        return Err(DteError::InvalidControlNumber(format!(
            "'{number}' is a type {type_code} number, document is type {}",
            document_type.code()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_numbering() {
        let mut seq = ControlNumberSequence::new(DocumentType::Invoice, "M001P001").unwrap();
        assert_eq!(
            seq.next_control_number().unwrap(),
            "DTE-01-M001P001-000000000000001"
        );
        assert_eq!(
            seq.next_control_number().unwrap(),
            "DTE-01-M001P001-000000000000002"
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut seq = ControlNumberSequence::new(DocumentType::FiscalCredit, "m001p001").unwrap();
        assert_eq!(seq.peek().unwrap(), "DTE-03-M001P001-000000000000001");
        assert_eq!(seq.peek().unwrap(), "DTE-03-M001P001-000000000000001");
        seq.next_control_number().unwrap();
        assert_eq!(seq.next_raw(), 2);
    }

    #[test]
    fn starting_at() {
        let mut seq =
            ControlNumberSequence::starting_at(DocumentType::ExcludedSubject, "S001P002", 42)
                .unwrap();
        assert_eq!(
            seq.next_control_number().unwrap(),
            "DTE-14-S001P002-000000000000042"
        );
    }

    #[test]
    fn rejects_bad_series() {
        assert!(ControlNumberSequence::new(DocumentType::Invoice, "M001").is_err());
        assert!(ControlNumberSequence::new(DocumentType::Invoice, "M001-P01").is_err());
        assert!(ControlNumberSequence::starting_at(DocumentType::Invoice, "M001P001", 0).is_err());
    }

    #[test]
    fn exhausted_series() {
        let mut seq =
            ControlNumberSequence::starting_at(DocumentType::Invoice, "M001P001", MAX_SEQUENCE)
                .unwrap();
        assert!(seq.next_control_number().is_ok());
        assert!(seq.next_control_number().is_err());
    }

    #[test]
    fn generated_numbers_validate() {
        let mut seq = ControlNumberSequence::new(DocumentType::DebitNote, "M001P001").unwrap();
        let n = seq.next_control_number().unwrap();
        assert!(validate_control_number(&n, DocumentType::DebitNote).is_ok());
        assert!(validate_control_number(&n, DocumentType::Invoice).is_err());
    }

    #[test]
    fn validate_rejects_malformed() {
        assert!(
            validate_control_number("DTE-02-M001P001-000000000000001", DocumentType::Invoice)
                .is_err()
        );
        assert!(validate_control_number("DTE-01-M001P001-1", DocumentType::Invoice).is_err());
    }
}
