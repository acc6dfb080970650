use thiserror::Error;

/// Errors raised locally, before anything is sent to the tax authority.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DteError {
    /// National ID (DUI) is not exactly 9 digits.
    #[error("invalid document length: '{0}' must be exactly 9 digits")]
    InvalidDocumentLength(String),

    /// Generation code does not have the 8-4-4-4-12 uppercase hex shape.
    #[error("invalid generation code format: '{0}'")]
    InvalidGenerationCode(String),

    /// Emission time does not match `HH:mm:ss`.
    #[error("time '{0}' does not match the HH:mm:ss pattern")]
    TimePatternMismatch(String),

    /// Control number does not match the authority's pattern.
    #[error("invalid control number: {0}")]
    InvalidControlNumber(String),

    /// A field the document variant requires is absent on the input.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Control number / generation code were already assigned to this document.
    #[error("identifiers already assigned: generation code {0}")]
    AlreadyAssigned(String),

    /// Submission status moved along an edge the state machine does not allow.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Payload was built for one environment and is being sent to the other.
    #[error("payload built for environment {document} cannot be sent to environment {target}")]
    EnvironmentMismatch { document: String, target: String },

    /// One or more pre-flight validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Pre-flight rule a document can break. Codes group by document block:
/// `ID` identification, `EM` issuer, `RC` recipient, `CU` body, `RS` summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    GenerationCode,
    ControlNumber,
    EmissionDate,
    EmissionTime,
    OperationMode,
    Environment,
    IssuerIdentity,
    RecipientIdentity,
    ItemSequence,
    SummaryArithmetic,
    AmountScale,
}

impl ValidationRule {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GenerationCode => "DTE-ID-01",
            Self::ControlNumber => "DTE-ID-02",
            Self::EmissionDate => "DTE-ID-03",
            Self::EmissionTime => "DTE-ID-04",
            Self::OperationMode => "DTE-ID-05",
            Self::Environment => "DTE-ID-06",
            Self::IssuerIdentity => "DTE-EM-01",
            Self::RecipientIdentity => "DTE-RC-01",
            Self::ItemSequence => "DTE-CU-01",
            Self::SummaryArithmetic => "DTE-RS-01",
            Self::AmountScale => "DTE-RS-02",
        }
    }
}

/// One broken rule on a mapped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub rule: ValidationRule,
    /// JSON path of the offending field, e.g. `resumen.totalPagar`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(rule: ValidationRule, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.rule.code(), self.field, self.message)
    }
}

impl DteError {
    /// Collapse a list of validation errors into a single `DteError::Validation`.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(msg)
    }
}
