use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::{DteDocument, serde_date};
use crate::core::format::{generate_generation_code, generate_time_string, validate_generation_code};
use crate::core::{DocumentType, DteError, Environment, validate_control_number};

/// The only currency the authority accepts.
pub const CURRENCY: &str = "USD";

/// `identificacion` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub version: u8,
    pub ambiente: String,
    pub tipo_dte: DocumentType,
    pub numero_control: Option<String>,
    pub codigo_generacion: Option<String>,
    /// 1 = prior transmission, 2 = deferred (contingency).
    pub tipo_modelo: u8,
    /// 1 = normal, 2 = contingency.
    pub tipo_operacion: u8,
    pub tipo_contingencia: Option<u8>,
    pub motivo_contin: Option<String>,
    #[serde(with = "serde_date::option")]
    pub fec_emi: Option<NaiveDate>,
    pub hor_emi: Option<String>,
    pub tipo_moneda: String,
}

/// CAT-005 contingency types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContingencyType {
    /// 1: Authority system not available.
    AuthorityUnavailable,
    /// 2: Issuer's system not available.
    IssuerSystemUnavailable,
    /// 3: Issuer's internet service failure.
    IssuerInternetFailure,
    /// 4: Issuer's power failure.
    IssuerPowerFailure,
    /// 5: Other reason; a free-text reason is mandatory.
    Other,
}

impl ContingencyType {
    pub fn code(&self) -> u8 {
        match self {
            Self::AuthorityUnavailable => 1,
            Self::IssuerSystemUnavailable => 2,
            Self::IssuerInternetFailure => 3,
            Self::IssuerPowerFailure => 4,
            Self::Other => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::AuthorityUnavailable),
            2 => Some(Self::IssuerSystemUnavailable),
            3 => Some(Self::IssuerInternetFailure),
            4 => Some(Self::IssuerPowerFailure),
            5 => Some(Self::Other),
            _ => None,
        }
    }
}

/// How a document is transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationMode {
    /// Sent immediately after issuance.
    #[default]
    Normal,
    /// Issued during an outage and reported later.
    Contingency {
        kind: ContingencyType,
        reason: Option<String>,
    },
}

/// Builds an `identificacion` block consistent with document type and mode.
///
/// Normal operation leaves `tipoContingencia` and `motivoContin` null;
/// contingency operation fills them and switches to the deferred model.
#[derive(Debug, Clone)]
pub struct IdentificationBuilder {
    document_type: DocumentType,
    environment: Environment,
    mode: OperationMode,
    control_number: Option<String>,
    generation_code: Option<String>,
    emitted_at: Option<NaiveDateTime>,
}

impl IdentificationBuilder {
    pub fn new(document_type: DocumentType, environment: Environment) -> Self {
        Self {
            document_type,
            environment,
            mode: OperationMode::Normal,
            control_number: None,
            generation_code: None,
            emitted_at: None,
        }
    }

    pub fn mode(mut self, mode: OperationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn control_number(mut self, number: impl Into<String>) -> Self {
        self.control_number = Some(number.into());
        self
    }

    pub fn generation_code(mut self, code: impl Into<String>) -> Self {
        self.generation_code = Some(code.into());
        self
    }

    pub fn emitted_at(mut self, at: NaiveDateTime) -> Self {
        self.emitted_at = Some(at);
        self
    }

    pub fn build(self) -> Result<Identification, DteError> {
        if let Some(number) = &self.control_number {
            validate_control_number(number, self.document_type)?;
        }
        if let Some(code) = &self.generation_code {
            validate_generation_code(code)?;
        }

        let (fec_emi, hor_emi) = match self.emitted_at {
            Some(at) => (Some(at.date()), Some(generate_time_string(at.time())?)),
            None => (None, None),
        };

        let (tipo_modelo, tipo_operacion, tipo_contingencia, motivo_contin) =
            mode_fields(&self.mode)?;

        Ok(Identification {
            version: self.document_type.schema_version(),
            ambiente: self.environment.code().to_string(),
            tipo_dte: self.document_type,
            numero_control: self.control_number,
            codigo_generacion: self.generation_code,
            tipo_modelo,
            tipo_operacion,
            tipo_contingencia,
            motivo_contin,
            fec_emi,
            hor_emi,
            tipo_moneda: CURRENCY.to_string(),
        })
    }
}

type ModeFields = (u8, u8, Option<u8>, Option<String>);

fn mode_fields(mode: &OperationMode) -> Result<ModeFields, DteError> {
    match mode {
        OperationMode::Normal => Ok((1, 1, None, None)),
        OperationMode::Contingency { kind, reason } => {
            let reason = reason
                .as_ref()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());
            if *kind == ContingencyType::Other && reason.is_none() {
                return Err(DteError::Builder(
                    "contingency type 5 requires a reason".into(),
                ));
            }
            Ok((2, 2, Some(kind.code()), reason))
        }
    }
}

impl DteDocument {
    /// Assign control number, a fresh generation code and the emission
    /// instant. Call immediately before the first submission.
    ///
    /// Fails with `AlreadyAssigned` if the document already carries a
    /// generation code: a logical document keeps its identifiers forever.
    pub fn assign_identifiers(
        &mut self,
        control_number: impl Into<String>,
        at: NaiveDateTime,
    ) -> Result<(), DteError> {
        if let Some(code) = &self.identificacion.codigo_generacion {
            return Err(DteError::AlreadyAssigned(code.clone()));
        }
        let control_number = control_number.into();
        validate_control_number(&control_number, self.identificacion.tipo_dte)?;
        let hor_emi = generate_time_string(at.time())?;
        let code = generate_generation_code()?;

        let id = &mut self.identificacion;
        id.numero_control = Some(control_number);
        id.codigo_generacion = Some(code);
        id.fec_emi = Some(at.date());
        id.hor_emi = Some(hor_emi);
        Ok(())
    }

    /// Switch the document to contingency (or back to normal) operation.
    /// Only allowed before identifiers are assigned.
    pub fn set_operation_mode(&mut self, mode: &OperationMode) -> Result<(), DteError> {
        if let Some(code) = &self.identificacion.codigo_generacion {
            return Err(DteError::AlreadyAssigned(code.clone()));
        }
        let (tipo_modelo, tipo_operacion, tipo_contingencia, motivo_contin) = mode_fields(mode)?;
        let id = &mut self.identificacion;
        id.tipo_modelo = tipo_modelo;
        id.tipo_operacion = tipo_operacion;
        id.tipo_contingencia = tipo_contingencia;
        id.motivo_contin = motivo_contin;
        Ok(())
    }
}
