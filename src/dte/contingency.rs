//! Contingency report: one event listing every document issued while the
//! authority could not be reached.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::*;
use crate::core::format::{generate_generation_code, generate_time_string, validate_generation_code};
use crate::core::{DocumentType, DteError, Environment};

/// Schema version of the contingency report payload.
pub const CONTINGENCY_VERSION: u8 = 3;

/// The authority accepts at most this many documents per report.
pub const MAX_CONTINGENCY_DOCUMENTS: usize = 1_000;

/// Contingency report sent to `/document/contingencia/report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyReport {
    pub identificacion: ContingencyIdentification,
    pub emisor: ContingencyIssuer,
    #[serde(rename = "detalleDTE")]
    pub detalle_dte: Vec<ContingencyEntry>,
    pub motivo: ContingencyMotive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyIdentification {
    pub version: u8,
    pub ambiente: String,
    pub codigo_generacion: String,
    #[serde(with = "serde_date")]
    pub f_transmision: NaiveDate,
    pub h_transmision: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyIssuer {
    pub nit: String,
    pub nombre: String,
    pub nombre_responsable: String,
    pub tipo_doc_responsable: String,
    pub numero_doc_responsable: String,
    pub tipo_establecimiento: String,
    #[serde(rename = "codEstableMH")]
    pub cod_estable_mh: Option<String>,
    pub cod_punto_venta: Option<String>,
    pub telefono: String,
    pub correo: String,
}

/// One `detalleDTE` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyEntry {
    pub no_item: u32,
    pub codigo_generacion: String,
    pub tipo_doc: DocumentType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyMotive {
    #[serde(with = "serde_date")]
    pub f_inicio: NaiveDate,
    #[serde(with = "serde_date")]
    pub f_fin: NaiveDate,
    pub h_inicio: String,
    pub h_fin: String,
    pub tipo_contingencia: u8,
    pub motivo_contingencia: Option<String>,
}

/// Period during which the authority could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutageWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Builder for [`ContingencyReport`].
///
/// Documents are listed in the order they are added.
#[derive(Debug, Clone)]
pub struct ContingencyReportBuilder {
    issuer: Issuer,
    responsible: ResponsiblePerson,
    window: OutageWindow,
    kind: ContingencyType,
    reason: Option<String>,
    entries: Vec<(String, DocumentType)>,
}

impl ContingencyReportBuilder {
    pub fn new(
        issuer: Issuer,
        responsible: ResponsiblePerson,
        window: OutageWindow,
        kind: ContingencyType,
    ) -> Self {
        Self {
            issuer,
            responsible,
            window,
            kind,
            reason: None,
            entries: Vec::new(),
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn add_document(mut self, generation_code: impl Into<String>, doc_type: DocumentType) -> Self {
        self.entries.push((generation_code.into(), doc_type));
        self
    }

    pub fn build(self, environment: Environment, at: NaiveDateTime) -> Result<ContingencyReport, DteError> {
        if self.entries.is_empty() {
            return Err(DteError::Builder(
                "contingency report needs at least one document".into(),
            ));
        }
        if self.entries.len() > MAX_CONTINGENCY_DOCUMENTS {
            return Err(DteError::Builder(format!(
                "contingency report cannot list more than {MAX_CONTINGENCY_DOCUMENTS} documents"
            )));
        }
        if self.window.end < self.window.start {
            return Err(DteError::Builder(
                "outage window ends before it starts".into(),
            ));
        }
        let reason = self
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if self.kind == ContingencyType::Other && reason.is_none() {
            return Err(DteError::Builder(
                "contingency type 5 requires a reason".into(),
            ));
        }

        let mut detalle_dte = Vec::with_capacity(self.entries.len());
        for (i, (code, doc_type)) in self.entries.into_iter().enumerate() {
            validate_generation_code(&code)?;
            detalle_dte.push(ContingencyEntry {
                no_item: (i + 1) as u32,
                codigo_generacion: code,
                tipo_doc: doc_type,
            });
        }

        let issuer = self.issuer;
        Ok(ContingencyReport {
            identificacion: ContingencyIdentification {
                version: CONTINGENCY_VERSION,
                ambiente: environment.code().to_string(),
                codigo_generacion: generate_generation_code()?,
                f_transmision: at.date(),
                h_transmision: generate_time_string(at.time())?,
            },
            emisor: ContingencyIssuer {
                nit: issuer.nit,
                nombre: issuer.nombre,
                nombre_responsable: self.responsible.name,
                tipo_doc_responsable: self.responsible.document_type,
                numero_doc_responsable: self.responsible.document_number,
                tipo_establecimiento: issuer.tipo_establecimiento,
                cod_estable_mh: issuer.cod_estable_mh,
                cod_punto_venta: issuer.cod_punto_venta,
                telefono: issuer.telefono,
                correo: issuer.correo,
            },
            detalle_dte,
            motivo: ContingencyMotive {
                f_inicio: self.window.start.date(),
                f_fin: self.window.end.date(),
                h_inicio: generate_time_string(self.window.start.time())?,
                h_fin: generate_time_string(self.window.end.time())?,
                tipo_contingencia: self.kind.code(),
                motivo_contingencia: reason,
            },
        })
    }
}

impl ContingencyReport {
    /// Generation codes listed in the report, in report order.
    pub fn generation_codes(&self) -> impl Iterator<Item = &str> {
        self.detalle_dte.iter().map(|e| e.codigo_generacion.as_str())
    }
}
