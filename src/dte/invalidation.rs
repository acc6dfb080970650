//! Invalidation (anulación) of an already accepted document.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use super::*;
use crate::core::format::{generate_generation_code, generate_time_string, validate_generation_code};
use crate::core::{DocumentType, DteError, Environment};

/// Schema version of the invalidation payload.
pub const INVALIDATION_VERSION: u8 = 2;

/// CAT-022 identity document type for a NIT.
pub const ID_TYPE_NIT: &str = "36";

/// Invalidation request sent to `/document/dte/invalidate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidationRequest {
    pub identificacion: InvalidationIdentification,
    pub emisor: InvalidationIssuer,
    pub documento: InvalidatedDocument,
    pub motivo: InvalidationMotive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationIdentification {
    pub version: u8,
    pub ambiente: String,
    pub codigo_generacion: String,
    #[serde(with = "serde_date")]
    pub fec_anula: NaiveDate,
    pub hor_anula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationIssuer {
    pub nit: String,
    pub nombre: String,
    pub tipo_establecimiento: String,
    pub nom_establecimiento: Option<String>,
    #[serde(rename = "codEstableMH")]
    pub cod_estable_mh: Option<String>,
    pub cod_estable: Option<String>,
    #[serde(rename = "codPuntoVentaMH")]
    pub cod_punto_venta_mh: Option<String>,
    pub cod_punto_venta: Option<String>,
    pub telefono: Option<String>,
    pub correo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidatedDocument {
    pub tipo_dte: DocumentType,
    pub codigo_generacion: String,
    pub sello_recibido: String,
    pub numero_control: String,
    #[serde(with = "serde_date")]
    pub fec_emi: NaiveDate,
    pub monto_iva: Option<Decimal>,
    /// Generation code of the replacement document, if any.
    #[serde(rename = "codigoGeneracionR")]
    pub codigo_generacion_r: Option<String>,
    pub tipo_documento: Option<String>,
    pub num_documento: Option<String>,
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationMotive {
    pub tipo_anulacion: u8,
    pub motivo_anulacion: Option<String>,
    pub nombre_responsable: String,
    pub tip_doc_responsable: String,
    pub num_doc_responsable: String,
    pub nombre_solicita: String,
    pub tip_doc_solicita: String,
    pub num_doc_solicita: String,
}

/// Why a document is invalidated (CAT-024).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationType {
    /// 1: Error in the document; a replacement document was issued.
    Error { replacement_code: String },
    /// 2: The operation was rescinded; no replacement.
    Rescind,
    /// 3: Other reason, with a replacement and a description.
    Other {
        replacement_code: String,
        reason: String,
    },
}

impl InvalidationType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Error { .. } => 1,
            Self::Rescind => 2,
            Self::Other { .. } => 3,
        }
    }

    fn replacement_code(&self) -> Option<&str> {
        match self {
            Self::Error { replacement_code } | Self::Other { replacement_code, .. } => {
                Some(replacement_code.as_str())
            }
            Self::Rescind => None,
        }
    }
}

/// Person named on an invalidation or contingency report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiblePerson {
    pub name: String,
    /// CAT-022 identity document type ("13" DUI, "36" NIT).
    pub document_type: String,
    pub document_number: String,
}

impl ResponsiblePerson {
    pub fn new(
        name: impl Into<String>,
        document_type: impl Into<String>,
        document_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            document_type: document_type.into(),
            document_number: document_number.into(),
        }
    }
}

impl InvalidationRequest {
    /// Build the invalidation of `doc`, previously accepted with `receipt_stamp`.
    ///
    /// `doc` must carry its assigned identifiers. A fresh generation code is
    /// produced for the invalidation event itself.
    pub fn for_document(
        doc: &DteDocument,
        receipt_stamp: &str,
        kind: InvalidationType,
        responsible: &ResponsiblePerson,
        requester: &ResponsiblePerson,
        environment: Environment,
        at: NaiveDateTime,
    ) -> Result<Self, DteError> {
        let id = &doc.identificacion;
        let codigo_generacion = id
            .codigo_generacion
            .clone()
            .ok_or_else(|| DteError::MissingField("identificacion.codigoGeneracion".into()))?;
        let numero_control = id
            .numero_control
            .clone()
            .ok_or_else(|| DteError::MissingField("identificacion.numeroControl".into()))?;
        let fec_emi = id
            .fec_emi
            .ok_or_else(|| DteError::MissingField("identificacion.fecEmi".into()))?;
        if receipt_stamp.trim().is_empty() {
            return Err(DteError::MissingField("selloRecibido".into()));
        }
        if let Some(code) = kind.replacement_code() {
            validate_generation_code(code)?;
            if code == codigo_generacion {
                return Err(DteError::Builder(
                    "replacement document must differ from the invalidated one".into(),
                ));
            }
        }
        if let InvalidationType::Other { reason, .. } = &kind {
            if reason.trim().is_empty() {
                return Err(DteError::Builder(
                    "invalidation type 3 requires a reason".into(),
                ));
            }
        }

        let (tipo_documento, num_documento, nombre, telefono, correo) = match &doc.recipient {
            RecipientBlock::Recipient(Recipient::NaturalPerson(r)) => (
                Some(r.tipo_documento.clone()),
                Some(r.num_documento.clone()),
                Some(r.nombre.clone()),
                r.telefono.clone(),
                r.correo.clone(),
            ),
            RecipientBlock::Recipient(Recipient::Taxpayer(r)) => (
                Some(ID_TYPE_NIT.to_string()),
                Some(r.nit.clone()),
                Some(r.nombre.clone()),
                r.telefono.clone(),
                r.correo.clone(),
            ),
            RecipientBlock::ExcludedSubject(r) => (
                Some(r.tipo_documento.clone()),
                Some(r.num_documento.clone()),
                Some(r.nombre.clone()),
                r.telefono.clone(),
                r.correo.clone(),
            ),
        };

        let emisor = &doc.emisor;
        let motivo_anulacion = match &kind {
            InvalidationType::Other { reason, .. } => Some(reason.trim().to_string()),
            _ => None,
        };

        Ok(Self {
            identificacion: InvalidationIdentification {
                version: INVALIDATION_VERSION,
                ambiente: environment.code().to_string(),
                codigo_generacion: generate_generation_code()?,
                fec_anula: at.date(),
                hor_anula: generate_time_string(at.time())?,
            },
            emisor: InvalidationIssuer {
                nit: emisor.nit.clone(),
                nombre: emisor.nombre.clone(),
                tipo_establecimiento: emisor.tipo_establecimiento.clone(),
                nom_establecimiento: emisor.nombre_comercial.clone(),
                cod_estable_mh: emisor.cod_estable_mh.clone(),
                cod_estable: emisor.cod_estable.clone(),
                cod_punto_venta_mh: emisor.cod_punto_venta_mh.clone(),
                cod_punto_venta: emisor.cod_punto_venta.clone(),
                telefono: Some(emisor.telefono.clone()).filter(|t| !t.is_empty()),
                correo: emisor.correo.clone(),
            },
            documento: InvalidatedDocument {
                tipo_dte: id.tipo_dte,
                codigo_generacion,
                sello_recibido: receipt_stamp.to_string(),
                numero_control,
                fec_emi,
                monto_iva: Some(doc.tax_amount()),
                codigo_generacion_r: kind.replacement_code().map(str::to_string),
                tipo_documento,
                num_documento,
                nombre,
                telefono,
                correo,
            },
            motivo: InvalidationMotive {
                tipo_anulacion: kind.code(),
                motivo_anulacion,
                nombre_responsable: responsible.name.clone(),
                tip_doc_responsable: responsible.document_type.clone(),
                num_doc_responsable: responsible.document_number.clone(),
                nombre_solicita: requester.name.clone(),
                tip_doc_solicita: requester.document_type.clone(),
                num_doc_solicita: requester.document_number.clone(),
            },
        })
    }

    /// Generation code of the invalidated document.
    pub fn target_generation_code(&self) -> &str {
        &self.documento.codigo_generacion
    }
}
