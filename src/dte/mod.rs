//! The electronic tax document (DTE) object graph and everything that
//! produces it: the invoice mapper, the identification builder, pre-flight
//! validation, and the invalidation and contingency payloads.
//!
//! Wire names follow the authority's JSON schemas exactly, so struct fields
//! mirror them in snake case. Fields whose presence depends on the document
//! variant live in per-variant types rather than in optional fields.
//!
//! # Example
//!
//! ```ignore
//! use dte_sv::dte::*;
//!
//! let mut doc = map_invoice(&invoice, Environment::for_build())?;
//! doc.assign_identifiers(sequence.next_control_number()?, now)?;
//! let problems = validate_for_submission(&doc);
//! assert!(problems.is_empty());
//! ```

mod contingency;
mod identification;
mod invalidation;
mod mapper;
pub mod serde_date;
mod validation;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::DocumentType;

pub use contingency::*;
pub use identification::*;
pub use invalidation::*;
pub use mapper::*;
pub use validation::*;

/// A complete tax document, ready to be serialized and submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DteDocument {
    pub identificacion: Identification,
    pub documento_relacionado: Option<Vec<RelatedDocument>>,
    pub emisor: Issuer,
    #[serde(flatten)]
    pub recipient: RecipientBlock,
    pub cuerpo_documento: Vec<DocumentItem>,
    pub resumen: Summary,
    pub extension: Option<Extension>,
    pub apendice: Option<Vec<Appendix>>,
}

impl DteDocument {
    pub fn document_type(&self) -> DocumentType {
        self.identificacion.tipo_dte
    }

    pub fn generation_code(&self) -> Option<&str> {
        self.identificacion.codigo_generacion.as_deref()
    }

    pub fn control_number(&self) -> Option<&str> {
        self.identificacion.numero_control.as_deref()
    }

    /// `totalPagar` of the summary.
    pub fn total_payable(&self) -> Decimal {
        match &self.resumen {
            Summary::Sale(s) => s.total_pagar,
            Summary::Purchase(s) => s.total_pagar,
        }
    }

    /// VAT carried by the document: `totalIva` for invoices, the tributo
    /// "20" amount for fiscal-credit documents and notes.
    pub fn tax_amount(&self) -> Decimal {
        match &self.resumen {
            Summary::Sale(s) => {
                let tributes: Decimal = s
                    .tributos
                    .iter()
                    .flatten()
                    .map(|t| t.valor)
                    .sum();
                s.total_iva + tributes
            }
            Summary::Purchase(_) => Decimal::ZERO,
        }
    }
}

/// Address block shared by issuer and recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Direccion {
    pub departamento: String,
    pub municipio: String,
    pub complemento: String,
}

impl From<&crate::core::Address> for Direccion {
    fn from(a: &crate::core::Address) -> Self {
        Self {
            departamento: a.department.clone(),
            municipio: a.municipality.clone(),
            complemento: a.complement.clone(),
        }
    }
}

/// `emisor` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub nit: String,
    pub nrc: String,
    pub nombre: String,
    pub cod_actividad: String,
    pub desc_actividad: String,
    pub nombre_comercial: Option<String>,
    pub tipo_establecimiento: String,
    pub direccion: Direccion,
    pub telefono: String,
    pub correo: String,
    #[serde(rename = "codEstableMH", skip_serializing_if = "Option::is_none")]
    pub cod_estable_mh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_estable: Option<String>,
    #[serde(rename = "codPuntoVentaMH", skip_serializing_if = "Option::is_none")]
    pub cod_punto_venta_mh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_punto_venta: Option<String>,
}

/// The counterparty block. Excluded-subject documents name it
/// `sujetoExcluido`; every other type uses `receptor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecipientBlock {
    #[serde(rename = "receptor")]
    Recipient(Recipient),
    #[serde(rename = "sujetoExcluido")]
    ExcludedSubject(ExcludedSubjectParty),
}

/// `receptor`: either a natural person identified by national ID, or a
/// taxpayer identified by NIT + NRC. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Recipient {
    NaturalPerson(NaturalPersonRecipient),
    Taxpayer(TaxpayerRecipient),
}

/// Recipient of a consumer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalPersonRecipient {
    /// CAT-022 identity document type ("13" = DUI).
    pub tipo_documento: String,
    pub num_documento: String,
    /// Always null for natural persons.
    pub nrc: Option<String>,
    pub nombre: String,
    pub cod_actividad: Option<String>,
    pub desc_actividad: Option<String>,
    pub direccion: Option<Direccion>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
}

/// Recipient of a fiscal-credit document or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxpayerRecipient {
    pub nit: String,
    pub nrc: String,
    pub nombre: String,
    pub cod_actividad: String,
    pub desc_actividad: String,
    pub nombre_comercial: Option<String>,
    pub direccion: Direccion,
    pub telefono: Option<String>,
    pub correo: Option<String>,
}

/// `sujetoExcluido` block of document type 14.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedSubjectParty {
    pub tipo_documento: String,
    pub num_documento: String,
    pub nombre: String,
    pub cod_actividad: Option<String>,
    pub desc_actividad: Option<String>,
    pub direccion: Direccion,
    pub telefono: Option<String>,
    pub correo: Option<String>,
}

/// `documentoRelacionado` entry of a credit or debit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedDocument {
    pub tipo_documento: DocumentType,
    /// 1 = physical, 2 = electronic.
    pub tipo_generacion: u8,
    pub numero_documento: String,
    #[serde(with = "serde_date")]
    pub fecha_emision: NaiveDate,
}

/// One entry of `cuerpoDocumento`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentItem {
    Sale(SaleItem),
    Purchase(PurchaseItem),
}

impl DocumentItem {
    pub fn num_item(&self) -> u32 {
        match self {
            Self::Sale(i) => i.num_item,
            Self::Purchase(i) => i.num_item,
        }
    }

    /// `ventaGravada` or `compra`.
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Sale(i) => i.venta_gravada,
            Self::Purchase(i) => i.compra,
        }
    }
}

/// Item of a sale document (01, 03, 05, 06).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub num_item: u32,
    pub tipo_item: u8,
    pub numero_documento: Option<String>,
    pub cantidad: Decimal,
    pub codigo: Option<String>,
    pub cod_tributo: Option<String>,
    pub uni_medida: u8,
    pub descripcion: String,
    pub precio_uni: Decimal,
    pub monto_descu: Decimal,
    pub venta_no_suj: Decimal,
    pub venta_exenta: Decimal,
    pub venta_gravada: Decimal,
    /// `None` on invoices, `["20"]` on fiscal-credit documents and notes.
    pub tributos: Option<Vec<String>>,
    #[serde(flatten)]
    pub tax: ItemTax,
}

/// Variant-specific trailing fields of a sale item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemTax {
    /// Invoice: tax-inclusive line with its own `ivaItem`.
    Inclusive {
        psv: Decimal,
        #[serde(rename = "noGravado")]
        no_gravado: Decimal,
        #[serde(rename = "ivaItem")]
        iva_item: Decimal,
    },
    /// Fiscal-credit document: no per-line VAT.
    Exclusive {
        psv: Decimal,
        #[serde(rename = "noGravado")]
        no_gravado: Decimal,
    },
    /// Credit and debit notes carry neither.
    Amendment {},
}

impl ItemTax {
    /// `ivaItem`, present only on invoice lines.
    pub fn iva_item(&self) -> Option<Decimal> {
        match self {
            Self::Inclusive { iva_item, .. } => Some(*iva_item),
            _ => None,
        }
    }
}

/// Item of an excluded-subject purchase document (14).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub num_item: u32,
    pub tipo_item: u8,
    pub cantidad: Decimal,
    pub codigo: Option<String>,
    pub uni_medida: u8,
    pub descripcion: String,
    pub precio_uni: Decimal,
    pub monto_descu: Decimal,
    pub compra: Decimal,
}

/// `resumen` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Sale(SaleSummary),
    Purchase(PurchaseSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub total_no_suj: Decimal,
    pub total_exenta: Decimal,
    pub total_gravada: Decimal,
    pub sub_total_ventas: Decimal,
    pub descu_no_suj: Decimal,
    pub descu_exenta: Decimal,
    pub descu_gravada: Decimal,
    pub porcentaje_descuento: Decimal,
    pub total_descu: Decimal,
    pub tributos: Option<Vec<TributeSummary>>,
    pub sub_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iva_perci1: Option<Decimal>,
    pub iva_rete1: Decimal,
    pub rete_renta: Decimal,
    pub monto_total_operacion: Decimal,
    pub total_no_gravado: Decimal,
    pub total_pagar: Decimal,
    pub total_letras: String,
    /// Σ `ivaItem`. Always zero on fiscal-credit documents.
    pub total_iva: Decimal,
    pub saldo_favor: Decimal,
    pub condicion_operacion: u8,
    pub pagos: Option<Vec<Payment>>,
    pub num_pago_electronico: Option<String>,
}

/// Summary-level tributo entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TributeSummary {
    pub codigo: String,
    pub descripcion: String,
    pub valor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub total_compra: Decimal,
    pub descu: Decimal,
    pub total_descu: Decimal,
    pub sub_total: Decimal,
    pub iva_rete1: Decimal,
    pub rete_renta: Decimal,
    pub total_pagar: Decimal,
    pub total_letras: String,
    pub condicion_operacion: u8,
    pub pagos: Option<Vec<Payment>>,
    pub observaciones: Option<String>,
}

/// `pagos` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// CAT-017 payment form ("01" = cash).
    pub codigo: String,
    pub monto_pago: Decimal,
    pub referencia: Option<String>,
    pub plazo: Option<String>,
    pub periodo: Option<u32>,
}

/// `extension` block (delivery details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub nomb_entrega: Option<String>,
    pub docu_entrega: Option<String>,
    pub nomb_recibe: Option<String>,
    pub docu_recibe: Option<String>,
    pub observaciones: Option<String>,
    pub placa_vehiculo: Option<String>,
}

/// `apendice` entry (free labelled field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appendix {
    pub campo: String,
    pub etiqueta: String,
    pub valor: String,
}
