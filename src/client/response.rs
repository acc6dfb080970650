use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body returned by a successful document sync.
///
/// Every field is optional: the gateway forwards whatever the authority
/// sent back and older schema versions omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorityResponse {
    pub version: Option<u32>,
    pub ambiente: Option<String>,
    pub version_app: Option<u32>,
    /// "PROCESADO" or "RECHAZADO".
    pub estado: Option<String>,
    pub codigo_generacion: Option<String>,
    /// Receipt stamp; required later to invalidate the document.
    pub sello_recibido: Option<String>,
    pub fh_procesamiento: Option<String>,
    pub clasifica_msg: Option<String>,
    pub codigo_msg: Option<String>,
    pub descripcion_msg: Option<String>,
    pub observaciones: Vec<String>,
}

impl AuthorityResponse {
    pub fn is_processed(&self) -> bool {
        self.estado.as_deref() == Some("PROCESADO")
    }
}

/// A payment found by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRecord {
    pub order_reference: Option<String>,
    pub status: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub paid_at: Option<String>,
}

/// Outcome of a payment-status lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentStatus {
    Found(PaymentRecord),
    /// The gateway does not know the order yet. Not an error.
    Pending { order_reference: String },
}

impl PaymentStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
