use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A locally created invoice, the input to the mapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Local invoice number; sent as the `reference` header on submission.
    pub number: String,
    /// When the invoice was created locally. Orders contingency batches.
    pub created_at: NaiveDateTime,
    /// Which tax document this invoice becomes.
    pub variant: DocumentVariant,
    /// Line items in stored order. Never resorted.
    pub lines: Vec<InvoiceLine>,
    pub customer: Customer,
    pub company: Company,
    /// Payment condition (`condicionOperacion`).
    pub operation_condition: OperationCondition,
    /// Aggregates computed from the lines (set by the builder).
    pub totals: InvoiceTotals,
}

/// A single invoice line. `unit_price` is always tax-inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Product description printed on the document.
    pub description: String,
    /// Seller's product code, if any.
    pub product_code: Option<String>,
}

/// Invoice-level aggregates, all rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of tax-inclusive line totals.
    pub subtotal: Decimal,
    /// Amount payable.
    pub total: Decimal,
    /// Total with the 13% VAT extracted.
    pub total_without_tax: Decimal,
}

/// Tax document variant, each carrying only the data it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentVariant {
    /// 01: Factura (consumer invoice).
    StandardInvoice,
    /// 03: Comprobante de Crédito Fiscal (B2B).
    FiscalCredit,
    /// 14: Factura de Sujeto Excluido.
    ExcludedSubject,
    /// 05: Nota de Crédito, amending a fiscal-credit document.
    CreditNote { related: RelatedDocumentRef },
    /// 06: Nota de Débito, amending a fiscal-credit document.
    DebitNote { related: RelatedDocumentRef },
}

impl DocumentVariant {
    /// The authority's document type for this variant.
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::StandardInvoice => DocumentType::Invoice,
            Self::FiscalCredit => DocumentType::FiscalCredit,
            Self::ExcludedSubject => DocumentType::ExcludedSubject,
            Self::CreditNote { .. } => DocumentType::CreditNote,
            Self::DebitNote { .. } => DocumentType::DebitNote,
        }
    }

    /// Document referenced by a note, if this is a note.
    pub fn related(&self) -> Option<&RelatedDocumentRef> {
        match self {
            Self::CreditNote { related } | Self::DebitNote { related } => Some(related),
            _ => None,
        }
    }
}

/// Reference from a credit/debit note to the fiscal-credit document it amends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDocumentRef {
    /// Generation code of the amended document.
    pub generation_code: String,
    /// Emission date of the amended document.
    pub emitted_on: NaiveDate,
}

/// CAT-002 document type codes used by this crate.
///
/// Serialized as the two-digit `tipoDte` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// 01: Factura.
    Invoice,
    /// 03: Comprobante de Crédito Fiscal.
    FiscalCredit,
    /// 05: Nota de Crédito.
    CreditNote,
    /// 06: Nota de Débito.
    DebitNote,
    /// 14: Factura de Sujeto Excluido.
    ExcludedSubject,
}

impl DocumentType {
    /// Two-digit `tipoDte` code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invoice => "01",
            Self::FiscalCredit => "03",
            Self::CreditNote => "05",
            Self::DebitNote => "06",
            Self::ExcludedSubject => "14",
        }
    }

    /// Parse from a `tipoDte` code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Invoice),
            "03" => Some(Self::FiscalCredit),
            "05" => Some(Self::CreditNote),
            "06" => Some(Self::DebitNote),
            "14" => Some(Self::ExcludedSubject),
            _ => None,
        }
    }

    /// JSON schema version the authority expects for this type.
    pub fn schema_version(&self) -> u8 {
        match self {
            Self::Invoice | Self::ExcludedSubject => 1,
            Self::FiscalCredit | Self::CreditNote | Self::DebitNote => 3,
        }
    }

    /// Whether the recipient is identified by NIT + NRC rather than a national ID.
    pub fn uses_taxpayer_recipient(&self) -> bool {
        matches!(self, Self::FiscalCredit | Self::CreditNote | Self::DebitNote)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown document type '{code}'")))
    }
}

/// `condicionOperacion` (CAT-016).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationCondition {
    /// 1: Contado.
    #[default]
    Cash,
    /// 2: A crédito.
    Credit,
    /// 3: Otro.
    Other,
}

impl OperationCondition {
    pub fn code(&self) -> u8 {
        match self {
            Self::Cash => 1,
            Self::Credit => 2,
            Self::Other => 3,
        }
    }
}

/// Authority environment (`ambiente`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// 00: Modo prueba.
    Test,
    /// 01: Modo producción.
    Production,
}

impl Environment {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Test => "00",
            Self::Production => "01",
        }
    }

    /// Environment fixed for this build by the `production` feature.
    pub fn for_build() -> Self {
        if cfg!(feature = "production") {
            Self::Production
        } else {
            Self::Test
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Issuing company (Emisor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Taxpayer ID. Required before submission.
    pub nit: Option<String>,
    /// Tax registry number. Required before submission.
    pub nrc: Option<String>,
    pub name: String,
    pub commercial_name: Option<String>,
    pub activity_code: String,
    pub activity_description: String,
    /// CAT-009 establishment type (e.g. "01" branch, "02" head office).
    pub establishment_type: String,
    /// Authority-assigned establishment code; empty when unassigned.
    pub establishment_code_mh: String,
    /// Issuer's own establishment code; empty when unassigned.
    pub establishment_code: String,
    /// Authority-assigned point-of-sale code; empty when unassigned.
    pub point_of_sale_code_mh: String,
    /// Issuer's own point-of-sale code; empty when unassigned.
    pub point_of_sale_code: String,
    pub address: Address,
    pub phone: String,
    pub email: String,
}

/// Invoice recipient (Receptor). Holds whichever identity fields the
/// local store has; the mapper picks the scheme the variant needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    /// National ID (DUI), 9 digits, unformatted or formatted.
    pub national_id: Option<String>,
    pub nit: Option<String>,
    pub nrc: Option<String>,
    pub commercial_name: Option<String>,
    pub activity_code: Option<String>,
    pub activity_description: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Postal address in authority terms (CAT-012 / CAT-013 codes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Department code, e.g. "06" San Salvador.
    pub department: String,
    /// Municipality code within the department.
    pub municipality: String,
    /// Free-text complement (street, number, colonia).
    pub complement: String,
}
