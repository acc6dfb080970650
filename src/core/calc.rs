//! VAT extraction and document aggregates under the fixed 13% rate.
//!
//! Stored unit prices are always tax-inclusive. Every amount is rounded once,
//! where it is computed, and the rounded value is carried forward.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::format::round_decimal;
use super::types::{DocumentType, InvoiceLine, InvoiceTotals};
use super::words::amount_to_words;

/// Tax-inclusive price multiplier (13% IVA).
pub const TAX_MULTIPLIER: Decimal = dec!(1.13);

/// Tributo code for IVA 13% on fiscal-credit documents.
pub const IVA_TRIBUTE_CODE: &str = "20";

/// How a document shows tax on its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxTreatment {
    /// Tax-inclusive prices with a per-line `ivaItem` (factura).
    Inclusive,
    /// Tax-exclusive prices, tax aggregated under tributo "20" (CCF and notes).
    Exclusive,
    /// No VAT at all (sujeto excluido).
    Untaxed,
}

impl TaxTreatment {
    pub fn for_document(doc_type: DocumentType) -> Self {
        match doc_type {
            DocumentType::Invoice => Self::Inclusive,
            DocumentType::FiscalCredit | DocumentType::CreditNote | DocumentType::DebitNote => {
                Self::Exclusive
            }
            DocumentType::ExcludedSubject => Self::Untaxed,
        }
    }
}

/// Per-line figures as they appear on the tax document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// quantity × tax-inclusive unit price.
    pub line_total: Decimal,
    /// Unit price as shown on the document.
    pub unit_price: Decimal,
    /// VAT contained in `line_total`.
    pub tax: Decimal,
    /// `ventaGravada` (or `compra` for untaxed documents).
    pub sale_amount: Decimal,
    /// `ivaItem`; only tax-inclusive documents carry it.
    pub line_tax_field: Option<Decimal>,
}

/// Compute one line's amounts.
pub fn compute_line(quantity: Decimal, unit_price: Decimal, treatment: TaxTreatment) -> LineAmounts {
    let line_total = round_decimal(quantity * unit_price, 2);
    match treatment {
        TaxTreatment::Inclusive => {
            let tax = extract_tax(line_total);
            LineAmounts {
                line_total,
                unit_price,
                tax,
                sale_amount: line_total,
                line_tax_field: Some(tax),
            }
        }
        TaxTreatment::Exclusive => {
            let tax = extract_tax(line_total);
            LineAmounts {
                line_total,
                unit_price: round_decimal(unit_price / TAX_MULTIPLIER, 2),
                tax,
                sale_amount: line_total - tax,
                line_tax_field: None,
            }
        }
        TaxTreatment::Untaxed => LineAmounts {
            line_total,
            unit_price,
            tax: Decimal::ZERO,
            sale_amount: line_total,
            line_tax_field: None,
        },
    }
}

/// VAT contained in a tax-inclusive amount: `total - total / 1.13`, rounded.
pub fn extract_tax(tax_inclusive: Decimal) -> Decimal {
    round_decimal(tax_inclusive - tax_inclusive / TAX_MULTIPLIER, 2)
}

/// Summary-level aggregates for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTotals {
    /// Σ `ventaGravada` (or Σ `compra`).
    pub total_taxed: Decimal,
    /// Σ `ivaItem`. Zero when lines carry no per-line tax field.
    pub total_line_tax: Decimal,
    /// Σ line tax reported under tributo "20"; zero unless tax-exclusive.
    pub tribute_tax: Decimal,
    /// `subTotal`.
    pub subtotal: Decimal,
    /// `montoTotalOperacion`.
    pub operation_total: Decimal,
    /// `totalPagar`.
    pub total_payable: Decimal,
    /// `totalLetras`.
    pub total_in_words: String,
}

/// Aggregate already-computed line amounts.
pub fn compute_totals(lines: &[LineAmounts], treatment: TaxTreatment) -> DocumentTotals {
    let total_taxed: Decimal = lines.iter().map(|l| l.sale_amount).sum();
    let total_line_tax: Decimal = lines.iter().filter_map(|l| l.line_tax_field).sum();
    let tribute_tax: Decimal = match treatment {
        TaxTreatment::Exclusive => lines.iter().map(|l| l.tax).sum(),
        _ => Decimal::ZERO,
    };

    let subtotal = total_taxed;
    let operation_total = subtotal + tribute_tax;
    let total_payable = operation_total;

    DocumentTotals {
        total_taxed,
        total_line_tax,
        tribute_tax,
        subtotal,
        operation_total,
        total_payable,
        total_in_words: amount_to_words(total_payable),
    }
}

/// Invoice-level aggregates for the local record.
pub fn invoice_totals(lines: &[InvoiceLine]) -> InvoiceTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|l| round_decimal(l.quantity * l.unit_price, 2))
        .sum();
    InvoiceTotals {
        subtotal,
        total: subtotal,
        total_without_tax: round_decimal(subtotal / TAX_MULTIPLIER, 2),
    }
}
