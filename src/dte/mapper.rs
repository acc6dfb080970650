use rust_decimal::Decimal;

use super::*;
use crate::core::calc::{self, IVA_TRIBUTE_CODE, TaxTreatment};
use crate::core::format::{format_phone_number, normalize_national_id};
use crate::core::{
    Company, Customer, DocumentType, DteError, Environment, Invoice, InvoiceLine, OperationCondition,
};

/// CAT-011 item type. Every line is reported as a service.
pub const ITEM_TYPE_SERVICE: u8 = 2;

/// CAT-014 unit code used on invoice and excluded-subject lines ("Otra").
pub const UNIT_OTHER: u8 = 99;

/// CAT-014 unit code used on fiscal-credit and note lines ("Unidad").
pub const UNIT_PIECE: u8 = 59;

/// CAT-022 identity document type for a DUI.
pub const ID_TYPE_DUI: &str = "13";

/// CAT-017 payment form for cash.
pub const PAYMENT_CASH: &str = "01";

const IVA_TRIBUTE_DESCRIPTION: &str = "Impuesto al Valor Agregado 13%";

/// Map an invoice into a complete tax document.
///
/// Control number, generation code and emission instant are left unset;
/// assign them with [`DteDocument::assign_identifiers`] right before
/// submission.
pub fn map_invoice(invoice: &Invoice, environment: Environment) -> Result<DteDocument, DteError> {
    let doc_type = invoice.variant.document_type();
    let treatment = TaxTreatment::for_document(doc_type);

    let identificacion = IdentificationBuilder::new(doc_type, environment).build()?;
    let emisor = map_issuer(&invoice.company)?;
    let recipient = map_recipient(&invoice.customer, doc_type)?;

    let related_code = invoice.variant.related().map(|r| r.generation_code.clone());
    let documento_relacionado = invoice.variant.related().map(|r| {
        vec![RelatedDocument {
            tipo_documento: DocumentType::FiscalCredit,
            tipo_generacion: 2,
            numero_documento: r.generation_code.clone(),
            fecha_emision: r.emitted_on,
        }]
    });

    let amounts: Vec<calc::LineAmounts> = invoice
        .lines
        .iter()
        .map(|l| calc::compute_line(l.quantity, l.unit_price, treatment))
        .collect();

    let cuerpo_documento = invoice
        .lines
        .iter()
        .zip(&amounts)
        .enumerate()
        .map(|(i, (line, amt))| {
            map_item(
                (i + 1) as u32,
                line,
                amt,
                doc_type,
                related_code.as_deref(),
            )
        })
        .collect();

    let totals = calc::compute_totals(&amounts, treatment);
    let resumen = map_summary(&totals, doc_type, invoice.operation_condition);

    Ok(DteDocument {
        identificacion,
        documento_relacionado,
        emisor,
        recipient,
        cuerpo_documento,
        resumen,
        extension: None,
        apendice: None,
    })
}

/// Map the issuing company. NIT and NRC must be present.
pub fn map_issuer(company: &Company) -> Result<Issuer, DteError> {
    let nit = required(company.nit.as_deref(), "company.nit")?;
    let nrc = required(company.nrc.as_deref(), "company.nrc")?;

    Ok(Issuer {
        nit: digits_only(nit),
        nrc: digits_only(nrc),
        nombre: company.name.clone(),
        cod_actividad: company.activity_code.clone(),
        desc_actividad: company.activity_description.clone(),
        nombre_comercial: non_empty(company.commercial_name.as_deref()),
        tipo_establecimiento: company.establishment_type.clone(),
        direccion: Direccion::from(&company.address),
        telefono: format_phone_number(&company.phone),
        correo: company.email.clone(),
        cod_estable_mh: non_empty(Some(company.establishment_code_mh.as_str())),
        cod_estable: non_empty(Some(company.establishment_code.as_str())),
        cod_punto_venta_mh: non_empty(Some(company.point_of_sale_code_mh.as_str())),
        cod_punto_venta: non_empty(Some(company.point_of_sale_code.as_str())),
    })
}

/// Map the customer using the identity scheme the document type requires.
pub fn map_recipient(customer: &Customer, doc_type: DocumentType) -> Result<RecipientBlock, DteError> {
    let telefono = non_empty(customer.phone.as_deref()).map(|p| format_phone_number(&p));
    let correo = non_empty(customer.email.as_deref());

    if doc_type.uses_taxpayer_recipient() {
        let nit = required(customer.nit.as_deref(), "customer.nit")?;
        let nrc = required(customer.nrc.as_deref(), "customer.nrc")?;
        let activity = required(customer.activity_code.as_deref(), "customer.activity_code")?;
        if !(2..=6).contains(&activity.len()) || !activity.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DteError::Validation(format!(
                "customer.activity_code: '{activity}' must be 2 to 6 digits"
            )));
        }
        let description = required(
            customer.activity_description.as_deref(),
            "customer.activity_description",
        )?;

        return Ok(RecipientBlock::Recipient(Recipient::Taxpayer(
            TaxpayerRecipient {
                nit: digits_only(nit),
                nrc: digits_only(nrc),
                nombre: customer.name.clone(),
                cod_actividad: activity.to_string(),
                desc_actividad: description.to_string(),
                nombre_comercial: non_empty(customer.commercial_name.as_deref()),
                direccion: Direccion::from(&customer.address),
                telefono,
                correo,
            },
        )));
    }

    let raw_id = required(customer.national_id.as_deref(), "customer.national_id")?;
    let num_documento = normalize_national_id(raw_id)?;
    let cod_actividad = non_empty(customer.activity_code.as_deref());
    let desc_actividad = non_empty(customer.activity_description.as_deref());

    if doc_type == DocumentType::ExcludedSubject {
        return Ok(RecipientBlock::ExcludedSubject(ExcludedSubjectParty {
            tipo_documento: ID_TYPE_DUI.to_string(),
            num_documento,
            nombre: customer.name.clone(),
            cod_actividad,
            desc_actividad,
            direccion: Direccion::from(&customer.address),
            telefono,
            correo,
        }));
    }

    Ok(RecipientBlock::Recipient(Recipient::NaturalPerson(
        NaturalPersonRecipient {
            tipo_documento: ID_TYPE_DUI.to_string(),
            num_documento,
            nrc: None,
            nombre: customer.name.clone(),
            cod_actividad,
            desc_actividad,
            direccion: Some(Direccion::from(&customer.address)),
            telefono,
            correo,
        },
    )))
}

fn map_item(
    num_item: u32,
    line: &InvoiceLine,
    amounts: &calc::LineAmounts,
    doc_type: DocumentType,
    related_code: Option<&str>,
) -> DocumentItem {
    let codigo = non_empty(line.product_code.as_deref());

    if doc_type == DocumentType::ExcludedSubject {
        return DocumentItem::Purchase(PurchaseItem {
            num_item,
            tipo_item: ITEM_TYPE_SERVICE,
            cantidad: line.quantity,
            codigo,
            uni_medida: UNIT_OTHER,
            descripcion: line.description.clone(),
            precio_uni: amounts.unit_price,
            monto_descu: Decimal::ZERO,
            compra: amounts.sale_amount,
        });
    }

    let (uni_medida, tributos, tax) = match doc_type {
        DocumentType::Invoice => (
            UNIT_OTHER,
            None,
            ItemTax::Inclusive {
                psv: Decimal::ZERO,
                no_gravado: Decimal::ZERO,
                iva_item: amounts.line_tax_field.unwrap_or(Decimal::ZERO),
            },
        ),
        DocumentType::FiscalCredit => (
            UNIT_PIECE,
            Some(vec![IVA_TRIBUTE_CODE.to_string()]),
            ItemTax::Exclusive {
                psv: Decimal::ZERO,
                no_gravado: Decimal::ZERO,
            },
        ),
        _ => (
            UNIT_PIECE,
            Some(vec![IVA_TRIBUTE_CODE.to_string()]),
            ItemTax::Amendment {},
        ),
    };

    DocumentItem::Sale(SaleItem {
        num_item,
        tipo_item: ITEM_TYPE_SERVICE,
        numero_documento: related_code.map(str::to_string),
        cantidad: line.quantity,
        codigo,
        cod_tributo: None,
        uni_medida,
        descripcion: line.description.clone(),
        precio_uni: amounts.unit_price,
        monto_descu: Decimal::ZERO,
        venta_no_suj: Decimal::ZERO,
        venta_exenta: Decimal::ZERO,
        venta_gravada: amounts.sale_amount,
        tributos,
        tax,
    })
}

fn map_summary(
    totals: &calc::DocumentTotals,
    doc_type: DocumentType,
    condition: OperationCondition,
) -> Summary {
    let pagos = (condition == OperationCondition::Cash).then(|| {
        vec![Payment {
            codigo: PAYMENT_CASH.to_string(),
            monto_pago: totals.total_payable,
            referencia: None,
            plazo: None,
            periodo: None,
        }]
    });

    if doc_type == DocumentType::ExcludedSubject {
        return Summary::Purchase(PurchaseSummary {
            total_compra: totals.total_taxed,
            descu: Decimal::ZERO,
            total_descu: Decimal::ZERO,
            sub_total: totals.subtotal,
            iva_rete1: Decimal::ZERO,
            rete_renta: Decimal::ZERO,
            total_pagar: totals.total_payable,
            total_letras: totals.total_in_words.clone(),
            condicion_operacion: condition.code(),
            pagos,
            observaciones: None,
        });
    }

    let taxpayer = doc_type.uses_taxpayer_recipient();
    let tributos = taxpayer.then(|| {
        vec![TributeSummary {
            codigo: IVA_TRIBUTE_CODE.to_string(),
            descripcion: IVA_TRIBUTE_DESCRIPTION.to_string(),
            valor: totals.tribute_tax,
        }]
    });

    Summary::Sale(SaleSummary {
        total_no_suj: Decimal::ZERO,
        total_exenta: Decimal::ZERO,
        total_gravada: totals.total_taxed,
        sub_total_ventas: totals.total_taxed,
        descu_no_suj: Decimal::ZERO,
        descu_exenta: Decimal::ZERO,
        descu_gravada: Decimal::ZERO,
        porcentaje_descuento: Decimal::ZERO,
        total_descu: Decimal::ZERO,
        tributos,
        sub_total: totals.subtotal,
        iva_perci1: taxpayer.then_some(Decimal::ZERO),
        iva_rete1: Decimal::ZERO,
        rete_renta: Decimal::ZERO,
        monto_total_operacion: totals.operation_total,
        total_no_gravado: Decimal::ZERO,
        total_pagar: totals.total_payable,
        total_letras: totals.total_in_words.clone(),
        total_iva: totals.total_line_tax,
        saldo_favor: Decimal::ZERO,
        condicion_operacion: condition.code(),
        pagos,
        num_pago_electronico: None,
    })
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, DteError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DteError::MissingField(field.to_string()))
}

/// Empty strings map to absent, never to `""`.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Strip the hyphens people type into NIT/NRC values.
pub(crate) fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}
