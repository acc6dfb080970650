use rust_decimal::Decimal;

use super::*;
use crate::core::format::{GENERATION_CODE_PATTERN, TIME_PATTERN};
use crate::core::{CONTROL_NUMBER_PATTERN, DteError, Environment, ValidationError, ValidationRule};

/// Validate a mapped document before it is sent to the authority.
/// Returns all validation errors found (not just the first).
pub fn validate_for_submission(doc: &DteDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let id = &doc.identificacion;

    match id.codigo_generacion.as_deref() {
        None => errors.push(ValidationError::new(
            ValidationRule::GenerationCode,
            "identificacion.codigoGeneracion",
            "generation code must be assigned before submission",
        )),
        Some(code) if !GENERATION_CODE_PATTERN.is_match(code) => {
            errors.push(ValidationError::new(
                ValidationRule::GenerationCode,
                "identificacion.codigoGeneracion",
                format!("'{code}' is not an uppercase UUID"),
            ))
        }
        Some(_) => {}
    }

    match id.numero_control.as_deref() {
        None => errors.push(ValidationError::new(
            ValidationRule::ControlNumber,
            "identificacion.numeroControl",
            "control number must be assigned before submission",
        )),
        Some(number) if !CONTROL_NUMBER_PATTERN.is_match(number) => {
            errors.push(ValidationError::new(
                ValidationRule::ControlNumber,
                "identificacion.numeroControl",
                format!("'{number}' does not match DTE-XX-XXXXXXXX-XXXXXXXXXXXXXXX"),
            ))
        }
        Some(number) if &number[4..6] != id.tipo_dte.code() => {
            errors.push(ValidationError::new(
                ValidationRule::ControlNumber,
                "identificacion.numeroControl",
                format!(
                    "control number type {} does not match document type {}",
                    &number[4..6],
                    id.tipo_dte.code()
                ),
            ))
        }
        Some(_) => {}
    }

    if id.fec_emi.is_none() {
        errors.push(ValidationError::new(
            ValidationRule::EmissionDate,
            "identificacion.fecEmi",
            "emission date must be set before submission",
        ));
    }
    match id.hor_emi.as_deref() {
        None => errors.push(ValidationError::new(
            ValidationRule::EmissionTime,
            "identificacion.horEmi",
            "emission time must be set before submission",
        )),
        Some(t) if !TIME_PATTERN.is_match(t) => errors.push(ValidationError::new(
            ValidationRule::EmissionTime,
            "identificacion.horEmi",
            format!("'{t}' does not match HH:mm:ss"),
        )),
        Some(_) => {}
    }

    if id.tipo_operacion == 2 && id.tipo_contingencia.is_none() {
        errors.push(ValidationError::new(
            ValidationRule::OperationMode,
            "identificacion.tipoContingencia",
            "contingency operation requires a contingency type",
        ));
    }
    if id.tipo_operacion == 1 && (id.tipo_contingencia.is_some() || id.motivo_contin.is_some()) {
        errors.push(ValidationError::new(
            ValidationRule::OperationMode,
            "identificacion.tipoContingencia",
            "normal operation must not carry contingency fields",
        ));
    }

    if doc.emisor.nit.is_empty() {
        errors.push(ValidationError::new(
            ValidationRule::IssuerIdentity,
            "emisor.nit",
            "issuer NIT must not be empty",
        ));
    }
    if doc.emisor.nrc.is_empty() {
        errors.push(ValidationError::new(
            ValidationRule::IssuerIdentity,
            "emisor.nrc",
            "issuer NRC must not be empty",
        ));
    }

    validate_recipient(doc, &mut errors);

    if doc.cuerpo_documento.is_empty() {
        errors.push(ValidationError::new(
            ValidationRule::ItemSequence,
            "cuerpoDocumento",
            "document must have at least one item",
        ));
    }
    for (i, item) in doc.cuerpo_documento.iter().enumerate() {
        let expected = (i + 1) as u32;
        if item.num_item() != expected {
            errors.push(ValidationError::new(
                ValidationRule::ItemSequence,
                format!("cuerpoDocumento[{i}].numItem"),
                format!("item number {} should be {expected}", item.num_item()),
            ));
        }
    }

    errors.extend(validate_summary(doc));
    errors
}

/// [`validate_for_submission`] plus the check that the document's
/// `ambiente` is the environment it is about to be sent to.
pub fn validate_for_environment(doc: &DteDocument, target: Environment) -> Vec<ValidationError> {
    let mut errors = validate_for_submission(doc);
    if let Err(e) = ensure_environment(&doc.identificacion.ambiente, target) {
        errors.push(ValidationError::new(
            ValidationRule::Environment,
            "identificacion.ambiente",
            e.to_string(),
        ));
    }
    errors
}

/// Fail unless a payload's `ambiente` code is the one of `target`.
pub fn ensure_environment(ambiente: &str, target: Environment) -> Result<(), DteError> {
    if ambiente == target.code() {
        Ok(())
    } else {
        Err(DteError::EnvironmentMismatch {
            document: ambiente.to_string(),
            target: target.code().to_string(),
        })
    }
}

fn validate_recipient(doc: &DteDocument, errors: &mut Vec<ValidationError>) {
    let taxpayer = doc.document_type().uses_taxpayer_recipient();
    match &doc.recipient {
        RecipientBlock::Recipient(Recipient::Taxpayer(_)) if !taxpayer => {
            errors.push(ValidationError::new(
                ValidationRule::RecipientIdentity,
                "receptor",
                "this document type identifies the recipient by national ID",
            ))
        }
        RecipientBlock::Recipient(Recipient::NaturalPerson(_)) if taxpayer => {
            errors.push(ValidationError::new(
                ValidationRule::RecipientIdentity,
                "receptor",
                "this document type identifies the recipient by NIT and NRC",
            ))
        }
        RecipientBlock::ExcludedSubject(_)
            if doc.document_type() != crate::core::DocumentType::ExcludedSubject =>
        {
            errors.push(ValidationError::new(
                ValidationRule::RecipientIdentity,
                "sujetoExcluido",
                "only excluded-subject documents carry sujetoExcluido",
            ))
        }
        _ => {}
    }
}

/// Check summary arithmetic and 2-decimal amounts.
pub fn validate_summary(doc: &DteDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let line_sum: Decimal = doc.cuerpo_documento.iter().map(DocumentItem::amount).sum();

    match &doc.resumen {
        Summary::Sale(s) => {
            if s.total_gravada != line_sum {
                errors.push(ValidationError::new(
                    ValidationRule::SummaryArithmetic,
                    "resumen.totalGravada",
                    format!(
                        "total {} does not match sum of item amounts {}",
                        s.total_gravada, line_sum
                    ),
                ));
            }
            let tributes: Decimal = s.tributos.iter().flatten().map(|t| t.valor).sum();
            let expected_operation = s.sub_total + tributes;
            if s.monto_total_operacion != expected_operation {
                errors.push(ValidationError::new(
                    ValidationRule::SummaryArithmetic,
                    "resumen.montoTotalOperacion",
                    format!(
                        "operation total {} does not match subtotal {} + tributes {}",
                        s.monto_total_operacion, s.sub_total, tributes
                    ),
                ));
            }
            let iva_sum: Decimal = doc
                .cuerpo_documento
                .iter()
                .filter_map(|i| match i {
                    DocumentItem::Sale(s) => s.tax.iva_item(),
                    DocumentItem::Purchase(_) => None,
                })
                .sum();
            if s.total_iva != iva_sum {
                errors.push(ValidationError::new(
                    ValidationRule::SummaryArithmetic,
                    "resumen.totalIva",
                    format!("total IVA {} does not match item IVA {}", s.total_iva, iva_sum),
                ));
            }
            for (field, value) in [
                ("resumen.totalGravada", s.total_gravada),
                ("resumen.montoTotalOperacion", s.monto_total_operacion),
                ("resumen.totalPagar", s.total_pagar),
                ("resumen.totalIva", s.total_iva),
            ] {
                check_decimal_places(value, field, &mut errors);
            }
        }
        Summary::Purchase(s) => {
            if s.total_compra != line_sum {
                errors.push(ValidationError::new(
                    ValidationRule::SummaryArithmetic,
                    "resumen.totalCompra",
                    format!(
                        "total {} does not match sum of item amounts {}",
                        s.total_compra, line_sum
                    ),
                ));
            }
            check_decimal_places(s.total_pagar, "resumen.totalPagar", &mut errors);
        }
    }

    errors
}

fn check_decimal_places(value: Decimal, field: &str, errors: &mut Vec<ValidationError>) {
    if value != value.round_dp(2) {
        errors.push(ValidationError::new(
            ValidationRule::AmountScale,
            field,
            format!("amount {value} has more than 2 decimal places"),
        ));
    }
}
