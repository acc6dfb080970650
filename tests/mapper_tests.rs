use chrono::{NaiveDate, NaiveDateTime};
use dte_sv::core::*;
use dte_sv::dte::*;
use rust_decimal_macros::dec;
use serde_json::Value;

fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn address() -> Address {
    AddressBuilder::new("06", "14", "Colonia Escalón, San Salvador").build()
}

fn company() -> Company {
    CompanyBuilder::new("Comercial Ejemplo S.A. de C.V.", "46510", "Venta al por mayor", address())
        .nit("0614-123456-789-0")
        .nrc("123456-7")
        .commercial_name("Comercial Ejemplo")
        .contact("22223333", "facturas@ejemplo.sv")
        .build()
}

fn consumer() -> Customer {
    CustomerBuilder::new("María López", address())
        .national_id("012345678")
        .phone("77778888")
        .email("maria@correo.sv")
        .build()
}

fn taxpayer() -> Customer {
    CustomerBuilder::new("Distribuidora Central S.A. de C.V.", address())
        .taxpayer("0614-010190-101-3", "234567-8")
        .commercial_name("Dicentral")
        .activity("46900", "Venta al por mayor de otros productos")
        .build()
}

fn invoice(variant: DocumentVariant, customer: Customer) -> Invoice {
    InvoiceBuilder::new("F-0001", created(), variant)
        .company(company())
        .customer(customer)
        .add_line(InvoiceLineBuilder::new("Consultoría", dec!(2), dec!(11.30)).product_code("CONS").build())
        .add_line(InvoiceLineBuilder::new("Papelería", dec!(3), dec!(1.00)).build())
        .build()
        .unwrap()
}

fn to_json(doc: &DteDocument) -> Value {
    serde_json::to_value(doc).unwrap()
}

fn related() -> RelatedDocumentRef {
    RelatedDocumentRef {
        generation_code: "A1B2C3D4-0000-4000-8000-0000000000AA".into(),
        emitted_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    }
}

// --- Standard invoice (01) ---

#[test]
fn standard_invoice_identification() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let id = &json["identificacion"];
    assert_eq!(id["version"], 1);
    assert_eq!(id["ambiente"], "00");
    assert_eq!(id["tipoDte"], "01");
    assert_eq!(id["tipoModelo"], 1);
    assert_eq!(id["tipoOperacion"], 1);
    assert!(id["tipoContingencia"].is_null());
    assert!(id["motivoContin"].is_null());
    assert!(id["numeroControl"].is_null());
    assert!(id["codigoGeneracion"].is_null());
    assert!(id["fecEmi"].is_null());
    assert_eq!(id["tipoMoneda"], "USD");
}

#[test]
fn standard_invoice_issuer() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let emisor = &to_json(&doc)["emisor"];
    assert_eq!(emisor["nit"], "06141234567890");
    assert_eq!(emisor["nrc"], "1234567");
    assert_eq!(emisor["telefono"], "2222-3333");
    assert_eq!(emisor["nombreComercial"], "Comercial Ejemplo");
    assert_eq!(emisor["direccion"]["departamento"], "06");
    assert!(emisor.get("codEstableMH").is_none());
    assert!(emisor.get("codEstable").is_none());
    assert!(emisor.get("codPuntoVentaMH").is_none());
    assert!(emisor.get("codPuntoVenta").is_none());
}

#[test]
fn establishment_codes_present_when_set() {
    let mut inv = invoice(DocumentVariant::StandardInvoice, consumer());
    inv.company.establishment_code_mh = "M001".into();
    inv.company.point_of_sale_code_mh = "P001".into();
    let doc = map_invoice(&inv, Environment::Test).unwrap();
    let emisor = &to_json(&doc)["emisor"];
    assert_eq!(emisor["codEstableMH"], "M001");
    assert_eq!(emisor["codPuntoVentaMH"], "P001");
    assert!(emisor.get("codEstable").is_none());
}

#[test]
fn standard_invoice_recipient_uses_national_id() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let receptor = &json["receptor"];
    assert_eq!(receptor["tipoDocumento"], "13");
    assert_eq!(receptor["numDocumento"], "01234567-8");
    assert_eq!(receptor["telefono"], "7777-8888");
    assert!(receptor.get("nit").is_none());
    assert!(receptor["nrc"].is_null());
    assert!(json.get("sujetoExcluido").is_none());
}

#[test]
fn standard_invoice_lines_keep_order_and_carry_iva() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let items = json["cuerpoDocumento"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["numItem"], 1);
    assert_eq!(items[0]["descripcion"], "Consultoría");
    assert_eq!(items[0]["codigo"], "CONS");
    assert_eq!(items[1]["numItem"], 2);
    assert_eq!(items[1]["descripcion"], "Papelería");
    assert!(items[1]["codigo"].is_null());

    assert_eq!(items[0]["tipoItem"], 2);
    assert_eq!(items[0]["uniMedida"], 99);
    assert!(items[0]["tributos"].is_null());
    assert_eq!(items[0]["precioUni"].as_f64(), Some(11.3));
    assert_eq!(items[0]["ventaGravada"].as_f64(), Some(22.6));
    assert_eq!(items[0]["ivaItem"].as_f64(), Some(2.6));
    assert_eq!(items[1]["ivaItem"].as_f64(), Some(0.35));
}

#[test]
fn standard_invoice_summary() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let resumen = &json["resumen"];
    assert_eq!(resumen["totalGravada"].as_f64(), Some(25.6));
    assert_eq!(resumen["totalIva"].as_f64(), Some(2.95));
    assert_eq!(resumen["montoTotalOperacion"].as_f64(), Some(25.6));
    assert_eq!(resumen["totalPagar"].as_f64(), Some(25.6));
    assert_eq!(resumen["totalLetras"], "VEINTICINCO DÓLARES Y SESENTA CENTAVOS");
    assert!(resumen["tributos"].is_null());
    assert!(resumen.get("ivaPerci1").is_none());
    assert_eq!(resumen["condicionOperacion"], 1);
    assert_eq!(resumen["pagos"][0]["codigo"], "01");
    assert_eq!(resumen["pagos"][0]["montoPago"].as_f64(), Some(25.6));
    assert_eq!(doc.total_payable(), dec!(25.60));
    assert_eq!(doc.tax_amount(), dec!(2.95));
}

#[test]
fn credit_condition_has_no_cash_payment() {
    let mut inv = invoice(DocumentVariant::StandardInvoice, consumer());
    inv.operation_condition = OperationCondition::Credit;
    let doc = map_invoice(&inv, Environment::Test).unwrap();
    let resumen = &to_json(&doc)["resumen"];
    assert_eq!(resumen["condicionOperacion"], 2);
    assert!(resumen["pagos"].is_null());
}

#[test]
fn production_environment_code() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Production).unwrap();
    assert_eq!(doc.identificacion.ambiente, "01");
}

#[test]
fn hyphenated_national_id_is_accepted() {
    let customer = CustomerBuilder::new("María López", address())
        .national_id("01234567-8")
        .build();
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, customer), Environment::Test).unwrap();
    assert_eq!(to_json(&doc)["receptor"]["numDocumento"], "01234567-8");
}

#[test]
fn malformed_national_id_fails() {
    let customer = CustomerBuilder::new("María López", address())
        .national_id("12345")
        .build();
    let res = map_invoice(&invoice(DocumentVariant::StandardInvoice, customer), Environment::Test);
    assert!(matches!(res, Err(DteError::InvalidDocumentLength(_))));
}

#[test]
fn issuer_without_nit_fails() {
    let mut inv = invoice(DocumentVariant::StandardInvoice, consumer());
    inv.company.nit = None;
    match map_invoice(&inv, Environment::Test) {
        Err(DteError::MissingField(f)) => assert_eq!(f, "company.nit"),
        other => panic!("unexpected {other:?}"),
    }
}

// --- Fiscal credit (03) ---

#[test]
fn fiscal_credit_recipient_uses_nit() {
    let doc = map_invoice(&invoice(DocumentVariant::FiscalCredit, taxpayer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    assert_eq!(json["identificacion"]["version"], 3);
    assert_eq!(json["identificacion"]["tipoDte"], "03");
    let receptor = &json["receptor"];
    assert_eq!(receptor["nit"], "06140101901013");
    assert_eq!(receptor["nrc"], "2345678");
    assert_eq!(receptor["nombreComercial"], "Dicentral");
    assert_eq!(receptor["codActividad"], "46900");
    assert!(receptor.get("numDocumento").is_none());
    assert!(receptor.get("tipoDocumento").is_none());
}

#[test]
fn fiscal_credit_lines_are_tax_exclusive() {
    let doc = map_invoice(&invoice(DocumentVariant::FiscalCredit, taxpayer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let item = &json["cuerpoDocumento"][0];
    assert_eq!(item["uniMedida"], 59);
    assert_eq!(item["tipoItem"], 2);
    assert_eq!(item["tributos"], serde_json::json!(["20"]));
    assert_eq!(item["precioUni"].as_f64(), Some(10.0));
    assert_eq!(item["ventaGravada"].as_f64(), Some(20.0));
    assert!(item.get("ivaItem").is_none());
    assert_eq!(item["psv"].as_f64(), Some(0.0));
}

#[test]
fn fiscal_credit_summary_uses_tribute_20() {
    let doc = map_invoice(&invoice(DocumentVariant::FiscalCredit, taxpayer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    let resumen = &json["resumen"];
    // 3 × 1.00 → 2.65 net + 0.35 tax
    assert_eq!(resumen["totalGravada"].as_f64(), Some(22.65));
    assert_eq!(resumen["totalIva"].as_f64(), Some(0.0));
    assert_eq!(resumen["tributos"][0]["codigo"], "20");
    assert_eq!(resumen["tributos"][0]["valor"].as_f64(), Some(2.95));
    assert_eq!(resumen["montoTotalOperacion"].as_f64(), Some(25.6));
    assert_eq!(resumen["totalPagar"].as_f64(), Some(25.6));
    assert_eq!(resumen["ivaPerci1"].as_f64(), Some(0.0));
    assert_eq!(doc.tax_amount(), dec!(2.95));
}

#[test]
fn fiscal_credit_without_activity_fails() {
    let customer = CustomerBuilder::new("Distribuidora Central", address())
        .taxpayer("06140101901013", "2345678")
        .build();
    match map_invoice(&invoice(DocumentVariant::FiscalCredit, customer), Environment::Test) {
        Err(DteError::MissingField(f)) => assert_eq!(f, "customer.activity_code"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn fiscal_credit_with_malformed_activity_fails() {
    let customer = CustomerBuilder::new("Distribuidora Central", address())
        .taxpayer("06140101901013", "2345678")
        .activity("ABC", "Comercio")
        .build();
    let res = map_invoice(&invoice(DocumentVariant::FiscalCredit, customer), Environment::Test);
    assert!(matches!(res, Err(DteError::Validation(_))));
}

// --- Excluded subject (14) ---

#[test]
fn excluded_subject_uses_its_own_block() {
    let doc = map_invoice(&invoice(DocumentVariant::ExcludedSubject, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    assert_eq!(json["identificacion"]["version"], 1);
    assert_eq!(json["identificacion"]["tipoDte"], "14");
    assert!(json.get("receptor").is_none());
    let subject = &json["sujetoExcluido"];
    assert_eq!(subject["numDocumento"], "01234567-8");

    let item = &json["cuerpoDocumento"][0];
    assert_eq!(item["compra"].as_f64(), Some(22.6));
    assert_eq!(item["uniMedida"], 99);
    assert!(item.get("ventaGravada").is_none());

    let resumen = &json["resumen"];
    assert_eq!(resumen["totalCompra"].as_f64(), Some(25.6));
    assert_eq!(resumen["totalPagar"].as_f64(), Some(25.6));
    assert!(resumen.get("totalIva").is_none());
    assert_eq!(doc.tax_amount(), dec!(0));
}

// --- Notes (05, 06) ---

#[test]
fn credit_note_references_original_document() {
    let doc = map_invoice(
        &invoice(DocumentVariant::CreditNote { related: related() }, taxpayer()),
        Environment::Test,
    )
    .unwrap();
    let json = to_json(&doc);
    assert_eq!(json["identificacion"]["tipoDte"], "05");
    assert_eq!(json["identificacion"]["version"], 3);

    let rel = &json["documentoRelacionado"][0];
    assert_eq!(rel["tipoDocumento"], "03");
    assert_eq!(rel["tipoGeneracion"], 2);
    assert_eq!(rel["numeroDocumento"], "A1B2C3D4-0000-4000-8000-0000000000AA");
    assert_eq!(rel["fechaEmision"], "2024-05-01");

    for item in json["cuerpoDocumento"].as_array().unwrap() {
        assert_eq!(item["numeroDocumento"], "A1B2C3D4-0000-4000-8000-0000000000AA");
        assert!(item.get("ivaItem").is_none());
        assert!(item.get("psv").is_none());
    }
}

#[test]
fn debit_note_type_code() {
    let doc = map_invoice(
        &invoice(DocumentVariant::DebitNote { related: related() }, taxpayer()),
        Environment::Test,
    )
    .unwrap();
    assert_eq!(doc.document_type(), DocumentType::DebitNote);
    assert!(to_json(&doc)["receptor"].get("nit").is_some());
}

#[test]
fn invoice_has_no_related_documents() {
    let doc = map_invoice(&invoice(DocumentVariant::StandardInvoice, consumer()), Environment::Test).unwrap();
    let json = to_json(&doc);
    assert!(json["documentoRelacionado"].is_null());
    assert!(json["cuerpoDocumento"][0]["numeroDocumento"].is_null());
}
