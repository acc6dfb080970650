//! Contingency batch runs against a local mock server.
//!
//! Run with: `cargo test --features contingency --test batch_tests`

#![cfg(feature = "contingency")]

use chrono::{NaiveDate, NaiveDateTime};
use dte_sv::batch::*;
use dte_sv::client::{AuthorityClient, ClientConfig, Credentials};
use dte_sv::core::*;
use dte_sv::dte::{ContingencyType, Issuer, ResponsiblePerson, map_issuer};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const A: &str = "A1B2C3D4-0000-4000-8000-000000000001";
const B: &str = "A1B2C3D4-0000-4000-8000-000000000002";
const C: &str = "A1B2C3D4-0000-4000-8000-000000000003";

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn issuer() -> Issuer {
    let address = AddressBuilder::new("06", "14", "San Salvador").build();
    let company = CompanyBuilder::new("Comercial Ejemplo", "46510", "Venta al por mayor", address)
        .nit("06141234567890")
        .nrc("1234567")
        .contact("22223333", "facturas@ejemplo.sv")
        .build();
    map_issuer(&company).unwrap()
}

fn context() -> ContingencyContext {
    ContingencyContext {
        issuer: issuer(),
        responsible: ResponsiblePerson::new("Carlos Pérez", "13", "01234567-8"),
        kind: ContingencyType::IssuerInternetFailure,
        reason: None,
    }
}

fn credentials() -> Credentials {
    Credentials::new("api-123", "cert-pass", "06141234567890", "mh-pass")
}

fn batch() -> ContingencyBatch {
    let mut batch = ContingencyBatch::new();
    batch
        .track(TrackedDocument::new(C, DocumentType::FiscalCredit, at(10, 45)).unwrap())
        .unwrap();
    batch
        .track(TrackedDocument::new(A, DocumentType::Invoice, at(8, 15)).unwrap())
        .unwrap();
    batch
        .track(TrackedDocument::new(B, DocumentType::Invoice, at(9, 30)).unwrap())
        .unwrap();
    batch
}

async fn mock_report(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/document/contingencia/report"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> AuthorityClient {
    AuthorityClient::new(ClientConfig::new(server.uri(), server.uri())).unwrap()
}

#[tokio::test]
async fn one_request_for_the_whole_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/document/contingencia/report"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut batch = batch();
    let report = batch
        .submit(&client_for(&server), &context(), &credentials(), Environment::Test, at(12, 0))
        .await
        .unwrap();

    assert!(report.report_code.is_some());
    assert_eq!(report.reported(), 3);
    assert_eq!(report.failed(), 0);
    for code in [A, B, C] {
        assert_eq!(batch.status_of(code), Some(SubmissionStatus::Completed));
    }

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let listed: Vec<&str> = body["detalleDTE"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["codigoGeneracion"].as_str().unwrap())
        .collect();
    assert_eq!(listed, [A, B, C]);
    assert_eq!(body["detalleDTE"][2]["tipoDoc"], "03");
    assert_eq!(body["motivo"]["hInicio"], "08:15:00");
    assert_eq!(body["motivo"]["hFin"], "10:45:00");
    assert_eq!(body["motivo"]["tipoContingencia"], 3);
}

#[tokio::test]
async fn completed_documents_are_not_reported_again() {
    let server = MockServer::start().await;
    mock_report(&server, 200, json!({})).await;
    let client = client_for(&server);

    let mut batch = batch();
    batch
        .submit(&client, &context(), &credentials(), Environment::Test, at(12, 0))
        .await
        .unwrap();

    let second = batch
        .submit(&client, &context(), &credentials(), Environment::Test, at(13, 0))
        .await
        .unwrap();
    assert!(second.report_code.is_none());
    assert!(
        second
            .results
            .iter()
            .all(|r| r.outcome == DocumentOutcome::AlreadyCompleted
                && r.prior_status == SubmissionStatus::Completed)
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejection_marks_documents_failed() {
    let server = MockServer::start().await;
    mock_report(
        &server,
        400,
        json!({ "descripcionMsg": "RECHAZADO", "observaciones": ["Documento duplicado"] }),
    )
    .await;

    let mut batch = batch();
    let report = batch
        .submit(&client_for(&server), &context(), &credentials(), Environment::Test, at(12, 0))
        .await
        .unwrap();

    assert_eq!(report.failed(), 3);
    for result in &report.results {
        match &result.outcome {
            DocumentOutcome::Failed(msg) => assert!(msg.contains("Documento duplicado\nRECHAZADO")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(result.prior_status, SubmissionStatus::Pending);
    }
    let doc = &batch.documents()[0];
    assert_eq!(doc.status(), SubmissionStatus::Failed);
    assert!(doc.last_error().is_some());
}

#[tokio::test]
async fn failed_documents_are_retried_and_completed_ones_skipped() {
    let server = MockServer::start().await;
    mock_report(&server, 200, json!({})).await;

    let mut batch = ContingencyBatch::new();
    batch
        .track(
            TrackedDocument::new(A, DocumentType::Invoice, at(8, 0))
                .unwrap()
                .with_status(SubmissionStatus::Completed),
        )
        .unwrap();
    batch
        .track(
            TrackedDocument::new(B, DocumentType::Invoice, at(8, 30))
                .unwrap()
                .with_status(SubmissionStatus::Failed),
        )
        .unwrap();
    batch
        .track(TrackedDocument::new(C, DocumentType::Invoice, at(9, 0)).unwrap())
        .unwrap();

    let report = batch
        .submit(&client_for(&server), &context(), &credentials(), Environment::Test, at(12, 0))
        .await
        .unwrap();

    let outcomes: Vec<(&str, &DocumentOutcome)> = report
        .results
        .iter()
        .map(|r| (r.generation_code.as_str(), &r.outcome))
        .collect();
    assert_eq!(
        outcomes,
        [
            (A, &DocumentOutcome::AlreadyCompleted),
            (B, &DocumentOutcome::Reported),
            (C, &DocumentOutcome::Reported),
        ]
    );
    assert_eq!(report.results[1].prior_status, SubmissionStatus::Failed);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["detalleDTE"].as_array().unwrap().len(), 2);
    assert_eq!(body["motivo"]["hInicio"], "08:30:00");
}

#[tokio::test]
async fn other_contingency_without_reason_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut context = context();
    context.kind = ContingencyType::Other;

    let mut batch = batch();
    let res = batch
        .submit(&client_for(&server), &context, &credentials(), Environment::Test, at(12, 0))
        .await;
    assert!(res.is_err());
    assert_eq!(batch.status_of(A), Some(SubmissionStatus::Pending));
}
