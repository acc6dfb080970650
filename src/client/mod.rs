//! Submission client for the authority-facing gateway.
//!
//! Every call builds its own request from the arguments it is given. The
//! client holds nothing between calls except the read-only transport
//! configuration, so one instance can be shared freely.
//!
//! | Operation | Method | Path | Success |
//! |-----------|--------|------|---------|
//! | [`sync_document`](AuthorityClient::sync_document) | POST | `/document/dte/sync` (`/document/dte/se/sync/` for type 14) | 200 |
//! | [`invalidate_document`](AuthorityClient::invalidate_document) | POST | `/document/dte/invalidate` | 200 |
//! | [`send_contingency_report`](AuthorityClient::send_contingency_report) | POST | `/document/contingencia/report` | 200, 201 |
//! | [`upload_certificate`](AuthorityClient::upload_certificate) | POST | `/document/upload` | 200 |
//! | [`validate_certificate`](AuthorityClient::validate_certificate) | POST | `/settings/certificate/validate` | 200 |
//! | [`validate_credentials`](AuthorityClient::validate_credentials) | GET | `/account/validate` | 200 |
//! | [`payment_status`](AuthorityClient::payment_status) | GET | `/payment/status` | 200, 404 = pending |

mod config;
mod error;
mod response;

use log::{debug, warn};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;

pub use config::*;
pub use error::*;
pub use response::*;

use crate::core::{DocumentType, DteError, Environment};
use crate::dte::{
    ContingencyReport, DteDocument, InvalidationRequest, ensure_environment, validate_for_environment,
};

pub const SYNC_PATH: &str = "/document/dte/sync";
pub const EXCLUDED_SUBJECT_SYNC_PATH: &str = "/document/dte/se/sync/";
pub const INVALIDATE_PATH: &str = "/document/dte/invalidate";
pub const CONTINGENCY_PATH: &str = "/document/contingencia/report";
pub const UPLOAD_CERTIFICATE_PATH: &str = "/document/upload";
pub const VALIDATE_CERTIFICATE_PATH: &str = "/settings/certificate/validate";
pub const VALIDATE_ACCOUNT_PATH: &str = "/account/validate";
pub const PAYMENT_STATUS_PATH: &str = "/payment/status";

const HEADER_API_KEY: &str = "apiKey";
const HEADER_CERTIFICATE_KEY: &str = "key";
const HEADER_MH_USER: &str = "MH_USER";
const HEADER_MH_KEY: &str = "MH_KEY";
const HEADER_REFERENCE: &str = "reference";

const OK_ONLY: &[StatusCode] = &[StatusCode::OK];
const OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

/// Client for the authority gateway.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AuthorityClient {
    pub fn new(config: ClientConfig) -> Result<Self, AuthorityError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthorityError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit a document for immediate processing.
    ///
    /// The document is checked with [`validate_for_environment`] first, so a
    /// document built for the other environment never leaves the process.
    /// Any problem fails the call before a request is made. Only HTTP 200
    /// counts as success.
    pub async fn sync_document(
        &self,
        document: &DteDocument,
        reference: &str,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<AuthorityResponse, AuthorityError> {
        let problems = validate_for_environment(document, environment);
        if !problems.is_empty() {
            return Err(DteError::from_validation(&problems).into());
        }

        let path = sync_path(document.document_type());
        let request = self.document_request(path, reference, credentials, environment, document);
        let body = self.execute(request, path, OK_ONLY).await?;
        serde_json::from_str(&body).map_err(|e| AuthorityError::Decode(e.to_string()))
    }

    /// Invalidate a previously accepted document.
    pub async fn invalidate_document(
        &self,
        request: &InvalidationRequest,
        reference: &str,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<bool, AuthorityError> {
        ensure_environment(&request.identificacion.ambiente, environment)?;
        let builder =
            self.document_request(INVALIDATE_PATH, reference, credentials, environment, request);
        self.execute(builder, INVALIDATE_PATH, OK_ONLY).await?;
        Ok(true)
    }

    /// Report documents issued during an outage. 200 and 201 both count as
    /// success on this endpoint.
    pub async fn send_contingency_report(
        &self,
        report: &ContingencyReport,
        reference: &str,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<bool, AuthorityError> {
        ensure_environment(&report.identificacion.ambiente, environment)?;
        let builder =
            self.document_request(CONTINGENCY_PATH, reference, credentials, environment, report);
        self.execute(builder, CONTINGENCY_PATH, OK_OR_CREATED).await?;
        Ok(true)
    }

    /// Upload the signing certificate as the multipart part `file`.
    pub async fn upload_certificate(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<bool, AuthorityError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self
            .http
            .post(self.url(UPLOAD_CERTIFICATE_PATH, environment))
            .header(HEADER_API_KEY, &credentials.api_key)
            .header(HEADER_MH_USER, &credentials.mh_user)
            .multipart(form);
        self.execute(builder, UPLOAD_CERTIFICATE_PATH, OK_ONLY).await?;
        Ok(true)
    }

    /// Check that the uploaded certificate opens with `certificate_key`.
    pub async fn validate_certificate(
        &self,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<bool, AuthorityError> {
        let builder = self
            .http
            .post(self.url(VALIDATE_CERTIFICATE_PATH, environment))
            .header(HEADER_API_KEY, &credentials.api_key)
            .header(HEADER_CERTIFICATE_KEY, &credentials.certificate_key)
            .header(HEADER_MH_USER, &credentials.mh_user);
        self.execute(builder, VALIDATE_CERTIFICATE_PATH, OK_ONLY).await?;
        Ok(true)
    }

    /// Check the authority user and password. `force_refresh` asks the
    /// gateway to log in again instead of using its cached session.
    pub async fn validate_credentials(
        &self,
        force_refresh: bool,
        credentials: &Credentials,
        environment: Environment,
    ) -> Result<bool, AuthorityError> {
        let builder = self
            .http
            .get(self.url(VALIDATE_ACCOUNT_PATH, environment))
            .query(&[("forceRefresh", force_refresh)])
            .header(HEADER_API_KEY, &credentials.api_key)
            .header(HEADER_MH_USER, &credentials.mh_user)
            .header(HEADER_MH_KEY, &credentials.mh_key);
        self.execute(builder, VALIDATE_ACCOUNT_PATH, OK_ONLY).await?;
        Ok(true)
    }

    /// Look up a payment. HTTP 404 means the order is not known yet and
    /// yields [`PaymentStatus::Pending`].
    pub async fn payment_status(
        &self,
        order_reference: &str,
        api_key: &str,
        environment: Environment,
    ) -> Result<PaymentStatus, AuthorityError> {
        let builder = self
            .http
            .get(self.url(PAYMENT_STATUS_PATH, environment))
            .query(&[("orderReference", order_reference)])
            .header(HEADER_API_KEY, api_key);

        debug!("GET {PAYMENT_STATUS_PATH} order={order_reference}");
        let (status, body) = send(builder).await?;
        debug!("{PAYMENT_STATUS_PATH} -> {status}");

        match status {
            StatusCode::OK => serde_json::from_str(&body)
                .map(PaymentStatus::Found)
                .map_err(|e| AuthorityError::Decode(e.to_string())),
            StatusCode::NOT_FOUND => Ok(PaymentStatus::Pending {
                order_reference: order_reference.to_string(),
            }),
            other => Err(rejection(PAYMENT_STATUS_PATH, other, &body)),
        }
    }

    fn url(&self, path: &str, environment: Environment) -> String {
        format!("{}{}", self.config.base_url(environment), path)
    }

    fn document_request<T: Serialize + ?Sized>(
        &self,
        path: &str,
        reference: &str,
        credentials: &Credentials,
        environment: Environment,
        body: &T,
    ) -> RequestBuilder {
        debug!("POST {path} reference={reference}");
        self.http
            .post(self.url(path, environment))
            .header(HEADER_API_KEY, &credentials.api_key)
            .header(HEADER_CERTIFICATE_KEY, &credentials.certificate_key)
            .header(HEADER_MH_USER, &credentials.mh_user)
            .header(HEADER_MH_KEY, &credentials.mh_key)
            .header(HEADER_REFERENCE, reference)
            .json(body)
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        path: &str,
        accepted: &[StatusCode],
    ) -> Result<String, AuthorityError> {
        let (status, body) = send(builder).await?;
        debug!("{path} -> {status}");
        if accepted.contains(&status) {
            Ok(body)
        } else {
            Err(rejection(path, status, &body))
        }
    }
}

/// Endpoint for submitting a document of `doc_type`.
pub fn sync_path(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::ExcludedSubject => EXCLUDED_SUBJECT_SYNC_PATH,
        _ => SYNC_PATH,
    }
}

async fn send(builder: RequestBuilder) -> Result<(StatusCode, String), AuthorityError> {
    let response = builder
        .send()
        .await
        .map_err(|e| AuthorityError::Network(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthorityError::Network(e.to_string()))?;
    Ok((status, body))
}

fn rejection(path: &str, status: StatusCode, body: &str) -> AuthorityError {
    warn!("{path} rejected with HTTP {status}");
    AuthorityError::Rejected {
        status: status.as_u16(),
        message: decode_error_message(body),
    }
}
