//! Contingency batches: documents issued while the authority was
//! unreachable, reported later in a single request.
//!
//! A [`ContingencyBatch`] tracks the [`SubmissionStatus`] of every
//! document. Running it again after a partial failure only reports what is
//! still `Pending` or `Failed`; `Completed` documents are never reported
//! twice.

mod status;

use chrono::NaiveDateTime;
use log::{debug, warn};

pub use status::*;

use crate::client::{AuthorityClient, AuthorityError, Credentials};
use crate::core::format::validate_generation_code;
use crate::core::{DocumentType, DteError, Environment};
use crate::dte::{
    ContingencyReport, ContingencyReportBuilder, ContingencyType, DteDocument, Issuer,
    OutageWindow, ResponsiblePerson,
};

/// A document whose delivery is being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDocument {
    pub generation_code: String,
    pub document_type: DocumentType,
    /// Local creation instant; batches list documents in this order.
    pub created_at: NaiveDateTime,
    status: SubmissionStatus,
    last_error: Option<String>,
}

impl TrackedDocument {
    pub fn new(
        generation_code: impl Into<String>,
        document_type: DocumentType,
        created_at: NaiveDateTime,
    ) -> Result<Self, DteError> {
        let generation_code = generation_code.into();
        validate_generation_code(&generation_code)?;
        Ok(Self {
            generation_code,
            document_type,
            created_at,
            status: SubmissionStatus::Pending,
            last_error: None,
        })
    }

    /// Track a mapped document. Its identifiers must already be assigned.
    pub fn from_document(doc: &DteDocument, created_at: NaiveDateTime) -> Result<Self, DteError> {
        let code = doc
            .generation_code()
            .ok_or_else(|| DteError::MissingField("identificacion.codigoGeneracion".into()))?;
        Self::new(code, doc.document_type(), created_at)
    }

    /// Restore a status persisted by the caller.
    pub fn with_status(mut self, status: SubmissionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Message of the last failed attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn advance(&mut self, next: SubmissionStatus) -> Result<(), DteError> {
        self.status = self.status.transition(next)?;
        if next != SubmissionStatus::Failed {
            self.last_error = None;
        }
        Ok(())
    }
}

/// Who reports the batch and why.
#[derive(Debug, Clone)]
pub struct ContingencyContext {
    pub issuer: Issuer,
    pub responsible: ResponsiblePerson,
    pub kind: ContingencyType,
    /// Mandatory for [`ContingencyType::Other`].
    pub reason: Option<String>,
}

/// Which documents the next run will report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub to_report: Vec<String>,
    pub already_completed: Vec<String>,
    /// Sent in an earlier run whose outcome was never recorded.
    pub in_flight: Vec<String>,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.to_report.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Already delivered; nothing was sent.
    AlreadyCompleted,
    /// Awaiting the outcome of an earlier run; nothing was sent.
    InFlight,
    /// Included in the report, which the authority accepted.
    Reported,
    /// Included in the report, which failed with this message.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResult {
    pub generation_code: String,
    pub prior_status: SubmissionStatus,
    pub outcome: DocumentOutcome,
}

/// Result of one batch run, one entry per tracked document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Generation code of the contingency report, if one was sent.
    pub report_code: Option<String>,
    pub results: Vec<DocumentResult>,
}

impl BatchReport {
    pub fn reported(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Reported))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed(_)))
    }

    fn count(&self, f: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }
}

/// Documents awaiting a contingency report, kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct ContingencyBatch {
    documents: Vec<TrackedDocument>,
}

impl ContingencyBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Documents created at the same instant keep the order
    /// in which they were added.
    pub fn track(&mut self, doc: TrackedDocument) -> Result<(), DteError> {
        if self.find(&doc.generation_code).is_some() {
            return Err(DteError::Builder(format!(
                "document {} is already tracked",
                doc.generation_code
            )));
        }
        let at = self
            .documents
            .partition_point(|d| d.created_at <= doc.created_at);
        self.documents.insert(at, doc);
        Ok(())
    }

    pub fn documents(&self) -> &[TrackedDocument] {
        &self.documents
    }

    pub fn status_of(&self, generation_code: &str) -> Option<SubmissionStatus> {
        self.find(generation_code).map(|i| self.documents[i].status)
    }

    /// Split tracked documents by what the next run does with them.
    pub fn plan(&self) -> BatchPlan {
        let mut plan = BatchPlan::default();
        for doc in &self.documents {
            let code = doc.generation_code.clone();
            match doc.status {
                s if s.needs_reporting() => plan.to_report.push(code),
                SubmissionStatus::Completed => plan.already_completed.push(code),
                _ => plan.in_flight.push(code),
            }
        }
        plan
    }

    /// Build the report for `plan`. The outage window spans the creation
    /// instants of the reported documents.
    pub fn build_report(
        &self,
        plan: &BatchPlan,
        context: &ContingencyContext,
        environment: Environment,
        at: NaiveDateTime,
    ) -> Result<ContingencyReport, DteError> {
        let docs: Vec<&TrackedDocument> = plan
            .to_report
            .iter()
            .filter_map(|code| self.find(code).map(|i| &self.documents[i]))
            .collect();
        let (first, last) = match (docs.first(), docs.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(DteError::Builder(
                    "nothing to report in this batch".into(),
                ));
            }
        };
        let window = OutageWindow {
            start: first.created_at,
            end: last.created_at,
        };

        let mut builder = ContingencyReportBuilder::new(
            context.issuer.clone(),
            context.responsible.clone(),
            window,
            context.kind,
        );
        if let Some(reason) = &context.reason {
            builder = builder.reason(reason.clone());
        }
        for doc in docs {
            builder = builder.add_document(doc.generation_code.clone(), doc.document_type);
        }
        builder.build(environment, at)
    }

    /// Report every document that still needs it in one request and record
    /// the per-document outcome.
    ///
    /// A rejected or failed request does not return `Err`: the affected
    /// documents move to `Failed` and carry the message. `Err` is reserved
    /// for problems found before anything is sent.
    pub async fn submit(
        &mut self,
        client: &AuthorityClient,
        context: &ContingencyContext,
        credentials: &Credentials,
        environment: Environment,
        at: NaiveDateTime,
    ) -> Result<BatchReport, AuthorityError> {
        let prior: Vec<SubmissionStatus> = self.documents.iter().map(|d| d.status).collect();
        let plan = self.plan();

        if plan.is_empty() {
            debug!("contingency batch has nothing to report");
            return Ok(BatchReport {
                report_code: None,
                results: self.results(&prior, &plan, None),
            });
        }

        let report = self.build_report(&plan, context, environment, at)?;
        let report_code = report.identificacion.codigo_generacion.clone();
        self.advance_all(&plan.to_report, SubmissionStatus::Submitted)?;

        debug!(
            "reporting {} documents in contingency report {report_code}",
            plan.to_report.len()
        );
        let failure = match client
            .send_contingency_report(&report, &report_code, credentials, environment)
            .await
        {
            Ok(_) => {
                self.advance_all(&plan.to_report, SubmissionStatus::Completed)?;
                None
            }
            Err(e) => {
                let message = e.to_string();
                warn!("contingency report {report_code} failed");
                self.advance_all(&plan.to_report, SubmissionStatus::Failed)?;
                for code in &plan.to_report {
                    if let Some(i) = self.find(code) {
                        self.documents[i].last_error = Some(message.clone());
                    }
                }
                Some(message)
            }
        };

        Ok(BatchReport {
            report_code: Some(report_code),
            results: self.results(&prior, &plan, failure.as_deref()),
        })
    }

    fn find(&self, generation_code: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.generation_code == generation_code)
    }

    fn advance_all(&mut self, codes: &[String], next: SubmissionStatus) -> Result<(), DteError> {
        for code in codes {
            if let Some(i) = self.find(code) {
                self.documents[i].advance(next)?;
            }
        }
        Ok(())
    }

    fn results(
        &self,
        prior: &[SubmissionStatus],
        plan: &BatchPlan,
        failure: Option<&str>,
    ) -> Vec<DocumentResult> {
        self.documents
            .iter()
            .zip(prior)
            .map(|(doc, &prior_status)| {
                let outcome = if plan.to_report.contains(&doc.generation_code) {
                    match failure {
                        Some(message) => DocumentOutcome::Failed(message.to_string()),
                        None => DocumentOutcome::Reported,
                    }
                } else if prior_status == SubmissionStatus::Completed {
                    DocumentOutcome::AlreadyCompleted
                } else {
                    DocumentOutcome::InFlight
                };
                DocumentResult {
                    generation_code: doc.generation_code.clone(),
                    prior_status,
                    outcome,
                }
            })
            .collect()
    }
}
