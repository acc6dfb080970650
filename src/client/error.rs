use serde::Deserialize;
use thiserror::Error;

use crate::core::DteError;

/// Errors from talking to the authority gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthorityError {
    /// Transport failure; carries the underlying description.
    #[error("network error: {0}")]
    Network(String),

    /// Success status, but the body is not the expected shape.
    #[error("could not decode authority response: {0}")]
    Decode(String),

    /// The authority refused the request.
    #[error("authority rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document failed a local check before anything was sent.
    #[error(transparent)]
    Document(#[from] DteError),
}

impl AuthorityError {
    /// Message the authority attached to a rejection, if this is one.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    descripcion_msg: String,
    #[serde(default)]
    observaciones: Vec<String>,
}

/// Turn a rejection body into the message surfaced to the caller.
///
/// A structured body yields every `observaciones` entry followed by
/// `descripcionMsg`, one per line. Anything else is returned verbatim.
pub fn decode_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .observaciones
            .into_iter()
            .chain(std::iter::once(parsed.descripcion_msg))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(_) => body.to_string(),
    }
}
