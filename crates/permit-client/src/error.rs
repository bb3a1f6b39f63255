use std::io;

use permit_form::{FieldErrors, PayloadError, StageError};
use serde_json::Value;
use thiserror::Error;

pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
pub const AUTH_MESSAGE: &str = "Your session has expired. Please login again.";
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures surfaced by the client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{} field(s) need attention", .0.len())]
    Validation(FieldErrors),
    #[error("missing required files: {}", .0.join(", "))]
    MissingAssets(Vec<String>),
    #[error("submission is only possible from the last section")]
    NotOnFinalSection,
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("asset '{name}': {reason}")]
    Asset { name: String, reason: String },
    #[error("authentication required: {0}")]
    Auth(String),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// The single message shown to a user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors
                .values()
                .next()
                .map(|error| error.message.clone())
                .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            ClientError::MissingAssets(fields) => {
                format!("Please add the required files: {}", fields.join(", "))
            }
            ClientError::NotOnFinalSection => "Please complete every section first.".into(),
            ClientError::Network(_) => NETWORK_MESSAGE.into(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Asset { name, reason } => format!("{name}: {reason}"),
            ClientError::Auth(_) => AUTH_MESSAGE.into(),
            ClientError::Stage(StageError::AllRejected(rejected)) => format!(
                "These files could not be added: {}",
                rejected
                    .iter()
                    .map(|file| file.display_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ClientError::Stage(StageError::SubmissionInFlight) => {
                "Please wait for the current submission to finish.".into()
            }
            ClientError::Stage(_) | ClientError::Payload(_) | ClientError::Io(_) => {
                GENERIC_MESSAGE.into()
            }
            ClientError::Decode(_) => GENERIC_MESSAGE.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Server { status: 500.., .. }
        )
    }

    /// Maps a non-2xx response body to a typed error. Server text is used
    /// verbatim from `detail`, `message` or `error`, in that order.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string());
        if status == 401 {
            return ClientError::Auth(message);
        }
        ClientError::Server { status, message }
    }
}

/// Human-readable error text carried in a response body.
pub fn server_message(body: &Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            // FastAPI validation errors carry a list of `{msg}` objects.
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return ClientError::from_status(status.as_u16(), "");
        }
        ClientError::Network(err.to_string())
    }
}
