//! Error taxonomy shared by every layer.
//!
//! `ApiError` is the uniform shape of a failed server call. `FailureKind` is
//! what the orchestration surfaces to the user once a journey cannot continue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed server call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Network unreachable or a non-JSON body (e.g. an HTML page from a
    /// misrouted request).
    Transport,
    /// Any other non-success status.
    Http,
    /// 422 with structured validation detail.
    Validation,
    /// 402: the server refuses to consume a credit for this request.
    PaymentRequired,
    /// 401: missing or expired session.
    Auth,
}

impl ApiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::Transport => "transport",
            ApiErrorKind::Http => "http",
            ApiErrorKind::Validation => "validation",
            ApiErrorKind::PaymentRequired => "payment-required",
            ApiErrorKind::Auth => "auth",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a 422 `detail` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetail {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub input: Option<serde_json::Value>,
}

/// Uniform error returned by every server port.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub http_status: Option<u16>,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, http_status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status,
            message: message.into(),
            details: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Http, Some(status), message)
    }

    pub fn validation(message: impl Into<String>, details: Vec<ValidationDetail>) -> Self {
        let details = serde_json::to_value(details).ok();
        Self {
            kind: ApiErrorKind::Validation,
            http_status: Some(422),
            message: message.into(),
            details,
        }
    }

    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::PaymentRequired, Some(402), message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, Some(401), message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_payment_required(&self) -> bool {
        self.kind == ApiErrorKind::PaymentRequired
    }

    pub fn is_auth(&self) -> bool {
        self.kind == ApiErrorKind::Auth
    }
}

/// User-visible category of a failed grant extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionCategory {
    Unreachable,
    Blocked,
    NotFound,
    ServerUnavailable,
    AuthConfig,
    Timeout,
    Other,
}

impl ExtractionCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractionCategory::Unreachable => {
                "The grant page could not be reached. Check the link and try again."
            }
            ExtractionCategory::Blocked => {
                "The grant site blocked automated access. Enter the details manually."
            }
            ExtractionCategory::NotFound => "The grant page was not found.",
            ExtractionCategory::ServerUnavailable => {
                "The assessment service is temporarily unavailable."
            }
            ExtractionCategory::AuthConfig => {
                "Extraction is not available right now (service configuration)."
            }
            ExtractionCategory::Timeout => {
                "Reading the grant page took too long. Enter the details manually."
            }
            ExtractionCategory::Other => "The grant page could not be read.",
        }
    }
}

/// Why an orchestration ended in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    Transport { message: String },
    Auth,
    Validation { message: String },
    Http { status: Option<u16>, message: String },
    /// The server refused a request that already carried a verified payment.
    PaymentRequired,
    PaymentInitialization { message: String },
    Fatal { message: String },
}

impl FailureKind {
    pub fn fatal(message: impl Into<String>) -> Self {
        FailureKind::Fatal {
            message: message.into(),
        }
    }
}

impl From<&ApiError> for FailureKind {
    fn from(error: &ApiError) -> Self {
        match error.kind {
            ApiErrorKind::Transport => FailureKind::Transport {
                message: error.message.clone(),
            },
            ApiErrorKind::Auth => FailureKind::Auth,
            ApiErrorKind::Validation => FailureKind::Validation {
                message: error.message.clone(),
            },
            ApiErrorKind::PaymentRequired => FailureKind::PaymentRequired,
            ApiErrorKind::Http => FailureKind::Http {
                status: error.http_status,
                message: error.message.clone(),
            },
        }
    }
}
