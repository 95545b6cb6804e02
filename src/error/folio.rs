use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Where an error belongs in the operator-facing taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials or an expired session.
    Auth,
    /// A row operation was rejected.
    Data,
    /// An upload or remove was rejected.
    Storage,
    /// Configuration, request shape or anything else local.
    Internal,
}

#[derive(Debug, ThisError)]
pub enum FolioError {
    #[error("{message}")]
    Auth {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("{message}")]
    Data {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("{message}")]
    Storage {
        status: Option<StatusCode>,
        message: String,
    },

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FolioError {
    pub fn auth(message: impl Into<String>) -> Self {
        FolioError::Auth {
            status: None,
            message: message.into(),
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        FolioError::Data {
            status: None,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        FolioError::Storage {
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Auth { .. } => ErrorKind::Auth,
            FolioError::Data { .. } | FolioError::ReqwestError(_) | FolioError::JsonError(_) => {
                ErrorKind::Data
            }
            FolioError::Storage { .. } => ErrorKind::Storage,
            FolioError::UrlError(_)
            | FolioError::Config(_)
            | FolioError::InvalidRequest(_) => ErrorKind::Internal,
        }
    }

    /// Kind the operator sees: storage failures are surfaced exactly like row failures.
    pub fn surfaced_kind(&self) -> ErrorKind {
        match self.kind() {
            ErrorKind::Storage => ErrorKind::Data,
            other => other,
        }
    }

    /// Plain-text message shown inline to the operator.
    pub fn user_message(&self) -> String {
        self.user_message_or("Something went wrong.")
    }

    /// Like [`Self::user_message`], with `fallback` for backend errors that carry no text.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            FolioError::Auth { message, .. }
            | FolioError::Data { message, .. }
            | FolioError::Storage { message, .. } => {
                if message.trim().is_empty() {
                    fallback.to_string()
                } else {
                    message.clone()
                }
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for FolioError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Data | ErrorKind::Storage => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal if matches!(self, FolioError::InvalidRequest(_)) => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        (status, self.user_message()).into_response()
    }
}
