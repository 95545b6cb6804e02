use crate::error::{ErrorKind, FolioError};
use crate::utils::logging::debug_backend_body;
use folio_schema::{AuthErrorBody, PostgrestErrorBody, StorageErrorBody};
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};

pub(super) const BODY_PREVIEW_CHARS: usize = 300;

/// A structured error body one of the backend services answers with.
pub(super) trait BackendErrorBody: std::fmt::Debug + DeserializeOwned + Serialize {
    fn backend_message(&self) -> Option<&str>;
}

impl BackendErrorBody for AuthErrorBody {
    fn backend_message(&self) -> Option<&str> {
        self.message()
    }
}

impl BackendErrorBody for PostgrestErrorBody {
    fn backend_message(&self) -> Option<&str> {
        self.message()
    }
}

impl BackendErrorBody for StorageErrorBody {
    fn backend_message(&self) -> Option<&str> {
        self.message()
    }
}

/// Reads a rejected response into the error of the given kind.
pub(super) async fn error_from_response(resp: reqwest::Response, kind: ErrorKind) -> FolioError {
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();
    error_from_body(status, &bytes, kind)
}

pub(super) fn error_from_body(status: StatusCode, bytes: &[u8], kind: ErrorKind) -> FolioError {
    let message = match kind {
        ErrorKind::Auth => structured_message::<AuthErrorBody>(status, bytes),
        ErrorKind::Storage => structured_message::<StorageErrorBody>(status, bytes),
        ErrorKind::Data | ErrorKind::Internal => {
            structured_message::<PostgrestErrorBody>(status, bytes)
        }
    }
    .unwrap_or_else(|| {
        let raw = String::from_utf8_lossy(bytes);
        tracing::debug!(
            %status,
            body = %format!("{:.len$}", raw, len = BODY_PREVIEW_CHARS),
            "Backend unstructured error"
        );
        format!("Backend returned {status}")
    });

    // An expired or revoked token is an auth problem whichever service noticed it.
    let kind = if status == StatusCode::UNAUTHORIZED {
        ErrorKind::Auth
    } else {
        kind
    };

    let status = Some(status);
    match kind {
        ErrorKind::Auth => FolioError::Auth { status, message },
        ErrorKind::Storage => FolioError::Storage { status, message },
        ErrorKind::Data | ErrorKind::Internal => FolioError::Data { status, message },
    }
}

fn structured_message<E: BackendErrorBody>(status: StatusCode, bytes: &[u8]) -> Option<String> {
    let error = serde_json::from_slice::<E>(bytes).ok()?;
    debug_backend_body(&format!("Backend structured error ({status})"), &error);
    error.backend_message().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_prefer_the_description() {
        let body = br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body, ErrorKind::Auth);
        assert!(matches!(
            err,
            FolioError::Auth { status: Some(StatusCode::BAD_REQUEST), ref message }
                if message == "Invalid login credentials"
        ));
    }

    #[test]
    fn row_errors_use_the_postgrest_message() {
        let body = br#"{"code":"42501","details":null,"hint":null,"message":"new row violates row-level security policy"}"#;
        let err = error_from_body(StatusCode::FORBIDDEN, body, ErrorKind::Data);
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(
            err.user_message(),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn storage_errors_keep_their_kind() {
        let body = br#"{"statusCode":"413","error":"Payload too large","message":"The object exceeded the maximum allowed size"}"#;
        let err = error_from_body(StatusCode::PAYLOAD_TOO_LARGE, body, ErrorKind::Storage);
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(
            err.user_message(),
            "The object exceeded the maximum allowed size"
        );
    }

    #[test]
    fn unauthorized_responses_become_auth_errors() {
        let body = br#"{"message":"JWT expired","code":"PGRST301"}"#;
        let err = error_from_body(StatusCode::UNAUTHORIZED, body, ErrorKind::Data);
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.user_message(), "JWT expired");
    }

    #[test]
    fn unstructured_bodies_fall_back_to_the_status() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"<html>oops</html>", ErrorKind::Data);
        assert_eq!(err.user_message(), "Backend returned 502 Bad Gateway");
    }
}
