use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

pub async fn handler404(path: Uri) -> Error {
    Error::NotFound {
        message: format!("Invalid path: {}", path),
    }
}

/// Everything a handler can fail with. Rendered as a status code plus plain text.
#[derive(Debug, Clone)]
pub enum Error {
    InvalidPayload { message: String },
    NotFound { message: String },
    InternalError { kind: &'static str, message: String },
}

impl Error {
    pub fn invalid<S: Into<String>>(msg: S) -> Error {
        Error::InvalidPayload {
            message: msg.into(),
        }
    }

    /// Logs the store failure and replaces it with `public` for the client.
    pub fn storage(err: StoreError, public: &str) -> Error {
        match err {
            StoreError::Validation(_) => Error::invalid(public),
            StoreError::Storage(err) => {
                log::error!("Database error: {}", err);
                Error::InternalError {
                    kind: "DatabaseError",
                    message: public.to_string(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::InvalidPayload { message }
            | Error::NotFound { message }
            | Error::InternalError { message, .. } => message,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::InternalError { kind, .. } = &self {
            log::debug!("Answering {} after {}", self.status(), kind);
        }
        (self.status(), self.message().to_string()).into_response()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        log::debug!("Rejected JSON body: {}", err);
        Error::invalid("Malformed payload.")
    }
}

impl From<serde_urlencoded::de::Error> for Error {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        log::debug!("Rejected form body: {}", err);
        Error::invalid("Malformed payload.")
    }
}
