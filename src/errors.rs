use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::api::Envelope;
use crate::export::RenderError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Template(askama::Error),
    Render(RenderError),
    /// Loading the data behind a PDF export failed.
    Export(String),
    Hash(String),
    Session(String),
    Internal(String),
    Unauthorized,
    Forbidden(String),
    /// Carries the entity label, e.g. "Notulensi".
    NotFound(String),
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Render(e) => write!(f, "Render error: {e}"),
            AppError::Export(e) => write!(f, "Export error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Internal(e) => write!(f, "{e}"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(e) => write!(f, "Forbidden: {e}"),
            AppError::NotFound(label) => write!(f, "{label} not found"),
            AppError::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl AppError {
    /// Message returned to the caller. Internal details stay in the log.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Forbidden(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(label) => format!("{label} not found"),
            AppError::Store(StoreError::Conflict(_)) => "Record already exists".to_string(),
            AppError::Template(_) | AppError::Render(_) | AppError::Export(_) => {
                "Failed to generate PDF".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(status).json(Envelope::error(self.public_message()))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}
