//! The error type returned by HTTP handlers and its mapping to responses.
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::classifier::ClassifyError;

pub const INVALID_QUESTION_MESSAGE: &str =
    "The assistant could not understand that question. Please try rephrasing it.";
pub const PROCESSING_ERROR_MESSAGE: &str = "Processing error";
pub const DATABASE_ERROR_MESSAGE: &str = "Database error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request itself was unusable; the message is shown to the caller.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Classification(#[from] ClassifyError),

    /// Reading or writing transactions failed.
    #[error("database: {0:#}")]
    Database(anyhow::Error),

    /// Anything else that went wrong while producing an answer.
    #[error("processing: {0:#}")]
    Processing(anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Classification(e) if e.is_invalid_output() => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Classification(_) | AppError::Processing(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Classification(e) if e.is_invalid_output() => {
                INVALID_QUESTION_MESSAGE.to_string()
            }
            AppError::Classification(_) | AppError::Processing(_) => {
                PROCESSING_ERROR_MESSAGE.to_string()
            }
            AppError::Database(_) => DATABASE_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
