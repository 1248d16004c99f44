use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::model::ModelError;

/// Everything that can stop a comparison from producing a result.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Both 'wireframe' and 'webpage' image files are required")]
    MissingFiles,

    #[error("Invalid {0} file")]
    InvalidFile(&'static str),

    #[error("Unsupported file type for {0}. Use PNG, JPG, or JPEG")]
    UnsupportedFileType(&'static str),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Server error: {0}")]
    Server(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingFiles
            | GatewayError::InvalidFile(_)
            | GatewayError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            GatewayError::Model(_) | GatewayError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for GatewayError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        GatewayError::Server(err.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
