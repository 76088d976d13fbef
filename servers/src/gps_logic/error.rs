use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        log::error!("{}", self);
        (status, self.to_string()).into_response()
    }
}
