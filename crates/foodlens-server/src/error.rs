use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use foodlens_ai::InferenceError;
use foodlens_core::ErrorBody;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("expected a multipart/form-data body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("missing multipart field `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("inference task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotMultipart(rejection) => rejection.status(),
            Self::Multipart(err) => err.status(),
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::Inference(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Inference(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "prediction failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "rejected request");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
