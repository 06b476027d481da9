//! Router and handlers.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::extract::multipart::MultipartRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use foodlens_ai::{InferenceError, Pipeline, decode_rgb};
use foodlens_core::{Health, LabelList, Prediction};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Shared handler state: the pipeline loaded at startup.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the service router.
///
/// `body_limit` caps the request body in bytes; larger uploads get 413.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/labels", get(labels))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /predict`: classify the uploaded `file` field.
async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = upload.ok_or(ApiError::MissingField(FILE_FIELD))?;
    let size = bytes.len();

    // Decoding and the forward pass are CPU-bound.
    let pipeline = state.pipeline.clone();
    let label = tokio::task::spawn_blocking(move || -> Result<String, InferenceError> {
        let image = decode_rgb(&bytes)?;
        let classification = pipeline.classify(&image)?;
        info!(
            label = classification.label,
            index = classification.index,
            width = image.width(),
            height = image.height(),
            bytes = size,
            "prediction"
        );
        Ok(classification.label.to_string())
    })
    .await??;

    Ok(Json(Prediction { result: label }))
}

/// `GET /labels`: the active label table in output-slot order.
async fn labels(State(state): State<AppState>) -> Json<LabelList> {
    Json(LabelList {
        labels: state.pipeline.labels().as_slice().to_vec(),
    })
}

/// `GET /health`: liveness.
async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}
