use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Runtime(#[from] ort::Error),

    #[error("unexpected classifier output shape: {0:?}")]
    OutputShape(Vec<i64>),

    #[error("classifier produced {got} scores but the label table has {expected}")]
    ScoreLength { expected: usize, got: usize },

    #[error("classifier produced no finite score")]
    NoFiniteScore,

    #[error("classifier session lock poisoned")]
    Poisoned,
}

impl InferenceError {
    /// Whether the failure was caused by the uploaded data rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
