use crate::error::InferenceError;
use crate::preprocess::ImageTensor;

/// A frozen classifier: one preprocessed image in, one score per class out.
///
/// Implementations are shared across request handlers and must tolerate
/// concurrent calls without mutating their weights.
pub trait ScoreModel: Send + Sync {
    /// Per-class scores for a `(1, 3, 224, 224)` tensor.
    fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError>;

    /// Number of classes the model declares, if the artifact states it.
    fn num_classes(&self) -> Option<usize> {
        None
    }
}
