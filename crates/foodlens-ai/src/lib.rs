//! Inference layer: image decoding, preprocessing, and the classifier pipeline.

mod error;
mod model;
mod pipeline;
pub mod preprocess;

pub use error::InferenceError;
pub use model::ScoreModel;
pub use pipeline::{Classification, Pipeline, argmax};
pub use preprocess::{ImageTensor, decode_rgb, preprocess};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
