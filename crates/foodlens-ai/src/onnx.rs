//! ONNX Runtime backend for the frozen food classifier.
//!
//! The artifact takes a single `f32` input of shape `[1, 3, 224, 224]` and
//! produces one score per class as its first output (`[1, N]`).

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::error::InferenceError;
use crate::model::ScoreModel;
use crate::preprocess::ImageTensor;

/// Image classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so calls from concurrent requests
/// take turns on the mutex. The weights are never modified after load.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    num_classes: Option<usize>,
}

impl OnnxClassifier {
    /// Load a classifier artifact from an `.onnx` file.
    pub fn load(model_path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "model not found at {model_path:?}");

        let session = Session::builder()?.commit_from_file(model_path)?;

        // Class count from the output shape, when the export made it static.
        let num_classes = infer_classes(session.outputs()[0].dtype());

        info!(
            classes = ?num_classes,
            model = %model_path.display(),
            "loaded classifier model"
        );
        Ok(Self {
            session: Mutex::new(session),
            num_classes,
        })
    }
}

impl ScoreModel for OnnxClassifier {
    fn scores(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let [n, c, h, w] = input.shape();
        let shape = [n as i64, c as i64, h as i64, w as i64];
        let tensor = Tensor::from_array((shape, input.as_slice().to_vec().into_boxed_slice()))?;

        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session.run(ort::inputs![tensor])?;

        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;

        // Accept `[N]` or `[1, N]`.
        let classes = match dims {
            [n] => *n,
            [1, n] => *n,
            _ => return Err(InferenceError::OutputShape(dims.to_vec())),
        };
        if classes < 0 || classes as usize != output_data.len() {
            return Err(InferenceError::OutputShape(dims.to_vec()));
        }

        Ok(output_data.to_vec())
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }
}

/// Try to read the class count from the model's output type.
fn infer_classes(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the class axis; dynamic dims are negative.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
