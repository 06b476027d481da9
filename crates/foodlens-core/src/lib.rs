pub mod config;
pub mod labels;
pub mod wire;

pub use config::{ModelConfig, ServerConfig};
pub use labels::{LabelError, LabelTable};
pub use wire::{ErrorBody, Health, LabelList, Prediction};
