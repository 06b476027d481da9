//! Runtime configuration shared by the server and the CLI.

use std::path::PathBuf;

use crate::labels::{LabelError, LabelTable};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;
/// 10 MiB, enough for a phone camera JPEG.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// `host:port`, with IPv6 hosts bracketed.
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Where the classifier artifact and its label ordering come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    /// `None` uses the built-in table.
    pub labels_path: Option<PathBuf>,
}

impl ModelConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels_path: None,
        }
    }

    pub fn with_labels(mut self, labels_path: impl Into<PathBuf>) -> Self {
        self.labels_path = Some(labels_path.into());
        self
    }

    pub fn load_labels(&self) -> Result<LabelTable, LabelError> {
        match &self.labels_path {
            Some(path) => LabelTable::load(path),
            None => {
                tracing::info!(count = crate::labels::FOOD_LABELS.len(), "using built-in label table");
                Ok(LabelTable::builtin())
            }
        }
    }
}
