//! Class label table for the food classifier.
//!
//! The classifier's output slot `i` means `labels[i]`. Nothing in the artifact
//! ties a slot to a name, so the table order must match the order the model was
//! trained with. The built-in table is the one the service ships with; a label
//! file exported alongside the model can replace it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Food classes in classifier output order.
pub const FOOD_LABELS: &[&str] = &[
    "beatroot",
    "beef_carpaccio",
    "beef_tartare",
    "beet_salad",
    "cheesecake",
    "chicken curry",
    "chicken_wings",
    "dhal",
    "french_fries",
    "fried egg",
    "fried_rice",
    "ice_cream",
    "kottu",
    "milk rice",
    "omelette",
    "red_rice",
    "sambol",
    "white_rice",
];

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("label table is empty")]
    Empty,

    #[error("label {label:?} appears at both index {first} and index {second}")]
    Duplicate {
        label: String,
        first: usize,
        second: usize,
    },
}

/// Ordered, immutable sequence of class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// The table shipped with the service ([`FOOD_LABELS`]).
    pub fn builtin() -> Self {
        Self {
            labels: FOOD_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build a table from labels in output order.
    ///
    /// Rejects an empty table and repeated labels.
    pub fn new<I, S>(labels: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            if let Some(&first) = seen.get(label.as_str()) {
                return Err(LabelError::Duplicate {
                    label: label.clone(),
                    first,
                    second: idx,
                });
            }
            seen.insert(label, idx);
        }

        Ok(Self { labels })
    }

    /// Parse a label file body: one label per line.
    ///
    /// Lines are trimmed and blank lines skipped. Spaces inside a label are
    /// kept (`"fried egg"` stays `"fried egg"`).
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Read and parse a label file.
    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text)?;
        tracing::info!(count = table.len(), path = %path.display(), "loaded label file");
        Ok(table)
    }

    /// Label for an output slot.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::builtin()
    }
}
