//! JSON bodies exchanged over HTTP.

use serde::{Deserialize, Serialize};

/// Successful `/predict` response: `{"result": "<label>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub result: String,
}

/// Error response: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `/labels` response, labels in output-slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelList {
    pub labels: Vec<String>,
}

/// `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_serializes_single_field() {
        let body = Prediction {
            result: "white_rice".into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"result":"white_rice"}"#
        );
    }

    #[test]
    fn error_body_parses() {
        let parsed: ErrorBody = serde_json::from_str(r#"{"error": "bad image"}"#).unwrap();
        assert_eq!(parsed.error, "bad image");
    }

    #[test]
    fn label_with_space_survives_json() {
        let body = LabelList {
            labels: vec!["fried egg".into(), "kottu".into()],
        };
        let json = serde_json::to_string(&body).unwrap();
        let parsed: LabelList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.labels[0], "fried egg");
    }
}
