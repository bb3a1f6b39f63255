//! Server response snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Review state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    NeedsReview,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Unknown values read as `Pending`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "needs_review" | "pending_review" | "review" => SubmissionStatus::NeedsReview,
            "approved" | "verified" => SubmissionStatus::Approved,
            "rejected" | "declined" => SubmissionStatus::Rejected,
            _ => SubmissionStatus::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "Processing",
            SubmissionStatus::NeedsReview => "Pending Review",
            SubmissionStatus::Approved => "Approved",
            SubmissionStatus::Rejected => "Rejected",
        }
    }
}

/// Similarity percentages; absent values are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub similarity: f64,
    pub text_similarity: f64,
    pub label_similarity: f64,
    pub object_similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub id: Option<String>,
    pub status: SubmissionStatus,
    pub scores: Scores,
    pub submitted_at: Option<String>,
    /// Free text such as "check your email for the code".
    pub message: Option<String>,
}

impl SubmissionResult {
    /// Reads any of the create-endpoint response shapes: a bare record,
    /// `{submission: {...}}`, or a register acknowledgement.
    pub fn from_response(body: &Value) -> Self {
        let record = body.get("submission").unwrap_or(body);
        let details = record.get("comparison_details");
        let score = |source: Option<&Value>, key: &str| {
            source
                .and_then(|value| value.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };

        Self {
            id: ["_id", "id"]
                .iter()
                .find_map(|key| record.get(*key))
                .and_then(|id| match id {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                }),
            status: record
                .get("status")
                .and_then(Value::as_str)
                .map(SubmissionStatus::parse)
                .unwrap_or_default(),
            scores: Scores {
                similarity: score(Some(record), "similarity_percentage"),
                text_similarity: score(details, "text_similarity"),
                label_similarity: score(details, "label_similarity"),
                object_similarity: score(details, "object_similarity"),
            },
            submitted_at: record
                .get("submitted_at")
                .and_then(Value::as_str)
                .map(str::to_string),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Reads `{submissions: [...]}` or a bare array.
    pub fn list_from_response(body: &Value) -> Vec<Self> {
        body.get("submissions")
            .unwrap_or(body)
            .as_array()
            .map(|items| items.iter().map(Self::from_response).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartDetection {
    /// `[x1, y1, x2, y2]` in image pixels.
    #[serde(rename = "box")]
    pub bounding_box: [f64; 4],
    pub class_id: i64,
    pub confidence: f64,
}

/// Response of the cart detection endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartPrediction {
    #[serde(default)]
    pub predictions: Vec<CartDetection>,
    #[serde(default)]
    pub text_detection: Option<Value>,
    #[serde(default)]
    pub original_image_url: Option<String>,
}

impl CartPrediction {
    pub fn best(&self) -> Option<&CartDetection> {
        self.predictions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}
