use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::spec::field::AssetAccept;
use crate::value::StagedAsset;

/// Largest file accepted at pick time (10 MiB, inclusive).
pub const MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;

/// Where a picker acquires media from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Camera,
    Gallery,
    DocumentBrowser,
}

/// Outcome of a platform picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Cancelled,
    Picked(Vec<StagedAsset>),
}

/// Platform media acquisition (camera, gallery, document browser).
pub trait AssetPicker {
    fn pick(&mut self, source: AssetSource, multiple: bool) -> PickResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    TooLarge { limit_bytes: u64 },
    UnsupportedType { mime_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedAsset {
    pub display_name: String,
    pub size_bytes: u64,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Files split into the staged subset and the rejected ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub staged: Vec<StagedAsset>,
    pub rejected: Vec<RejectedAsset>,
}

impl StageReport {
    pub fn rejected_names(&self) -> Vec<&str> {
        self.rejected
            .iter()
            .map(|rejected| rejected.display_name.as_str())
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' does not hold assets")]
    NotAnAssetField(String),
    #[error("no file could be staged ({} rejected)", .0.len())]
    AllRejected(Vec<RejectedAsset>),
    #[error("files cannot change while a submission is in progress")]
    SubmissionInFlight,
}

/// Enforces size and type limits before anything is staged. Performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct AssetStager {
    max_bytes: u64,
}

impl Default for AssetStager {
    fn default() -> Self {
        Self::new(MAX_ASSET_BYTES)
    }
}

impl AssetStager {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn stage(&self, accept: AssetAccept, candidates: Vec<StagedAsset>) -> StageReport {
        let mut report = StageReport::default();
        for candidate in candidates {
            let reason = if candidate.size_bytes > self.max_bytes {
                Some(RejectReason::TooLarge {
                    limit_bytes: self.max_bytes,
                })
            } else if !accept.allows(&candidate.mime_type) {
                Some(RejectReason::UnsupportedType {
                    mime_type: candidate.mime_type.clone(),
                })
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    warn!(
                        file = %candidate.display_name,
                        size_bytes = candidate.size_bytes,
                        ?reason,
                        "rejected picked file"
                    );
                    report.rejected.push(RejectedAsset {
                        display_name: candidate.display_name,
                        size_bytes: candidate.size_bytes,
                        reason,
                    });
                }
                None => report.staged.push(candidate),
            }
        }
        report
    }
}
