//! Backend REST contracts and the seams the orchestrator submits through.

pub mod client;
pub mod dto;

use async_trait::async_trait;
use permit_form::{InlinePart, StagedAsset};
use serde_json::{Map, Value};

use crate::error::ClientError;

pub use client::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    /// Text parts for every payload entry plus one file part per inline asset.
    Multipart,
}

/// A fully assembled create-or-update call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub method: Method,
    pub path: String,
    pub encoding: Encoding,
    pub authenticated: bool,
    pub body: Map<String, Value>,
    pub files: Vec<InlinePart>,
}

/// Uploads one staged file and returns its remote URL.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, asset: &StagedAsset) -> Result<String, ClientError>;
}

/// Sends the final submission and returns the decoded 2xx body.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, request: SubmissionRequest) -> Result<Value, ClientError>;
}
