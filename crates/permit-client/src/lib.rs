#![forbid(unsafe_code)]
//! Asynchronous shell around the `permit-form` engine: the submission
//! orchestrator, the backend REST client, session and gallery persistence,
//! and the CLI driver.

pub mod api;
pub mod auth;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod gallery;
pub mod kv;
pub mod logging;
pub mod orchestrator;
pub mod picker;
pub mod result;
pub mod workflows;

pub use api::{
    ApiClient, AssetUploader, Encoding, Method, SubmissionRequest, SubmissionTransport,
};
pub use auth::{AuthContext, LoginResponse, Session, UserProfile};
pub use config::ClientConfig;
pub use error::ClientError;
pub use gallery::{Gallery, GalleryPhoto, GeoPoint};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use orchestrator::{
    Endpoint, SharedSession, SubmissionOrchestrator, SubmitOutcome, SubmitTarget, shared,
};
pub use result::{CartPrediction, SubmissionResult, SubmissionStatus};
pub use workflows::Workflow;
