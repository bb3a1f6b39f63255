//! Upload-then-submit pipeline for a finished [`FormSession`].

use std::sync::Arc;

use permit_form::{
    AssetDelivery, AssetRef, FieldKind, FieldValue, FinalCheck, FormSession, ResolvedAssets,
    SessionMode, assemble, inline_parts,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::{AssetUploader, Encoding, Method, SubmissionRequest, SubmissionTransport};
use crate::error::ClientError;
use crate::result::SubmissionResult;

/// A session shared between the UI side and an in-flight submission.
pub type SharedSession = Arc<Mutex<FormSession>>;

pub fn shared(session: FormSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    /// `{id}` is replaced by the record id of update sessions.
    pub path: String,
}

impl Endpoint {
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
        }
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
        }
    }
}

/// Where and how a workflow's payload is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTarget {
    pub create: Endpoint,
    pub update: Option<Endpoint>,
    pub encoding: Encoding,
    pub authenticated: bool,
}

impl SubmitTarget {
    fn endpoint_for(&self, mode: &SessionMode) -> Endpoint {
        match (mode, &self.update) {
            (SessionMode::Update { record_id }, Some(update)) => Endpoint {
                method: update.method,
                path: update
                    .path
                    .replace("{id}", record_id.as_deref().unwrap_or_default()),
            },
            _ => self.create.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(SubmissionResult),
    /// Another submission of the same session is still running.
    AlreadyInFlight,
}

pub struct SubmissionOrchestrator {
    uploader: Arc<dyn AssetUploader>,
    transport: Arc<dyn SubmissionTransport>,
}

impl SubmissionOrchestrator {
    pub fn new(uploader: Arc<dyn AssetUploader>, transport: Arc<dyn SubmissionTransport>) -> Self {
        Self {
            uploader,
            transport,
        }
    }

    /// Validates the final section, uploads staged files, then sends one
    /// request. Any failure leaves field values and staged files untouched.
    pub async fn submit(
        &self,
        session: &SharedSession,
        target: &SubmitTarget,
    ) -> Result<SubmitOutcome, ClientError> {
        let (spec, fields, mode) = {
            let mut guard = session.lock().await;
            match guard.submit_final() {
                FinalCheck::Ready => {}
                FinalCheck::InFlight => return Ok(SubmitOutcome::AlreadyInFlight),
                FinalCheck::NotOnLastSection { .. } => return Err(ClientError::NotOnFinalSection),
                FinalCheck::Blocked(errors) => return Err(ClientError::Validation(errors)),
            }
            let missing = guard.missing_required_assets();
            if !missing.is_empty() {
                return Err(ClientError::MissingAssets(missing));
            }
            if !guard.begin_submission() {
                return Ok(SubmitOutcome::AlreadyInFlight);
            }
            (
                guard.spec().clone(),
                guard.fields().clone(),
                guard.mode().clone(),
            )
        };
        info!(form = %spec.id, "submission started");

        let outcome = async {
            let mut resolved = ResolvedAssets::new();
            for field in spec.asset_fields() {
                if !matches!(
                    field.kind,
                    FieldKind::Asset {
                        delivery: AssetDelivery::Upload,
                        ..
                    }
                ) {
                    continue;
                }
                let Some(assets) = fields.get(&field.id).and_then(FieldValue::assets) else {
                    continue;
                };
                let mut urls = Vec::with_capacity(assets.len());
                for asset in assets {
                    match asset {
                        AssetRef::Remote { url } => urls.push(url.clone()),
                        AssetRef::Staged(staged) => {
                            urls.push(self.uploader.upload(staged).await?);
                        }
                    }
                }
                if !urls.is_empty() {
                    resolved.insert(field.id.clone(), urls);
                }
            }

            let body = assemble(&spec, &fields, &resolved)?;
            let endpoint = target.endpoint_for(&mode);
            let request = SubmissionRequest {
                method: endpoint.method,
                path: endpoint.path,
                encoding: target.encoding,
                authenticated: target.authenticated,
                body,
                files: match target.encoding {
                    Encoding::Multipart => inline_parts(&spec, &fields),
                    Encoding::Json => Vec::new(),
                },
            };
            let response = self.transport.send(request).await?;
            Ok::<_, ClientError>((resolved, response))
        }
        .await;

        let mut guard = session.lock().await;
        match outcome {
            Ok((resolved, response)) => {
                guard.complete_submission(&resolved);
                Ok(SubmitOutcome::Submitted(SubmissionResult::from_response(
                    &response,
                )))
            }
            Err(err) => {
                warn!(form = %spec.id, error = %err, "submission aborted");
                guard.fail_submission(err.user_message());
                Err(err)
            }
        }
    }
}
