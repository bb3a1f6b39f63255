#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use permit_form::{FieldValue, FixedClock, FormSession, StagedAsset, StepOutcome};
use serde_json::{Value, json};
use time::macros::date;
use tokio::sync::Notify;

use permit_client::{AssetUploader, ClientError, SubmissionRequest, SubmissionTransport, Workflow};

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(date!(2024 - 06 - 14)))
}

pub fn image(name: &str) -> StagedAsset {
    StagedAsset {
        local_ref: format!("file:///photos/{name}"),
        mime_type: "image/jpeg".into(),
        display_name: name.into(),
        size_bytes: 120_000,
    }
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::text(value)
}

/// Presses `Next` until the session sits on its last section.
pub fn walk_to_end(session: &mut FormSession) {
    loop {
        match session.next() {
            StepOutcome::Advanced { .. } => continue,
            StepOutcome::AtLastSection => return,
            other => panic!("walk stopped: {other:?}"),
        }
    }
}

/// A complete vendor application with three staged photos, still on the
/// first section.
pub fn vendor_session() -> FormSession {
    let mut session = Workflow::VendorApplication.start(clock());
    session.set_fields([
        ("business_name".to_string(), text("Aling Nena's Fishballs")),
        ("goods_type".to_string(), text("Snacks")),
        ("cart_type".to_string(), text("Push Cart")),
        ("years_in_operation".to_string(), text("3")),
        (
            "area_of_operation".to_string(),
            FieldValue::Choices(vec!["School".into(), "Streets".into()]),
        ),
        (
            "products".to_string(),
            FieldValue::Rows(vec![
                [
                    ("name".to_string(), "Fishball".to_string()),
                    ("category".to_string(), String::new()),
                    ("price".to_string(), "15".to_string()),
                ]
                .into(),
                [
                    ("name".to_string(), "Gulaman".to_string()),
                    ("category".to_string(), "Beverages".to_string()),
                    ("price".to_string(), "20.50".to_string()),
                ]
                .into(),
            ]),
        ),
        ("facebook".to_string(), text("fb.com/alingnena")),
    ]);
    for (field, name) in [
        ("business_logo_url", "logo.jpg"),
        ("cart_image_url", "cart.jpg"),
        ("vendor_photo_url", "me.jpg"),
    ] {
        session
            .stage_assets(field, vec![image(name)])
            .expect("stage photo");
    }
    session
}

/// Uploads succeed with a CDN URL, except the `fail_on`-th call (1-based).
#[derive(Default)]
pub struct FakeUploader {
    pub calls: AtomicUsize,
    pub fail_on: Option<usize>,
}

impl FakeUploader {
    pub fn failing_on(call: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: Some(call),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetUploader for FakeUploader {
    async fn upload(&self, asset: &StagedAsset) -> Result<String, ClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(ClientError::Network("connection reset".into()));
        }
        Ok(format!("https://cdn.example.ph/{}", asset.display_name))
    }
}

/// Records every request and answers with a canned body. When `gate` is
/// set, `send` signals `entered` and waits for the gate before answering.
pub struct FakeTransport {
    pub requests: Mutex<Vec<SubmissionRequest>>,
    pub response: Result<Value, ClientError>,
    pub entered: Notify,
    pub gate: Option<Notify>,
}

impl FakeTransport {
    pub fn ok(response: Value) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(response),
            entered: Notify::new(),
            gate: None,
        }
    }

    pub fn failing(err: ClientError) -> Self {
        Self {
            response: Err(err),
            ..Self::ok(Value::Null)
        }
    }

    pub fn gated(response: Value) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::ok(response)
        }
    }

    pub fn sent(&self) -> Vec<SubmissionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionTransport for FakeTransport {
    async fn send(&self, request: SubmissionRequest) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(ClientError::Server { status, message }) => Err(ClientError::Server {
                status: *status,
                message: message.clone(),
            }),
            Err(ClientError::Network(message)) => Err(ClientError::Network(message.clone())),
            Err(other) => Err(ClientError::Decode(other.to_string())),
        }
    }
}

pub fn accepted() -> Value {
    json!({
        "success": true,
        "submission": {
            "_id": "sub-42",
            "status": "needs_review",
            "similarity_percentage": 87.5,
        },
        "message": "Application received",
    })
}
