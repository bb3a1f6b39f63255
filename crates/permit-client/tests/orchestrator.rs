mod common;

use std::sync::Arc;

use permit_form::{FieldValue, SessionStatus, StageError};
use permit_client::api::client::{REGISTER_PATH, VENDOR_APPLICATION_PATH, VENDOR_APPLY_PATH};
use permit_client::{
    ClientError, Encoding, Method, SubmissionOrchestrator, SubmissionStatus, SubmitOutcome,
    Workflow, shared,
};
use serde_json::{Value, json};

use common::{
    FakeTransport, FakeUploader, accepted, clock, image, text, vendor_session, walk_to_end,
};

fn orchestrator(
    uploader: &Arc<FakeUploader>,
    transport: &Arc<FakeTransport>,
) -> SubmissionOrchestrator {
    SubmissionOrchestrator::new(uploader.clone(), transport.clone())
}

#[tokio::test]
async fn vendor_application_uploads_then_posts_json() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    let session = shared(session);

    let outcome = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap();

    let SubmitOutcome::Submitted(result) = outcome else {
        panic!("expected a submission, got {outcome:?}");
    };
    assert_eq!(result.id.as_deref(), Some("sub-42"));
    assert_eq!(result.status, SubmissionStatus::NeedsReview);
    assert_eq!(uploader.call_count(), 3);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let request = &sent[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, VENDOR_APPLY_PATH);
    assert_eq!(request.encoding, Encoding::Json);
    assert!(request.authenticated);
    assert!(request.files.is_empty());
    assert_eq!(
        request.body["cart_image_url"],
        json!("https://cdn.example.ph/cart.jpg")
    );

    let session = session.lock().await;
    assert_eq!(session.status(), SessionStatus::Succeeded);
    assert!(session.staged_assets().is_empty());
    assert_eq!(
        session.field("vendor_photo_url"),
        Some(FieldValue::Assets(vec![permit_form::AssetRef::Remote {
            url: "https://cdn.example.ph/me.jpg".into()
        }]))
    );
}

#[tokio::test]
async fn second_submit_while_in_flight_sends_nothing() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::gated(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    let session = shared(session);
    let orchestrator = Arc::new(orchestrator(&uploader, &transport));
    let target = Workflow::VendorApplication.target();

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let session = session.clone();
        let target = target.clone();
        async move { orchestrator.submit(&session, &target).await }
    });
    transport.entered.notified().await;
    assert_eq!(session.lock().await.status(), SessionStatus::Submitting);

    let second = orchestrator.submit(&session, &target).await.unwrap();
    assert_eq!(second, SubmitOutcome::AlreadyInFlight);

    transport.gate.as_ref().unwrap().notify_one();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, SubmitOutcome::Submitted(_)));
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(uploader.call_count(), 3);
}

#[tokio::test]
async fn files_picked_during_submission_are_refused_not_lost() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::gated(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    let session = shared(session);
    let orchestrator = Arc::new(orchestrator(&uploader, &transport));

    let pending = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let session = session.clone();
        async move {
            orchestrator
                .submit(&session, &Workflow::VendorApplication.target())
                .await
        }
    });
    transport.entered.notified().await;
    {
        let mut guard = session.lock().await;
        let err = guard
            .stage_assets("cart_image_url", vec![image("new-cart.jpg")])
            .unwrap_err();
        assert_eq!(err, StageError::SubmissionInFlight);
        assert_eq!(
            ClientError::from(err).user_message(),
            "Please wait for the current submission to finish."
        );
        assert!(!guard.set_field("business_name", text("Renamed")));
    }

    transport.gate.as_ref().unwrap().notify_one();
    pending.await.unwrap().unwrap();

    let mut guard = session.lock().await;
    assert_eq!(guard.status(), SessionStatus::Succeeded);
    assert_eq!(
        guard.field("cart_image_url"),
        Some(FieldValue::Assets(vec![permit_form::AssetRef::Remote {
            url: "https://cdn.example.ph/cart.jpg".into()
        }]))
    );
    assert_eq!(guard.fields().text("business_name"), "Aling Nena's Fishballs");

    guard
        .stage_assets("cart_image_url", vec![image("new-cart.jpg")])
        .unwrap();
    assert_eq!(guard.staged_assets().len(), 1);
}

#[tokio::test]
async fn upload_failure_keeps_every_staged_file_and_sends_nothing() {
    let uploader = Arc::new(FakeUploader::failing_on(2));
    let transport = Arc::new(FakeTransport::ok(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    let session = shared(session);

    let err = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_retryable());
    assert!(transport.sent().is_empty());

    let session = session.lock().await;
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.failure_message(), Some(err.user_message().as_str()));
    assert_eq!(session.staged_assets().len(), 3);
    assert_eq!(
        session.fields().text("business_name"),
        "Aling Nena's Fishballs"
    );
}

#[tokio::test]
async fn server_rejection_marks_session_failed_and_allows_retry() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::failing(ClientError::Server {
        status: 422,
        message: "Business name already registered".into(),
    }));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    let session = shared(session);

    let err = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Business name already registered");

    let mut guard = session.lock().await;
    assert_eq!(guard.status(), SessionStatus::Failed);
    guard.set_field("business_name", text("Nena's Fishballs"));
    assert_eq!(guard.status(), SessionStatus::Editing);
    assert_eq!(guard.staged_assets().len(), 3);
}

#[tokio::test]
async fn refuses_before_the_last_section() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(accepted()));
    let session = shared(vendor_session());

    let err = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotOnFinalSection));
    assert_eq!(uploader.call_count(), 0);
    assert_eq!(session.lock().await.status(), SessionStatus::Editing);
}

#[tokio::test]
async fn refuses_when_the_final_section_is_invalid() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    session.set_field("preferred_contact", text("Carrier pigeon"));
    let session = shared(session);

    let err = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap_err();

    let ClientError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains_key("preferred_contact"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn refuses_when_a_required_photo_was_removed() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(accepted()));
    let mut session = vendor_session();
    walk_to_end(&mut session);
    session.remove_asset("business_logo_url", 0).unwrap();
    let session = shared(session);

    let err = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap_err();

    match err {
        ClientError::MissingAssets(fields) => assert_eq!(fields, vec!["business_logo_url"]),
        other => panic!("expected missing assets, got {other:?}"),
    }
    assert_eq!(uploader.call_count(), 0);
}

#[tokio::test]
async fn update_session_uses_the_update_endpoint_and_keeps_remote_urls() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(json!({"success": true})));
    let record = json!({
        "business_name": "Aling Nena's Fishballs",
        "goods_type": "Snacks",
        "cart_type": "Push Cart",
        "years_in_operation": 3,
        "products": [],
        "preferred_contact": "Call",
        "business_logo_url": "https://cdn.example.ph/old-logo.jpg",
        "cart_image_url": "https://cdn.example.ph/old-cart.jpg",
        "vendor_photo_url": "https://cdn.example.ph/old-me.jpg",
    });
    let mut session =
        Workflow::VendorApplication.resume(clock(), &record, Some("app-7".into()));
    session
        .stage_assets("cart_image_url", vec![image("new-cart.jpg")])
        .unwrap();
    walk_to_end(&mut session);
    let session = shared(session);

    orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::VendorApplication.target())
        .await
        .unwrap();

    assert_eq!(uploader.call_count(), 1);
    let request = &transport.sent()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, VENDOR_APPLICATION_PATH);
    assert_eq!(
        request.body["business_logo_url"],
        json!("https://cdn.example.ph/old-logo.jpg")
    );
    assert_eq!(
        request.body["cart_image_url"],
        json!("https://cdn.example.ph/new-cart.jpg")
    );
    assert_eq!(request.body["preferred_contact"], json!("Call"));
}

#[tokio::test]
async fn registration_goes_out_as_one_multipart_post() {
    let uploader = Arc::new(FakeUploader::default());
    let transport = Arc::new(FakeTransport::ok(json!({
        "message": "Registration successful. Check your email for the code."
    })));
    let mut session = Workflow::Register.start(clock());
    session.set_fields([
        ("firstname".to_string(), text("Juan")),
        ("lastname".to_string(), text("Dela Cruz")),
        ("birthday".to_string(), text("1994-03-02")),
        ("gender".to_string(), text("male")),
        ("mobile_no".to_string(), text("09171234567")),
        ("email".to_string(), text("juan@example.ph")),
        ("address".to_string(), text("12 Shaw Blvd")),
        ("barangay".to_string(), text("Kapitolyo")),
        ("password".to_string(), text("s3cret-pass")),
        ("confirmPassword".to_string(), text("s3cret-pass")),
    ]);
    session
        .stage_assets("img", vec![image("profile.jpg")])
        .unwrap();
    walk_to_end(&mut session);
    let session = shared(session);

    let outcome = orchestrator(&uploader, &transport)
        .submit(&session, &Workflow::Register.target())
        .await
        .unwrap();

    let SubmitOutcome::Submitted(result) = outcome else {
        panic!("expected a submission");
    };
    assert!(result.message.unwrap().contains("email"));
    assert_eq!(uploader.call_count(), 0);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let request = &sent[0];
    assert_eq!(request.path, REGISTER_PATH);
    assert_eq!(request.encoding, Encoding::Multipart);
    assert!(!request.authenticated);
    assert_eq!(request.body["age"], json!(30));
    assert_eq!(request.body["zip_code"], json!("1603"));
    assert_eq!(request.body["role"], json!("user"));
    assert!(!request.body.contains_key("confirmPassword"));
    assert!(!request.body.contains_key("img"));
    assert_eq!(request.files.len(), 1);
    assert_eq!(request.files[0].name, "img");
    assert_eq!(request.files[0].asset.display_name, "profile.jpg");
    assert!(request.body.values().all(|value| !matches!(value, Value::Object(_))));
}
