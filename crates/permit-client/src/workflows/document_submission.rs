//! Document upload for AI-assisted comparison against a base document.

use std::collections::BTreeMap;

use permit_form::{AssetAccept, AssetDelivery, FieldKind, FieldSpec, FormSpec, SectionSpec};

use crate::api::Encoding;
use crate::api::client::DOCUMENT_UPLOAD_PATH;
use crate::orchestrator::{Endpoint, SubmitTarget};

pub const FORM_ID: &str = "document_submission";

pub fn spec() -> FormSpec {
    FormSpec {
        id: FORM_ID.into(),
        title: "Submit Documents".into(),
        version: "1.0.0".into(),
        sections: vec![SectionSpec::new(
            "documents",
            "Documents",
            vec![
                FieldSpec::text("base_document_id", "Document Type").required(),
                FieldSpec::text("notes", "Notes"),
                FieldSpec::new(
                    "files",
                    "Files",
                    FieldKind::Asset {
                        accept: AssetAccept::Document,
                        multiple: true,
                        delivery: AssetDelivery::Inline,
                    },
                )
                .required(),
            ],
        )],
        derivations: Vec::new(),
        constants: BTreeMap::new(),
    }
}

pub fn target() -> SubmitTarget {
    SubmitTarget {
        create: Endpoint::post(DOCUMENT_UPLOAD_PATH),
        update: None,
        encoding: Encoding::Multipart,
        authenticated: true,
    }
}
