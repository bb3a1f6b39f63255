//! The three concrete workflows.

pub mod document_submission;
pub mod register;
pub mod vendor_application;

use std::sync::Arc;

use clap::ValueEnum;
use permit_form::{Clock, FieldStore, FormSession, FormSpec};
use serde_json::Value;

use crate::orchestrator::SubmitTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Workflow {
    Register,
    VendorApplication,
    DocumentSubmission,
}

impl Workflow {
    pub const ALL: [Workflow; 3] = [
        Workflow::Register,
        Workflow::VendorApplication,
        Workflow::DocumentSubmission,
    ];

    pub fn spec(&self) -> FormSpec {
        match self {
            Workflow::Register => register::spec(),
            Workflow::VendorApplication => vendor_application::spec(),
            Workflow::DocumentSubmission => document_submission::spec(),
        }
    }

    pub fn target(&self) -> SubmitTarget {
        match self {
            Workflow::Register => register::target(),
            Workflow::VendorApplication => vendor_application::target(),
            Workflow::DocumentSubmission => document_submission::target(),
        }
    }

    pub fn supports_update(&self) -> bool {
        self.target().update.is_some()
    }

    /// Fresh session with the workflow's starting values.
    pub fn start(&self, clock: Arc<dyn Clock>) -> FormSession {
        let mut session = FormSession::new(Arc::new(self.spec()), clock);
        if let Workflow::VendorApplication = self {
            session.set_fields(vendor_application::initial_values());
        }
        session
    }

    /// Session pre-populated from an existing record.
    pub fn resume(&self, clock: Arc<dyn Clock>, record: &Value, record_id: Option<String>) -> FormSession {
        let spec = Arc::new(self.spec());
        let fields = FieldStore::from_json(&spec, record);
        FormSession::for_update(spec, clock, fields, record_id)
    }
}
