use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{AssetPicker, AssetSource, AssetStager, PickResult, StageError, StageReport};
use crate::derived::{Clock, derive_all, derive_for};
use crate::sequencer::{FinalCheck, SectionSequencer, StepOutcome};
use crate::spec::field::{AssetAccept, AssetDelivery, FieldKind};
use crate::spec::form::FormSpec;
use crate::spec::section::SectionSpec;
use crate::store::FieldStore;
use crate::validate::{FieldErrors, validate_section};
use crate::value::{AssetRef, FieldValue, StagedAsset};

/// Lifecycle of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Editing,
    /// Transient while a section is checked.
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Fresh application or update of an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    Create,
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        record_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Cancelled,
    Staged(StageReport),
}

/// A staged file together with the slot it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSlot {
    pub field: String,
    pub position: usize,
    pub delivery: AssetDelivery,
    pub asset: StagedAsset,
}

/// Serializable copy of a session used to resume an interrupted workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub form_id: String,
    pub spec_version: String,
    pub section_index: usize,
    pub fields: FieldStore,
    #[serde(default)]
    pub errors: FieldErrors,
    pub status: SessionStatus,
    pub mode: SessionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SessionSnapshot {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot belongs to form '{found}', expected '{expected}'")]
    FormMismatch { expected: String, found: String },
    #[error("snapshot was taken with form version {found}, current is {expected}")]
    VersionMismatch { expected: String, found: String },
}

/// Complete in-progress state of one workflow instance.
#[derive(Debug, Clone)]
pub struct FormSession {
    spec: Arc<FormSpec>,
    fields: FieldStore,
    sequencer: SectionSequencer,
    errors: FieldErrors,
    status: SessionStatus,
    mode: SessionMode,
    failure: Option<String>,
    stager: AssetStager,
    clock: Arc<dyn Clock>,
}

impl FormSession {
    pub fn new(spec: Arc<FormSpec>, clock: Arc<dyn Clock>) -> Self {
        let sequencer = SectionSequencer::new(spec.section_count());
        Self {
            spec,
            fields: FieldStore::new(),
            sequencer,
            errors: FieldErrors::new(),
            status: SessionStatus::Editing,
            mode: SessionMode::Create,
            failure: None,
            stager: AssetStager::default(),
            clock,
        }
    }

    /// Session pre-populated from an existing record.
    pub fn for_update(
        spec: Arc<FormSpec>,
        clock: Arc<dyn Clock>,
        record: FieldStore,
        record_id: Option<String>,
    ) -> Self {
        let mut session = Self::new(spec, clock);
        session.fields = derive_all(&session.spec, &record, session.clock.today());
        session.mode = SessionMode::Update { record_id };
        session
    }

    pub fn restore(
        spec: Arc<FormSpec>,
        clock: Arc<dyn Clock>,
        snapshot: SessionSnapshot,
    ) -> Result<Self, SnapshotError> {
        if snapshot.form_id != spec.id {
            return Err(SnapshotError::FormMismatch {
                expected: spec.id.clone(),
                found: snapshot.form_id,
            });
        }
        if snapshot.spec_version != spec.version {
            return Err(SnapshotError::VersionMismatch {
                expected: spec.version.clone(),
                found: snapshot.spec_version,
            });
        }
        let mut session = Self::new(spec, clock);
        session.sequencer = SectionSequencer::at(snapshot.section_index, session.spec.section_count());
        session.fields = snapshot.fields;
        session.errors = snapshot.errors;
        session.mode = snapshot.mode;
        session.failure = snapshot.failure;
        session.status = match snapshot.status {
            SessionStatus::Submitting => {
                session
                    .failure
                    .get_or_insert_with(|| "submission was interrupted".into());
                SessionStatus::Failed
            }
            SessionStatus::Validating => SessionStatus::Editing,
            other => other,
        };
        Ok(session)
    }

    pub fn with_stager(mut self, stager: AssetStager) -> Self {
        self.stager = stager;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            form_id: self.spec.id.clone(),
            spec_version: self.spec.version.clone(),
            section_index: self.sequencer.index(),
            fields: self.fields.clone(),
            errors: self.errors.clone(),
            status: self.status,
            mode: self.mode.clone(),
            failure: self.failure.clone(),
        }
    }

    pub fn spec(&self) -> &Arc<FormSpec> {
        &self.spec
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn section_index(&self) -> usize {
        self.sequencer.index()
    }

    pub fn section_count(&self) -> usize {
        self.sequencer.section_count()
    }

    pub fn current_section(&self) -> Option<&SectionSpec> {
        self.spec.sections.get(self.sequencer.index())
    }

    pub fn today(&self) -> time::Date {
        self.clock.today()
    }

    /// Current value, or the kind's empty default for declared fields.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        if let Some(value) = self.fields.get(name) {
            return Some(value.clone());
        }
        self.spec
            .field(name)
            .and_then(|field| FieldValue::default_for(&field.kind))
    }

    /// Replaces one value, clears its error and recomputes dependent fields
    /// before returning. Returns `false`, changing nothing, while a
    /// submission is in flight.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) -> bool {
        let name = name.into();
        if self.refuse_edit(&name) {
            return false;
        }
        self.touch();
        self.fields.set(name.clone(), value);
        self.errors.remove(&name);
        self.fields = derive_for(&self.spec, &self.fields, &name, self.clock.today());
        true
    }

    /// Applies several values as one transaction. Refused as a whole while
    /// a submission is in flight.
    pub fn set_fields<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        if self.refuse_edit("*") {
            return false;
        }
        self.touch();
        let mut changed = Vec::new();
        for (name, value) in values {
            self.fields.set(name.clone(), value);
            self.errors.remove(&name);
            changed.push(name);
        }
        let today = self.clock.today();
        for name in changed {
            self.fields = derive_for(&self.spec, &self.fields, &name, today);
        }
        true
    }

    /// Removes a value. Fields derived from it keep their last value.
    pub fn clear_field(&mut self, name: &str) -> bool {
        if self.refuse_edit(name) {
            return false;
        }
        self.touch();
        self.fields.remove(name);
        self.errors.remove(name);
        true
    }

    // The in-flight request was built from the current values; they stay
    // frozen until it settles.
    fn refuse_edit(&self, field: &str) -> bool {
        if self.status != SessionStatus::Submitting {
            return false;
        }
        warn!(form = %self.spec.id, field, "edit refused while submitting");
        true
    }

    pub fn validate_current(&self) -> FieldErrors {
        validate_section(
            &self.spec,
            self.sequencer.index(),
            &self.fields,
            self.clock.today(),
        )
    }

    /// `Next`: validates the current section and advances on success.
    pub fn next(&mut self) -> StepOutcome {
        let from = self.sequencer.index();
        let errors = self.run_validation();
        if !errors.is_empty() {
            debug!(form = %self.spec.id, section = from, errors = errors.len(), "section blocked");
            return StepOutcome::Blocked(errors);
        }
        match self.sequencer.advance() {
            Some(to) => {
                debug!(form = %self.spec.id, from, to, "advanced section");
                StepOutcome::Advanced { from, to }
            }
            None => StepOutcome::AtLastSection,
        }
    }

    /// `Previous`: unconditional step back; errors are left untouched.
    pub fn previous(&mut self) -> StepOutcome {
        let from = self.sequencer.index();
        match self.sequencer.retreat() {
            Some(to) => {
                debug!(form = %self.spec.id, from, to, "returned to section");
                StepOutcome::Retreated { from, to }
            }
            None => StepOutcome::AtFirstSection,
        }
    }

    /// `SubmitFinal`: only on the last section; validates it before handing off.
    pub fn submit_final(&mut self) -> FinalCheck {
        if self.status == SessionStatus::Submitting {
            return FinalCheck::InFlight;
        }
        if !self.sequencer.is_last() {
            return FinalCheck::NotOnLastSection {
                current: self.sequencer.index(),
                last: self.sequencer.section_count() - 1,
            };
        }
        let errors = self.run_validation();
        if errors.is_empty() {
            FinalCheck::Ready
        } else {
            FinalCheck::Blocked(errors)
        }
    }

    fn run_validation(&mut self) -> FieldErrors {
        let previous = self.status;
        self.status = SessionStatus::Validating;
        let errors = self.validate_current();
        self.errors = errors.clone();
        self.status = match previous {
            SessionStatus::Validating => SessionStatus::Editing,
            other => other,
        };
        errors
    }

    fn touch(&mut self) {
        if self.status == SessionStatus::Failed {
            self.status = SessionStatus::Editing;
        }
    }

    /// Runs a platform picker and stages what it returns.
    pub fn pick_asset(
        &mut self,
        field: &str,
        picker: &mut dyn AssetPicker,
        source: AssetSource,
    ) -> Result<PickOutcome, StageError> {
        let multiple = self.asset_kind(field)?.1;
        self.ensure_editable_assets(field)?;
        match picker.pick(source, multiple) {
            PickResult::Cancelled => Ok(PickOutcome::Cancelled),
            PickResult::Picked(candidates) => {
                self.stage_assets(field, candidates).map(PickOutcome::Staged)
            }
        }
    }

    /// Stages the valid subset of `candidates` into an asset slot, replacing
    /// whatever the slot held. Rejected files are reported, not staged.
    pub fn stage_assets(
        &mut self,
        field: &str,
        candidates: Vec<StagedAsset>,
    ) -> Result<StageReport, StageError> {
        let (accept, multiple) = self.asset_kind(field)?;
        self.ensure_editable_assets(field)?;
        let mut report = self.stager.stage(accept, candidates);
        if report.staged.is_empty() {
            return Err(StageError::AllRejected(report.rejected));
        }
        if !multiple {
            report.staged.truncate(1);
        }
        let assets = report
            .staged
            .iter()
            .cloned()
            .map(AssetRef::Staged)
            .collect();
        self.set_field(field, FieldValue::Assets(assets));
        Ok(report)
    }

    pub fn remove_asset(&mut self, field: &str, position: usize) -> Result<(), StageError> {
        self.asset_kind(field)?;
        self.ensure_editable_assets(field)?;
        self.touch();
        if let Some(FieldValue::Assets(assets)) = self.fields.get_mut(field)
            && position < assets.len()
        {
            assets.remove(position);
        }
        Ok(())
    }

    fn ensure_editable_assets(&self, field: &str) -> Result<(), StageError> {
        if self.refuse_edit(field) {
            return Err(StageError::SubmissionInFlight);
        }
        Ok(())
    }

    fn asset_kind(&self, field: &str) -> Result<(AssetAccept, bool), StageError> {
        let spec = self
            .spec
            .field(field)
            .ok_or_else(|| StageError::UnknownField(field.to_string()))?;
        match &spec.kind {
            FieldKind::Asset {
                accept, multiple, ..
            } => Ok((*accept, *multiple)),
            _ => Err(StageError::NotAnAssetField(field.to_string())),
        }
    }

    /// Every staged (not yet remote) asset in field order.
    pub fn staged_assets(&self) -> Vec<StagedSlot> {
        let mut slots = Vec::new();
        for field in self.spec.asset_fields() {
            let FieldKind::Asset { delivery, .. } = field.kind else {
                continue;
            };
            let Some(assets) = self.fields.get(&field.id).and_then(FieldValue::assets) else {
                continue;
            };
            for (position, asset) in assets.iter().enumerate() {
                if let Some(staged) = asset.staged() {
                    slots.push(StagedSlot {
                        field: field.id.clone(),
                        position,
                        delivery,
                        asset: staged.clone(),
                    });
                }
            }
        }
        slots
    }

    /// Required asset slots, across all sections, that hold nothing.
    pub fn missing_required_assets(&self) -> Vec<String> {
        self.spec
            .asset_fields()
            .filter(|field| field.required)
            .filter(|field| self.fields.get(&field.id).is_none_or(FieldValue::is_blank))
            .map(|field| field.id.clone())
            .collect()
    }

    /// Enters `Submitting`. Returns `false` when a submission is already in flight.
    pub fn begin_submission(&mut self) -> bool {
        if self.status == SessionStatus::Submitting {
            return false;
        }
        self.status = SessionStatus::Submitting;
        self.failure = None;
        true
    }

    /// Marks success. `resolved` maps upload fields to the remote URL of each
    /// entry in slot order; other staged files were sent inline and are dropped.
    pub fn complete_submission(&mut self, resolved: &BTreeMap<String, Vec<String>>) {
        let asset_ids: Vec<String> = self.spec.asset_fields().map(|f| f.id.clone()).collect();
        for id in asset_ids {
            let Some(FieldValue::Assets(assets)) = self.fields.get_mut(&id) else {
                continue;
            };
            match resolved.get(&id) {
                Some(urls) => {
                    *assets = urls
                        .iter()
                        .map(|url| AssetRef::Remote { url: url.clone() })
                        .collect();
                }
                None => assets.retain(|asset| asset.staged().is_none()),
            }
        }
        self.status = SessionStatus::Succeeded;
        self.errors.clear();
        self.failure = None;
        info!(form = %self.spec.id, "submission succeeded");
    }

    /// Marks failure. Field values and staged assets are preserved for retry.
    pub fn fail_submission(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(form = %self.spec.id, %message, "submission failed");
        self.status = SessionStatus::Failed;
        self.failure = Some(message);
    }
}
