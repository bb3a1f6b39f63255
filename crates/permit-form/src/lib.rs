#![forbid(unsafe_code)]
//! Multi-section form engine for permit and registration workflows.
//!
//! Sessions hold a flat field store, recompute derived fields on every edit,
//! validate one section at a time and stage picked files. Nothing here
//! performs network I/O; submission lives in `permit-client`.

pub mod assets;
pub mod barangay;
pub mod derived;
pub mod payload;
pub mod render;
pub mod sequencer;
pub mod session;
pub mod spec;
pub mod store;
pub mod validate;
pub mod value;

pub use assets::{
    AssetPicker, AssetSource, AssetStager, MAX_ASSET_BYTES, PickResult, RejectReason,
    RejectedAsset, StageError, StageReport,
};
pub use barangay::{BARANGAYS, barangay_choices, zip_code_for};
pub use derived::{
    Clock, FixedClock, SystemClock, age_from_birthday, age_on, derive_all, derive_for, parse_date,
};
pub use payload::{InlinePart, PayloadError, ResolvedAssets, assemble, inline_parts};
pub use render::{FieldView, SectionView, section_view};
pub use sequencer::{FinalCheck, SectionSequencer, StepOutcome};
pub use session::{
    FormSession, PickOutcome, SessionMode, SessionSnapshot, SessionStatus, SnapshotError,
    StagedSlot,
};
pub use spec::{
    AssetAccept, AssetDelivery, ChoiceOption, ColumnSpec, Derivation, FieldKind, FieldSpec,
    FormSpec, Rule, SectionSpec, WireFormat, form_schema,
};
pub use store::FieldStore;
pub use validate::{FieldErrors, ValidationError, validate_form, validate_section};
pub use value::{AssetRef, FieldValue, StagedAsset, is_remote_url};
