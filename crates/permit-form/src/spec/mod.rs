pub mod field;
pub mod form;
pub mod section;

pub use field::{
    AssetAccept, AssetDelivery, ChoiceOption, ColumnSpec, FieldKind, FieldSpec, Rule, WireFormat,
};
pub use form::{Derivation, FormSpec};
pub use section::SectionSpec;

/// JSON schema describing [`FormSpec`] documents.
pub fn form_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(FormSpec)).unwrap_or_default()
}
