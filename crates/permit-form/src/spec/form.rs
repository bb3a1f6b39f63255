use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::field::FieldSpec;
use crate::spec::section::SectionSpec;

/// Dependent fields recomputed whenever their source changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Derivation {
    AgeFromBirthday { source: String, target: String },
    ZipFromBarangay { source: String, target: String },
}

impl Derivation {
    pub fn source(&self) -> &str {
        match self {
            Derivation::AgeFromBirthday { source, .. }
            | Derivation::ZipFromBarangay { source, .. } => source,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Derivation::AgeFromBirthday { target, .. }
            | Derivation::ZipFromBarangay { target, .. } => target,
        }
    }
}

/// Top-level workflow form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    pub sections: Vec<SectionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derivations: Vec<Derivation>,
    /// Fixed entries merged into every payload.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constants: BTreeMap<String, Value>,
}

impl FormSpec {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.id == id)
    }

    /// Index of the section that owns `id`.
    pub fn section_of(&self, id: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.field(id).is_some())
    }

    pub fn asset_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields().filter(|field| field.kind.is_asset())
    }
}
