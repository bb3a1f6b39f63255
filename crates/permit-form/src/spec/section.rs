use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::FieldSpec;

/// One logical step of a multi-section form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionSpec {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields,
        }
    }

    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.id.as_str())
            .collect()
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }
}
