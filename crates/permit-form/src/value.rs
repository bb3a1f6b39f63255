use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::spec::field::FieldKind;

/// A locally-picked file pending upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StagedAsset {
    /// Device URI or filesystem path.
    pub local_ref: String,
    pub mime_type: String,
    pub display_name: String,
    pub size_bytes: u64,
}

/// Reference held by an asset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssetRef {
    Staged(StagedAsset),
    Remote { url: String },
}

impl AssetRef {
    pub fn staged(&self) -> Option<&StagedAsset> {
        match self {
            AssetRef::Staged(asset) => Some(asset),
            AssetRef::Remote { .. } => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            AssetRef::Remote { url } => Some(url),
            AssetRef::Staged(_) => None,
        }
    }
}

/// Value stored for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Choices(Vec<String>),
    Rows(Vec<BTreeMap<String, String>>),
    Assets(Vec<AssetRef>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn assets(&self) -> Option<&[AssetRef]> {
        match self {
            FieldValue::Assets(assets) => Some(assets),
            _ => None,
        }
    }

    /// Empty text (after trimming) and empty collections count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Choices(items) => items.is_empty(),
            FieldValue::Rows(rows) => rows.is_empty(),
            FieldValue::Assets(assets) => assets.is_empty(),
            FieldValue::Integer(_) | FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// Type-appropriate empty value for a field kind.
    pub fn default_for(kind: &FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Text | FieldKind::Enum { .. } | FieldKind::Date => {
                Some(FieldValue::Text(String::new()))
            }
            FieldKind::MultiEnum { .. } => Some(FieldValue::Choices(Vec::new())),
            FieldKind::Boolean => Some(FieldValue::Bool(false)),
            FieldKind::List { .. } => Some(FieldValue::Rows(Vec::new())),
            FieldKind::Asset { .. } => Some(FieldValue::Assets(Vec::new())),
            FieldKind::Integer => None,
        }
    }

    /// Whether the value has the shape a field kind expects.
    pub fn matches_kind(&self, kind: &FieldKind) -> bool {
        match kind {
            FieldKind::Text | FieldKind::Enum { .. } | FieldKind::Date => {
                matches!(self, FieldValue::Text(_))
            }
            FieldKind::MultiEnum { .. } => matches!(self, FieldValue::Choices(_)),
            FieldKind::Integer => matches!(self, FieldValue::Integer(_)),
            FieldKind::Boolean => matches!(self, FieldValue::Bool(_)),
            FieldKind::List { .. } => matches!(self, FieldValue::Rows(_)),
            FieldKind::Asset { .. } => matches!(self, FieldValue::Assets(_)),
        }
    }

    /// Converts loosely-typed JSON (answers files, existing records) into a
    /// value of the given kind. Asset URLs become remote references.
    pub fn from_json(kind: &FieldKind, value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match kind {
            FieldKind::Text | FieldKind::Enum { .. } | FieldKind::Date => match value {
                Value::String(text) => Some(FieldValue::Text(text.clone())),
                Value::Number(number) => Some(FieldValue::Text(number.to_string())),
                Value::Bool(flag) => Some(FieldValue::Text(flag.to_string())),
                _ => None,
            },
            FieldKind::MultiEnum { .. } => value.as_array().map(|items| {
                FieldValue::Choices(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                )
            }),
            FieldKind::Integer => match value {
                Value::Number(number) => number.as_i64().map(FieldValue::Integer),
                Value::String(text) => text.trim().parse().ok().map(FieldValue::Integer),
                _ => None,
            },
            FieldKind::Boolean => match value {
                Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
                Value::String(text) => match text.to_ascii_lowercase().as_str() {
                    "true" | "yes" => Some(FieldValue::Bool(true)),
                    "false" | "no" => Some(FieldValue::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            FieldKind::List { .. } => value.as_array().map(|rows| {
                FieldValue::Rows(rows.iter().filter_map(Value::as_object).map(row_strings).collect())
            }),
            FieldKind::Asset { .. } => {
                let urls: Vec<&str> = match value {
                    Value::String(url) => vec![url.as_str()],
                    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                    _ => return None,
                };
                Some(FieldValue::Assets(
                    urls.into_iter()
                        .filter(|url| is_remote_url(url))
                        .map(|url| AssetRef::Remote {
                            url: url.to_string(),
                        })
                        .collect(),
                ))
            }
        }
    }

    /// Plain JSON rendering used by views and payload assembly.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Integer(value) => Value::from(*value),
            FieldValue::Number(value) => Value::from(*value),
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Choices(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Rows(rows) => Value::Array(
                rows.iter()
                    .map(|row| {
                        Value::Object(
                            row.iter()
                                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            FieldValue::Assets(assets) => Value::Array(
                assets
                    .iter()
                    .map(|asset| match asset {
                        AssetRef::Staged(staged) => Value::String(staged.display_name.clone()),
                        AssetRef::Remote { url } => Value::String(url.clone()),
                    })
                    .collect(),
            ),
        }
    }
}

pub fn is_remote_url(candidate: &str) -> bool {
    candidate.starts_with("http://") || candidate.starts_with("https://")
}

fn row_strings(row: &Map<String, Value>) -> BTreeMap<String, String> {
    row.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
