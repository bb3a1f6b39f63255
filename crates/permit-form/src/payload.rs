use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::spec::field::{AssetDelivery, ColumnSpec, FieldKind, FieldSpec, WireFormat};
use crate::spec::form::FormSpec;
use crate::store::FieldStore;
use crate::value::{FieldValue, StagedAsset};

/// Upload field id to the remote URL of each of its entries, in slot order.
pub type ResolvedAssets = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("asset field '{field}' has no uploaded URL")]
    UnresolvedAsset { field: String },
    #[error("invalid pointer '{0}'")]
    InvalidPointer(String),
}

/// A staged file sent as a multipart part of the submission itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePart {
    pub name: String,
    pub asset: StagedAsset,
}

/// Builds the transmitted JSON object. Internal-only fields are dropped,
/// wire conversions applied and inline assets left for the multipart body.
pub fn assemble(
    spec: &FormSpec,
    fields: &FieldStore,
    resolved: &ResolvedAssets,
) -> Result<Map<String, Value>, PayloadError> {
    let mut payload = Value::Object(Map::new());

    for field in spec.fields() {
        if field.wire == WireFormat::Omit {
            continue;
        }
        let value = match &field.kind {
            FieldKind::Asset {
                delivery: AssetDelivery::Inline,
                ..
            } => continue,
            FieldKind::Asset { multiple, .. } => asset_value(field, *multiple, fields, resolved)?,
            FieldKind::List { columns } => list_value(columns, fields.get(&field.id)),
            _ => scalar_value(field, fields.get(&field.id)),
        };
        set_path(&mut payload, &field.payload_pointer(), value)?;
    }

    for (key, value) in &spec.constants {
        set_path(&mut payload, &format!("/{key}"), value.clone())?;
    }

    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(PayloadError::InvalidPointer(String::new())),
    }
}

/// Staged files of inline-delivery fields, in field order.
pub fn inline_parts(spec: &FormSpec, fields: &FieldStore) -> Vec<InlinePart> {
    spec.asset_fields()
        .filter(|field| {
            matches!(
                field.kind,
                FieldKind::Asset {
                    delivery: AssetDelivery::Inline,
                    ..
                }
            )
        })
        .flat_map(|field| {
            fields
                .get(&field.id)
                .and_then(FieldValue::assets)
                .unwrap_or_default()
                .iter()
                .filter_map(|asset| asset.staged())
                .map(|asset| InlinePart {
                    name: field.id.clone(),
                    asset: asset.clone(),
                })
        })
        .collect()
}

fn asset_value(
    field: &FieldSpec,
    multiple: bool,
    fields: &FieldStore,
    resolved: &ResolvedAssets,
) -> Result<Value, PayloadError> {
    let urls: Vec<String> = match resolved.get(&field.id) {
        Some(urls) => urls.clone(),
        None => {
            let assets = fields
                .get(&field.id)
                .and_then(FieldValue::assets)
                .unwrap_or_default();
            let mut urls = Vec::with_capacity(assets.len());
            for asset in assets {
                match asset.remote_url() {
                    Some(url) => urls.push(url.to_string()),
                    None => {
                        return Err(PayloadError::UnresolvedAsset {
                            field: field.id.clone(),
                        });
                    }
                }
            }
            urls
        }
    };

    if multiple {
        return Ok(Value::Array(urls.into_iter().map(Value::String).collect()));
    }
    Ok(urls.into_iter().next().map(Value::String).unwrap_or(Value::Null))
}

fn list_value(columns: &[ColumnSpec], value: Option<&FieldValue>) -> Value {
    let Some(FieldValue::Rows(rows)) = value else {
        return Value::Array(Vec::new());
    };
    let rows = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for column in columns {
                if column.wire == WireFormat::Omit {
                    continue;
                }
                let cell = row.get(&column.id).map(String::as_str).unwrap_or("");
                object.insert(column.id.clone(), convert_text(column.wire, cell));
            }
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

fn scalar_value(field: &FieldSpec, value: Option<&FieldValue>) -> Value {
    let Some(value) = value else {
        return match field.wire {
            WireFormat::Verbatim => FieldValue::default_for(&field.kind)
                .map(|value| value.to_json())
                .unwrap_or(Value::Null),
            WireFormat::Number => Value::from(0),
            _ => Value::Null,
        };
    };
    match (field.wire, value) {
        (WireFormat::Verbatim, value) => value.to_json(),
        (_, FieldValue::Text(text)) => convert_text(field.wire, text),
        (WireFormat::NullIfEmpty, value) if value.is_blank() => Value::Null,
        (WireFormat::Number, FieldValue::Integer(number)) => Value::from(*number as f64),
        (_, value) => value.to_json(),
    }
}

// Unparseable integers become null; unparseable numbers fall back to zero.
fn convert_text(wire: WireFormat, text: &str) -> Value {
    let trimmed = text.trim();
    match wire {
        WireFormat::Verbatim | WireFormat::Omit => Value::String(text.to_string()),
        WireFormat::NullIfEmpty if trimmed.is_empty() => Value::Null,
        WireFormat::NullIfEmpty => Value::String(text.to_string()),
        WireFormat::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        WireFormat::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Value::from)
            .unwrap_or_else(|| Value::from(0)),
    }
}

fn set_path(root: &mut Value, pointer: &str, value: Value) -> Result<(), PayloadError> {
    if !pointer.starts_with('/') || pointer.len() < 2 {
        return Err(PayloadError::InvalidPointer(pointer.to_string()));
    }

    let segments = pointer[1..].split('/').map(decode_segment).collect::<Vec<_>>();

    let mut current = root;
    for (idx, segment) in segments.iter().enumerate() {
        if idx + 1 == segments.len() {
            ensure_object(current).insert(segment.clone(), value);
            return Ok(());
        }
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Err(PayloadError::InvalidPointer(pointer.to_string()))
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut().expect("value is object")
}

fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
