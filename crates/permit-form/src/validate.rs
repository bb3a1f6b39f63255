use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::derived::{age_from_birthday, parse_date};
use crate::spec::field::{FieldKind, FieldSpec, Rule};
use crate::spec::form::FormSpec;
use crate::store::FieldStore;
use crate::value::FieldValue;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));

/// Validation failure reported for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Field id to error; empty means valid.
pub type FieldErrors = BTreeMap<String, ValidationError>;

/// Validates every field of one section. All invalid fields are reported.
pub fn validate_section(
    spec: &FormSpec,
    index: usize,
    fields: &FieldStore,
    today: Date,
) -> FieldErrors {
    let Some(section) = spec.sections.get(index) else {
        return FieldErrors::new();
    };
    section
        .fields
        .iter()
        .filter_map(|field| validate_field(spec, field, fields, today))
        .map(|error| (error.field.clone(), error))
        .collect()
}

/// Validates all sections at once.
pub fn validate_form(spec: &FormSpec, fields: &FieldStore, today: Date) -> FieldErrors {
    (0..spec.section_count())
        .flat_map(|index| validate_section(spec, index, fields, today))
        .collect()
}

fn validate_field(
    spec: &FormSpec,
    field: &FieldSpec,
    fields: &FieldStore,
    today: Date,
) -> Option<ValidationError> {
    let value = fields.get(&field.id);
    let blank = value.is_none_or(FieldValue::is_blank);

    if blank {
        if field.required {
            return Some(error(
                field,
                format!("{} is required", field.title),
                "required",
            ));
        }
        // An empty confirmation still has to match its counterpart.
        return field.rules.iter().find_map(|rule| match rule {
            Rule::Matches { field: other } => check_matches(spec, field, fields, other),
            _ => None,
        });
    }

    let value = value?;
    if !value.matches_kind(&field.kind) {
        return Some(error(field, "type mismatch".into(), "type_mismatch"));
    }

    if let Some(error) = check_kind(field, value) {
        return Some(error);
    }

    field
        .rules
        .iter()
        .find_map(|rule| check_rule(spec, field, value, fields, rule, today))
}

fn check_kind(field: &FieldSpec, value: &FieldValue) -> Option<ValidationError> {
    match (&field.kind, value) {
        (FieldKind::Enum { choices }, FieldValue::Text(text))
            if !choices.iter().any(|choice| &choice.value == text) =>
        {
            Some(error(field, "invalid option".into(), "enum_mismatch"))
        }
        (FieldKind::MultiEnum { choices }, FieldValue::Choices(selected))
            if selected
                .iter()
                .any(|item| !choices.iter().any(|choice| &choice.value == item)) =>
        {
            Some(error(field, "invalid option".into(), "enum_mismatch"))
        }
        (FieldKind::Date, FieldValue::Text(text)) if parse_date(text).is_none() => Some(error(
            field,
            format!("{} is not a valid date", field.title),
            "invalid_date",
        )),
        (FieldKind::Asset { multiple: false, .. }, FieldValue::Assets(assets))
            if assets.len() > 1 =>
        {
            Some(error(
                field,
                format!("{} accepts a single file", field.title),
                "too_many_assets",
            ))
        }
        _ => None,
    }
}

fn check_rule(
    spec: &FormSpec,
    field: &FieldSpec,
    value: &FieldValue,
    fields: &FieldStore,
    rule: &Rule,
    today: Date,
) -> Option<ValidationError> {
    if let Rule::Matches { field: other } = rule {
        return check_matches(spec, field, fields, other);
    }

    let text = value.as_text()?;
    match rule {
        Rule::Email if !EMAIL.is_match(text) => Some(error(
            field,
            format!("{} is invalid", field.title),
            "invalid_email",
        )),
        Rule::Digits { count }
            if text.len() != *count || !text.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            Some(error(
                field,
                format!("{} must be {} digits", field.title, count),
                "digits",
            ))
        }
        Rule::MinLength { min } if text.chars().count() < *min => Some(error(
            field,
            format!("{} must be at least {} characters", field.title, min),
            "min_length",
        )),
        Rule::MinAge { years } => match age_from_birthday(text, today) {
            None => Some(error(
                field,
                format!("{} is not a valid date", field.title),
                "invalid_date",
            )),
            Some(age) if age < i64::from(*years) => Some(error(
                field,
                format!("Must be at least {} years old", years),
                "min_age",
            )),
            Some(_) => None,
        },
        _ => None,
    }
}

fn check_matches(
    spec: &FormSpec,
    field: &FieldSpec,
    fields: &FieldStore,
    other: &str,
) -> Option<ValidationError> {
    if fields.text(&field.id) == fields.text(other) {
        return None;
    }
    let other_title = spec
        .field(other)
        .map(|spec| spec.title.as_str())
        .unwrap_or(other);
    Some(error(
        field,
        format!("Does not match {}", other_title),
        "mismatch",
    ))
}

fn error(field: &FieldSpec, message: String, code: &str) -> ValidationError {
    ValidationError {
        field: field.id.clone(),
        message,
        code: code.into(),
    }
}
