use serde::Serialize;
use serde_json::Value;

use crate::session::{FormSession, SessionStatus};
use crate::spec::field::{ChoiceOption, FieldKind};

/// One field as a frontend should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub id: String,
    pub title: String,
    pub kind: &'static str,
    pub required: bool,
    pub read_only: bool,
    pub secret: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceOption>,
    /// Secrets are rendered as `null`.
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Presentation-neutral snapshot of the current section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub form_id: String,
    pub section_id: String,
    pub title: String,
    pub index: usize,
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub fields: Vec<FieldView>,
}

impl SectionView {
    /// Number of fields currently flagged.
    pub fn error_count(&self) -> usize {
        self.fields.iter().filter(|field| field.error.is_some()).count()
    }
}

pub fn section_view(session: &FormSession) -> Option<SectionView> {
    let section = session.current_section()?;
    let index = session.section_index();
    let total = session.section_count();

    let fields = section
        .fields
        .iter()
        .map(|field| {
            let value = if field.secret {
                Value::Null
            } else {
                session
                    .field(&field.id)
                    .map(|value| value.to_json())
                    .unwrap_or(Value::Null)
            };
            FieldView {
                id: field.id.clone(),
                title: field.title.clone(),
                kind: field.kind.label(),
                required: field.required,
                read_only: field.read_only,
                secret: field.secret,
                choices: match &field.kind {
                    FieldKind::Enum { choices } | FieldKind::MultiEnum { choices } => {
                        choices.clone()
                    }
                    _ => Vec::new(),
                },
                value,
                error: session
                    .errors()
                    .get(&field.id)
                    .map(|error| error.message.clone()),
            }
        })
        .collect();

    Some(SectionView {
        form_id: session.spec().id.clone(),
        section_id: section.id.clone(),
        title: section.title.clone(),
        index,
        total,
        is_first: index == 0,
        is_last: index + 1 == total,
        status: session.status(),
        failure: session.failure_message().map(str::to_string),
        fields,
    })
}
