use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selectable option for enum-like fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose transmitted value is also its label.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Media families accepted by an asset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetAccept {
    Image,
    Document,
    Any,
}

impl AssetAccept {
    pub fn allows(&self, mime_type: &str) -> bool {
        let mime = mime_type.to_ascii_lowercase();
        match self {
            AssetAccept::Image => mime.starts_with("image/"),
            AssetAccept::Document => {
                mime.starts_with("image/")
                    || mime == "application/pdf"
                    || mime.contains("word")
                    || mime.contains("document")
            }
            AssetAccept::Any => true,
        }
    }
}

/// How a staged asset reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetDelivery {
    /// Uploaded separately first; the payload carries the returned URL.
    Upload,
    /// Attached as a multipart file part of the submission itself.
    Inline,
}

/// Column of a repeatable list field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub wire: WireFormat,
}

/// Field data kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Enum {
        choices: Vec<ChoiceOption>,
    },
    MultiEnum {
        choices: Vec<ChoiceOption>,
    },
    /// ISO `YYYY-MM-DD` date kept as text.
    Date,
    Integer,
    Boolean,
    List {
        columns: Vec<ColumnSpec>,
    },
    Asset {
        accept: AssetAccept,
        #[serde(default)]
        multiple: bool,
        delivery: AssetDelivery,
    },
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Enum { .. } => "enum",
            FieldKind::MultiEnum { .. } => "multi_enum",
            FieldKind::Date => "date",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::List { .. } => "list",
            FieldKind::Asset { .. } => "asset",
        }
    }

    pub fn choices(&self) -> Option<&[ChoiceOption]> {
        match self {
            FieldKind::Enum { choices } | FieldKind::MultiEnum { choices } => Some(choices),
            _ => None,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, FieldKind::Asset { .. })
    }
}

/// Declarative per-field validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Email,
    Digits { count: usize },
    MinLength { min: usize },
    MinAge { years: i32 },
    Matches { field: String },
}

/// Conversion applied when a value is written into the outgoing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    #[default]
    Verbatim,
    Integer,
    Number,
    NullIfEmpty,
    /// Internal-only; never transmitted.
    Omit,
}

/// Definition of a single field inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub wire: WireFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_path: Option<String>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            required: false,
            secret: false,
            read_only: false,
            rules: Vec::new(),
            wire: WireFormat::Verbatim,
            wire_path: None,
        }
    }

    pub fn text(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn wire(mut self, wire: WireFormat) -> Self {
        self.wire = wire;
        self
    }

    pub fn wire_path(mut self, pointer: impl Into<String>) -> Self {
        self.wire_path = Some(pointer.into());
        self
    }

    /// JSON pointer the value is written to in the payload.
    pub fn payload_pointer(&self) -> String {
        match &self.wire_path {
            Some(path) => path.clone(),
            None => format!("/{}", self.id.replace('~', "~0").replace('/', "~1")),
        }
    }
}
