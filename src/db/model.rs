use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar value of a child field. Numbers keep their plain representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Decimal(d) => write!(f, "{d}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn is_jpeg(&self) -> bool {
        matches!(self.content_type.as_str(), "image/jpeg" | "image/jpg" | "image/pjpeg")
    }
}

/// A child case record.
///
/// Attachments are not part of the serialized document; the store keeps
/// them next to it, keyed by `<logical name>-<timestamp>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_photo_key: Option<String>,
    #[serde(skip)]
    pub attachments: BTreeMap<String, Attachment>,
}

impl Child {
    pub fn new(id: impl Into<String>) -> Self {
        Child {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Plain string form of a field, empty when the child lacks it.
    pub fn field_text(&self, name: &str) -> String {
        self.field(name).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.field_text("name")
    }

    pub fn unique_identifier(&self) -> String {
        self.field_text("unique_identifier")
    }

    pub fn current_photo(&self) -> Option<&Attachment> {
        self.current_photo_key
            .as_ref()
            .and_then(|key| self.attachments.get(key))
    }
}
