use crate::db::model::FieldValue;

/// A binary part of an update request.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    /// An empty file input still arrives as a part; it carries no data.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn content_type_or_default(&self) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// Fields and uploads of a create or update request, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayload {
    pub fields: Vec<(String, FieldValue)>,
    pub uploads: Vec<Upload>,
}

impl UpdatePayload {
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn with_upload(mut self, field: &str, content_type: &str, data: &[u8]) -> Self {
        self.uploads.push(Upload {
            field: field.to_string(),
            filename: Some(format!("{field}.bin")),
            content_type: Some(content_type.to_string()),
            data: data.to_vec(),
        });
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }
}
