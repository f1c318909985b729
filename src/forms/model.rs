use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    TextField,
    NumericField,
    Textarea,
    PhotoUploadBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FormField {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_upload(&self) -> bool {
        self.field_type == FieldType::PhotoUploadBox
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSection {
    pub unique_id: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

fn enabled_by_default() -> bool {
    true
}
