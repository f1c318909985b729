use crate::forms::model::FormSection;
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

/// Ordered form sections for the child record type.
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    sections: Vec<FormSection>,
}

impl FormConfig {
    pub fn new(mut sections: Vec<FormSection>) -> Self {
        sections.sort_by_key(|s| s.order);
        FormConfig { sections }
    }

    pub fn load(path: &str) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("cannot read form sections '{path}'"))?;
        let config = Self::from_json(&raw).with_context(|| format!("cannot parse '{path}'"))?;
        info!(
            path,
            sections = config.sections.len(),
            "form sections loaded"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let sections: Vec<FormSection> = serde_json::from_str(raw)?;
        Ok(Self::new(sections))
    }

    /// Sections shown on forms, in display order.
    pub fn enabled_sections(&self) -> impl Iterator<Item = &FormSection> {
        self.sections.iter().filter(|s| s.enabled)
    }

    /// Column order for CSV export.
    pub fn all_child_field_names(&self) -> Vec<String> {
        self.enabled_sections()
            .flat_map(|s| s.fields.iter().map(|f| f.name.clone()))
            .collect()
    }
}
