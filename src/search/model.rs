use crate::db::model::Child;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Html,
    Csv,
}

/// Query string of `GET /children/search`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub unique_identifier: String,
    #[serde(default)]
    pub show_thumbnails: Option<String>,
    #[serde(default)]
    pub format: Format,
}

impl SearchParams {
    pub fn show_thumbnails(&self) -> bool {
        self.show_thumbnails.as_deref() == Some("1")
    }
}

/// What the search page displays.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<Child>,
    pub show_thumbnails: bool,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn offers_csv_export(&self) -> bool {
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(show: Option<&str>) -> SearchParams {
        SearchParams {
            show_thumbnails: show.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn thumbnails_only_for_literal_one() {
        assert!(params(Some("1")).show_thumbnails());
        assert!(!params(None).show_thumbnails());
        assert!(!params(Some("true")).show_thumbnails());
        assert!(!params(Some("")).show_thumbnails());
    }

    #[test]
    fn empty_outcome_hides_csv_export() {
        let outcome = SearchOutcome {
            results: Vec::new(),
            show_thumbnails: false,
        };
        assert!(outcome.is_empty());
        assert!(!outcome.offers_csv_export());
    }
}
