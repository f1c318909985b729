use crate::attachments::merger::merge;
use crate::attachments::model::UpdatePayload;
use crate::clock::interface::Clock;
use crate::db::interface::ChildStore;
use crate::db::model::{Attachment, Child};
use crate::error::AppError;
use crate::forms::loader::FormConfig;
use crate::pdf::interface::{PDF_CONTENT_TYPE, PdfGenerator};
use crate::render::csv::render_csv;
use crate::search::interface::SearchIndex;
use crate::search::model::{SearchOutcome, SearchParams};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const SELECTED_MARKER: &str = "selected";

pub struct PdfExport {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Request-independent logic behind the `/children` routes.
pub struct ChildrenController {
    store: Arc<dyn ChildStore>,
    search: Arc<dyn SearchIndex>,
    pdf: Arc<dyn PdfGenerator>,
    forms: FormConfig,
    clock: Arc<dyn Clock>,
}

/// Keys whose value is the `selected` marker, in parameter order. A key
/// posted more than once is kept at its first position.
pub fn selected_ids(params: &[(String, String)]) -> Vec<&str> {
    let mut seen = HashSet::new();
    params
        .iter()
        .filter(|(_, value)| value == SELECTED_MARKER)
        .map(|(key, _)| key.as_str())
        .filter(|key| seen.insert(*key))
        .collect()
}

pub fn export_filename(requester: &str, now: DateTime<Utc>) -> String {
    format!("{requester}-{}.pdf", now.timestamp())
}

fn new_unique_identifier(user: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", user.to_lowercase(), &suffix[..8])
}

impl ChildrenController {
    pub fn new(
        store: Arc<dyn ChildStore>,
        search: Arc<dyn SearchIndex>,
        pdf: Arc<dyn PdfGenerator>,
        forms: FormConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ChildrenController {
            store,
            search,
            pdf,
            forms,
            clock,
        }
    }

    pub fn forms(&self) -> &FormConfig {
        &self.forms
    }

    fn fetch(&self, id: &str) -> Result<Child, AppError> {
        self.store
            .get(id)?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub fn index(&self) -> Result<Vec<Child>, AppError> {
        Ok(self.store.all()?)
    }

    pub fn show(&self, id: &str) -> Result<Child, AppError> {
        self.fetch(id)
    }

    pub fn new_child(&self) -> Child {
        Child::default()
    }

    pub fn edit(&self, id: &str) -> Result<Child, AppError> {
        self.fetch(id)
    }

    pub fn create(&self, payload: UpdatePayload, user: &str) -> Result<Child, AppError> {
        let now = self.clock.now();
        let mut child = Child::new(Uuid::new_v4().simple().to_string());

        let supplied_uid = payload.has_field("unique_identifier");
        merge(&mut child, payload, now)?;
        if !supplied_uid {
            child = child.with_field("unique_identifier", new_unique_identifier(user));
        }
        child = child
            .with_field("created_by", user)
            .with_field("created_at", now.to_rfc3339());

        self.store.create(&child)?;
        info!(id = %child.id, attachments = child.attachments.len(), "child created");
        Ok(child)
    }

    /// Merges the payload into the stored child and saves it in one go. A
    /// second upload to the same field within one second is a conflict.
    pub fn update(&self, id: &str, payload: UpdatePayload) -> Result<Child, AppError> {
        let mut child = self.fetch(id)?;
        let appended = merge(&mut child, payload, self.clock.now())?;
        self.store.save(&child)?;
        info!(id, appended, "child updated");
        Ok(child)
    }

    pub fn destroy(&self, id: &str) -> Result<(), AppError> {
        let child = self.fetch(id)?;
        self.store.destroy(&child.id)?;
        info!(id, "child destroyed");
        Ok(())
    }

    pub fn photo(&self, id: &str) -> Result<Attachment, AppError> {
        let child = self.fetch(id)?;
        child
            .current_photo()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{id}/photo")))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome, AppError> {
        debug!(
            child_name = %params.child_name,
            unique_identifier = %params.unique_identifier,
            "basic search"
        );
        let results = self
            .search
            .basic_search(&params.child_name, &params.unique_identifier)
            .await
            .map_err(AppError::Search)?;
        Ok(SearchOutcome {
            results,
            show_thumbnails: params.show_thumbnails(),
        })
    }

    pub fn search_csv(&self, outcome: &SearchOutcome) -> String {
        render_csv(&self.forms.all_child_field_names(), &outcome.results)
    }

    pub fn photo_pdf(
        &self,
        params: &[(String, String)],
        requester: &str,
    ) -> Result<PdfExport, AppError> {
        let children = selected_ids(params)
            .into_iter()
            .map(|id| self.fetch(id))
            .collect::<Result<Vec<Child>, AppError>>()?;

        let data = self.pdf.child_photos(&children).map_err(AppError::Pdf)?;
        let filename = export_filename(requester, self.clock.now());
        info!(children = children.len(), %filename, "photo pdf exported");
        Ok(PdfExport {
            data,
            filename,
            content_type: PDF_CONTENT_TYPE,
        })
    }
}
