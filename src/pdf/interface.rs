use crate::db::model::Child;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub trait PdfGenerator: Send + Sync {
    /// One document holding the photos of `children`, in the given order.
    fn child_photos(&self, children: &[Child]) -> Result<Vec<u8>, anyhow::Error>;
}
