use crate::db::error::StoreError;
use crate::db::model::Child;

/// Document store for child records.
///
/// `save` must be atomic per record: either every field and new attachment
/// lands, or nothing does. Attachments are append-only: `save` fails with
/// `AttachmentExists` rather than replace bytes stored under the same key.
///
/// `all` returns documents for listing and search. Attachment bytes are not
/// loaded, but `current_photo_key` is; use `get` for anything that reads the
/// attachments.
pub trait ChildStore: Send + Sync {
    fn create(&self, child: &Child) -> Result<(), StoreError>;
    fn get(&self, id: &str) -> Result<Option<Child>, StoreError>;
    fn all(&self) -> Result<Vec<Child>, StoreError>;
    fn save(&self, child: &Child) -> Result<(), StoreError>;
    fn destroy(&self, id: &str) -> Result<(), StoreError>;
}
