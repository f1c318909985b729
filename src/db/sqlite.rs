use crate::db::error::StoreError;
use crate::db::interface::ChildStore;
use crate::db::model::{Attachment, Child};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS children (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS attachments (
                child_id TEXT NOT NULL,
                key TEXT NOT NULL,
                content_type TEXT NOT NULL,
                data BLOB NOT NULL,
                PRIMARY KEY (child_id, key)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn load_attachments(
        conn: &Connection,
        id: &str,
    ) -> Result<BTreeMap<String, Attachment>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT key, content_type, data FROM attachments WHERE child_id = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map([id], |row| {
            let key: String = row.get(0)?;
            Ok((
                key,
                Attachment {
                    content_type: row.get(1)?,
                    data: row.get(2)?,
                },
            ))
        })?;

        let mut attachments = BTreeMap::new();
        for row in rows {
            let (key, attachment) = row?;
            attachments.insert(key, attachment);
        }
        Ok(attachments)
    }

    fn read_document(id: &str, document: &str) -> Result<Child, StoreError> {
        let mut child: Child = serde_json::from_str(document)?;
        child.id = id.to_string();
        Ok(child)
    }

    /// Attachments are append-only. A key already stored with the same bytes
    /// is skipped; one stored with different bytes fails the write, so a
    /// racing save in the same second cannot replace an earlier upload.
    fn write_attachments(tx: &Transaction<'_>, child: &Child) -> Result<(), StoreError> {
        let mut insert = tx.prepare(
            "INSERT INTO attachments (child_id, key, content_type, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(child_id, key) DO NOTHING",
        )?;
        let mut unchanged = tx.prepare(
            "SELECT 1 FROM attachments WHERE child_id = ?1 AND key = ?2 AND data = ?3",
        )?;
        for (key, attachment) in &child.attachments {
            let inserted = insert.execute(params![
                child.id,
                key,
                attachment.content_type,
                attachment.data
            ])?;
            if inserted == 0 && !unchanged.exists(params![child.id, key, attachment.data])? {
                return Err(StoreError::AttachmentExists {
                    id: child.id.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }
}

impl ChildStore for Database {
    fn create(&self, child: &Child) -> Result<(), StoreError> {
        let document = serde_json::to_string(child)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO children (id, document) VALUES (?1, ?2)",
            params![child.id, document],
        )?;
        Self::write_attachments(&tx, child)?;
        tx.commit()?;
        debug!(id = %child.id, attachments = child.attachments.len(), "child created");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Child>, StoreError> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM children WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            None => Ok(None),
            Some(doc) => {
                let mut child = Self::read_document(id, &doc)?;
                child.attachments = Self::load_attachments(&conn, id)?;
                Ok(Some(child))
            }
        }
    }

    /// All children in creation order, documents only.
    fn all(&self) -> Result<Vec<Child>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, document FROM children ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let document: String = row.get(1)?;
            Ok((id, document))
        })?;

        let mut children = Vec::new();
        for row in rows {
            let (id, document) = row?;
            children.push(Self::read_document(&id, &document)?);
        }
        Ok(children)
    }

    fn save(&self, child: &Child) -> Result<(), StoreError> {
        let document = serde_json::to_string(child)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE children SET document = ?2 WHERE id = ?1",
            params![child.id, document],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                id: child.id.clone(),
            });
        }
        Self::write_attachments(&tx, child)?;
        tx.commit()?;
        debug!(id = %child.id, attachments = child.attachments.len(), "child saved");
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attachments WHERE child_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM children WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::model::FieldValue;

    fn photo(bytes: &[u8]) -> Attachment {
        Attachment {
            content_type: "image/jpeg".to_string(),
            data: bytes.to_vec(),
        }
    }

    #[test]
    fn create_then_get_returns_fields_and_attachments() {
        let db = Database::in_memory().unwrap();
        let mut child = Child::new("abc").with_field("name", "Dave").with_field("age", 7);
        child
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"jpeg"));
        child.current_photo_key = Some("photo-2010-01-17T140532".to_string());
        db.create(&child).unwrap();

        let loaded = db.get("abc").unwrap().unwrap();
        assert_eq!(loaded, child);
        assert_eq!(loaded.field("age"), Some(&FieldValue::Integer(7)));
    }

    #[test]
    fn get_unknown_id_is_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.get("nope").unwrap().is_none());
    }

    #[test]
    fn save_keeps_previous_attachments() {
        let db = Database::in_memory().unwrap();
        let mut child = Child::new("abc");
        child
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"first"));
        db.create(&child).unwrap();

        let mut only_new = Child::new("abc").with_field("name", "Mary");
        only_new
            .attachments
            .insert("photo-2010-01-18T090000".to_string(), photo(b"second"));
        db.save(&only_new).unwrap();

        let loaded = db.get("abc").unwrap().unwrap();
        assert_eq!(loaded.attachments.len(), 2);
        assert_eq!(loaded.name(), "Mary");
        assert_eq!(
            loaded.attachments["photo-2010-01-17T140532"].data,
            b"first".to_vec()
        );
    }

    #[test]
    fn save_never_replaces_stored_attachment_bytes() {
        let db = Database::in_memory().unwrap();
        let mut first = Child::new("abc").with_field("name", "Dave");
        first
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"first upload"));
        db.create(&first).unwrap();

        let mut racing = Child::new("abc").with_field("name", "Mary");
        racing
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"second upload"));
        let err = db.save(&racing).unwrap_err();
        assert!(matches!(
            err,
            StoreError::AttachmentExists { ref key, .. } if key == "photo-2010-01-17T140532"
        ));

        let loaded = db.get("abc").unwrap().unwrap();
        assert_eq!(loaded.name(), "Dave");
        assert_eq!(
            loaded.attachments["photo-2010-01-17T140532"].data,
            b"first upload".to_vec()
        );
    }

    #[test]
    fn resaving_a_loaded_child_is_not_a_conflict() {
        let db = Database::in_memory().unwrap();
        let mut child = Child::new("abc");
        child
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"jpeg"));
        db.create(&child).unwrap();

        let loaded = db.get("abc").unwrap().unwrap().with_field("age", 8);
        db.save(&loaded).unwrap();
        assert_eq!(db.get("abc").unwrap().unwrap().attachments.len(), 1);
    }

    #[test]
    fn save_of_missing_child_commits_nothing() {
        let db = Database::in_memory().unwrap();
        let mut ghost = Child::new("ghost");
        ghost
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"x"));

        let err = db.save(&ghost).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let conn = db.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM attachments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn all_lists_in_creation_order() {
        let db = Database::in_memory().unwrap();
        db.create(&Child::new("b")).unwrap();
        db.create(&Child::new("a")).unwrap();
        let ids: Vec<String> = db.all().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn all_leaves_attachment_data_unloaded() {
        let db = Database::in_memory().unwrap();
        let mut child = Child::new("abc").with_field("name", "Dave");
        child
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"jpeg"));
        child.current_photo_key = Some("photo-2010-01-17T140532".to_string());
        db.create(&child).unwrap();

        let listed = db.all().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].attachments.is_empty());
        assert_eq!(listed[0].current_photo_key.as_deref(), Some("photo-2010-01-17T140532"));
        assert_eq!(listed[0].name(), "Dave");
    }

    #[test]
    fn destroy_removes_child_and_attachments() {
        let db = Database::in_memory().unwrap();
        let mut child = Child::new("abc");
        child
            .attachments
            .insert("photo-2010-01-17T140532".to_string(), photo(b"x"));
        db.create(&child).unwrap();

        db.destroy("abc").unwrap();
        assert!(db.get("abc").unwrap().is_none());
        assert!(matches!(
            db.destroy("abc"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn file_backed_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("children.db");
        let path = path.to_str().unwrap();

        Database::new(path)
            .unwrap()
            .create(&Child::new("abc").with_field("name", "Dave"))
            .unwrap();

        let reopened = Database::new(path).unwrap();
        assert_eq!(reopened.get("abc").unwrap().unwrap().name(), "Dave");
    }
}
