use crate::db::interface::ChildStore;
use crate::db::model::Child;
use crate::search::interface::SearchIndex;
use async_trait::async_trait;
use std::sync::Arc;

/// Search over the record store itself: case-insensitive substring match on
/// `name` and `unique_identifier`.
pub struct Summary {
    store: Arc<dyn ChildStore>,
}

impl Summary {
    pub fn new(store: Arc<dyn ChildStore>) -> Self {
        Summary { store }
    }
}

fn matches(value: &str, filter: &str) -> bool {
    filter.is_empty() || value.to_lowercase().contains(&filter.to_lowercase())
}

#[async_trait]
impl SearchIndex for Summary {
    async fn basic_search(&self, name: &str, unique_id: &str) -> Result<Vec<Child>, anyhow::Error> {
        let children = self.store.all()?;
        Ok(children
            .into_iter()
            .filter(|c| matches(&c.name(), name) && matches(&c.unique_identifier(), unique_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::Database;

    fn seeded() -> Summary {
        let db = Database::in_memory().unwrap();
        db.create(
            &Child::new("1")
                .with_field("name", "Dave Smith")
                .with_field("unique_identifier", "rapidabc123"),
        )
        .unwrap();
        db.create(
            &Child::new("2")
                .with_field("name", "Mary")
                .with_field("unique_identifier", "rapiddef456"),
        )
        .unwrap();
        Summary::new(Arc::new(db))
    }

    #[tokio::test]
    async fn empty_filters_match_everything() {
        let found = seeded().basic_search("", "").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn name_match_ignores_case() {
        let found = seeded().basic_search("dave", "").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[tokio::test]
    async fn both_filters_must_hold() {
        let index = seeded();
        assert!(index.basic_search("mary", "abc").await.unwrap().is_empty());
        assert_eq!(index.basic_search("mary", "DEF").await.unwrap().len(), 1);
    }
}
