use crate::db::model::Child;
use async_trait::async_trait;

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Children matching a free-text name and a unique identifier.
    /// An empty string means "no filter" for either argument.
    async fn basic_search(&self, name: &str, unique_id: &str) -> Result<Vec<Child>, anyhow::Error>;
}
