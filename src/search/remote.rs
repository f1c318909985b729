use crate::db::model::Child;
use crate::search::interface::SearchIndex;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Request<'a> {
    child_name: &'a str,
    unique_identifier: &'a str,
}

#[derive(Deserialize)]
struct Response {
    results: Vec<Child>,
}

/// Client for an external search index speaking JSON over HTTP.
pub struct RemoteSearch {
    client: reqwest::Client,
    url: String,
}

impl RemoteSearch {
    pub fn new(url: &str) -> Self {
        RemoteSearch {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl SearchIndex for RemoteSearch {
    async fn basic_search(&self, name: &str, unique_id: &str) -> Result<Vec<Child>, anyhow::Error> {
        let req = Request {
            child_name: name,
            unique_identifier: unique_id,
        };
        let resp = self
            .client
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .with_context(|| format!("search service unreachable at {}", self.url))?
            .error_for_status()?;
        let res: Response = resp.json().await.context("malformed search response")?;
        Ok(res.results)
    }
}
