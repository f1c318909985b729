use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_PATH: &str = "rapidftr.db";
const DEFAULT_FORM_SECTIONS_PATH: &str = "config/form_sections.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub form_sections_path: String,
    /// External search index; the record store is searched when unset.
    pub search_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("BIND_ADDR '{bind}' is not a socket address"))?;

        Ok(Settings {
            bind_addr,
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            form_sections_path: lookup("FORM_SECTIONS_PATH")
                .unwrap_or_else(|| DEFAULT_FORM_SECTIONS_PATH.to_string()),
            search_url: lookup("SEARCH_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}
