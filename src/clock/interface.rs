use chrono::{DateTime, Utc};

/// Source of "now" for attachment keys and export filenames.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
