// Persistence for tailored résumés and the master résumé.
// Everything sits under a handful of string keys in a key-value store; the library
// owns the layout, backends only move strings.

pub mod handlers;
pub mod library;
#[cfg(test)]
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

/// JSON object: url → tailored résumé text.
pub const RESUMES_KEY: &str = "resumes";
/// JSON object: url → epoch millis of the last save.
pub const LAST_UPDATE_TIMES_KEY: &str = "lastUpdateTimes";
/// JSON object: url → job title extracted from the posting.
pub const JOB_TITLES_KEY: &str = "jobTitles";
/// Plain string: the master résumé source.
pub const MASTER_RESUME_KEY: &str = "masterResume";
/// Plain string: epoch millis of the last master résumé upload.
pub const MASTER_RESUME_LAST_UPDATE_KEY: &str = "masterResumeLastUpdate";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Writes all entries in one round trip.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}
