//! Résumé library: tailored résumés keyed by posting URL, plus the master résumé.
//!
//! Layout: three JSON objects (`resumes`, `lastUpdateTimes`, `jobTitles`) keyed by URL,
//! and two plain strings for the master résumé. Every mutation is a read-modify-write
//! of whole objects, so writers are serialized behind one lock per process.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::resume::{ExportedResume, MasterResume, ResumeExport, StoredResume};
use crate::storage::{
    KeyValueStore, StoreError, JOB_TITLES_KEY, LAST_UPDATE_TIMES_KEY, MASTER_RESUME_KEY,
    MASTER_RESUME_LAST_UPDATE_KEY, RESUMES_KEY,
};

type UrlMap<V> = BTreeMap<String, V>;

#[derive(Clone)]
pub struct ResumeLibrary {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ResumeLibrary {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ── tailored résumés ────────────────────────────────────────────────────

    pub async fn save_tailored(
        &self,
        url: &str,
        resume: &str,
        job_title: Option<&str>,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut resumes: UrlMap<String> = self.read_map(RESUMES_KEY).await?;
        let mut times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;
        let mut titles: UrlMap<String> = self.read_map(JOB_TITLES_KEY).await?;

        resumes.insert(url.to_string(), resume.to_string());
        times.insert(url.to_string(), now_ms);
        // A posting without a title keeps whatever title an earlier save recorded.
        if let Some(title) = job_title {
            titles.insert(url.to_string(), title.to_string());
        }

        self.store
            .set_many(&[
                (RESUMES_KEY, encode(RESUMES_KEY, &resumes)?),
                (LAST_UPDATE_TIMES_KEY, encode(LAST_UPDATE_TIMES_KEY, &times)?),
                (JOB_TITLES_KEY, encode(JOB_TITLES_KEY, &titles)?),
            ])
            .await?;

        debug!("Stored resume for {url} ({} saved)", resumes.len());
        Ok(())
    }

    pub async fn get(&self, url: &str) -> Result<Option<StoredResume>, StoreError> {
        let mut resumes: UrlMap<String> = self.read_map(RESUMES_KEY).await?;
        let Some(resume) = resumes.remove(url) else {
            return Ok(None);
        };
        let times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;
        let mut titles: UrlMap<String> = self.read_map(JOB_TITLES_KEY).await?;

        Ok(Some(StoredResume {
            url: url.to_string(),
            resume,
            last_update: times.get(url).copied(),
            job_title: titles.remove(url),
        }))
    }

    /// All saved résumés, most recent first. `query` filters case-insensitively on
    /// URL or résumé text.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<StoredResume>, StoreError> {
        let resumes: UrlMap<String> = self.read_map(RESUMES_KEY).await?;
        let times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;
        let mut titles: UrlMap<String> = self.read_map(JOB_TITLES_KEY).await?;

        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut entries: Vec<StoredResume> = resumes
            .into_iter()
            .filter(|(url, resume)| match &needle {
                Some(needle) => {
                    url.to_lowercase().contains(needle) || resume.to_lowercase().contains(needle)
                }
                None => true,
            })
            .map(|(url, resume)| StoredResume {
                last_update: times.get(&url).copied(),
                job_title: titles.remove(&url),
                url,
                resume,
            })
            .collect();

        // BTreeMap order breaks ties by URL.
        entries.sort_by(|a, b| b.last_update.unwrap_or(0).cmp(&a.last_update.unwrap_or(0)));
        Ok(entries)
    }

    /// Removes one résumé. Returns false when nothing was stored under `url`.
    pub async fn delete(&self, url: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut resumes: UrlMap<String> = self.read_map(RESUMES_KEY).await?;
        if resumes.remove(url).is_none() {
            return Ok(false);
        }
        let mut times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;
        let mut titles: UrlMap<String> = self.read_map(JOB_TITLES_KEY).await?;
        times.remove(url);
        titles.remove(url);

        self.store
            .set_many(&[
                (RESUMES_KEY, encode(RESUMES_KEY, &resumes)?),
                (LAST_UPDATE_TIMES_KEY, encode(LAST_UPDATE_TIMES_KEY, &times)?),
                (JOB_TITLES_KEY, encode(JOB_TITLES_KEY, &titles)?),
            ])
            .await?;

        info!("Deleted resume for {url}");
        Ok(true)
    }

    /// Drops every tailored résumé. The master résumé is kept.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.store
            .remove(&[RESUMES_KEY, LAST_UPDATE_TIMES_KEY, JOB_TITLES_KEY])
            .await?;
        info!("Cleared all tailored resumes");
        Ok(())
    }

    pub async fn last_update_time(&self, url: &str) -> Result<Option<i64>, StoreError> {
        let times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;
        Ok(times.get(url).copied())
    }

    /// True when `url` was never tailored or its last save is older than `interval`.
    pub async fn should_update(
        &self,
        url: &str,
        now_ms: i64,
        interval: Duration,
    ) -> Result<bool, StoreError> {
        let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        Ok(match self.last_update_time(url).await? {
            Some(last) => now_ms.saturating_sub(last) > interval_ms,
            None => true,
        })
    }

    // ── master résumé ───────────────────────────────────────────────────────

    pub async fn master_resume(&self) -> Result<Option<MasterResume>, StoreError> {
        let Some(content) = self.store.get(MASTER_RESUME_KEY).await? else {
            return Ok(None);
        };
        let last_update = self
            .store
            .get(MASTER_RESUME_LAST_UPDATE_KEY)
            .await?
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        Ok(Some(MasterResume {
            content,
            last_update,
        }))
    }

    pub async fn save_master_resume(&self, content: &str, now_ms: i64) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.store
            .set_many(&[
                (MASTER_RESUME_KEY, content.to_string()),
                (MASTER_RESUME_LAST_UPDATE_KEY, now_ms.to_string()),
            ])
            .await?;
        info!("Master resume updated ({} chars)", content.chars().count());
        Ok(())
    }

    // ── export ──────────────────────────────────────────────────────────────

    pub async fn export(&self, now: DateTime<Utc>) -> Result<ResumeExport, StoreError> {
        let resumes: UrlMap<String> = self.read_map(RESUMES_KEY).await?;
        let times: UrlMap<i64> = self.read_map(LAST_UPDATE_TIMES_KEY).await?;

        Ok(ResumeExport {
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            resumes: resumes
                .into_iter()
                .map(|(url, resume)| ExportedResume {
                    last_update: times.get(&url).copied(),
                    url,
                    resume,
                })
                .collect(),
        })
    }

    async fn read_map<V: DeserializeOwned>(&self, key: &str) -> Result<UrlMap<V>, StoreError> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => Ok(UrlMap::new()),
        }
    }
}

fn encode<V: Serialize>(key: &str, map: &UrlMap<V>) -> Result<String, StoreError> {
    serde_json::to_string(map).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}
