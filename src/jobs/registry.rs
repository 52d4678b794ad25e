//! Job registry over a key-value store capability.

use super::cron::cron_expression;
use super::store::KeyValueStore;
use super::{JobConfig, JobError, JobType, StoredJob};

/// Key prefix under which jobs are persisted.
pub const JOB_KEY_PREFIX: &str = "config:job:";

/// Validates and persists scheduled jobs.
///
/// The store is passed in explicitly; the registry holds no global state.
pub struct JobRegistry<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> JobRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(name: &str) -> String {
        format!("{JOB_KEY_PREFIX}{name}")
    }

    /// Validates `config`, renders its cron expression and stores it.
    ///
    /// Returns the storage key. Fails when a job with the same name exists
    /// or any part of the configuration is invalid.
    pub async fn add(&self, config: JobConfig) -> Result<String, JobError> {
        let key = Self::key(&config.name);
        if self.store.get(&key).await?.is_some() {
            return Err(JobError::Duplicate(config.name));
        }

        let cron_time = cron_expression(config.minute, config.hour, &config.days)?;

        let data = match config.job_type {
            JobType::Search => {
                let options = config.search.ok_or(JobError::MissingSearchOptions)?;
                options.validate()?;
                Some(options)
            }
            JobType::Chat => None,
        };

        let stored = StoredJob {
            cron_time,
            job_type: config.job_type,
            data,
        };
        self.store
            .set(&key, serde_json::to_string(&stored)?, None)
            .await?;

        log::info!("registered job '{key}'");
        Ok(key)
    }

    /// All stored jobs; entries that fail to deserialize are logged and
    /// skipped rather than poisoning the listing.
    pub async fn list(&self) -> Result<Vec<StoredJob>, JobError> {
        let values = self.store.values_with_prefix(JOB_KEY_PREFIX).await?;
        let mut jobs = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_str(&value) {
                Ok(job) => jobs.push(job),
                Err(e) => log::warn!("skipping malformed stored job: {e}"),
            }
        }
        Ok(jobs)
    }

    pub async fn count(&self) -> Result<usize, JobError> {
        Ok(self.store.count_with_prefix(JOB_KEY_PREFIX).await?)
    }

    pub async fn remove(&self, name: &str) -> Result<(), JobError> {
        Ok(self.store.delete(&Self::key(name)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::MemoryStore;
    use crate::search::SearchOptions;

    fn search_job(name: &str) -> JobConfig {
        JobConfig {
            name: name.to_string(),
            minute: 15,
            hour: 6,
            days: vec!["mon".to_string(), "thu".to_string()],
            job_type: JobType::Search,
            search: Some(SearchOptions::default()),
        }
    }

    #[tokio::test]
    async fn add_list_count_remove() {
        let registry = JobRegistry::new(MemoryStore::new());

        let key = registry.add(search_job("daily-search")).await.unwrap();
        assert_eq!(key, "config:job:daily-search");
        assert_eq!(registry.count().await.unwrap(), 1);

        let jobs = registry.list().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].cron_time, "15 6 * * 1,4");
        assert_eq!(jobs[0].job_type, JobType::Search);
        assert!(jobs[0].data.is_some());

        registry.remove("daily-search").await.unwrap();
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let registry = JobRegistry::new(MemoryStore::new());
        registry.add(search_job("once")).await.unwrap();
        let err = registry.add(search_job("once")).await.unwrap_err();
        assert!(matches!(err, JobError::Duplicate(name) if name == "once"));
    }

    #[tokio::test]
    async fn search_jobs_require_options() {
        let registry = JobRegistry::new(MemoryStore::new());
        let mut config = search_job("missing");
        config.search = None;
        assert!(matches!(
            registry.add(config).await.unwrap_err(),
            JobError::MissingSearchOptions
        ));
    }

    #[tokio::test]
    async fn invalid_search_options_are_rejected() {
        let registry = JobRegistry::new(MemoryStore::new());
        let mut config = search_job("bad-ages");
        if let Some(options) = config.search.as_mut() {
            options.age1 = 40;
            options.age2 = 20;
        }
        assert!(matches!(
            registry.add(config).await.unwrap_err(),
            JobError::Options(_)
        ));
    }

    #[tokio::test]
    async fn chat_jobs_store_no_data() {
        let registry = JobRegistry::new(MemoryStore::new());
        let config = JobConfig {
            name: "sweep".to_string(),
            minute: 0,
            hour: 12,
            days: vec!["sat".to_string(), "sun".to_string()],
            job_type: JobType::Chat,
            search: None,
        };
        registry.add(config).await.unwrap();
        let jobs = registry.list().await.unwrap();
        assert_eq!(jobs[0].cron_time, "0 12 * * 6,0");
        assert!(jobs[0].data.is_none());
    }
}
