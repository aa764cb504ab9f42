//! Scheduled dashboard snapshot service

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, FixedOffset, NaiveDate, Utc};

use crate::{
    api::backup::BackupRunResponse,
    config::BackupConfig,
    error::{AppError, AppResult},
    models::{Snapshot, SnapshotEntry},
    store::{keys, KvStore},
};

#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn KvStore>,
    config: BackupConfig,
}

impl BackupService {
    pub fn new(store: Arc<dyn KvStore>, config: BackupConfig) -> Self {
        Self { store, config }
    }

    /// Capture today's snapshot, update the index, evict expired snapshots.
    /// The civil date is computed once per invocation in the laboratory's
    /// time zone; a second run on the same date replaces the first.
    pub async fn run(&self, auto: bool) -> AppResult<BackupRunResponse> {
        let offset = FixedOffset::east_opt(self.config.utc_offset_hours * 3600)
            .ok_or_else(|| AppError::Internal("Invalid backup time-zone offset".to_string()))?;
        let today = Utc::now().with_timezone(&offset).date_naive();
        self.run_for_date(today, auto).await
    }

    pub(crate) async fn run_for_date(
        &self,
        today: NaiveDate,
        auto: bool,
    ) -> AppResult<BackupRunResponse> {
        let date = today.format("%Y-%m-%d").to_string();

        // Capture every configured section; an absent key is recorded as an
        // explicit null, never omitted.
        let mut sections = BTreeMap::new();
        for section in &self.config.sections {
            let value = match self.store.get(&keys::content(section)).await? {
                Some(raw) => {
                    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
                }
                None => serde_json::Value::Null,
            };
            sections.insert(section.clone(), value);
        }

        let snapshot = Snapshot {
            date: date.clone(),
            sections,
        };
        let serialized = serde_json::to_string(&snapshot)
            .map_err(|e| AppError::Internal(format!("Failed to serialize snapshot: {}", e)))?;
        let size = serialized.len() as u64;
        self.store.set(&keys::backup(&date), &serialized).await?;

        let mut index = self.index().await?;
        index.retain(|entry| entry.date != date);
        index.insert(
            0,
            SnapshotEntry {
                date: date.clone(),
                size,
                auto,
            },
        );

        let cutoff = today - Duration::days(self.config.retention_days);
        let (kept, expired): (Vec<_>, Vec<_>) = index.into_iter().partition(|entry| {
            NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .map(|d| d >= cutoff)
                .unwrap_or(false)
        });
        for entry in &expired {
            self.store.delete(&keys::backup(&entry.date)).await?;
        }

        // The index write is the last store operation, keeping the window of
        // inconsistency on failure as small as the store allows.
        let raw_index = serde_json::to_string(&kept)
            .map_err(|e| AppError::Internal(format!("Failed to serialize snapshot index: {}", e)))?;
        self.store.set(keys::BACKUP_INDEX, &raw_index).await?;

        Ok(BackupRunResponse {
            date,
            evicted: expired.len() as u64,
        })
    }

    /// Current snapshot index, newest first
    pub async fn index(&self) -> AppResult<Vec<SnapshotEntry>> {
        match self.store.get(keys::BACKUP_INDEX).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Internal(format!("Snapshot index corrupted: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch one stored snapshot by date
    pub async fn snapshot(&self, date: &str) -> AppResult<Snapshot> {
        let raw = self
            .store
            .get(&keys::backup(date))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No snapshot for {}", date)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Snapshot {} corrupted: {}", date, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> BackupService {
        BackupService::new(
            store,
            BackupConfig {
                retention_days: 7,
                utc_offset_hours: 9,
                sections: vec!["about".to_string(), "team".to_string()],
            },
        )
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn missing_sections_are_recorded_as_null() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(&keys::content("about"), r#"{"headline":"Welcome"}"#)
            .await
            .unwrap();
        let service = service(store);

        let run = service.run_for_date(day("2026-08-08"), true).await.unwrap();
        assert_eq!(run.date, "2026-08-08");
        assert_eq!(run.evicted, 0);

        let snapshot = service.snapshot("2026-08-08").await.unwrap();
        assert_eq!(
            snapshot.sections["about"]["headline"],
            serde_json::json!("Welcome")
        );
        assert!(snapshot.sections["team"].is_null());
    }

    #[tokio::test]
    async fn same_date_run_replaces_the_snapshot_and_keeps_one_entry() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        service.run_for_date(day("2026-08-08"), true).await.unwrap();
        store
            .set(&keys::content("about"), r#""second version""#)
            .await
            .unwrap();
        service.run_for_date(day("2026-08-08"), false).await.unwrap();

        let index = service.index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].date, "2026-08-08");
        assert!(!index[0].auto);

        let snapshot = service.snapshot("2026-08-08").await.unwrap();
        assert_eq!(snapshot.sections["about"], serde_json::json!("second version"));
    }

    #[tokio::test]
    async fn entries_older_than_the_retention_window_are_evicted() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        service.run_for_date(day("2026-07-31"), true).await.unwrap();
        service.run_for_date(day("2026-08-01"), true).await.unwrap();

        // 2026-07-31 is 8 days before 2026-08-08: outside the window.
        let run = service.run_for_date(day("2026-08-08"), true).await.unwrap();
        assert_eq!(run.evicted, 1);

        let index = service.index().await.unwrap();
        let dates: Vec<_> = index.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-08", "2026-08-01"]);
        assert!(store.get(&keys::backup("2026-07-31")).await.unwrap().is_none());
        assert!(store.get(&keys::backup("2026-08-01")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_snapshot_is_not_found() {
        let service = service(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.snapshot("1999-01-01").await,
            Err(AppError::NotFound(_))
        ));
    }
}
