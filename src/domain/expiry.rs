//! In-memory record of when each asset was uploaded.
//!
//! Shared between the upload handler, the stream handler and the sweeper.
//! Nothing here survives a restart.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
pub struct ExpiryTracker {
    retention: Duration,
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl ExpiryTracker {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Register (or re-register) an asset as created at `at`.
    pub fn record(&self, key: &str, at: DateTime<Utc>) {
        self.write().insert(key.to_owned(), at);
    }

    pub fn get(&self, key: &str) -> Option<DateTime<Utc>> {
        self.read().get(key).copied()
    }

    /// Moment the asset stops being streamable.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).map(|created| created + self.retention)
    }

    /// `false` for untracked keys.
    pub fn is_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.get(key)
            .map(|created| now - created > self.retention)
            .unwrap_or(false)
    }

    /// Snapshot of every expired entry with the timestamp it was recorded with.
    pub fn expired(&self, now: DateTime<Utc>) -> Vec<(String, DateTime<Utc>)> {
        let mut expired: Vec<_> = self
            .read()
            .iter()
            .filter(|(_, created)| now - **created > self.retention)
            .map(|(key, created)| (key.clone(), *created))
            .collect();
        expired.sort();
        expired
    }

    /// Drop `key` unless it was re-recorded after `at`.
    pub fn remove_if_unchanged(&self, key: &str, at: DateTime<Utc>) -> bool {
        let mut entries = self.write();
        match entries.get(key) {
            Some(current) if *current == at => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panicking writer cannot leave the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
