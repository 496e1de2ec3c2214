//! In-process store backend
//!
//! A mutex-guarded map with lazily enforced expiry. Each operation holds the
//! lock for its whole duration, which gives the same atomicity the Redis
//! backend gets from server-side scripts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

use super::{CasOutcome, FieldMap, KvStore, StoreError};

struct Entry {
    fields: FieldMap,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_entry<'a>(
        map: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a mut Entry> {
        if map.get(key).is_some_and(|e| !e.is_live(now)) {
            map.remove(key);
        }
        map.get_mut(key)
    }
}

impl KvStore for MemoryStore {
    async fn get_fields(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
        let mut map = self.entries.lock();
        Ok(Self::live_entry(&mut map, key, Instant::now()).map(|e| e.fields.clone()))
    }

    async fn put_fields(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                fields: fields.clone(),
                expires_at: ttl.map(|t| now + t),
            },
        );
        Ok(())
    }

    async fn put_fields_if_absent(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        if Self::live_entry(&mut map, key, now).is_some() {
            return Ok(false);
        }
        map.insert(
            key.to_string(),
            Entry {
                fields: fields.clone(),
                expires_at: ttl.map(|t| now + t),
            },
        );
        Ok(true)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        updates: &FieldMap,
        deadline: Option<&str>,
    ) -> Result<CasOutcome, StoreError> {
        let mut map = self.entries.lock();
        let Some(entry) = Self::live_entry(&mut map, key, Instant::now()) else {
            return Ok(CasOutcome::Missing);
        };
        match entry.fields.get(field) {
            None => return Ok(CasOutcome::Missing),
            Some(current) if current != expected => {
                return Ok(CasOutcome::Mismatch(current.clone()));
            }
            Some(_) => {}
        }
        if let Some(deadline_field) = deadline {
            let at = entry
                .fields
                .get(deadline_field)
                .and_then(|v| v.parse::<i64>().ok())
                .ok_or_else(|| {
                    StoreError::Corrupt(format!("{key}: {deadline_field} is not a timestamp"))
                })?;
            if at <= Utc::now().timestamp_millis() {
                return Ok(CasOutcome::PastDeadline);
            }
        }
        for (k, v) in updates {
            entry.fields.insert(k.clone(), v.clone());
        }
        Ok(CasOutcome::Applied)
    }

    async fn put_records(&self, records: &[(&str, &FieldMap)]) -> Result<(), StoreError> {
        let mut map = self.entries.lock();
        for (key, fields) in records {
            map.insert(
                key.to_string(),
                Entry {
                    fields: (*fields).clone(),
                    expires_at: None,
                },
            );
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut map = self.entries.lock();
        let existed = Self::live_entry(&mut map, key, Instant::now()).is_some();
        map.remove(key);
        Ok(existed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
