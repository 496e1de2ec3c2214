//! Key-value store protocol
//!
//! Records are flat field maps (Redis hashes) under string keys. Besides
//! plain reads and writes the protocol offers two atomic primitives that
//! every cross-process invariant in the service rests on:
//!
//! - [`LocalKvStore::put_fields_if_absent`]: create a record only if the key
//!   does not exist
//! - [`LocalKvStore::compare_and_set`]: update fields only if one field still
//!   holds an expected value and, optionally, a deadline field has not passed
//!   on the store's clock
//! - [`LocalKvStore::put_records`]: replace several records as one unit
//!
//! Two backends implement it: [`RedisStore`] for deployments and
//! [`MemoryStore`] for tests and local development.

mod memory;
mod redis_store;

use std::collections::BTreeMap;
use std::time::Duration;

use kernel::error::app_error::AppError;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// A record's fields
pub type FieldMap = BTreeMap<String, String>;

/// Build a [`FieldMap`] from string pairs
pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool exhausted, connection refused or dropped
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer within the configured budget
    #[error("Store timed out during {0}")]
    Timeout(&'static str),

    /// A record exists but cannot be interpreted
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn log(&self) {
        match self {
            StoreError::Corrupt(detail) => tracing::error!(%detail, "Corrupt store record"),
            other => tracing::error!(error = %other, "Store call failed"),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Unavailable(_) => {
                AppError::service_unavailable("Store unavailable").with_source(err)
            }
            StoreError::Timeout(_) => {
                AppError::gateway_timeout("Store did not respond in time").with_source(err)
            }
            StoreError::Corrupt(_) => AppError::internal("Stored data is corrupt").with_source(err),
        }
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Result of [`LocalKvStore::compare_and_set`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// Field matched; updates were written
    Applied,
    /// Field held a different value (returned); nothing was written
    Mismatch(String),
    /// Key or field did not exist; nothing was written
    Missing,
    /// Field matched but the deadline field is at or before the store's
    /// clock; nothing was written
    PastDeadline,
}

#[trait_variant::make(KvStore: Send)]
pub trait LocalKvStore {
    /// All fields of a record, `None` if the key does not exist or expired
    async fn get_fields(&self, key: &str) -> Result<Option<FieldMap>, StoreError>;

    /// Replace a record. `ttl` sets a store-enforced expiry.
    async fn put_fields(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Create a record only if the key is absent. Returns whether it was created.
    async fn put_fields_if_absent(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError>;

    /// Atomically write `updates` if `field` currently equals `expected`.
    ///
    /// `deadline` names a field holding a Unix millisecond timestamp. When
    /// given, the write is refused with [`CasOutcome::PastDeadline`] once the
    /// store's own clock has reached it, inside the same atomic step. A
    /// missing or non-numeric deadline field is [`StoreError::Corrupt`].
    async fn compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        updates: &FieldMap,
        deadline: Option<&str>,
    ) -> Result<CasOutcome, StoreError>;

    /// Replace every listed record in one atomic step, without TTL.
    /// Either all records are written or none are.
    async fn put_records(&self, records: &[(&str, &FieldMap)]) -> Result<(), StoreError>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Round-trip liveness check
    async fn ping(&self) -> Result<(), StoreError>;
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// e.g. `redis://127.0.0.1:6379`
    pub url: String,
    /// Upper bound for any single store call
    pub timeout: Duration,
    pub pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            timeout: Duration::from_secs(2),
            pool_size: 16,
        }
    }
}
