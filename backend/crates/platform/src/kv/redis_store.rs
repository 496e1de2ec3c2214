//! Redis store backend
//!
//! Connections come from a `deadpool-redis` pool. The atomic primitives are
//! Lua scripts, which Redis runs without interleaving other commands. Every
//! call is bounded by the configured timeout.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, Script};

use super::{CasOutcome, FieldMap, KvStore, StoreConfig, StoreError};

// KEYS[1] record; ARGV[1] field, ARGV[2] expected, ARGV[3] deadline field
// ('' = none), ARGV[4..] field/value pairs. The deadline is compared with the
// server clock.
static CAS_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if not current then
  return {'missing', ''}
end
if current ~= ARGV[2] then
  return {'mismatch', current}
end
if ARGV[3] ~= '' then
  local deadline = tonumber(redis.call('HGET', KEYS[1], ARGV[3]))
  if not deadline then
    return {'corrupt', ARGV[3]}
  end
  local t = redis.call('TIME')
  local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
  if deadline <= now then
    return {'past_deadline', ''}
  end
end
for i = 4, #ARGV, 2 do
  redis.call('HSET', KEYS[1], ARGV[i], ARGV[i + 1])
end
return {'applied', ''}
",
    )
});

// KEYS[1] record; ARGV[1] ttl ms (0 = none), ARGV[2..] field/value pairs
static PUT_IF_ABSENT_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
for i = 2, #ARGV, 2 do
  redis.call('HSET', KEYS[1], ARGV[i], ARGV[i + 1])
end
local ttl = tonumber(ARGV[1])
if ttl > 0 then
  redis.call('PEXPIRE', KEYS[1], ttl)
end
return 1
",
    )
});

#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    timeout: Duration,
}

impl RedisStore {
    /// Build the pool. No connection is opened until the first call.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut cfg = deadpool_redis::Config::from_url(config.url.as_str());
        cfg.pool = Some(PoolConfig::new(config.pool_size.max(1)));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Unavailable(format!("Failed to create Redis pool: {e}")))?;

        Ok(Self {
            pool,
            timeout: config.timeout,
        })
    }

    /// Run `op` on a pooled connection within the timeout budget.
    async fn bounded<T, F, Fut>(&self, name: &'static str, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(Connection) -> Fut,
        Fut: Future<Output = Result<T, redis::RedisError>>,
    {
        let call = async {
            let conn = self
                .pool
                .get()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            op(conn).await.map_err(|e| map_redis_error(name, e))
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op = name, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out");
                Err(StoreError::Timeout(name))
            }
        }
    }
}

fn map_redis_error(name: &'static str, err: redis::RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout(name)
    } else if err.kind() == redis::ErrorKind::TypeError || is_wrong_type(err.code()) {
        StoreError::Corrupt(format!("{name}: {err}"))
    } else {
        StoreError::Unavailable(format!("{name}: {err}"))
    }
}

/// A key holds a non-hash value. Retrying cannot help.
fn is_wrong_type(code: Option<&str>) -> bool {
    code == Some("WRONGTYPE")
}

fn ttl_millis(ttl: Option<Duration>) -> i64 {
    ttl.map(|t| i64::try_from(t.as_millis()).unwrap_or(i64::MAX).max(1))
        .unwrap_or(0)
}

impl KvStore for RedisStore {
    async fn get_fields(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
        let map: FieldMap = self
            .bounded("get_fields", |mut conn| async move {
                conn.hgetall::<_, FieldMap>(key).await
            })
            .await?;
        // HGETALL on a missing key yields an empty map
        Ok((!map.is_empty()).then_some(map))
    }

    async fn put_fields(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let ttl_ms = ttl_millis(ttl);

        self.bounded("put_fields", |mut conn| async move {
            let mut pipe = redis::pipe();
            pipe.atomic().del(key).ignore();
            pipe.hset_multiple(key, &items).ignore();
            if ttl_ms > 0 {
                pipe.pexpire(key, ttl_ms).ignore();
            }
            pipe.query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn put_fields_if_absent(
        &self,
        key: &str,
        fields: &FieldMap,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let ttl_ms = ttl_millis(ttl);
        let created: i64 = self
            .bounded("put_fields_if_absent", |mut conn| async move {
                let mut invocation = PUT_IF_ABSENT_SCRIPT.key(key);
                invocation.arg(ttl_ms);
                for (k, v) in fields {
                    invocation.arg(k).arg(v);
                }
                invocation.invoke_async::<i64>(&mut conn).await
            })
            .await?;
        Ok(created == 1)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        updates: &FieldMap,
        deadline: Option<&str>,
    ) -> Result<CasOutcome, StoreError> {
        let (verdict, detail): (String, String) = self
            .bounded("compare_and_set", |mut conn| async move {
                let mut invocation = CAS_SCRIPT.key(key);
                invocation.arg(field).arg(expected).arg(deadline.unwrap_or(""));
                for (k, v) in updates {
                    invocation.arg(k).arg(v);
                }
                invocation.invoke_async::<(String, String)>(&mut conn).await
            })
            .await?;

        match verdict.as_str() {
            "applied" => Ok(CasOutcome::Applied),
            "mismatch" => Ok(CasOutcome::Mismatch(detail)),
            "missing" => Ok(CasOutcome::Missing),
            "past_deadline" => Ok(CasOutcome::PastDeadline),
            "corrupt" => Err(StoreError::Corrupt(format!(
                "{key}: {detail} is not a timestamp"
            ))),
            other => Err(StoreError::Corrupt(format!(
                "unexpected compare_and_set verdict: {other}"
            ))),
        }
    }

    async fn put_records(&self, records: &[(&str, &FieldMap)]) -> Result<(), StoreError> {
        let records: Vec<(&str, Vec<(&str, &str)>)> = records
            .iter()
            .map(|(key, fields)| {
                let items = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                (*key, items)
            })
            .collect();

        self.bounded("put_records", |mut conn| async move {
            let mut pipe = redis::pipe();
            pipe.atomic();
            for (key, items) in &records {
                pipe.del(*key).ignore();
                pipe.hset_multiple(*key, items).ignore();
            }
            pipe.query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed: i64 = self
            .bounded("delete", |mut conn| async move {
                conn.del::<_, i64>(key).await
            })
            .await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let pong: String = self
            .bounded("ping", |mut conn| async move {
                redis::cmd("PING").query_async::<String>(&mut conn).await
            })
            .await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Corrupt(format!("unexpected PING reply: {pong}")))
        }
    }
}
