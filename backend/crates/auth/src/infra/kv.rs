//! Key-value store repository
//!
//! Layout:
//! - `account:{username}` → `{id, username, credential_hash, role, status}`
//! - `account:id:{uuid}` → `{username}`
//! - `{session_key_prefix}{sha256_hex(token)}` →
//!   `{account_id, role, created_at_ms, expires_at_ms}` with a store TTL
//!
//! An account record and its id index are written in one atomic batch.

use std::sync::Arc;
use std::time::Duration;

use kernel::id::AccountId;
use platform::kv::{FieldMap, KvStore, StoreError, fields};
use platform::password::HashedPassword;

use crate::domain::entity::{account::Account, session::Session};
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::domain::value_object::{
    account_status::AccountStatus, role::Role, session_token::SessionToken, username::Username,
};
use crate::error::AuthResult;

const ACCOUNT_PREFIX: &str = "account:";
const ACCOUNT_ID_PREFIX: &str = "account:id:";

pub struct KvAuthRepository<S> {
    store: Arc<S>,
    session_key_prefix: String,
}

impl<S> Clone for KvAuthRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            session_key_prefix: self.session_key_prefix.clone(),
        }
    }
}

impl<S: KvStore> KvAuthRepository<S> {
    pub fn new(store: Arc<S>, session_key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            session_key_prefix: session_key_prefix.into(),
        }
    }

    fn session_key(&self, token: &SessionToken) -> String {
        format!("{}{}", self.session_key_prefix, token.digest())
    }
}

fn account_key(username: &Username) -> String {
    format!("{ACCOUNT_PREFIX}{username}")
}

fn account_id_key(id: &AccountId) -> String {
    format!("{ACCOUNT_ID_PREFIX}{id}")
}

// ============================================================================
// Record mapping
// ============================================================================

fn required<'a>(record: &'a FieldMap, key: &str, field: &str) -> Result<&'a str, StoreError> {
    record
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| StoreError::Corrupt(format!("{key}: missing field `{field}`")))
}

fn corrupt(key: &str, field: &str) -> StoreError {
    StoreError::Corrupt(format!("{key}: invalid field `{field}`"))
}

fn account_to_fields(account: &Account) -> FieldMap {
    fields([
        ("id", account.id.to_string()),
        ("username", account.username.to_string()),
        ("credential_hash", account.credential_hash.as_phc_string().to_string()),
        ("role", account.role.code().to_string()),
        ("status", account.status.code().to_string()),
    ])
}

fn account_from_fields(key: &str, record: &FieldMap) -> Result<Account, StoreError> {
    let id = required(record, key, "id")?
        .parse::<AccountId>()
        .map_err(|_| corrupt(key, "id"))?;
    let username =
        Username::parse(required(record, key, "username")?).ok_or_else(|| corrupt(key, "username"))?;
    let credential_hash = HashedPassword::from_phc_string(required(record, key, "credential_hash")?)
        .map_err(|_| corrupt(key, "credential_hash"))?;
    let role = Role::from_code(required(record, key, "role")?).ok_or_else(|| corrupt(key, "role"))?;
    let status = AccountStatus::from_code(required(record, key, "status")?)
        .ok_or_else(|| corrupt(key, "status"))?;

    Ok(Account {
        id,
        username,
        credential_hash,
        role,
        status,
    })
}

fn session_to_fields(session: &Session) -> FieldMap {
    fields([
        ("account_id", session.account_id.to_string()),
        ("role", session.role.code().to_string()),
        ("created_at_ms", session.created_at_ms.to_string()),
        ("expires_at_ms", session.expires_at_ms.to_string()),
    ])
}

fn session_from_fields(key: &str, record: &FieldMap) -> Result<Session, StoreError> {
    let millis = |field: &str| -> Result<i64, StoreError> {
        required(record, key, field)?
            .parse::<i64>()
            .map_err(|_| corrupt(key, field))
    };

    Ok(Session {
        account_id: required(record, key, "account_id")?
            .parse::<AccountId>()
            .map_err(|_| corrupt(key, "account_id"))?,
        role: Role::from_code(required(record, key, "role")?).ok_or_else(|| corrupt(key, "role"))?,
        created_at_ms: millis("created_at_ms")?,
        expires_at_ms: millis("expires_at_ms")?,
    })
}

// ============================================================================
// AccountRepository
// ============================================================================

impl<S: KvStore + Send + Sync> AccountRepository for KvAuthRepository<S> {
    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>> {
        let key = account_key(username);
        let Some(record) = self.store.get_fields(&key).await? else {
            return Ok(None);
        };
        Ok(Some(account_from_fields(&key, &record)?))
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        let index_key = account_id_key(id);
        let Some(index) = self.store.get_fields(&index_key).await? else {
            return Ok(None);
        };
        let username = Username::parse(required(&index, &index_key, "username")?)
            .ok_or_else(|| corrupt(&index_key, "username"))?;

        // A stale index entry (username reassigned) does not resolve
        Ok(self
            .find_by_username(&username)
            .await?
            .filter(|account| account.id == *id))
    }

    async fn save(&self, account: &Account) -> AuthResult<()> {
        // Record and id index land together or not at all
        let record_key = account_key(&account.username);
        let index_key = account_id_key(&account.id);
        let record = account_to_fields(account);
        let index = fields([("username", account.username.to_string())]);
        self.store
            .put_records(&[(record_key.as_str(), &record), (index_key.as_str(), &index)])
            .await?;

        tracing::info!(account_id = %account.id, role = %account.role, "Account saved");
        Ok(())
    }
}

// ============================================================================
// SessionRepository
// ============================================================================

impl<S: KvStore + Send + Sync> SessionRepository for KvAuthRepository<S> {
    async fn create(&self, token: &SessionToken, session: &Session, ttl: Duration) -> AuthResult<()> {
        self.store
            .put_fields(&self.session_key(token), &session_to_fields(session), Some(ttl))
            .await?;
        Ok(())
    }

    async fn find(&self, token: &SessionToken) -> AuthResult<Option<Session>> {
        let key = self.session_key(token);
        let Some(record) = self.store.get_fields(&key).await? else {
            return Ok(None);
        };
        Ok(Some(session_from_fields(&key, &record)?))
    }

    async fn delete(&self, token: &SessionToken) -> AuthResult<bool> {
        Ok(self.store.delete(&self.session_key(token)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::kv::MemoryStore;
    use platform::password::ClearTextPassword;

    fn repo() -> (Arc<MemoryStore>, KvAuthRepository<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), KvAuthRepository::new(store, "session:"))
    }

    #[tokio::test]
    async fn test_session_key_uses_digest() {
        let (store, repo) = repo();
        let token = SessionToken::generate();
        let session = Session::new(AccountId::new(), Role::Shop, chrono::Duration::minutes(1));
        repo.create(&token, &session, Duration::from_secs(60)).await.unwrap();

        let raw_key = format!("session:{}", token.expose());
        assert!(store.get_fields(&raw_key).await.unwrap().is_none());
        let digest_key = format!("session:{}", token.digest());
        assert!(store.get_fields(&digest_key).await.unwrap().is_some());

        assert_eq!(repo.find(&token).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_corrupt_session_record() {
        let (store, repo) = repo();
        let token = SessionToken::generate();
        store
            .put_fields(
                &format!("session:{}", token.digest()),
                &fields([("account_id", "nope")]),
                None,
            )
            .await
            .unwrap();

        let err = repo.find(&token).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AuthError::Store(StoreError::Corrupt(_))
        ));
    }

    /// Only whole-record batches get through
    struct BatchOnlyStore(MemoryStore);

    impl KvStore for BatchOnlyStore {
        async fn get_fields(&self, key: &str) -> Result<Option<FieldMap>, StoreError> {
            self.0.get_fields(key).await
        }
        async fn put_fields(&self, _: &str, _: &FieldMap, _: Option<Duration>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
        async fn put_fields_if_absent(
            &self,
            _: &str,
            _: &FieldMap,
            _: Option<Duration>,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
        async fn compare_and_set(
            &self,
            key: &str,
            field: &str,
            expected: &str,
            updates: &FieldMap,
            deadline: Option<&str>,
        ) -> Result<platform::kv::CasOutcome, StoreError> {
            self.0.compare_and_set(key, field, expected, updates, deadline).await
        }
        async fn put_records(&self, records: &[(&str, &FieldMap)]) -> Result<(), StoreError> {
            self.0.put_records(records).await
        }
        async fn delete(&self, key: &str) -> Result<bool, StoreError> {
            self.0.delete(key).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_save_writes_record_and_index_in_one_batch() {
        let repo = KvAuthRepository::new(Arc::new(BatchOnlyStore(MemoryStore::new())), "session:");
        let account = Account {
            id: AccountId::new(),
            username: Username::parse("shop_a").unwrap(),
            credential_hash: ClearTextPassword::new("Shop#Pass2024".to_string())
                .unwrap()
                .hash()
                .unwrap(),
            role: Role::Shop,
            status: AccountStatus::Active,
        };

        repo.save(&account).await.unwrap();
        assert_eq!(
            repo.find_by_username(&account.username).await.unwrap().map(|a| a.id),
            Some(account.id)
        );
        assert_eq!(
            repo.find_by_id(&account.id).await.unwrap().map(|a| a.id),
            Some(account.id)
        );
    }

    #[tokio::test]
    async fn test_stale_id_index_does_not_resolve() {
        let (store, repo) = repo();
        let id = AccountId::new();
        store
            .put_fields(&account_id_key(&id), &fields([("username", "ghost")]), None)
            .await
            .unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
