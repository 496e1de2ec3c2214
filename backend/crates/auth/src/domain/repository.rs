//! Repository Traits
//!
//! Interfaces for persistence. Implementation is in the infrastructure layer.

use std::time::Duration;

use kernel::id::AccountId;

use crate::domain::entity::{account::Account, session::Session};
use crate::domain::value_object::{session_token::SessionToken, username::Username};
use crate::error::AuthResult;

#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>>;

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>>;

    /// Create or replace an account (bootstrap path)
    async fn save(&self, account: &Account) -> AuthResult<()>;
}

#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a session; the store drops it after `ttl`
    async fn create(&self, token: &SessionToken, session: &Session, ttl: Duration)
    -> AuthResult<()>;

    async fn find(&self, token: &SessionToken) -> AuthResult<Option<Session>>;

    /// Returns whether a session existed
    async fn delete(&self, token: &SessionToken) -> AuthResult<bool>;
}
