//! Account Entity
//!
//! A shop, staff or admin login. Accounts are provisioned by an external
//! bootstrap step; this service only reads them (plus `save` for that step).

use kernel::id::AccountId;
use platform::password::{ClearTextPassword, HashedPassword};

use crate::domain::value_object::{
    account_status::AccountStatus, role::Role, username::Username,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub credential_hash: HashedPassword,
    pub role: Role,
    pub status: AccountStatus,
}

impl Account {
    /// Provision a new active account with a freshly hashed credential.
    pub fn provision(username: Username, password: &ClearTextPassword, role: Role) -> AuthResult<Self> {
        let credential_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Self {
            id: AccountId::new(),
            username,
            credential_hash,
            role,
            status: AccountStatus::Active,
        })
    }

    #[inline]
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    pub fn verify_password(&self, password: &ClearTextPassword) -> bool {
        self.credential_hash.verify(password)
    }
}
