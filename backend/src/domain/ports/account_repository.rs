//! Port for account persistence.
//!
//! Adapters must enforce username uniqueness atomically: of two concurrent
//! saves for the same username under different ids, exactly one succeeds and
//! the other reports [`AccountRepositoryError::DuplicateUsername`].

use async_trait::async_trait;

use crate::domain::{Account, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// Another account already owns the username.
        DuplicateUsername { username: String } =>
            "username already registered: {username}",
    }
}

/// Keyed account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look an account up by its exact (case-sensitive) username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Insert a new `account`.
    ///
    /// Fails with [`AccountRepositoryError::DuplicateUsername`] when the
    /// username is already stored. Existing records are never overwritten.
    async fn save(&self, account: &Account) -> Result<(), AccountRepositoryError>;
}
