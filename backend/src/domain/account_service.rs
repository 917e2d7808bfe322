//! Registration and login.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::task;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::identity::map_account_store_error;
use super::ports::{AccountCommand, AccountRepository, PasswordHashError, PasswordHasher};
use super::{
    Account, AccountId, CredentialCodec, Error, IssuedCredential, LoginCredentials, PasswordDigest,
    Registration,
};

const INVALID_LOGIN: &str = "Invalid username or password";

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_join_error(error: task::JoinError) -> Error {
    Error::internal(format!("password hashing task failed: {error}"))
}

/// Account service implementing [`AccountCommand`].
pub struct AccountService<R, H> {
    accounts: Arc<R>,
    hasher: Arc<H>,
    codec: Arc<CredentialCodec>,
    clock: Arc<dyn Clock>,
}

impl<R, H> AccountService<R, H> {
    /// Create a service over the account store, hasher, codec and clock.
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<H>,
        codec: Arc<CredentialCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            codec,
            clock,
        }
    }
}

impl<R, H> AccountService<R, H>
where
    H: PasswordHasher + 'static,
{
    // Hashing is CPU bound and runs on the blocking pool.
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordDigest, Error> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = Zeroizing::new(plaintext.to_owned());
        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(map_join_error)?
            .map_err(map_hash_error)
    }

    async fn password_matches(
        &self,
        plaintext: &str,
        digest: PasswordDigest,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = Zeroizing::new(plaintext.to_owned());
        task::spawn_blocking(move || hasher.matches(&plaintext, &digest))
            .await
            .map_err(map_join_error)?
            .map_err(map_hash_error)
    }
}

#[async_trait]
impl<R, H> AccountCommand for AccountService<R, H>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: Registration) -> Result<(), Error> {
        let username = registration.username();
        let existing = self
            .accounts
            .find_by_username(username)
            .await
            .map_err(map_account_store_error)?;
        if existing.is_some() {
            debug!(%username, "registration rejected: username taken");
            return Err(Error::username_taken("Username already taken"));
        }

        let digest = self.hash_password(registration.password()).await?;
        let account = Account::new(
            AccountId::random(),
            username.clone(),
            digest,
            registration.role(),
        );

        // A concurrent registration can still win between the lookup and the
        // insert; the store's uniqueness guarantee reports it as a duplicate.
        self.accounts
            .save(&account)
            .await
            .map_err(map_account_store_error)?;

        info!(
            account_id = %account.id(),
            role = %account.role(),
            "account registered"
        );
        Ok(())
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<IssuedCredential, Error> {
        let Some(account) = self
            .accounts
            .find_by_username(credentials.username())
            .await
            .map_err(map_account_store_error)?
        else {
            debug!("login rejected: unknown username");
            return Err(Error::invalid_credentials(INVALID_LOGIN));
        };

        let matches = self
            .password_matches(credentials.password(), account.password_digest().clone())
            .await?;
        if !matches {
            debug!(account_id = %account.id(), "login rejected: password mismatch");
            return Err(Error::invalid_credentials(INVALID_LOGIN));
        }

        let issued = self
            .codec
            .issue(account.username(), account.role(), self.clock.utc())
            .map_err(|err| Error::internal(err.to_string()))?;

        info!(
            account_id = %account.id(),
            expires_at = %issued.expires_at(),
            "credential issued"
        );
        Ok(issued)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
