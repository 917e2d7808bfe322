//! Caller identity resolution for protected operations.
//!
//! Each call verifies the bearer credential and performs exactly one account
//! lookup; nothing is cached between calls. The account record answers "who",
//! while the role embedded in the credential answers "what may they do". A
//! role change on the account therefore only affects credentials issued after
//! the change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::ports::{AccountRepository, AccountRepositoryError};
use super::{Account, CredentialCodec, Error, Role, Username, extract_bearer};

/// Why a caller could not be identified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Header absent, not a bearer header, or credential rejected.
    #[error("Invalid or missing token")]
    Unauthenticated,
    /// The credential is valid but its subject no longer exists.
    #[error("User not found")]
    AccountNotFound {
        /// Subject named by the credential.
        username: Username,
    },
    /// The account store failed.
    #[error(transparent)]
    Store(#[from] AccountRepositoryError),
}

pub(crate) fn map_account_store_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateUsername { .. } => Error::username_taken("Username already taken"),
    }
}

impl From<IdentityError> for Error {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::Unauthenticated => Self::unauthenticated("Invalid or missing token"),
            IdentityError::AccountNotFound { .. } => Self::not_found("User not found"),
            IdentityError::Store(err) => map_account_store_error(err),
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    account: Account,
    role: Role,
}

impl Identity {
    /// Account the credential's subject resolved to.
    #[must_use]
    pub const fn account(&self) -> &Account {
        &self.account
    }

    /// Role embedded in the credential; used for authorisation.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Fail with `forbidden` unless the credential carries `required`.
    pub fn require_role(&self, required: Role) -> Result<(), Error> {
        if self.role == required {
            Ok(())
        } else {
            debug!(
                account_id = %self.account.id(),
                role = %self.role,
                required = %required,
                "role check failed"
            );
            Err(Error::forbidden(format!("Only {required} accounts may do this")))
        }
    }
}

/// Turns an `Authorization` header into an [`Identity`].
pub struct IdentityResolver<A> {
    accounts: Arc<A>,
    codec: Arc<CredentialCodec>,
}

impl<A> Clone for IdentityResolver<A> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<A> IdentityResolver<A>
where
    A: AccountRepository,
{
    /// Create a resolver over the account store and codec.
    pub const fn new(accounts: Arc<A>, codec: Arc<CredentialCodec>) -> Self {
        Self { accounts, codec }
    }

    /// Verify the header's credential at `now` and load its account.
    pub async fn resolve(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, IdentityError> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(IdentityError::Unauthenticated)?;
        let verified = self
            .codec
            .verify(token, now)
            .map_err(|_| IdentityError::Unauthenticated)?;

        let account = self
            .accounts
            .find_by_username(&verified.subject)
            .await?
            .ok_or_else(|| IdentityError::AccountNotFound {
                username: verified.subject.clone(),
            })?;

        Ok(Identity {
            account,
            role: verified.role,
        })
    }
}
