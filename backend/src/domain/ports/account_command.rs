//! Driving port for registration and login.

use async_trait::async_trait;

use crate::domain::{Error, IssuedCredential, LoginCredentials, Registration};

/// Account use-cases exposed to inbound adapters.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account.
    ///
    /// Fails with `username_taken` when the username is already registered.
    async fn register(&self, registration: Registration) -> Result<(), Error>;

    /// Exchange a username and password for a bearer credential.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `invalid_credentials`.
    async fn login(&self, credentials: LoginCredentials) -> Result<IssuedCredential, Error>;
}
