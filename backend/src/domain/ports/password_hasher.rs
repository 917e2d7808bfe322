//! Port for one-way password hashing.

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Producing a digest failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

/// Salted one-way digest and comparison.
///
/// CPU bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest of `plaintext`.
    fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError>;

    /// Whether `plaintext` matches `digest`.
    fn matches(&self, plaintext: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError>;
}
