//! Registration and login inputs.
//!
//! Handlers hand raw strings to these constructors so that services only ever
//! see validated usernames, non-empty passwords and known roles.

use std::fmt;

use zeroize::Zeroizing;

use super::{AccountValidationError, Role, Username};

/// Why a registration or login payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username failed validation.
    Username(AccountValidationError),
    /// Password was empty.
    EmptyPassword,
    /// Role was not recognised.
    Role(AccountValidationError),
}

impl CredentialsValidationError {
    /// Name of the offending payload field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::EmptyPassword => "password",
            Self::Role(_) => "role",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(err) | Self::Role(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn password(raw: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    // Whitespace is significant in passwords; only emptiness is rejected.
    if raw.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use rideshare::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("alice", "pw1").unwrap();
/// assert_eq!(creds.username().as_ref(), "alice");
/// assert_eq!(creds.password(), "pw1");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw inputs.
    pub fn try_from_parts(username: &str, password_raw: &str) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username).map_err(CredentialsValidationError::Username)?;
        let password = password(password_raw)?;
        Ok(Self { username, password })
    }

    /// Username used for the account lookup.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated registration request.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Build a registration from raw inputs.
    pub fn try_from_parts(
        username: &str,
        password_raw: &str,
        role: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username).map_err(CredentialsValidationError::Username)?;
        let password = password(password_raw)?;
        let role = role.parse::<Role>().map_err(CredentialsValidationError::Role)?;
        Ok(Self {
            username,
            password,
            role,
        })
    }

    /// Requested username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password to be hashed.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
