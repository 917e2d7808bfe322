//! Account model: identifiers, usernames, roles and the stored password digest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USERNAME_MAX: usize = 64;

/// Validation errors for account values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// Identifier text was not a UUID.
    InvalidId,
    /// Username was empty or whitespace only.
    EmptyUsername,
    /// Username exceeded the maximum length.
    UsernameTooLong {
        /// Permitted length in characters.
        max: usize,
    },
    /// Role text did not name a known role.
    UnknownRole(String),
    /// Stored password digest was empty.
    EmptyDigest,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UnknownRole(value) => write!(f, "unknown role: {value}"),
            Self::EmptyDigest => write!(f, "password digest must not be empty"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Unique login name, kept exactly as supplied. Comparison is case-sensitive
/// and whitespace-sensitive.
///
/// # Examples
/// ```
/// use rideshare::domain::Username;
///
/// let name = Username::new("alice").unwrap();
/// assert_ne!(name, Username::new("Alice").unwrap());
/// assert_ne!(name, Username::new("alice ").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username from raw input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let raw = value.as_ref();
        if raw.trim().is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        if raw.chars().count() > USERNAME_MAX {
            return Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(raw.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an account is allowed to do with rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Requests rides and lists their own trips.
    #[serde(alias = "ROLE_USER")]
    Rider,
    /// Sees pending requests and accepts them.
    #[serde(alias = "ROLE_DRIVER")]
    Driver,
}

impl Role {
    /// Canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rider => "RIDER",
            Self::Driver => "DRIVER",
        }
    }
}

impl FromStr for Role {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RIDER" | "ROLE_USER" => Ok(Self::Rider),
            "DRIVER" | "ROLE_DRIVER" => Ok(Self::Driver),
            other => Err(AccountValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-way salted password digest in PHC string form.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded digest produced by a password hasher.
    pub fn new(encoded: impl Into<String>) -> Result<Self, AccountValidationError> {
        let encoded = encoded.into();
        if encoded.is_empty() {
            return Err(AccountValidationError::EmptyDigest);
        }
        Ok(Self(encoded))
    }

    /// Encoded digest for storage and verification.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Registered account.
///
/// Accounts are immutable once created. The digest is never serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    username: Username,
    password_digest: PasswordDigest,
    role: Role,
}

impl Account {
    /// Assemble an account from validated parts.
    #[must_use]
    pub const fn new(
        id: AccountId,
        username: Username,
        password_digest: PasswordDigest,
        role: Role,
    ) -> Self {
        Self {
            id,
            username,
            password_digest,
            role,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Login name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Stored password digest.
    #[must_use]
    pub const fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    /// Role recorded at registration.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}
