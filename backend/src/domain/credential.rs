//! Bearer credential codec.
//!
//! Credentials are HS256-signed JWTs carrying the username (`sub`), the role
//! snapshot taken at login (`role`), whole-second `iat`/`exp` stamps, and the
//! exact expiry instant (`exp_at`) that `verify` checks against. The
//! codec keeps no state beyond the injected [`TokenSettings`]; every
//! verification is a pure function of the token, the secret and the instant
//! supplied by the caller.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{Role, Username};

const BEARER_PREFIX: &str = "Bearer ";

/// Invalid signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenSettingsError {
    /// The signing secret was empty.
    #[error("token secret must not be empty")]
    EmptySecret,
    /// The lifetime was zero or negative.
    #[error("token lifetime must be positive, got {seconds}s")]
    NonPositiveTtl {
        /// Configured lifetime in seconds.
        seconds: i64,
    },
}

/// Signing secret and lifetime handed to [`CredentialCodec::new`].
#[derive(Clone)]
pub struct TokenSettings {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl TokenSettings {
    /// Validate the secret and lifetime.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, TokenSettingsError> {
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(TokenSettingsError::EmptySecret);
        }
        if ttl <= Duration::zero() {
            return Err(TokenSettingsError::NonPositiveTtl {
                seconds: ttl.num_seconds(),
            });
        }
        Ok(Self { secret, ttl })
    }

    /// Raw signing secret.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Lifetime of issued credentials.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
    /// Exact expiry; `exp` is rounded up to the next whole second.
    exp_at: DateTime<Utc>,
}

fn ceil_seconds(instant: DateTime<Utc>) -> i64 {
    instant.timestamp() + i64::from(instant.timestamp_subsec_nanos() > 0)
}

/// Signing failed. Only reachable with a broken key setup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to sign credential: {0}")]
pub struct SigningError(String);

/// The token was malformed, forged, or expired.
///
/// Deliberately carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid or expired credential")]
pub struct InvalidCredential;

/// Freshly signed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl IssuedCredential {
    /// Compact JWS form handed to clients.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Issue instant.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// First instant at which the credential is rejected.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Consume into the compact token.
    #[must_use]
    pub fn into_token(self) -> String {
        self.token
    }
}

/// Subject and role recovered from a valid credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    /// Username the credential was issued to.
    pub subject: Username,
    /// Role snapshot embedded at issue time.
    pub role: Role,
}

/// Issues and verifies bearer credentials.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use rideshare::domain::{CredentialCodec, Role, TokenSettings, Username};
///
/// let settings = TokenSettings::new(b"0123456789abcdef0123456789abcdef".to_vec(), Duration::hours(1)).unwrap();
/// let codec = CredentialCodec::new(&settings);
/// let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
///
/// let alice = Username::new("alice").unwrap();
/// let issued = codec.issue(&alice, Role::Rider, now).unwrap();
/// let verified = codec.verify(issued.token(), now + Duration::minutes(59)).unwrap();
/// assert_eq!(verified.subject, alice);
/// assert!(codec.verify(issued.token(), now + Duration::hours(1)).is_err());
/// ```
#[derive(Clone)]
pub struct CredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl CredentialCodec {
    /// Build a codec bound to `settings`.
    #[must_use]
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the injected instant in `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(settings.secret()),
            decoding: DecodingKey::from_secret(settings.secret()),
            validation,
            ttl: settings.ttl(),
        }
    }

    /// Sign a credential for `subject` with `role`, valid from `now` for the
    /// configured lifetime.
    pub fn issue(
        &self,
        subject: &Username,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredential, SigningError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: subject.as_ref().to_owned(),
            role,
            iat: now.timestamp(),
            exp: ceil_seconds(expires_at),
            exp_at: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| SigningError(err.to_string()))?;

        Ok(IssuedCredential {
            token,
            issued_at: now,
            expires_at,
        })
    }

    /// Check signature, shape and expiry of `raw` at instant `now`.
    ///
    /// A credential is accepted only while `now` is strictly before its expiry.
    pub fn verify(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedCredential, InvalidCredential> {
        let claims = decode::<Claims>(raw, &self.decoding, &self.validation)
            .map_err(|err| {
                debug!(kind = ?err.kind(), "credential failed to decode");
                InvalidCredential
            })?
            .claims;

        if now >= claims.exp_at {
            debug!("credential presented after expiry");
            return Err(InvalidCredential);
        }

        let subject = Username::new(&claims.sub).map_err(|_| InvalidCredential)?;
        Ok(VerifiedCredential {
            subject,
            role: claims.role,
        })
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// Only the exact, case-sensitive `Bearer ` prefix followed by a non-empty
/// token is accepted.
///
/// # Examples
/// ```
/// use rideshare::domain::extract_bearer;
///
/// assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
/// assert_eq!(extract_bearer("bearer abc"), None);
/// assert_eq!(extract_bearer("Bearer "), None);
/// ```
#[must_use]
pub fn extract_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}
