//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed identity and ride model used by the API
//! and persistence layers, plus the services that implement the driving
//! ports. Nothing here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Account, Username, Role: registered identities.
//! - CredentialCodec: signs and verifies bearer credentials.
//! - IdentityResolver: authorization header to caller identity.
//! - Ride, RideStatus: the ride lifecycle aggregate.
//! - AccountService, RideService: driving port implementations.

pub mod account;
pub mod account_service;
pub mod auth;
pub mod credential;
pub mod error;
pub mod identity;
pub mod ports;
pub mod ride;
pub mod ride_service;
pub mod trace_id;

pub use self::account::{Account, AccountId, AccountValidationError, PasswordDigest, Role, Username};
pub use self::account_service::AccountService;
pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::credential::{
    CredentialCodec, InvalidCredential, IssuedCredential, SigningError, TokenSettings,
    TokenSettingsError, VerifiedCredential, extract_bearer,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{Identity, IdentityError, IdentityResolver};
pub use self::ride::{
    Location, Ride, RideId, RideSnapshot, RideStatus, RideTransitionError, RideValidationError,
};
pub use self::ride_service::RideService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use rideshare::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
