//! Ride aggregate and its lifecycle.
//!
//! A ride moves strictly forward: `REQUESTED -> ACCEPTED -> COMPLETED`. The
//! aggregate enforces the state edges and the driver binding; who may trigger
//! an edge is decided by the ride service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;

const LOCATION_MAX: usize = 255;

/// Validation errors for ride values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideValidationError {
    /// Identifier text was not a UUID.
    InvalidId,
    /// A location was empty or whitespace only.
    EmptyLocation,
    /// A location exceeded the maximum length.
    LocationTooLong {
        /// Permitted length in characters.
        max: usize,
    },
    /// Status text did not name a known status.
    UnknownStatus(String),
    /// Driver presence contradicts the status.
    DriverMismatch {
        /// Status carried by the record.
        status: RideStatus,
    },
}

impl fmt::Display for RideValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "ride id must be a valid UUID"),
            Self::EmptyLocation => write!(f, "location must not be empty"),
            Self::LocationTooLong { max } => {
                write!(f, "location must be at most {max} characters")
            }
            Self::UnknownStatus(value) => write!(f, "unknown ride status: {value}"),
            Self::DriverMismatch { status } => match status {
                RideStatus::Requested => write!(f, "a REQUESTED ride cannot have a driver"),
                _ => write!(f, "a {status} ride must have a driver"),
            },
        }
    }
}

impl std::error::Error for RideValidationError {}

/// Stable ride identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(Uuid);

impl RideId {
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

impl FromStr for RideId {
    type Err = RideValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| RideValidationError::InvalidId)
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Position of a ride in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    /// Waiting for a driver.
    Requested,
    /// A driver is bound to the ride.
    Accepted,
    /// Terminal.
    Completed,
}

impl RideStatus {
    /// Canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Accepted => "ACCEPTED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl FromStr for RideStatus {
    type Err = RideValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(Self::Requested),
            "ACCEPTED" => Ok(Self::Accepted),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(RideValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form pickup or drop-off description, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    /// Validate and construct a location.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RideValidationError> {
        let raw = value.as_ref();
        if raw.trim().is_empty() {
            return Err(RideValidationError::EmptyLocation);
        }
        if raw.chars().count() > LOCATION_MAX {
            return Err(RideValidationError::LocationTooLong { max: LOCATION_MAX });
        }
        Ok(Self(raw.to_owned()))
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A lifecycle edge was attempted from the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Ride is not in {expected} status")]
pub struct RideTransitionError {
    /// Status the edge starts from.
    pub expected: RideStatus,
    /// Status the ride was actually in.
    pub actual: RideStatus,
}

/// Persisted ride fields, used to rehydrate a [`Ride`] from storage.
#[derive(Debug, Clone)]
pub struct RideSnapshot {
    /// Stored ride identifier.
    pub id: RideId,
    /// Account that requested the ride.
    pub rider_id: AccountId,
    /// Accepting driver; `None` while the ride is `REQUESTED`.
    pub driver_id: Option<AccountId>,
    /// Pickup description.
    pub pickup: Location,
    /// Drop-off description.
    pub dropoff: Location,
    /// Lifecycle status.
    pub status: RideStatus,
    /// Request instant.
    pub created_at: DateTime<Utc>,
}

/// A transportation request tracked through its lifecycle.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use rideshare::domain::{AccountId, Location, Ride, RideStatus};
///
/// let mut ride = Ride::request(
///     AccountId::random(),
///     Location::new("A").unwrap(),
///     Location::new("B").unwrap(),
///     Utc::now(),
/// );
/// assert_eq!(ride.status(), RideStatus::Requested);
///
/// let driver = AccountId::random();
/// ride.accept(driver).unwrap();
/// assert_eq!(ride.driver_id(), Some(driver));
/// assert!(ride.accept(AccountId::random()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    id: RideId,
    rider_id: AccountId,
    driver_id: Option<AccountId>,
    pickup: Location,
    dropoff: Location,
    status: RideStatus,
    created_at: DateTime<Utc>,
}

impl Ride {
    /// Open a new ride in `REQUESTED` with no driver.
    #[must_use]
    pub fn request(
        rider_id: AccountId,
        pickup: Location,
        dropoff: Location,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RideId::random(),
            rider_id,
            driver_id: None,
            pickup,
            dropoff,
            status: RideStatus::Requested,
            created_at,
        }
    }

    /// Rehydrate a stored ride, checking driver presence against the status.
    pub fn restore(snapshot: RideSnapshot) -> Result<Self, RideValidationError> {
        let RideSnapshot {
            id,
            rider_id,
            driver_id,
            pickup,
            dropoff,
            status,
            created_at,
        } = snapshot;

        let driver_expected = status != RideStatus::Requested;
        if driver_id.is_some() != driver_expected {
            return Err(RideValidationError::DriverMismatch { status });
        }

        Ok(Self {
            id,
            rider_id,
            driver_id,
            pickup,
            dropoff,
            status,
            created_at,
        })
    }

    /// Bind `driver_id` and move to `ACCEPTED`.
    ///
    /// Leaves the ride untouched unless it is `REQUESTED`.
    pub fn accept(&mut self, driver_id: AccountId) -> Result<(), RideTransitionError> {
        self.require(RideStatus::Requested)?;
        self.driver_id = Some(driver_id);
        self.status = RideStatus::Accepted;
        Ok(())
    }

    /// Move an `ACCEPTED` ride to `COMPLETED`.
    pub fn complete(&mut self) -> Result<(), RideTransitionError> {
        self.require(RideStatus::Accepted)?;
        self.status = RideStatus::Completed;
        Ok(())
    }

    fn require(&self, expected: RideStatus) -> Result<(), RideTransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(RideTransitionError {
                expected,
                actual: self.status,
            })
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> RideId {
        self.id
    }

    /// Account that requested the ride.
    #[must_use]
    pub const fn rider_id(&self) -> AccountId {
        self.rider_id
    }

    /// Driver bound on acceptance.
    #[must_use]
    pub const fn driver_id(&self) -> Option<AccountId> {
        self.driver_id
    }

    /// Pickup location.
    #[must_use]
    pub const fn pickup(&self) -> &Location {
        &self.pickup
    }

    /// Drop-off location.
    #[must_use]
    pub const fn dropoff(&self) -> &Location {
        &self.dropoff
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> RideStatus {
        self.status
    }

    /// Creation instant.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
