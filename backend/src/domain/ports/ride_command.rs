//! Driving port for ride lifecycle mutations.
//!
//! Every method takes the raw `Authorization` header value; the service
//! resolves the caller from it before doing anything else.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Error, Location, Ride, RideId, RideStatus};

/// Validated input for a new ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRequest {
    pub pickup: Location,
    pub dropoff: Location,
}

/// Serializable ride view returned by ride ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidePayload {
    pub id: RideId,
    #[serde(rename = "userId")]
    pub rider_id: AccountId,
    pub driver_id: Option<AccountId>,
    #[serde(rename = "pickupLocation")]
    pub pickup: String,
    #[serde(rename = "dropLocation")]
    pub dropoff: String,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Ride> for RidePayload {
    fn from(ride: &Ride) -> Self {
        Self {
            id: ride.id(),
            rider_id: ride.rider_id(),
            driver_id: ride.driver_id(),
            pickup: ride.pickup().as_ref().to_owned(),
            dropoff: ride.dropoff().as_ref().to_owned(),
            status: ride.status(),
            created_at: ride.created_at(),
        }
    }
}

impl From<Ride> for RidePayload {
    fn from(ride: Ride) -> Self {
        Self::from(&ride)
    }
}

/// Ride lifecycle transitions.
#[async_trait]
pub trait RideCommand: Send + Sync {
    /// Open a ride for the calling rider.
    async fn request_ride(
        &self,
        authorization: Option<&str>,
        request: RideRequest,
    ) -> Result<RidePayload, Error>;

    /// Bind the calling driver to a `REQUESTED` ride.
    async fn accept_ride(
        &self,
        authorization: Option<&str>,
        ride_id: RideId,
    ) -> Result<RidePayload, Error>;

    /// Finish an `ACCEPTED` ride. Any authenticated account may call this.
    async fn complete_ride(
        &self,
        authorization: Option<&str>,
        ride_id: RideId,
    ) -> Result<RidePayload, Error>;
}
