//! Driving port for ride listings.

use async_trait::async_trait;

use crate::domain::Error;

use super::RidePayload;

/// Role-gated ride listings.
#[async_trait]
pub trait RideQuery: Send + Sync {
    /// Every `REQUESTED` ride, for drivers looking for work.
    async fn list_pending_for_driver(
        &self,
        authorization: Option<&str>,
    ) -> Result<Vec<RidePayload>, Error>;

    /// Rides the calling rider has requested, in any status.
    async fn list_own_rides(&self, authorization: Option<&str>) -> Result<Vec<RidePayload>, Error>;
}
