//! Ride lifecycle service.
//!
//! Implements the ride driving ports. Every operation first resolves the caller
//! through [`IdentityResolver`], then applies the role gate, and only then
//! touches the ride store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::ports::{
    AccountRepository, RideCommand, RidePayload, RideQuery, RideRepository, RideRepositoryError,
    RideRequest,
};
use super::{
    CredentialCodec, Error, Identity, IdentityResolver, Ride, RideId, RideStatus,
    RideTransitionError, Role,
};

fn invalid_state(expected: RideStatus, actual: RideStatus) -> Error {
    Error::invalid_state(format!("Ride is not in {expected} status")).with_details(json!({
        "expected": expected,
        "actual": actual,
    }))
}

impl From<RideTransitionError> for Error {
    fn from(value: RideTransitionError) -> Self {
        invalid_state(value.expected, value.actual)
    }
}

fn map_repository_error(error: RideRepositoryError) -> Error {
    match error {
        RideRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ride repository unavailable: {message}"))
        }
        RideRepositoryError::Query { message } => {
            Error::internal(format!("ride repository error: {message}"))
        }
        RideRepositoryError::StatusMismatch { expected, actual } => invalid_state(expected, actual),
        RideRepositoryError::Missing { .. } => Error::not_found("Ride not found"),
    }
}

/// Ride service implementing [`RideCommand`] and [`RideQuery`].
pub struct RideService<A, R> {
    identity: IdentityResolver<A>,
    rides: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<A, R> RideService<A, R>
where
    A: AccountRepository,
    R: RideRepository,
{
    /// Create a service over the account and ride stores.
    pub fn new(
        accounts: Arc<A>,
        rides: Arc<R>,
        codec: Arc<CredentialCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity: IdentityResolver::new(accounts, codec),
            rides,
            clock,
        }
    }

    async fn caller(&self, authorization: Option<&str>) -> Result<Identity, Error> {
        Ok(self
            .identity
            .resolve(authorization, self.clock.utc())
            .await?)
    }

    async fn load(&self, ride_id: &RideId) -> Result<Ride, Error> {
        self.rides
            .find_by_id(ride_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("Ride not found"))
    }
}

#[async_trait]
impl<A, R> RideCommand for RideService<A, R>
where
    A: AccountRepository,
    R: RideRepository,
{
    async fn request_ride(
        &self,
        authorization: Option<&str>,
        request: RideRequest,
    ) -> Result<RidePayload, Error> {
        let caller = self.caller(authorization).await?;
        caller.require_role(Role::Rider)?;

        let ride = Ride::request(
            caller.account().id(),
            request.pickup,
            request.dropoff,
            self.clock.utc(),
        );
        self.rides
            .save(&ride, None)
            .await
            .map_err(map_repository_error)?;

        info!(ride_id = %ride.id(), rider_id = %ride.rider_id(), "ride requested");
        Ok(RidePayload::from(ride))
    }

    async fn accept_ride(
        &self,
        authorization: Option<&str>,
        ride_id: RideId,
    ) -> Result<RidePayload, Error> {
        let caller = self.caller(authorization).await?;
        caller.require_role(Role::Driver)?;

        let mut ride = self.load(&ride_id).await?;
        ride.accept(caller.account().id())?;
        self.rides
            .save(&ride, Some(RideStatus::Requested))
            .await
            .map_err(|err| {
                debug!(%ride_id, error = %err, "accept lost conditional write");
                map_repository_error(err)
            })?;

        info!(%ride_id, driver_id = %caller.account().id(), "ride accepted");
        Ok(RidePayload::from(ride))
    }

    async fn complete_ride(
        &self,
        authorization: Option<&str>,
        ride_id: RideId,
    ) -> Result<RidePayload, Error> {
        let caller = self.caller(authorization).await?;

        let mut ride = self.load(&ride_id).await?;
        ride.complete()?;
        self.rides
            .save(&ride, Some(RideStatus::Accepted))
            .await
            .map_err(map_repository_error)?;

        info!(%ride_id, completed_by = %caller.account().id(), "ride completed");
        Ok(RidePayload::from(ride))
    }
}

#[async_trait]
impl<A, R> RideQuery for RideService<A, R>
where
    A: AccountRepository,
    R: RideRepository,
{
    async fn list_pending_for_driver(
        &self,
        authorization: Option<&str>,
    ) -> Result<Vec<RidePayload>, Error> {
        let caller = self.caller(authorization).await?;
        caller.require_role(Role::Driver)?;

        let rides = self
            .rides
            .find_by_status(RideStatus::Requested)
            .await
            .map_err(map_repository_error)?;
        Ok(rides.iter().map(RidePayload::from).collect())
    }

    async fn list_own_rides(&self, authorization: Option<&str>) -> Result<Vec<RidePayload>, Error> {
        let caller = self.caller(authorization).await?;
        caller.require_role(Role::Rider)?;

        let rides = self
            .rides
            .find_by_rider_id(&caller.account().id())
            .await
            .map_err(map_repository_error)?;
        Ok(rides.iter().map(RidePayload::from).collect())
    }
}

#[cfg(test)]
#[path = "ride_service_tests.rs"]
mod tests;
