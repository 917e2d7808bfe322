//! Port for ride persistence.
//!
//! Status transitions are written with a compare-and-set: the update only
//! lands if the stored status still equals the status the caller read. When
//! two drivers race to accept the same ride, one write wins and the other sees
//! [`RideRepositoryError::StatusMismatch`].

use async_trait::async_trait;

use crate::domain::{AccountId, Ride, RideId, RideStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ride repository adapters.
    pub enum RideRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "ride repository connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } =>
            "ride repository query failed: {message}",
        /// The stored status moved on since it was read.
        StatusMismatch { expected: RideStatus, actual: RideStatus } =>
            "ride status mismatch: expected {expected}, found {actual}",
        /// A conditional update targeted a ride that is not stored.
        Missing { ride_id: RideId } =>
            "ride {ride_id} not found for update",
    }
}

/// Ride storage queried by id, status and rider.
///
/// Listing methods return rides ordered by creation time, oldest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Fetch a single ride.
    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError>;

    /// All rides currently in `status`.
    async fn find_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, RideRepositoryError>;

    /// All rides requested by `rider_id`.
    async fn find_by_rider_id(&self, rider_id: &AccountId)
    -> Result<Vec<Ride>, RideRepositoryError>;

    /// Persist `ride`.
    ///
    /// - `expected_status == None` inserts a new ride.
    /// - `Some(status)` overwrites the stored ride only if its status is still
    ///   `status`; otherwise nothing is written and
    ///   [`RideRepositoryError::StatusMismatch`] (or
    ///   [`RideRepositoryError::Missing`]) is returned.
    async fn save(
        &self,
        ride: &Ride,
        expected_status: Option<RideStatus>,
    ) -> Result<(), RideRepositoryError>;
}
