//! PostgreSQL-backed `RideRepository` implementation using Diesel ORM.
//!
//! Status transitions are a single conditional `UPDATE ... WHERE id = $1 AND
//! status = $2`. When no row matches, the ride is re-read to tell a moved-on
//! status apart from a missing ride.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{RideRepository, RideRepositoryError};
use crate::domain::{AccountId, Location, Ride, RideId, RideSnapshot, RideStatus};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{NewRideRow, RideRow, RideTransition};
use super::pool::DbPool;
use super::schema::rides;

/// Diesel-backed implementation of the ride repository port.
#[derive(Clone)]
pub struct DieselRideRepository {
    pool: DbPool,
}

impl DieselRideRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RideRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RideRepositoryError::connection(message),
        DieselFailure::UniqueViolation => RideRepositoryError::query("ride id already stored"),
        DieselFailure::Query(message) => RideRepositoryError::query(message),
    }
}

fn row_to_ride(row: RideRow) -> Result<Ride, RideRepositoryError> {
    let RideRow {
        id,
        rider_id,
        driver_id,
        pickup_location,
        drop_location,
        status,
        created_at,
    } = row;

    let corrupt = |err: crate::domain::RideValidationError| {
        RideRepositoryError::query(format!("stored ride {id} is invalid: {err}"))
    };
    Ride::restore(RideSnapshot {
        id: RideId::from_uuid(id),
        rider_id: AccountId::from_uuid(rider_id),
        driver_id: driver_id.map(AccountId::from_uuid),
        pickup: Location::new(pickup_location).map_err(corrupt)?,
        dropoff: Location::new(drop_location).map_err(corrupt)?,
        status: status.parse().map_err(corrupt)?,
        created_at,
    })
    .map_err(corrupt)
}

fn rows_to_rides(rows: Vec<RideRow>) -> Result<Vec<Ride>, RideRepositoryError> {
    rows.into_iter().map(row_to_ride).collect()
}

impl DieselRideRepository {
    async fn insert(&self, ride: &Ride) -> Result<(), RideRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RideRepositoryError::connection))?;

        let row = NewRideRow {
            id: *ride.id().as_uuid(),
            rider_id: *ride.rider_id().as_uuid(),
            driver_id: ride.driver_id().map(|id| *id.as_uuid()),
            pickup_location: ride.pickup().as_ref(),
            drop_location: ride.dropoff().as_ref(),
            status: ride.status().as_str(),
            created_at: ride.created_at(),
        };

        diesel::insert_into(rides::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn compare_and_set(
        &self,
        ride: &Ride,
        expected: RideStatus,
    ) -> Result<(), RideRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RideRepositoryError::connection))?;

        let changes = RideTransition {
            driver_id: ride.driver_id().map(|id| *id.as_uuid()),
            status: ride.status().as_str(),
        };
        let updated = diesel::update(rides::table)
            .filter(
                rides::id
                    .eq(ride.id().as_uuid())
                    .and(rides::status.eq(expected.as_str())),
            )
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 1 {
            return Ok(());
        }

        let current: Option<String> = rides::table
            .filter(rides::id.eq(ride.id().as_uuid()))
            .select(rides::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match current {
            None => Err(RideRepositoryError::missing(ride.id())),
            Some(status) => {
                let actual: RideStatus = status.parse().map_err(|err| {
                    RideRepositoryError::query(format!("stored ride status is invalid: {err}"))
                })?;
                debug!(ride_id = %ride.id(), %expected, %actual, "conditional ride update skipped");
                Err(RideRepositoryError::status_mismatch(expected, actual))
            }
        }
    }
}

#[async_trait]
impl RideRepository for DieselRideRepository {
    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RideRepositoryError::connection))?;

        let row = rides::table
            .filter(rides::id.eq(id.as_uuid()))
            .select(RideRow::as_select())
            .first::<RideRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ride).transpose()
    }

    async fn find_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, RideRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RideRepositoryError::connection))?;

        let rows: Vec<RideRow> = rides::table
            .filter(rides::status.eq(status.as_str()))
            .order((rides::created_at.asc(), rides::id.asc()))
            .select(RideRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_rides(rows)
    }

    async fn find_by_rider_id(
        &self,
        rider_id: &AccountId,
    ) -> Result<Vec<Ride>, RideRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RideRepositoryError::connection))?;

        let rows: Vec<RideRow> = rides::table
            .filter(rides::rider_id.eq(rider_id.as_uuid()))
            .order((rides::created_at.asc(), rides::id.asc()))
            .select(RideRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_rides(rows)
    }

    async fn save(
        &self,
        ride: &Ride,
        expected_status: Option<RideStatus>,
    ) -> Result<(), RideRepositoryError> {
        match expected_status {
            None => self.insert(ride).await,
            Some(expected) => self.compare_and_set(ride, expected).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> RideRow {
        RideRow {
            id: Uuid::new_v4(),
            rider_id: Uuid::new_v4(),
            driver_id: Some(Uuid::new_v4()),
            pickup_location: "Harbour Street".to_owned(),
            drop_location: "Airport".to_owned(),
            status: "ACCEPTED".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn converts_valid_rows(row: RideRow) {
        let driver = row.driver_id.map(AccountId::from_uuid);
        let ride = row_to_ride(row).expect("valid row");
        assert_eq!(ride.status(), RideStatus::Accepted);
        assert_eq!(ride.driver_id(), driver);
        assert_eq!(ride.pickup().as_ref(), "Harbour Street");
    }

    #[rstest]
    fn accepted_rows_without_driver_are_rejected(mut row: RideRow) {
        row.driver_id = None;
        let err = row_to_ride(row).expect_err("inconsistent row");
        assert!(matches!(err, RideRepositoryError::Query { .. }));
        assert!(err.to_string().contains("must have a driver"));
    }

    #[rstest]
    fn unknown_status_is_rejected(mut row: RideRow) {
        row.status = "CANCELLED".to_owned();
        let err = row_to_ride(row).expect_err("unknown status");
        assert!(err.to_string().contains("CANCELLED"));
    }
}
