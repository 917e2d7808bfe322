//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! into validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, rides};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub password_digest: String,
    pub role: String,
    #[expect(dead_code, reason = "audit column not surfaced in the domain")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_digest: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the rides table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RideRow {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup_location: String,
    pub drop_location: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new rides.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rides)]
pub(crate) struct NewRideRow<'a> {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup_location: &'a str,
    pub drop_location: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset applied by lifecycle transitions.
///
/// `driver_id` is written as-is, including `None`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = rides)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RideTransition<'a> {
    pub driver_id: Option<Uuid>,
    pub status: &'a str,
}
