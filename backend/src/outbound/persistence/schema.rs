//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` carries a unique constraint; concurrent registrations of the
    /// same name surface as a unique violation on insert.
    accounts (id) {
        id -> Uuid,
        /// Trimmed username, at most 64 characters.
        username -> Varchar,
        /// PHC-encoded Argon2id digest.
        password_digest -> Text,
        /// `RIDER` or `DRIVER`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ride requests and their lifecycle status.
    rides (id) {
        id -> Uuid,
        rider_id -> Uuid,
        /// Set exactly when `status` is not `REQUESTED`.
        driver_id -> Nullable<Uuid>,
        pickup_location -> Varchar,
        drop_location -> Varchar,
        /// `REQUESTED`, `ACCEPTED` or `COMPLETED`.
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(rides -> accounts (rider_id));
diesel::allow_tables_to_appear_in_same_query!(accounts, rides);
