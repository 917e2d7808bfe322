//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`. The wrappers here mirror their wire
//! shape and register under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No usable bearer credential accompanied the request.
    #[schema(rename = "unauthenticated")]
    Unauthenticated,
    /// Unknown username or wrong password.
    #[schema(rename = "invalid_credentials")]
    InvalidCredentials,
    /// The caller's role does not permit the operation.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The ride or account does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The ride is not in the required status.
    #[schema(rename = "invalid_state")]
    InvalidState,
    /// The username is already registered.
    #[schema(rename = "username_taken")]
    UsernameTaken,
    /// A backing store is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_state")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Ride is not in REQUESTED status")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::RideStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RideStatus)]
pub enum RideStatusSchema {
    /// Waiting for a driver.
    #[schema(rename = "REQUESTED")]
    Requested,
    /// A driver accepted the ride.
    #[schema(rename = "ACCEPTED")]
    Accepted,
    /// The ride is finished.
    #[schema(rename = "COMPLETED")]
    Completed,
}

/// OpenAPI schema for the ride JSON shape.
#[derive(ToSchema)]
#[schema(as = crate::domain::Ride, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RideSchema {
    /// Ride identifier.
    #[schema(format = "uuid")]
    id: String,
    /// Rider who requested the ride.
    #[schema(format = "uuid")]
    user_id: String,
    /// Driver bound on acceptance; null while `REQUESTED`.
    #[schema(format = "uuid")]
    driver_id: Option<String>,
    #[schema(example = "12 Harbour Street")]
    pickup_location: String,
    #[schema(example = "Central Station")]
    drop_location: String,
    status: RideStatusSchema,
    #[schema(format = "date-time")]
    created_at: String,
}
