//! Ride lifecycle HTTP handlers.
//!
//! ```text
//! POST /api/v1/rides                         rider requests a ride
//! GET  /api/v1/driver/rides/requests         driver lists pending rides
//! POST /api/v1/driver/rides/{id}/accept      driver accepts a ride
//! POST /api/v1/rides/{id}/complete           any caller completes a ride
//! GET  /api/v1/user/rides                    rider lists own rides
//! ```
//!
//! Handlers forward the raw `Authorization` header; identity and role checks
//! happen in the ride service.

use actix_web::http::header;
use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{RidePayload, RideRequest};
use crate::domain::{Error, Location, RideId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RideSchema};
use crate::inbound::http::state::HttpState;

/// Request body for a new ride.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RideRequestBody {
    #[schema(example = "12 Harbour Street")]
    pub pickup_location: String,
    #[schema(example = "Central Station")]
    pub drop_location: String,
}

fn authorization(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

fn parse_ride_id(raw: &str) -> Result<RideId, Error> {
    raw.parse()
        .map_err(|_| Error::not_found("Ride not found"))
}

fn parse_location(raw: &str, field: &'static str) -> Result<Location, Error> {
    Location::new(raw).map_err(|err| {
        Error::invalid_request(format!("{field}: {err}")).with_details(json!({
            "field": field,
            "code": "invalid_field",
        }))
    })
}

/// Open a ride for the calling rider.
#[utoipa::path(
    post,
    path = "/api/v1/rides",
    request_body = RideRequestBody,
    responses(
        (status = 200, description = "Ride requested", body = RideSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing or invalid credential", body = ErrorSchema),
        (status = 403, description = "Caller is not a rider", body = ErrorSchema),
        (status = 404, description = "Caller account no longer exists", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "requestRide",
    security(("BearerAuth" = []))
)]
#[post("/rides")]
pub async fn request_ride(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<RideRequestBody>,
) -> ApiResult<web::Json<RidePayload>> {
    let body = payload.into_inner();
    let request = RideRequest {
        pickup: parse_location(&body.pickup_location, "pickupLocation")?,
        dropoff: parse_location(&body.drop_location, "dropLocation")?,
    };

    let ride = state.rides.request_ride(authorization(&req), request).await?;
    Ok(web::Json(ride))
}

/// List every ride waiting for a driver.
#[utoipa::path(
    get,
    path = "/api/v1/driver/rides/requests",
    responses(
        (status = 200, description = "Pending rides, oldest first", body = [RideSchema]),
        (status = 401, description = "Missing or invalid credential", body = ErrorSchema),
        (status = 403, description = "Caller is not a driver", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "listPendingRides",
    security(("BearerAuth" = []))
)]
#[get("/driver/rides/requests")]
pub async fn list_pending_rides(
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RidePayload>>> {
    let rides = state
        .rides_query
        .list_pending_for_driver(authorization(&req))
        .await?;
    Ok(web::Json(rides))
}

/// Bind the calling driver to a requested ride.
#[utoipa::path(
    post,
    path = "/api/v1/driver/rides/{id}/accept",
    params(("id" = String, Path, description = "Ride identifier", format = "uuid")),
    responses(
        (status = 200, description = "Ride accepted", body = RideSchema),
        (status = 401, description = "Missing or invalid credential", body = ErrorSchema),
        (status = 403, description = "Caller is not a driver", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 409, description = "Ride is not REQUESTED", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "acceptRide",
    security(("BearerAuth" = []))
)]
#[post("/driver/rides/{id}/accept")]
pub async fn accept_ride(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RidePayload>> {
    let ride_id = parse_ride_id(&path)?;
    let ride = state.rides.accept_ride(authorization(&req), ride_id).await?;
    Ok(web::Json(ride))
}

/// Complete an accepted ride.
///
/// Any authenticated account may complete any accepted ride.
#[utoipa::path(
    post,
    path = "/api/v1/rides/{id}/complete",
    params(("id" = String, Path, description = "Ride identifier", format = "uuid")),
    responses(
        (status = 200, description = "Ride completed", body = RideSchema),
        (status = 401, description = "Missing or invalid credential", body = ErrorSchema),
        (status = 404, description = "Ride not found", body = ErrorSchema),
        (status = 409, description = "Ride is not ACCEPTED", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "completeRide",
    security(("BearerAuth" = []))
)]
#[post("/rides/{id}/complete")]
pub async fn complete_ride(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RidePayload>> {
    let ride_id = parse_ride_id(&path)?;
    let ride = state
        .rides
        .complete_ride(authorization(&req), ride_id)
        .await?;
    Ok(web::Json(ride))
}

/// List the calling rider's rides in any status.
#[utoipa::path(
    get,
    path = "/api/v1/user/rides",
    responses(
        (status = 200, description = "Caller's rides, oldest first", body = [RideSchema]),
        (status = 401, description = "Missing or invalid credential", body = ErrorSchema),
        (status = 403, description = "Caller is not a rider", body = ErrorSchema)
    ),
    tags = ["rides"],
    operation_id = "listOwnRides",
    security(("BearerAuth" = []))
)]
#[get("/user/rides")]
pub async fn list_own_rides(
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RidePayload>>> {
    let rides = state.rides_query.list_own_rides(authorization(&req)).await?;
    Ok(web::Json(rides))
}

#[cfg(test)]
#[path = "rides_tests.rs"]
mod tests;
