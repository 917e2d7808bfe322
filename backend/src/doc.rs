//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the auth, ride and health endpoints, the schema
//! wrappers from [`crate::inbound::http::schemas`], and the bearer security
//! scheme. The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::inbound::http::rides::RideRequestBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RideSchema, RideStatusSchema};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer credential scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description = Some("Credential issued by POST /api/auth/login.".to_owned());
        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rideshare API",
        description = "Token-authenticated ride requests, acceptance and completion."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::rides::request_ride,
        crate::inbound::http::rides::list_pending_rides,
        crate::inbound::http::rides::accept_ride,
        crate::inbound::http::rides::complete_ride,
        crate::inbound::http::rides::list_own_rides,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RideSchema,
        RideStatusSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        RideRequestBody
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "rides", description = "Ride lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
