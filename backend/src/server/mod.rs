//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};
#[cfg(feature = "metrics")]
pub(crate) use metrics::make_metrics;
pub(crate) use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use rideshare::Trace;
#[cfg(debug_assertions)]
use rideshare::doc::ApiDoc;
use rideshare::inbound::http::auth::{login, register};
use rideshare::inbound::http::health::{HealthState, live, ready};
use rideshare::inbound::http::rides::{
    accept_ride, complete_ride, list_own_rides, list_pending_rides, request_ride,
};
use rideshare::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Assemble the application: auth under `/api`, rides under `/api/v1`,
/// probes at the root.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let rides = web::scope("/api/v1")
        .service(request_ride)
        .service(list_pending_rides)
        .service(accept_ride)
        .service(complete_ride)
        .service(list_own_rides);

    // Must be registered before `/api`: scopes match by prefix and never fall through.
    let api = web::scope("/api").service(register).service(login);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(rides)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let server_health_state = health_state.clone();

    #[cfg(feature = "metrics")]
    let prometheus = match config.prometheus {
        Some(prometheus) => prometheus,
        None => make_metrics()?,
    };

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
