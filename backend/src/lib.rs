//! Rideshare backend library.
//!
//! Token-authenticated accounts and a ride lifecycle laid out as a hexagon:
//! [`domain`] holds entities, services and ports; [`inbound`] adapts HTTP to
//! the driving ports; [`outbound`] implements the driven ports over
//! PostgreSQL, process memory and Argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
