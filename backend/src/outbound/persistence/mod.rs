//! Persistence adapters for the account and ride ports.
//!
//! Two families live here:
//!
//! - **Diesel**: PostgreSQL repositories using `diesel-async` over a `bb8`
//!   pool. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - **In-memory**: `Mutex`-guarded maps with the same semantics, used when no
//!   database is configured and in tests.
//!
//! # Example
//!
//! ```ignore
//! use rideshare::outbound::persistence::{DbPool, DieselRideRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rides")).await?;
//! let rides = DieselRideRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_error_mapping;
mod diesel_ride_repository;
mod in_memory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_ride_repository::DieselRideRepository;
pub use in_memory::{InMemoryAccountRepository, InMemoryRideRepository};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
