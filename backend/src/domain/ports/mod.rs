//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) are implemented by
//! outbound adapters. Driving ports ([`AccountCommand`], [`RideCommand`],
//! [`RideQuery`]) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod password_hasher;
mod ride_command;
mod ride_query;
mod ride_repository;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use ride_command::{RideCommand, RidePayload, RideRequest};
pub use ride_query::RideQuery;
#[cfg(test)]
pub use ride_repository::MockRideRepository;
pub use ride_repository::{RideRepository, RideRepositoryError};
