//! Builders wiring repositories and services into [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use rideshare::domain::ports::{
    AccountCommand, AccountRepository, RideCommand, RideQuery, RideRepository,
};
use rideshare::domain::{AccountService, CredentialCodec, RideService};
use rideshare::inbound::http::state::HttpState;
use rideshare::outbound::persistence::{
    DieselAccountRepository, DieselRideRepository, InMemoryAccountRepository,
    InMemoryRideRepository,
};
use rideshare::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

fn build_services<A, R>(
    accounts: Arc<A>,
    rides: Arc<R>,
    codec: Arc<CredentialCodec>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    A: AccountRepository + 'static,
    R: RideRepository + 'static,
{
    let account_service: Arc<dyn AccountCommand> = Arc::new(AccountService::new(
        Arc::clone(&accounts),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::clone(&codec),
        Arc::clone(&clock),
    ));
    let ride_service = Arc::new(RideService::new(accounts, rides, codec, clock));
    let ride_command: Arc<dyn RideCommand> = ride_service.clone();
    let ride_query: Arc<dyn RideQuery> = ride_service;

    HttpState::new(account_service, ride_command, ride_query)
}

/// Build HTTP state over Diesel repositories when a pool is configured, or
/// over process-local stores otherwise.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let codec = Arc::new(CredentialCodec::new(&config.token_settings));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    match &config.db_pool {
        Some(pool) => build_services(
            Arc::new(DieselAccountRepository::new(pool.clone())),
            Arc::new(DieselRideRepository::new(pool.clone())),
            codec,
            clock,
        ),
        None => build_services(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(InMemoryRideRepository::new()),
            codec,
            clock,
        ),
    }
}
