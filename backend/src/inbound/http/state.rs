//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, RideCommand, RideQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub rides: Arc<dyn RideCommand>,
    pub rides_query: Arc<dyn RideQuery>,
}

impl HttpState {
    /// Bundle the account and ride ports.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        rides: Arc<dyn RideCommand>,
        rides_query: Arc<dyn RideQuery>,
    ) -> Self {
        Self {
            accounts,
            rides,
            rides_query,
        }
    }
}
