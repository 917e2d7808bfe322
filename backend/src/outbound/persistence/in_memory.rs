//! Process-local repositories backed by `Mutex`-guarded maps.
//!
//! Used when no database URL is configured and by the HTTP integration tests.
//! Each mutation holds the lock for its whole read-check-write sequence, so the
//! conditional ride update is atomic in the same way as the SQL adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, RideRepository, RideRepositoryError,
};
use crate::domain::{Account, AccountId, Ride, RideId, RideStatus, Username};

fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    query: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex
        .lock()
        .map_err(|_| query("in-memory store lock poisoned"))
}

/// Accounts keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let accounts = lock(&self.accounts, AccountRepositoryError::query)?;
        Ok(accounts.get(username.as_ref()).cloned())
    }

    async fn save(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut accounts = lock(&self.accounts, AccountRepositoryError::query)?;
        let key = account.username().as_ref();
        if accounts.contains_key(key) {
            return Err(AccountRepositoryError::duplicate_username(key));
        }
        accounts.insert(key.to_owned(), account.clone());
        Ok(())
    }
}

/// Rides keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryRideRepository {
    rides: Mutex<HashMap<RideId, Ride>>,
}

impl InMemoryRideRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted(
        &self,
        keep: impl Fn(&Ride) -> bool,
    ) -> Result<Vec<Ride>, RideRepositoryError> {
        let rides = lock(&self.rides, RideRepositoryError::query)?;
        let mut matching: Vec<Ride> = rides.values().filter(|ride| keep(ride)).cloned().collect();
        matching.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(matching)
    }
}

#[async_trait]
impl RideRepository for InMemoryRideRepository {
    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError> {
        let rides = lock(&self.rides, RideRepositoryError::query)?;
        Ok(rides.get(id).cloned())
    }

    async fn find_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, RideRepositoryError> {
        self.collect_sorted(|ride| ride.status() == status)
    }

    async fn find_by_rider_id(
        &self,
        rider_id: &AccountId,
    ) -> Result<Vec<Ride>, RideRepositoryError> {
        self.collect_sorted(|ride| ride.rider_id() == *rider_id)
    }

    async fn save(
        &self,
        ride: &Ride,
        expected_status: Option<RideStatus>,
    ) -> Result<(), RideRepositoryError> {
        let mut rides = lock(&self.rides, RideRepositoryError::query)?;
        match expected_status {
            None => {
                if rides.contains_key(&ride.id()) {
                    return Err(RideRepositoryError::query("ride id already stored"));
                }
            }
            Some(expected) => {
                let stored = rides
                    .get(&ride.id())
                    .ok_or_else(|| RideRepositoryError::missing(ride.id()))?;
                if stored.status() != expected {
                    return Err(RideRepositoryError::status_mismatch(
                        expected,
                        stored.status(),
                    ));
                }
            }
        }
        rides.insert(ride.id(), ride.clone());
        Ok(())
    }
}
