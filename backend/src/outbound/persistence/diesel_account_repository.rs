//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, PasswordDigest, Role, Username};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{AccountRow, NewAccountRow};
use super::pool::DbPool;
use super::schema::accounts;

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, username: &Username) -> AccountRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => AccountRepositoryError::connection(message),
        DieselFailure::UniqueViolation => {
            AccountRepositoryError::duplicate_username(username.as_ref())
        }
        DieselFailure::Query(message) => AccountRepositoryError::query(message),
    }
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let AccountRow {
        id,
        username,
        password_digest,
        role,
        created_at: _,
    } = row;

    let corrupt = |err: crate::domain::AccountValidationError| {
        AccountRepositoryError::query(format!("stored account {id} is invalid: {err}"))
    };
    Ok(Account::new(
        AccountId::from_uuid(id),
        Username::new(username).map_err(corrupt)?,
        PasswordDigest::new(password_digest).map_err(corrupt)?,
        role.parse::<Role>().map_err(corrupt)?,
    ))
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AccountRepositoryError::connection))?;

        let row = accounts::table
            .filter(accounts::username.eq(username.as_ref()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, username))?;

        row.map(row_to_account).transpose()
    }

    async fn save(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AccountRepositoryError::connection))?;

        let row = NewAccountRow {
            id: *account.id().as_uuid(),
            username: account.username().as_ref(),
            password_digest: account.password_digest().as_str(),
            role: account.role().as_str(),
        };

        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, account.username()))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and error mapping. Queries and the unique-username
    //! constraint are covered by `tests/diesel_repositories.rs`.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> AccountRow {
        AccountRow {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            password_digest: "$argon2id$v=19$digest".to_owned(),
            role: "DRIVER".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn converts_valid_rows(row: AccountRow) {
        let id = row.id;
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.id().as_uuid(), &id);
        assert_eq!(account.username().as_ref(), "alice");
        assert_eq!(account.role(), Role::Driver);
    }

    #[rstest]
    fn unknown_roles_are_query_errors(mut row: AccountRow) {
        row.role = "ADMIN".to_owned();
        let err = row_to_account(row).expect_err("bad role");
        assert!(matches!(err, AccountRepositoryError::Query { .. }));
        assert!(err.to_string().contains("ADMIN"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let username = Username::new("alice").expect("username");
        let err = map_diesel_error(diesel::result::Error::NotFound, &username);
        assert!(matches!(err, AccountRepositoryError::Query { .. }));
    }
}
