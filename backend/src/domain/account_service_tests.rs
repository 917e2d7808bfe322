//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, MockAccountRepository, MockPasswordHasher,
};
use crate::domain::{ErrorCode, PasswordDigest, Role, TokenSettings, Username};
use crate::outbound::persistence::InMemoryAccountRepository;

const DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0)
        .single()
        .expect("instant")
}

#[fixture]
fn codec() -> Arc<CredentialCodec> {
    let settings =
        TokenSettings::new(b"account-service-secret".to_vec(), Duration::minutes(30)).expect("settings");
    Arc::new(CredentialCodec::new(&settings))
}

fn clock_at(now: DateTime<Utc>) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

fn stored_account(name: &str, role: Role) -> Account {
    Account::new(
        AccountId::random(),
        Username::new(name).expect("username"),
        PasswordDigest::new(DIGEST).expect("digest"),
        role,
    )
}

fn service(
    accounts: MockAccountRepository,
    hasher: MockPasswordHasher,
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) -> AccountService<MockAccountRepository, MockPasswordHasher> {
    AccountService::new(Arc::new(accounts), Arc::new(hasher), codec, clock_at(now))
}

fn registration(name: &str, password: &str, role: &str) -> Registration {
    Registration::try_from_parts(name, password, role).expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn register_hashes_and_saves_new_account(codec: Arc<CredentialCodec>, now: DateTime<Utc>) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    accounts
        .expect_save()
        .withf(|account| {
            account.username().as_ref() == "alice"
                && account.role() == Role::Rider
                && account.password_digest().as_str() == DIGEST
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|plain| plain == "pw1")
        .times(1)
        .return_once(|_| Ok(PasswordDigest::new(DIGEST).expect("digest")));

    service(accounts, hasher, codec, now)
        .register(registration("alice", "pw1", "RIDER"))
        .await
        .expect("registration succeeds");
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_username_without_writing(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(Some(stored_account("alice", Role::Rider))));
    accounts.expect_save().times(0);
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().times(0);

    let err = service(accounts, hasher, codec, now)
        .register(registration("alice", "pw2", "RIDER"))
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::UsernameTaken);
    assert_eq!(err.message(), "Username already taken");
}

#[rstest]
#[tokio::test]
async fn register_reports_lost_race_as_username_taken(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    accounts
        .expect_save()
        .times(1)
        .return_once(|_| Err(AccountRepositoryError::duplicate_username("alice")));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordDigest::new(DIGEST).expect("digest")));

    let err = service(accounts, hasher, codec, now)
        .register(registration("alice", "pw1", "DRIVER"))
        .await
        .expect_err("lost race");

    assert_eq!(err.code(), ErrorCode::UsernameTaken);
}

#[rstest]
#[tokio::test]
async fn login_issues_credential_carrying_account_role(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(Some(stored_account("bob", Role::Driver))));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_matches().times(1).return_once(|_, _| Ok(true));

    let issued = service(accounts, hasher, Arc::clone(&codec), now)
        .login(LoginCredentials::try_from_parts("bob", "pw").expect("credentials"))
        .await
        .expect("login succeeds");

    assert_eq!(issued.issued_at(), now);
    assert_eq!(issued.expires_at(), now + Duration::minutes(30));
    let verified = codec.verify(issued.token(), now).expect("token verifies");
    assert_eq!(verified.subject.as_ref(), "bob");
    assert_eq!(verified.role, Role::Driver);
}

#[rstest]
#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let mut unknown_accounts = MockAccountRepository::new();
    unknown_accounts
        .expect_find_by_username()
        .return_once(|_| Ok(None));
    let mut unused_hasher = MockPasswordHasher::new();
    unused_hasher.expect_matches().times(0);
    let unknown = service(unknown_accounts, unused_hasher, Arc::clone(&codec), now)
        .login(LoginCredentials::try_from_parts("nobody", "pw").expect("credentials"))
        .await
        .expect_err("unknown user");

    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_account("alice", Role::Rider))));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_matches().times(1).return_once(|_, _| Ok(false));
    let wrong = service(accounts, hasher, codec, now)
        .login(LoginCredentials::try_from_parts("alice", "wrong").expect("credentials"))
        .await
        .expect_err("wrong password");

    assert_eq!(unknown.code(), ErrorCode::InvalidCredentials);
    assert_eq!(unknown.code(), wrong.code());
    assert_eq!(unknown.message(), wrong.message());
}

#[rstest]
#[tokio::test]
async fn login_maps_store_outage_to_service_unavailable(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .return_once(|_| Err(AccountRepositoryError::connection("refused")));

    let err = service(accounts, MockPasswordHasher::new(), codec, now)
        .login(LoginCredentials::try_from_parts("alice", "pw").expect("credentials"))
        .await
        .expect_err("outage");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn malformed_stored_digest_is_internal(codec: Arc<CredentialCodec>, now: DateTime<Utc>) {
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_account("alice", Role::Rider))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_matches()
        .return_once(|_, _| Err(PasswordHashError::malformed_digest("bad phc")));

    let err = service(accounts, hasher, codec, now)
        .login(LoginCredentials::try_from_parts("alice", "pw").expect("credentials"))
        .await
        .expect_err("corrupt digest");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn usernames_differing_in_whitespace_are_distinct_accounts(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(2)
        .returning(|_| Ok(PasswordDigest::new(DIGEST).expect("digest")));
    let service = AccountService::new(
        Arc::clone(&accounts),
        Arc::new(hasher),
        codec,
        clock_at(now),
    );

    service
        .register(registration("alice", "pw1", "RIDER"))
        .await
        .expect("first registration");
    service
        .register(registration("alice ", "pw2", "DRIVER"))
        .await
        .expect("trailing space names a different account");

    let padded = accounts
        .find_by_username(&Username::new("alice ").expect("username"))
        .await
        .expect("lookup")
        .expect("padded account stored");
    assert_eq!(padded.username().as_ref(), "alice ");
    assert_eq!(padded.role(), Role::Driver);
}

#[rstest]
#[tokio::test]
async fn password_hashing_runs_off_the_calling_thread(
    codec: Arc<CredentialCodec>,
    now: DateTime<Utc>,
) {
    let caller = std::thread::current().id();
    let mut accounts = MockAccountRepository::new();
    accounts
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_account("alice", Role::Rider))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_matches()
        .times(1)
        .returning(move |_, _| Ok(std::thread::current().id() != caller));

    service(accounts, hasher, codec, now)
        .login(LoginCredentials::try_from_parts("alice", "pw1").expect("credentials"))
        .await
        .expect("hasher ran on a blocking thread");
}
