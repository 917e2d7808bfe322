//! Behaviour tests for account and ride endpoints.
//!
//! Scenarios drive the assembled application over process-local stores, so
//! they exercise routing, error mapping, identity resolution and the ride
//! state machine together.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Only `build_app` is needed; bootstrap helpers stay unused here.
#[allow(dead_code)]
#[path = "../src/server/mod.rs"]
mod server;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use argon2::Params;
use chrono::{Duration, Utc};
use mockable::{Clock, DefaultClock};
use rideshare::domain::ports::{AccountCommand, AccountRepository, RideCommand, RideQuery};
use rideshare::domain::{AccountService, CredentialCodec, RideService, TokenSettings, Username};
use rideshare::inbound::http::health::HealthState;
use rideshare::inbound::http::state::HttpState;
use rideshare::outbound::persistence::{InMemoryAccountRepository, InMemoryRideRepository};
use rideshare::outbound::security::Argon2PasswordHasher;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

struct RideshareWorld {
    runtime: tokio::runtime::Runtime,
    health: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    accounts: Arc<InMemoryAccountRepository>,
    codec: CredentialCodec,
    tokens: RefCell<HashMap<String, String>>,
    current_ride: RefCell<Option<String>>,
    last_status: RefCell<Option<u16>>,
    last_body: RefCell<Option<Value>>,
}

impl RideshareWorld {
    fn new() -> Self {
        let settings = TokenSettings::new(vec![b'k'; 32], Duration::hours(1)).expect("settings");
        let codec = Arc::new(CredentialCodec::new(&settings));
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let hasher = Argon2PasswordHasher::with_params(
            Params::new(Params::MIN_M_COST, 1, 1, None).expect("argon2 params"),
        );

        let account_service: Arc<dyn AccountCommand> = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            Arc::new(hasher),
            Arc::clone(&codec),
            Arc::clone(&clock),
        ));
        let ride_service = Arc::new(RideService::new(
            Arc::clone(&accounts),
            Arc::new(InMemoryRideRepository::new()),
            codec,
            clock,
        ));
        let rides: Arc<dyn RideCommand> = ride_service.clone();
        let rides_query: Arc<dyn RideQuery> = ride_service;

        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime"),
            health: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(account_service, rides, rides_query)),
            accounts,
            codec: CredentialCodec::new(&settings),
            tokens: RefCell::new(HashMap::new()),
            current_ride: RefCell::new(None),
            last_status: RefCell::new(None),
            last_body: RefCell::new(None),
        }
    }

    fn send(&self, request: TestRequest) {
        let health = self.health.clone();
        let http_state = self.http_state.clone();
        let (status, body) = self.runtime.block_on(async move {
            let app = test::init_service(server::build_app(health, http_state)).await;
            let response = test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let bytes = test::read_body(response).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON response body")
            };
            (status, body)
        });
        *self.last_status.borrow_mut() = Some(status);
        *self.last_body.borrow_mut() = Some(body);
    }

    fn send_as(&self, name: &str, request: TestRequest) {
        let token = self
            .tokens
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} has not logged in"));
        self.send(request.insert_header((header::AUTHORIZATION, format!("Bearer {token}"))));
    }

    fn register(&self, name: &str, role: &str, password: &str) {
        self.send(
            TestRequest::post()
                .uri("/api/auth/register")
                .set_json(serde_json::json!({
                    "username": name,
                    "password": password,
                    "role": role,
                })),
        );
    }

    fn login(&self, name: &str, password: &str) {
        self.send(
            TestRequest::post()
                .uri("/api/auth/login")
                .set_json(serde_json::json!({"username": name, "password": password})),
        );
        if let Some(token) = self.body()["token"].as_str() {
            self.tokens
                .borrow_mut()
                .insert(name.to_owned(), token.to_owned());
        }
    }

    fn status(&self) -> u16 {
        self.last_status.borrow().expect("a response was recorded")
    }

    fn body(&self) -> Value {
        self.last_body
            .borrow()
            .clone()
            .expect("a response was recorded")
    }

    fn ride_path(&self, template: &str) -> String {
        let ride_id = self
            .current_ride
            .borrow()
            .clone()
            .expect("a ride was requested");
        template.replace("{id}", &ride_id)
    }
}

#[fixture]
fn world() -> RideshareWorld {
    RideshareWorld::new()
}

#[given("a running rideshare service")]
fn a_running_rideshare_service(world: &RideshareWorld) {
    world.health.mark_ready();
}

#[given("\"{name}\" is registered as a {role} with password \"{password}\"")]
fn is_registered(world: &RideshareWorld, name: String, role: String, password: String) {
    world.register(&name, &role, &password);
    assert_eq!(world.status(), 200, "registration of {name} should succeed");
    world.login(&name, &password);
    assert_eq!(world.status(), 200, "login of {name} should succeed");
}

#[when("\"{name}\" registers as a {role} with password \"{password}\"")]
fn registers(world: &RideshareWorld, name: String, role: String, password: String) {
    world.register(&name, &role, &password);
}

#[when("\"{name}\" logs in with password \"{password}\"")]
fn logs_in(world: &RideshareWorld, name: String, password: String) {
    world.login(&name, &password);
}

#[when("\"{name}\" requests a ride from \"{pickup}\" to \"{dropoff}\"")]
fn requests_a_ride(world: &RideshareWorld, name: String, pickup: String, dropoff: String) {
    world.send_as(
        &name,
        TestRequest::post()
            .uri("/api/v1/rides")
            .set_json(serde_json::json!({"pickupLocation": pickup, "dropLocation": dropoff})),
    );
    if let Some(id) = world.body()["id"].as_str() {
        *world.current_ride.borrow_mut() = Some(id.to_owned());
    }
}

#[when("\"{name}\" accepts the ride")]
fn accepts_the_ride(world: &RideshareWorld, name: String) {
    let uri = world.ride_path("/api/v1/driver/rides/{id}/accept");
    world.send_as(&name, TestRequest::post().uri(&uri));
}

#[when("\"{name}\" completes the ride")]
fn completes_the_ride(world: &RideshareWorld, name: String) {
    let uri = world.ride_path("/api/v1/rides/{id}/complete");
    world.send_as(&name, TestRequest::post().uri(&uri));
}

#[when("\"{name}\" lists pending rides")]
fn lists_pending_rides(world: &RideshareWorld, name: String) {
    world.send_as(&name, TestRequest::get().uri("/api/v1/driver/rides/requests"));
}

#[when("an anonymous client lists pending rides")]
fn an_anonymous_client_lists_pending_rides(world: &RideshareWorld) {
    world.send(TestRequest::get().uri("/api/v1/driver/rides/requests"));
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &RideshareWorld, status: u16) {
    assert_eq!(world.status(), status, "body: {}", world.body());
}

#[then("the error code is \"{code}\"")]
fn the_error_code_is(world: &RideshareWorld, code: String) {
    assert_eq!(world.body()["code"].as_str(), Some(code.as_str()));
}

#[then("the issued credential names \"{name}\" with role {role}")]
fn the_issued_credential_names(world: &RideshareWorld, name: String, role: String) {
    let body = world.body();
    let token = body["token"].as_str().expect("token in login response");
    let verified = world
        .codec
        .verify(token, Utc::now())
        .expect("credential verifies");
    assert_eq!(verified.subject, Username::new(&name).expect("username"));
    assert_eq!(verified.role.as_str(), role);
}

#[then("the ride status is {status}")]
fn the_ride_status_is(world: &RideshareWorld, status: String) {
    assert_eq!(world.body()["status"].as_str(), Some(status.as_str()));
}

#[then("the ride has no driver")]
fn the_ride_has_no_driver(world: &RideshareWorld) {
    assert!(world.body()["driverId"].is_null());
}

#[then("the ride driver is \"{name}\"")]
fn the_ride_driver_is(world: &RideshareWorld, name: String) {
    let username = Username::new(&name).expect("username");
    let driver = world
        .runtime
        .block_on(world.accounts.find_by_username(&username))
        .expect("account lookup")
        .expect("driver account exists");
    assert_eq!(
        world.body()["driverId"].as_str(),
        Some(driver.id().to_string().as_str())
    );
}

#[then("{count} rides are listed")]
fn rides_are_listed(world: &RideshareWorld, count: usize) {
    assert_eq!(world.body().as_array().map(Vec::len), Some(count));
}

#[then("every listed ride is {status}")]
fn every_listed_ride_is(world: &RideshareWorld, status: String) {
    let body = world.body();
    let rides = body.as_array().expect("ride list");
    assert!(
        rides
            .iter()
            .all(|ride| ride["status"].as_str() == Some(status.as_str())),
        "unexpected rides: {body}"
    );
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Registering a taken username is rejected"
)]
fn registering_a_taken_username_is_rejected(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Login rejects a wrong password and issues a credential for the right one"
)]
fn login_rejects_a_wrong_password(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Unknown usernames fail like wrong passwords"
)]
fn unknown_usernames_fail_like_wrong_passwords(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Registration rejects an unknown role"
)]
fn registration_rejects_an_unknown_role(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ride_lifecycle.feature",
    name = "A second driver cannot accept an accepted ride"
)]
fn a_second_driver_cannot_accept_an_accepted_ride(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ride_lifecycle.feature",
    name = "Completing a ride requires it to be accepted"
)]
fn completing_a_ride_requires_it_to_be_accepted(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ride_lifecycle.feature",
    name = "Drivers only see requested rides"
)]
fn drivers_only_see_requested_rides(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ride_lifecycle.feature",
    name = "Riders cannot accept rides"
)]
fn riders_cannot_accept_rides(world: RideshareWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ride_lifecycle.feature",
    name = "Ride endpoints require a bearer credential"
)]
fn ride_endpoints_require_a_bearer_credential(world: RideshareWorld) {
    drop(world);
}
