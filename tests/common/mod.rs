#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::{json, Value};

use taskvault::auth::{AuthService, TokenKeys};
use taskvault::routes::{self, health};
use taskvault::store::{MemoryTaskStore, MemoryUserStore};
use taskvault::{AppState, API_PREFIX};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Minimum bcrypt cost, to keep the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn memory_state() -> AppState {
    let auth = AuthService::new(
        Arc::new(MemoryUserStore::new()),
        TokenKeys::new(TEST_SECRET, Duration::hours(24)),
        TEST_BCRYPT_COST,
    );
    AppState::new(auth, Arc::new(MemoryTaskStore::new()))
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(health::health)
            .service(web::scope(API_PREFIX).configure(routes::config)),
    )
    .await
}

pub fn api(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Registers and logs in `username`, returning the session token.
pub async fn register_and_login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let credentials = json!({ "username": username, "password": password });

    let req = test::TestRequest::post()
        .uri(&api("/register"))
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", username);

    let req = test::TestRequest::post()
        .uri(&api("/login"))
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", username);

    let body: Value = test::read_body_json(resp).await;
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}
