use crate::{
    auth::{Credentials, MessageResponse, TokenResponse},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{"message": "User registered successfully"}`.
/// - `400 Bad Request`: malformed JSON, blank username or password, or the
///   username is already taken.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user_id = state
        .auth
        .register(&payload.username, &payload.password)
        .await?;
    log::info!("User {} registered", user_id);

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{"token": "<jwt>"}`.
/// - `400 Bad Request`: malformed JSON or missing fields.
/// - `401 Unauthorized`: unknown username, wrong password, or blank fields
///   (same message for all of them).
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let token = state.auth.login(&payload.username, &payload.password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
