pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::not_blank;

pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use service::{AuthService, AuthenticatedUser, INVALID_CREDENTIALS};
pub use token::{generate_token, verify_token, Claims, TokenKeys};

/// Username/password pair accepted by both `/register` and `/login`.
///
/// Only registration validates it; login leaves every credential check to
/// `AuthService::login` so all failures look alike.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(custom = "not_blank", length(max = 64, message = "must be at most 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body returned by a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
