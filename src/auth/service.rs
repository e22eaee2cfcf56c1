use std::sync::Arc;

use chrono::Utc;

use super::password::{hash_password, verify_password};
use super::token::{generate_token, verify_token, TokenKeys};
use crate::error::AppError;
use crate::store::UserStore;

/// Shared message for every failed login, whatever the reason.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// The identity carried by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
}

/// Registration, login and token verification on top of a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            users,
            keys,
            bcrypt_cost,
        }
    }

    /// Creates an account and returns its id. Only the bcrypt hash of the
    /// password is stored.
    pub async fn register(&self, username: &str, password: &str) -> Result<i32, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("Username and password required".into()));
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;
        self.users.create_user(username, &password_hash).await
    }

    /// Exchanges valid credentials for a signed session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.users.find_by_username(username.trim()).await? {
            Some(user) => user,
            None => {
                log::debug!("Login rejected: unknown username");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
        };

        if !verify_password(password, &user.password_hash)? {
            log::debug!("Login rejected: password mismatch for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        generate_token(&self.keys, user.id, &user.username, Utc::now())
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = verify_token(token, &self.keys, Utc::now())?;
        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            username: claims.username,
        })
    }
}
