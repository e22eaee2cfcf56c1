use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Signing material and token lifetime, built once from configuration.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Issues an HS256 token for the user, expiring `keys.ttl()` after `now`.
pub fn generate_token(
    keys: &TokenKeys,
    user_id: i32,
    username: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let claims = Claims {
        user_id,
        username: username.to_string(),
        exp: (now + keys.ttl()).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Checks signature, shape and expiry of `token` as seen at `now`.
///
/// This function has no side effects and does not read the system clock, so
/// callers decide what "now" is.
pub fn verify_token(token: &str, keys: &TokenKeys, now: DateTime<Utc>) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // expiry is compared against `now` below
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &keys.decoding, &validation)?.claims;

    if now.timestamp() >= claims.exp {
        return Err(AppError::Unauthorized("Invalid token: ExpiredSignature".into()));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(secret, Duration::hours(24))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let keys = keys("test_secret_for_gen_verify");
        let token = generate_token(&keys, 1, "alice", t0()).unwrap();
        let claims = verify_token(&token, &keys, t0() + Duration::hours(23)).unwrap();

        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp, (t0() + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_expiry_follows_configured_ttl() {
        let keys = TokenKeys::new("short_lived", Duration::minutes(30));
        assert_eq!(keys.ttl(), Duration::minutes(30));

        let token = generate_token(&keys, 9, "frank", t0()).unwrap();
        assert!(verify_token(&token, &keys, t0() + Duration::minutes(29)).is_ok());
        assert!(verify_token(&token, &keys, t0() + Duration::minutes(30)).is_err());
    }

    #[test]
    fn test_token_expiration() {
        let keys = keys("test_secret_for_expiration");
        let token = generate_token(&keys, 2, "bob", t0()).unwrap();

        for later in [Duration::hours(24), Duration::hours(24) + Duration::seconds(1)] {
            match verify_token(&token, &keys, t0() + later) {
                Err(AppError::Unauthorized(msg)) => assert!(msg.contains("ExpiredSignature")),
                other => panic!("Token should have expired, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = generate_token(&keys("signing_secret"), 3, "carol", t0()).unwrap();

        match verify_token(&token, &keys("a_completely_different_secret"), t0()) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("InvalidSignature")),
            other => panic!("Token should be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            verify_token("not-a-jwt", &keys("secret"), t0()),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            verify_token("", &keys("secret"), t0()),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let keys = keys("secret");
        let token = generate_token(&keys, 4, "dave", t0()).unwrap();
        let forged = generate_token(&TokenKeys::new("secret", Duration::hours(48)), 5, "eve", t0())
            .unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];

        assert!(verify_token(&parts.join("."), &keys, t0()).is_err());
    }
}
