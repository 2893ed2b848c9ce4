//! Access token verification.
//!
//! Postboard does not log users in itself; tokens come from the identity
//! provider sharing the HS256 secret. [`JwtService::generate_access_token`]
//! exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::Claims, config::JwtSettings};

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// Lifetime of minted tokens, in seconds. Negative values mint expired tokens.
    pub access_token_ttl_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_ttl_secs: 900,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_ttl_secs: i64::try_from(settings.access_token_expiry_secs)
                .unwrap_or(i64::MAX),
        }
    }
}

/// Token errors.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Bad signature, malformed token or wrong algorithm.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,
}

/// Verifies bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl", &self.ttl)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Derives both keys from the shared secret.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            ttl: Duration::seconds(config.access_token_ttl_secs),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mints a token for `user_id` valid for the configured lifetime.
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, Utc::now() + self.ttl);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Checks signature and expiry, returning the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl: i64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_ttl_secs: ttl,
        })
    }

    #[test]
    fn test_round_trips_subject() {
        let jwt = service("test-secret", 900);
        let user_id = Uuid::new_v4();

        let token = jwt.generate_access_token(user_id).unwrap();
        assert_eq!(jwt.validate_token(&token).unwrap().user_id(), user_id);
    }

    #[test]
    fn test_garbage_is_a_decoding_error() {
        let result = service("test-secret", 900).validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingError(_))));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway.
        let jwt = service("test-secret", -600);
        let token = jwt.generate_access_token(Uuid::new_v4()).unwrap();
        assert!(matches!(jwt.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = service("another-secret", 900)
            .generate_access_token(Uuid::new_v4())
            .unwrap();
        assert!(service("test-secret", 900).validate_token(&token).is_err());
    }

    #[test]
    fn test_config_from_settings() {
        let settings = JwtSettings {
            secret: "s".to_string(),
            access_token_expiry_secs: 120,
        };
        let config = JwtConfig::from(&settings);
        assert_eq!(config.secret, "s");
        assert_eq!(config.access_token_ttl_secs, 120);
    }
}
