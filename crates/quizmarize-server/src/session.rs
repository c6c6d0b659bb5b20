//! Bearer tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use quizmarize_core::User;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session management error
#[derive(Debug, Error)]
pub enum SessionError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// Token expired
    #[error("Session token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid session token")]
    InvalidToken,
}

/// JWT claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,

    /// User email at issue time
    pub email: String,

    /// Expiration timestamp (Unix epoch)
    pub exp: i64,

    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
}

/// Issues and checks HS256 tokens
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl SessionManager {
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Generate a new token for the given user
    pub fn generate_token(&self, user: &User) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: now + self.token_expiry_secs as i64,
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a token and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let validation = Validation::default();
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })?;

        Ok(token_data.claims)
    }
}
