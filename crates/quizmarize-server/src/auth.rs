//! Bearer token authentication.

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::session::SessionError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quizmarize_core::User;
use quizmarize_db::DbError;
use tracing::debug;

/// The active user a request was made by.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Token from an `Authorization` value, with or without the `Bearer ` prefix.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.sessions.validate_token(token).map_err(|e| {
            debug!("Rejected token: {}", e);
            match e {
                SessionError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
                _ => ApiError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        let user_id = claims.sub;
        let user = match state.pipeline.run_db(move |db| db.get_user(&user_id)).await {
            Ok(user) => user,
            Err(DbError::NotFound(_)) => return Err(ApiError::Unauthorized("Unknown user".to_string())),
            Err(e) => return Err(e.into()),
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Inactive user".to_string()));
        }

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }
}
