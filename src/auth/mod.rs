/*!
 * # Authentication Module
 *
 * Businesses authenticate with a username and password and receive an HS256
 * JWT. The token is stored in an HttpOnly `token` cookie; every protected
 * handler takes an [`AuthenticatedBusiness`], which validates the token and
 * yields the tenant id used to scope all queries.
 */

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::business;
use crate::errors::ServiceError;

mod cookie;
mod password;

pub use cookie::{clear_cookie, cookie_value, extract_token, session_cookie, TOKEN_COOKIE};
pub use password::{hash_password, verify_password};

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub business_id: i32,
    pub username: String,
    pub business_name: String,
    pub address: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub sub: String, // Subject (business id)
    pub jti: String, // JWT ID
    pub iat: i64,    // Issued at time
    pub nbf: i64,    // Not valid before time
    pub exp: i64,    // Expiration time
    pub iss: String, // Issuer
    pub aud: String, // Audience
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
    pub cookie_secure: bool,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        token_expiration: Duration,
        cookie_secure: bool,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            token_expiration,
            cookie_secure,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            cfg.cookie_secure,
        )
    }
}

/// A freshly signed session token. Only the cookie carries `token`.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
    pub claims: Claims,
}

/// Business details returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPayload {
    pub business_id: i32,
    pub username: String,
    pub business_name: String,
    pub address: Option<String>,
    pub creation_date: DateTime<Utc>,
}

impl From<&Claims> for TokenPayload {
    fn from(claims: &Claims) -> Self {
        Self {
            business_id: claims.business_id,
            username: claims.username.clone(),
            business_name: claims.business_name.clone(),
            address: claims.address.clone(),
            creation_date: claims.creation_date,
        }
    }
}

/// Issues and validates session tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signs a token describing `business`.
    pub fn issue_token(&self, business: &business::Model) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            business_id: business.business_id,
            username: business.username.clone(),
            business_name: business.business_name.clone(),
            address: business.address.clone(),
            creation_date: business.creation_date,
            sub: business.business_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        debug!(business_id = claims.business_id, jti = %claims.jti, "issued session token");

        Ok(IssuedToken {
            token,
            expires_in: self.config.token_expiration.as_secs(),
            claims,
        })
    }

    /// Validates signature, expiry, issuer and audience and returns the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if claims.sub != claims.business_id.to_string() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

/// The business a request is made on behalf of
#[derive(Debug, Clone)]
pub struct AuthenticatedBusiness {
    pub business_id: i32,
    pub username: String,
    pub business_name: String,
    pub token_id: String,
}

impl From<Claims> for AuthenticatedBusiness {
    fn from(claims: Claims) -> Self {
        Self {
            business_id: claims.business_id,
            username: claims.username,
            business_name: claims.business_name,
            token_id: claims.jti,
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedBusiness
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = Arc::<AuthService>::from_ref(state);
        let token = extract_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = auth_service.validate_token(&token)?;
        Ok(claims.into())
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authentication token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING_TOKEN",
                "No authentication token provided",
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token",
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired",
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Token creation failed",
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error",
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "authentication failure");
        }

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) | AuthError::InternalError(msg) => {
                ServiceError::InternalError(msg)
            }
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "k3Q9vXz2LmN8pR4tW6yB1cD5fH7jA0sE9uI2oP4lK6mN8bV1cX3zQ5wE7rT9yU0i";

    fn service(secret: &str, ttl: Duration) -> AuthService {
        AuthService::new(AuthConfig::new(
            secret.to_string(),
            "shopkeep-web".into(),
            "shopkeep-api".into(),
            ttl,
            false,
        ))
    }

    fn business() -> business::Model {
        business::Model {
            business_id: 7,
            username: "corner-shop".into(),
            password_hash: String::new(),
            business_name: "Corner Shop".into(),
            address: Some("1 High Street".into()),
            creation_date: Utc::now(),
        }
    }

    #[test]
    fn issued_token_validates() {
        let auth = service(SECRET, Duration::from_secs(3600));
        let issued = auth.issue_token(&business()).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = auth.validate_token(&issued.token).unwrap();
        assert_eq!(claims.business_id, 7);
        assert_eq!(claims.username, "corner-shop");
        assert_eq!(claims.address.as_deref(), Some("1 High Street"));
        assert_eq!(claims.sub, "7");

        let payload = TokenPayload::from(&issued.claims);
        assert_eq!(payload.business_id, 7);
        assert_eq!(payload.business_name, "Corner Shop");
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let issuer = service(SECRET, Duration::from_secs(3600));
        let verifier = service(&SECRET.chars().rev().collect::<String>(), Duration::from_secs(3600));
        let issued = issuer.issue_token(&business()).unwrap();
        assert_matches!(
            verifier.validate_token(&issued.token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn wrong_audience_rejected() {
        let issuer = service(SECRET, Duration::from_secs(3600));
        let mut verifier = service(SECRET, Duration::from_secs(3600));
        verifier.config.jwt_audience = "someone-else".into();
        let issued = issuer.issue_token(&business()).unwrap();
        assert_matches!(
            verifier.validate_token(&issued.token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn expired_token_rejected() {
        let auth = service(SECRET, Duration::from_secs(3600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            business_id: 7,
            username: "corner-shop".into(),
            business_name: "Corner Shop".into(),
            address: None,
            creation_date: Utc::now(),
            sub: "7".into(),
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            nbf: now - 7200,
            exp: now - 3600,
            iss: "shopkeep-api".into(),
            aud: "shopkeep-web".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_matches!(auth.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn garbage_token_rejected() {
        let auth = service(SECRET, Duration::from_secs(3600));
        assert_matches!(
            auth.validate_token("not-a-jwt"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        assert_eq!(
            AuthError::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_matches!(
            ServiceError::from(AuthError::TokenExpired),
            ServiceError::Unauthorized(_)
        );
    }
}
