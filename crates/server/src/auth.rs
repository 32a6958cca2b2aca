//! Admin authentication.
//!
//! The admin logs in with a password checked against an argon2 hash and gets
//! back a signed HS256 token. Every `/api/admin/*` route except login requires
//! `Authorization: Bearer <token>`.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use api_types::auth::{LoginRequest, LoginResponse};

use crate::{ServerError, extract::Json, server::ServerState};

const SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token expired")]
    Expired,
    #[error("token does not grant admin access")]
    NotAdmin,
    #[error("token generation failed: {0}")]
    Generation(String),
    #[error("invalid admin password hash: {0}")]
    PasswordHash(String),
}

/// Hash a password into a PHC string suitable for `server.admin_password_hash`.
pub fn hash_password(password: &str) -> Result<String, TokenError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TokenError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Password check plus token issue/validation for the single admin account.
pub struct AdminAuth {
    password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AdminAuth {
    /// Fails when `password_hash` is not a PHC string, so a misconfigured
    /// server refuses to start instead of refusing every login.
    pub fn new(password_hash: &str, secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        PasswordHash::new(password_hash).map_err(|e| TokenError::PasswordHash(e.to_string()))?;
        if secret.is_empty() {
            return Err(TokenError::Generation("empty signing secret".to_string()));
        }
        Ok(Self {
            password_hash: password_hash.to_string(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    pub fn issue(&self) -> Result<(String, DateTime<Utc>), TokenError> {
        self.issue_at(Utc::now())
    }

    /// Issue a token as if it was created at `issued_at`.
    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<(String, DateTime<Utc>), TokenError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: SUBJECT.to_string(),
            admin: true,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;
        Ok((token, expires_at))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if !data.claims.admin || data.claims.sub != SUBJECT {
            return Err(TokenError::NotAdmin);
        }
        Ok(data.claims)
    }
}

/// Middleware guarding the admin routes.
pub(crate) async fn require_admin(
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        if rejection.is_missing() {
            ServerError::Unauthorized("missing bearer token".to_string())
        } else {
            ServerError::Unauthorized("malformed authorization header".to_string())
        }
    })?;

    let claims = state.auth.validate(bearer.token()).map_err(|err| {
        tracing::debug!("admin token rejected: {err}");
        ServerError::Unauthorized(err.to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    if !state.auth.verify_password(&payload.password) {
        tracing::warn!("rejected admin login");
        return Err(ServerError::Unauthorized("invalid password".to_string()));
    }
    let (token, expires_at) = state
        .auth
        .issue()
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    tracing::info!("admin logged in");
    Ok(Json(LoginResponse { token, expires_at }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AdminAuth {
        let hash = hash_password("hunter2").unwrap();
        AdminAuth::new(&hash, b"test-secret-test-secret-test-secret", Duration::hours(24)).unwrap()
    }

    #[test]
    fn password_hash_round_trip() {
        let auth = auth();
        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("hunter3"));
    }

    #[test]
    fn plaintext_is_not_a_valid_hash() {
        assert!(AdminAuth::new("hunter2", b"secret", Duration::hours(1)).is_err());
    }

    #[test]
    fn fresh_token_validates() {
        let auth = auth();
        let (token, expires_at) = auth.issue().unwrap();
        let claims = auth.validate(&token).unwrap();
        assert!(claims.admin);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn token_older_than_ttl_is_expired() {
        let auth = auth();
        let (token, _) = auth.issue_at(Utc::now() - Duration::hours(25)).unwrap();
        assert!(matches!(auth.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = AdminAuth::new(
            &hash_password("x").unwrap(),
            b"another-secret",
            Duration::hours(24),
        )
        .unwrap();
        let (token, _) = other.issue().unwrap();
        assert!(matches!(auth().validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn non_admin_claim_is_rejected() {
        let secret = b"test-secret-test-secret-test-secret";
        let now = Utc::now();
        let claims = Claims {
            sub: SUBJECT.to_string(),
            admin: false,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        assert!(matches!(auth().validate(&token), Err(TokenError::NotAdmin)));
    }
}
