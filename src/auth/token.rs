use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two signing keys a token belongs to.
///
/// Access and refresh tokens share the same claim shape and differ only in
/// signing secret and lifetime, so a refresh token can never pass verification
/// as an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id. Makes consecutive tokens for the same subject
    /// distinct even within one clock second, which stored-token equality
    /// checks rely on.
    pub jti: Uuid,
}

impl TokenKind {
    fn secret<'a>(&self, config: &'a AuthConfig) -> &'a str {
        match self {
            TokenKind::Access => &config.access_secret,
            TokenKind::Refresh => &config.refresh_secret,
        }
    }

    fn ttl(&self, config: &AuthConfig) -> i64 {
        match self {
            TokenKind::Access => config.access_ttl_secs,
            TokenKind::Refresh => config.refresh_ttl_secs,
        }
    }
}

/// Signs a token of the given kind for `user_id`.
pub fn sign_token(kind: TokenKind, user_id: Uuid, config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(Duration::seconds(kind.ttl(config)))
        .ok_or_else(|| AppError::InternalServerError("token expiry out of range".into()))?;

    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: Uuid::new_v4(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(kind.secret(config).as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry with the key for `kind` and decodes the
/// claims.
///
/// Malformed tokens, signature mismatches, and expired tokens all come back as
/// `Unauthorized`; the caller decides how much of the cause to expose.
pub fn decode_token(kind: TokenKind, token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(kind.secret(config).as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
