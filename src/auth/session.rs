//!
//! # Session-token lifecycle
//!
//! Issues, verifies, and rotates the access/refresh token pair against the
//! identity store. The route handlers and the authorization middleware call
//! into these functions; neither ever touches token internals directly.

use uuid::Uuid;

use crate::auth::token::{self, TokenKind};
use crate::auth::TokenPair;
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::UserProfile;
use crate::store::IdentityStore;

/// Signs a fresh access/refresh pair for `user_id` and persists the refresh
/// token, overwriting any prior session.
///
/// Issuance is atomic with persistence: if the store write fails, no tokens
/// are returned. A token handed to a client that was never stored could never
/// be rotated or revoked.
pub async fn issue_token_pair(
    store: &dyn IdentityStore,
    config: &AuthConfig,
    user_id: Uuid,
) -> Result<TokenPair, AppError> {
    let pair = TokenPair {
        access_token: token::sign_token(TokenKind::Access, user_id, config)?,
        refresh_token: token::sign_token(TokenKind::Refresh, user_id, config)?,
    };

    store
        .set_refresh_token(user_id, &pair.refresh_token)
        .await
        .map_err(|e| {
            log::error!("failed to persist refresh token for {}: {}", user_id, e);
            AppError::InternalServerError(
                "Something went wrong while generating refresh and access token".into(),
            )
        })?;

    Ok(pair)
}

/// Verifies an access token and resolves its subject to a sanitized profile.
///
/// A subject that no longer exists in the store is reported exactly like a bad
/// token, so callers cannot distinguish a deleted account from a forged token.
pub async fn verify_access(
    store: &dyn IdentityStore,
    config: &AuthConfig,
    token_str: &str,
) -> Result<UserProfile, AppError> {
    let claims = token::decode_token(TokenKind::Access, token_str, config)
        .map_err(|_| AppError::Unauthorized("Invalid access token".into()))?;

    let user = store
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid access token".into()))?;

    Ok(UserProfile::from(user))
}

/// Exchanges a presented refresh token for a brand-new pair, invalidating it.
///
/// The stored-token comparison and the overwrite happen in one atomic
/// compare-and-swap at the store, so a given refresh token rotates at most
/// once even under concurrent requests. Every failure mode a client can cause
/// (malformed, expired, already rotated, cleared by logout, unknown subject)
/// collapses into the same 401.
pub async fn rotate_token_pair(
    store: &dyn IdentityStore,
    config: &AuthConfig,
    presented: &str,
) -> Result<TokenPair, AppError> {
    let claims = token::decode_token(TokenKind::Refresh, presented, config)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let pair = TokenPair {
        access_token: token::sign_token(TokenKind::Access, claims.sub, config)?,
        refresh_token: token::sign_token(TokenKind::Refresh, claims.sub, config)?,
    };

    let rotated = store
        .swap_refresh_token(claims.sub, presented, &pair.refresh_token)
        .await?;
    if !rotated {
        return Err(AppError::Unauthorized("Invalid refresh token".into()));
    }

    Ok(pair)
}
