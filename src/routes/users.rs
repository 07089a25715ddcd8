use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

use crate::{
    auth::{
        hash_password, issue_token_pair, rotate_token_pair, verify_password, CurrentUser,
        LoginData, LoginRequest, RefreshRequest, RegisterRequest, ACCESS_TOKEN_COOKIE,
        REFRESH_TOKEN_COOKIE,
    },
    config::AuthConfig,
    error::AppError,
    models::{NewUser, UserProfile},
    response::ApiResponse,
    store::IdentityStore,
};
use validator::Validate;

/// Session cookie carrying a token. Http-only and secure, so it is invisible
/// to page scripts and never sent over plaintext transport.
fn token_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build(name, value.to_owned())
        .path("/")
        .http_only(true)
        .secure(true)
        .finish()
}

/// Immediately-expiring replacement used to clear a session cookie.
fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// Register a new user.
///
/// Creates the account and returns the sanitized profile. No tokens are
/// issued at registration; the client logs in separately.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AuthConfig>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    if register_data.has_blank_field() {
        return Err(AppError::BadRequest("All fields are required".into()));
    }
    register_data.validate()?;

    // Duplicate check is case-insensitive; the store also enforces uniqueness
    // at insert time.
    let existing = store
        .find_by_username_or_email(Some(&register_data.username), Some(&register_data.email))
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&register_data.password, config.bcrypt_cost)?;

    let user = store
        .create(NewUser {
            username: register_data.username.trim().to_string(),
            email: register_data.email.trim().to_string(),
            full_name: register_data.full_name.trim().to_string(),
            password_hash,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        201,
        UserProfile::from(user),
        "User registered successfully",
    )))
}

/// Log a user in.
///
/// Accepts a username or an email as the identifier. On success both tokens
/// are set as cookies and also returned in the body alongside the sanitized
/// profile.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AuthConfig>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let username = login_data
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let email = login_data
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if username.is_none() && email.is_none() {
        return Err(AppError::BadRequest("Username or email is required".into()));
    }

    let user = store
        .find_by_username_or_email(username, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

    if !verify_password(&login_data.password, &user.password_hash)? {
        // Deliberately does not say whether the identifier or the password
        // was wrong.
        return Err(AppError::Unauthorized("Invalid user credentials".into()));
    }

    let pair = issue_token_pair(store.get_ref(), &config, user.id).await?;

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(ACCESS_TOKEN_COOKIE, &pair.access_token))
        .cookie(token_cookie(REFRESH_TOKEN_COOKIE, &pair.refresh_token))
        .json(ApiResponse::new(
            200,
            LoginData {
                user: UserProfile::from(user),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "User logged in successfully",
        )))
}

/// Log the authenticated user out.
///
/// Clears the stored refresh token and both cookies. The cookies are cleared
/// even when the store update fails, so the client never keeps a session the
/// server considers dead; the failure itself is still surfaced as a 500.
#[post("/logout")]
pub async fn logout(
    store: web::Data<dyn IdentityStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let result = store.clear_refresh_token(user.0.id).await;

    let (mut builder, payload) = match result {
        Ok(()) => (
            HttpResponse::Ok(),
            json!({
                "statusCode": 200,
                "data": {},
                "message": "User logged out successfully"
            }),
        ),
        Err(e) => {
            log::error!("error during logout for user {}: {}", user.0.id, e);
            (
                HttpResponse::InternalServerError(),
                json!({
                    "statusCode": 500,
                    "message": "An error occurred during logout",
                    "data": null
                }),
            )
        }
    };

    Ok(builder
        .cookie(expired_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(expired_cookie(REFRESH_TOKEN_COOKIE))
        .json(payload))
}

/// Exchange a refresh token for a fresh token pair.
///
/// The token is read from the `refreshToken` cookie, or from the body for
/// clients that do not hold cookies. Rotation invalidates the presented
/// token; any verification failure is answered with the same 401.
#[post("/refresh-token")]
pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<dyn IdentityStore>,
    config: web::Data<AuthConfig>,
    refresh_data: Option<web::Json<RefreshRequest>>,
) -> Result<impl Responder, AppError> {
    let presented = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| refresh_data.and_then(|body| body.into_inner().refresh_token));

    let Some(presented) = presented else {
        return Err(AppError::Unauthorized("Unauthorized request".into()));
    };

    let pair = rotate_token_pair(store.get_ref(), &config, &presented).await?;

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(ACCESS_TOKEN_COOKIE, &pair.access_token))
        .cookie(token_cookie(REFRESH_TOKEN_COOKIE, &pair.refresh_token))
        .json(ApiResponse::new(200, pair, "Access token refreshed")))
}
