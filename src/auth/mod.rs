pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserProfile;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use session::{issue_token_pair, rotate_token_pair, verify_access};
pub use token::{decode_token, sign_token, Claims, TokenKind};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Cookie names the session tokens travel under.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Payload for a new user registration request.
///
/// Password strength is deliberately not policed here; only presence is
/// required. Format rules apply to the username and email.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username, stored lowercased.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

impl RegisterRequest {
    /// True when every required field is empty or whitespace-only after
    /// trimming.
    pub fn has_blank_field(&self) -> bool {
        [
            self.username.as_str(),
            self.email.as_str(),
            self.password.as_str(),
            self.full_name.as_str(),
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }
}

/// Payload for a login request. At least one of `username` / `email` must be
/// present alongside the password.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Payload for a refresh request when the token is sent in the body rather
/// than the cookie.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// An access/refresh token pair as returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login response body: the sanitized profile plus both tokens (which are also
/// set as cookies).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "test_user-123".to_string(),
            email: "test@example.com".to_string(),
            password: "p1".to_string(),
            full_name: "Test User".to_string(),
        };
        assert!(valid.validate().is_ok());
        assert!(!valid.has_blank_field());

        let invalid_username = RegisterRequest {
            username: "test user!".to_string(), // Contains space and exclamation
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            full_name: "Test User".to_string(),
        };
        assert!(invalid_username.validate().is_err());

        let invalid_email = RegisterRequest {
            username: "testuser".to_string(),
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
            full_name: "Test User".to_string(),
        };
        assert!(invalid_email.validate().is_err());
    }

    #[test]
    fn test_blank_field_detection_trims() {
        let blank_name = RegisterRequest {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            full_name: "   ".to_string(),
        };
        assert!(blank_name.has_blank_field());
    }

    #[test]
    fn test_token_pair_serializes_camel_case() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value["accessToken"], "a");
        assert_eq!(value["refreshToken"], "r");
    }
}
