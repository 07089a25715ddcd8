use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserProfile;

/// Extracts the authenticated user's sanitized profile from request
/// extensions.
///
/// Intended for routes behind [`crate::auth::AuthMiddleware`], which verifies
/// the access token and inserts the resolved profile. If nothing was inserted
/// (middleware missing or misconfigured) this fails with `Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserProfile>().cloned() {
            Some(profile) => ready(Ok(CurrentUser(profile))),
            None => {
                let err = AppError::Unauthorized("Unauthorized request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            full_name: "Alice Doe".into(),
            created_at: Utc::now(),
        }
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        let profile = sample_profile();
        req.extensions_mut().insert(profile.clone());

        let mut payload = Payload::None;
        let extracted = CurrentUser::from_request(&req, &mut payload).await;
        assert!(extracted.is_ok());
        assert_eq!(extracted.unwrap().0, profile);
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No profile inserted into extensions

        let mut payload = Payload::None;
        let result = CurrentUser::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let err = result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
