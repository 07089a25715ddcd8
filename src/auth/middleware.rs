use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{session, ACCESS_TOKEN_COOKIE};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::store::IdentityStore;

/// Routes that must stay reachable without a session token.
const PUBLIC_ROUTES: [&str; 3] = [
    "/api/v1/users/register",
    "/api/v1/users/login",
    "/api/v1/users/refresh-token",
];

/// Authorization gate for protected routes.
///
/// Pulls a candidate access token from the `accessToken` cookie or the
/// `Authorization: Bearer` header, verifies it, resolves the subject through
/// the identity store, and inserts the sanitized [`crate::models::UserProfile`]
/// into the request's extensions. Handlers read it back through
/// [`crate::auth::CurrentUser`]. On any failure the handler never runs.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc so the service can be moved into the async block that awaits the
    // identity-store lookup.
    service: Rc<S>,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.request().cookie(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Rejections are answered as responses rather than service-level
            // errors so the envelope is produced here in tests and production
            // alike.
            fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
                let response = err.error_response().map_into_right_body();
                req.into_response(response)
            }

            // Prefix match so path variants like a trailing slash fall through
            // to routing (404) instead of being answered 401 here.
            if PUBLIC_ROUTES.iter().any(|route| req.path().starts_with(route)) {
                return service.call(req).await.map(|res| res.map_into_left_body());
            }

            let Some(token) = bearer_token(&req) else {
                return Ok(reject(
                    req,
                    AppError::Unauthorized("Unauthorized request".into()),
                ));
            };

            let Some(store) = req.app_data::<web::Data<dyn IdentityStore>>().cloned() else {
                return Ok(reject(
                    req,
                    AppError::InternalServerError("identity store not configured".into()),
                ));
            };
            let Some(config) = req.app_data::<web::Data<AuthConfig>>().cloned() else {
                return Ok(reject(
                    req,
                    AppError::InternalServerError("auth config not configured".into()),
                ));
            };

            let profile =
                match session::verify_access(store.get_ref(), config.get_ref(), &token).await {
                    Ok(profile) => profile,
                    Err(err) => return Ok(reject(req, err)),
                };

            // Extensions are scoped to this one request; nothing here is
            // visible to concurrently processed requests.
            req.extensions_mut().insert(profile);
            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}
