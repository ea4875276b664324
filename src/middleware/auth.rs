use std::{
    future::{ready, Ready},
    sync::Arc,
};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::{error, models::user::Role, routes::auth::Claims, AppConfig};

/// Caller identity resolved once at entry by the `Authentication` middleware.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| error::unauthorized("Unauthorized")),
        )
    }
}

/// Role-tagged extractor: rejects non-student callers with a 403.
pub struct StudentUser(pub AuthenticatedUser);

impl FromRequest for StudentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(match req.extensions().get::<AuthenticatedUser>() {
            Some(user) if user.role == Role::Student => Ok(StudentUser(user.clone())),
            Some(_) => Err(error::forbidden("Forbidden")),
            None => Err(error::unauthorized("Unauthorized")),
        })
    }
}

/// Role-tagged extractor: rejects non-counsellor callers with a 403.
pub struct CounsellorUser(pub AuthenticatedUser);

impl FromRequest for CounsellorUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(match req.extensions().get::<AuthenticatedUser>() {
            Some(user) if user.role == Role::Counsellor => Ok(CounsellorUser(user.clone())),
            Some(_) => Err(error::forbidden("Forbidden")),
            None => Err(error::unauthorized("Unauthorized")),
        })
    }
}

pub struct Authentication {
    pub app_config: Arc<AppConfig>,
}

// Middleware factory is `Transform` trait
// `S` - type of the next service
// `B` - type of response's body
impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service,
            app_config: self.app_config.clone(),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
    app_config: Arc<AppConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Extract the bearer token, validate it, and stash the caller identity
        // in the request extensions. Invalid tokens leave no identity behind;
        // the extractors turn that into a 401 where one is required.
        let app_config = self.app_config.clone();

        let auth_header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("Bearer "))
            .map(|value| value["Bearer ".len()..].to_string());

        match auth_header {
            Some(token) => {
                let decoding_key = DecodingKey::from_secret(app_config.jwt_secret.as_ref());

                match decode::<Claims>(&token, &decoding_key, &Validation::default()) {
                    Ok(token_data) => {
                        let claims = token_data.claims;

                        debug!("Authenticated user: {}", &claims.sub);
                        req.extensions_mut().insert(AuthenticatedUser {
                            user_id: claims.sub,
                            role: claims.role,
                        });
                    }
                    Err(e) => {
                        warn!("Invalid token: {:?}", e);
                    }
                }
            }
            None => {
                debug!("No Authorization header found.");
            }
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
