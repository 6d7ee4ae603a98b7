use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::AppConfig;
use crate::utils::{
    error::AppError,
    jwt::{verify_token, Claims, JwtSettings},
};

pub const AUTH_COOKIE: &str = "token";

/// Bearer header first, then the HttpOnly cookie.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(value) = req.headers().get("Authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    req.cookie(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// `Ok(None)` when no token was sent; an error when a token was sent but is bad.
pub fn claims_from_request(req: &HttpRequest, jwt: &JwtSettings) -> Result<Option<Claims>, AppError> {
    bearer_token(req)
        .map(|token| verify_token(jwt, &token))
        .transpose()
}

pub fn require_user(claims: Option<&Claims>) -> Result<&Claims, AppError> {
    claims.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

pub fn require_admin(claims: Option<&Claims>) -> Result<&Claims, AppError> {
    let claims = require_user(claims)?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(claims)
}

/// Whether the caller of a public route holds a valid admin token.
pub fn is_admin_request(req: &HttpRequest, jwt: &JwtSettings) -> bool {
    matches!(claims_from_request(req, jwt), Ok(Some(claims)) if claims.is_admin())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Authenticated,
    Admin,
}

/// Rejects requests without a valid token and exposes the claims to handlers
/// as `web::ReqData<Claims>`.
pub struct AuthMiddleware {
    gate: Gate,
}

impl AuthMiddleware {
    pub fn authenticated() -> Self {
        Self { gate: Gate::Authenticated }
    }

    pub fn admin() -> Self {
        Self { gate: Gate::Admin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service, gate: self.gate }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    gate: Gate,
}

fn authorize(req: &HttpRequest, gate: Gate) -> Result<Claims, AppError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Internal("AppConfig missing from app data".to_string()))?;

    let claims = claims_from_request(req, &config.jwt)?;
    let allowed = match gate {
        Gate::Authenticated => require_user(claims.as_ref())?,
        Gate::Admin => require_admin(claims.as_ref())?,
    };
    Ok(allowed.clone())
}

/// Extractor for admin-only handlers that share a resource with public routes.
pub struct AdminClaims(pub Claims);

impl FromRequest for AdminClaims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req, Gate::Admin).map(AdminClaims))
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        match authorize(req.request(), self.gate) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}
