use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::utils::error::AppError;

// Stale windows are swept once the table grows past this.
const SWEEP_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client IP. Clones share the same table, so
/// one limiter built in `main` covers every worker.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    message: &'static str,
    hits: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, message: &'static str) -> Self {
        Self {
            max_requests,
            window,
            message,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records one hit for `key` at `now`; false once the window is full.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if hits.len() > SWEEP_THRESHOLD {
            let window = self.window;
            hits.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = hits.entry(key.to_string()).or_insert(Window { started: now, count: 0 });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}

pub struct RateLimit {
    limiter: RateLimiter,
    trust_forwarded: bool,
}

impl RateLimit {
    /// Keys on the socket peer address.
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            limiter,
            trust_forwarded: false,
        }
    }

    /// Keys on `Forwarded` / `X-Forwarded-For` instead. Only for deployments
    /// behind a proxy that overwrites those headers.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
            trust_forwarded: self.trust_forwarded,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimiter,
    trust_forwarded: bool,
}

impl<S> RateLimitMiddleware<S> {
    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_forwarded {
            if let Some(ip) = req.connection_info().realip_remote_addr() {
                return ip.to_string();
            }
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let client = self.client_key(&req);

        if !self.limiter.check(&client) {
            log::warn!("🚦 Rate limit hit: {} {}", client, req.path());
            let message = self.limiter.message;
            return Box::pin(async move { Err(AppError::TooManyRequests(message.to_string()).into()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, web, App, HttpResponse};

    #[test]
    fn test_window_allows_max_then_blocks() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60), "slow down");
        let start = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_at("10.0.0.1", start));
        }
        assert!(!limiter.check_at("10.0.0.1", start + Duration::from_secs(59)));
        // Other clients have their own window.
        assert!(limiter.check_at("10.0.0.2", start));
        // A new window opens after a minute.
        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_clones_share_state() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), "slow down");
        let other = limiter.clone();
        assert!(limiter.check("ip"));
        assert!(!other.check("ip"));
    }

    fn login_from(peer: &str, forwarded_for: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer.parse().unwrap())
            .insert_header(("X-Forwarded-For", forwarded_for))
    }

    #[actix_web::test]
    async fn test_sixth_request_rejected() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60), "Too many login attempts");
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new(limiter))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        for _ in 0..5 {
            let req = actix_test::TestRequest::post()
                .uri("/login")
                .peer_addr("10.1.1.1:5000".parse().unwrap())
                .to_request();
            assert!(actix_test::call_service(&app, req).await.status().is_success());
        }

        let req = actix_test::TestRequest::post()
            .uri("/login")
            .peer_addr("10.1.1.1:5001".parse().unwrap())
            .to_request();
        let err = actix_test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_forwarded_header_ignored_by_default() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60), "Too many login attempts");
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new(limiter))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let mut allowed = 0;
        for i in 0..20 {
            let req = login_from("10.1.1.1:5000", &format!("1.2.3.{}", i)).to_request();
            if actix_test::try_call_service(&app, req).await.is_ok() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 5);
    }

    #[actix_web::test]
    async fn test_forwarded_header_used_behind_proxy() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), "Too many login attempts");
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new(limiter).trust_forwarded(true))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        for (forwarded_for, allowed) in [("1.2.3.4", true), ("5.6.7.8", true), ("1.2.3.4", false)] {
            let req = login_from("10.0.0.9:80", forwarded_for).to_request();
            assert_eq!(actix_test::try_call_service(&app, req).await.is_ok(), allowed);
        }
    }
}
