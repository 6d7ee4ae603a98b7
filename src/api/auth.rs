use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpResponse,
};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::AUTH_COOKIE,
    services::{
        auth_service::{
            self, AuthResponse, GoogleAuthRequest, LoginRequest, SignupRequest, SignupResponse,
            VerifyOtpRequest,
        },
        Mailer,
    },
    utils::{error::AppError, jwt::Claims},
};

/// HttpOnly session cookie carrying the same JWT as the response body.
pub fn auth_cookie(config: &AppConfig, token: &str) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::seconds(config.jwt.expires_in.num_seconds()))
        .finish()
}

fn with_cookie(config: &AppConfig, response: AuthResponse) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(auth_cookie(config, &response.token))
        .json(response)
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Pending account created, OTP emailed", body = SignupResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists with this email"),
        (status = 503, description = "Failed to send verification email")
    )
)]
pub async fn signup(
    db: web::Data<MongoDB>,
    mailer: web::Data<dyn Mailer>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /auth/signup - email: {}", request.email);

    let response = auth_service::signup(&db, mailer.get_ref(), &request).await.map_err(|e| {
        log::warn!("❌ Signup failed: {} - {}", request.email, e);
        e
    })?;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Email verified, session started", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Wrong or expired OTP, or already verified")
    )
)]
pub async fn verify_otp(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔑 POST /auth/verify-otp - email: {}", request.email);

    let response = auth_service::verify_otp(&db, &config.jwt, &request).await.map_err(|e| {
        log::warn!("❌ OTP verification failed: {} - {}", request.email, e);
        e
    })?;

    log::info!("✅ Email verified: {}", response.user.email);
    Ok(with_cookie(&config, response))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    let response = auth_service::login(&db, &config.jwt, &request).await.map_err(|e| {
        log::warn!("❌ Login failed: {} - {}", request.email, e);
        e
    })?;

    log::info!("✅ Login successful: {}", response.user.email);
    Ok(with_cookie(&config, response))
}

#[utoipa::path(
    post,
    path = "/auth/google",
    tag = "Auth",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Signed in with Google", body = AuthResponse),
        (status = 401, description = "Invalid Google credential"),
        (status = 503, description = "Google login is not configured")
    )
)]
pub async fn google(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<GoogleAuthRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/google");

    let response = auth_service::google_login(&db, &config, &request).await.map_err(|e| {
        log::warn!("❌ Google login failed: {}", e);
        e
    })?;

    log::info!("✅ Google login successful: {}", response.user.email);
    Ok(with_cookie(&config, response))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(config: web::Data<AppConfig>) -> HttpResponse {
    log::info!("👋 POST /auth/logout");

    let mut cookie = auth_cookie(&config, "");
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "message": "Logged out successfully" }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = crate::models::UserResponse),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(db: web::Data<MongoDB>, claims: web::ReqData<Claims>) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /auth/me - user: {}", claims.sub);
    let user = auth_service::current_user(&db, &claims).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database::testing::lazy_handle;
    use crate::services::mail_service::testing::RecordingMailer;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use std::sync::Arc;

    #[test]
    fn test_cookie_attributes() {
        let cookie = auth_cookie(&test_config(), "abc");
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
    }

    #[actix_web::test]
    async fn test_signup_rejects_bad_input_before_store() {
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_handle().await))
                .app_data(web::Data::from(mailer))
                .route("/auth/signup", web::post().to(signup)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "name": "Asha",
                "email": "not-an-email",
                "password": "secret1",
                "phone": "9999999999"
            }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "Invalid email address");
    }

    #[actix_web::test]
    async fn test_logout_clears_cookie() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .route("/auth/logout", web::post().to(logout)),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::post().uri("/auth/logout").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.response().cookies().find(|c| c.name() == AUTH_COOKIE).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
