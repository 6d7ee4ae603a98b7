use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consultancy Service API",
        version = "1.0.0",
        description = "Backend for the consultancy website and admin dashboard.\n\n**Authentication:** JWT, sent as a Bearer token or in the HttpOnly `token` cookie set by the login routes.\n\nAdmin CRUD over admins, users, universities and jobs is served by `POST /graphql` and mirrored under `/api/v1`."
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::verify_otp,
        crate::api::auth::login,
        crate::api::auth::google,
        crate::api::auth::logout,
        crate::api::auth::me,

        // Contact
        crate::api::contact::submit_contact_form,
        crate::api::contact::submit_partner_inquiry,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::SignupResponse,
            crate::services::auth_service::VerifyOtpRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::GoogleAuthRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserResponse,
            crate::models::ContactFormInput,
            crate::models::PartnerInquiryInput,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Email/OTP signup, password and Google login, session cookie."),
        (name = "Contact", description = "Website contact and partnership forms, delivered by email."),
        (name = "Health", description = "Liveness probe."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /auth/login, /auth/verify-otp or /auth/google"))
                        .build(),
                ),
            );
        }
    }
}
