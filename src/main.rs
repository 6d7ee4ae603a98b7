mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{
    auth::AuthMiddleware,
    rate_limit::{RateLimit, RateLimiter},
};

const LOGIN_ATTEMPTS_PER_MINUTE: u32 = 5;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let (host, port, trust_proxy) = (config.host.clone(), config.port, config.trust_proxy);

    log::info!("🚀 Starting Consultancy Service...");

    let db = database::MongoDB::new(&config.mongodb_uri).await.map_err(|e| {
        log::error!("❌ Failed to connect to MongoDB: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    log::info!("✅ MongoDB connected successfully");

    // 🌱 Bootstrap the first SuperAdmin
    seeds::admin_seed::seed_super_admin(&db, config.seed_admin.as_ref()).await;

    let mailer = services::mail_service::build_mailer(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // One limiter for every worker.
    let login_limiter = RateLimiter::new(
        LOGIN_ATTEMPTS_PER_MINUTE,
        Duration::from_secs(60),
        "Too many login attempts. Please try again later.",
    );

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    let mailer_data: web::Data<dyn services::Mailer> = web::Data::from(mailer);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("🧭 GraphQL endpoint at: http://{}:{}/graphql", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = config_data
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // GraphQL transport over the resolvers below
            .route("/graphql", web::post().to(api::graphql::graphql))
            // Auth endpoints
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(api::auth::signup))
                    .route("/verify-otp", web::post().to(api::auth::verify_otp))
                    .service(
                        web::resource("/login")
                            .wrap(RateLimit::new(login_limiter.clone()).trust_forwarded(trust_proxy))
                            .route(web::post().to(api::auth::login)),
                    )
                    .service(
                        web::resource("/admin/login")
                            .wrap(RateLimit::new(login_limiter.clone()).trust_forwarded(trust_proxy))
                            .route(web::post().to(api::admins::admin_login)),
                    )
                    .route("/google", web::post().to(api::auth::google))
                    .route("/logout", web::post().to(api::auth::logout))
                    .service(
                        web::resource("/me")
                            .wrap(AuthMiddleware::authenticated())
                            .route(web::get().to(api::auth::me)),
                    ),
            )
            // Admins: dashboard accounts, admin only
            .service(
                web::scope("/api/v1/admins")
                    .wrap(AuthMiddleware::admin())
                    .service(api::admins::list_admins)
                    .service(api::admins::get_admin)
                    .service(api::admins::create_admin)
                    .service(api::admins::update_admin)
                    .service(api::admins::delete_admin),
            )
            // Users: student leads, admin only
            .service(
                web::scope("/api/v1/users")
                    .wrap(AuthMiddleware::admin())
                    .service(api::users::list_users)
                    .service(api::users::get_user)
                    .service(api::users::create_user)
                    .service(api::users::update_user)
                    .service(api::users::delete_user),
            )
            // Universities: public reads, admin writes
            .service(
                web::scope("/api/v1/universities")
                    .service(api::universities::list_universities)
                    .service(api::universities::get_university)
                    .service(api::universities::create_university)
                    .service(api::universities::update_university)
                    .service(api::universities::delete_university),
            )
            // Jobs: public board and applications, admin writes
            .service(
                web::scope("/api/v1/jobs")
                    .service(api::jobs::list_jobs)
                    .service(api::jobs::get_job)
                    .service(api::jobs::create_job)
                    .service(api::jobs::update_job)
                    .service(api::jobs::delete_job)
                    .service(api::jobs::apply_for_job),
            )
            // Contact forms: delivered by email
            .service(
                web::scope("/api/v1/contact")
                    .route("", web::post().to(api::contact::submit_contact_form))
                    .route("/partners", web::post().to(api::contact::submit_partner_inquiry)),
            )
            .service(
                web::scope("/api/v1/dashboard")
                    .wrap(AuthMiddleware::admin())
                    .route("/stats", web::get().to(api::dashboard::get_stats)),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
