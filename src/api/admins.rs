use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    models::{AdminLoginInput, CreateAdminInput, ListQuery, UpdateAdminInput},
    services::admin_service,
    utils::{error::AppError, jwt::Claims},
};

/// GET /api/v1/admins
#[get("")]
pub async fn list_admins(db: web::Data<MongoDB>, query: web::Query<ListQuery>) -> Result<HttpResponse, AppError> {
    let admins = admin_service::list_admins(&db, &query).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "admins": admins,
        "total": admins.len()
    })))
}

/// GET /api/v1/admins/{id}
#[get("/{id}")]
pub async fn get_admin(db: web::Data<MongoDB>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let admin = admin_service::get_admin(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "admin": admin })))
}

/// POST /api/v1/admins
#[post("")]
pub async fn create_admin(
    caller: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateAdminInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("👑 POST /admins by {}", caller.email);
    let admin = admin_service::create_admin(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "admin": admin })))
}

/// PUT /api/v1/admins/{id}
#[put("/{id}")]
pub async fn update_admin(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateAdminInput>,
) -> Result<HttpResponse, AppError> {
    let admin = admin_service::update_admin(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "admin": admin })))
}

/// DELETE /api/v1/admins/{id}
#[delete("/{id}")]
pub async fn delete_admin(
    caller: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /admins/{} by {}", path, caller.email);
    let deleted = admin_service::delete_admin(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": deleted })))
}

/// POST /auth/admin/login
pub async fn admin_login(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    body: web::Json<AdminLoginInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/admin/login - email: {}", body.email);

    let response = admin_service::admin_login(&db, &config.jwt, &body).await.map_err(|e| {
        log::warn!("❌ Admin login failed: {} - {}", body.email, e);
        e
    })?;

    Ok(HttpResponse::Ok()
        .cookie(super::auth::auth_cookie(&config, &response.token))
        .json(response))
}
