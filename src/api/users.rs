use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    database::MongoDB,
    models::{CreateUserInput, ListQuery, UpdateUserInput},
    services::user_service,
    utils::{error::AppError, jwt::Claims},
};

/// GET /api/v1/users?status=New&sortBy=name&order=asc
#[get("")]
pub async fn list_users(db: web::Data<MongoDB>, query: web::Query<ListQuery>) -> Result<HttpResponse, AppError> {
    let users = user_service::list_users(&db, &query).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "users": users,
        "total": users.len()
    })))
}

/// GET /api/v1/users/{id}
#[get("/{id}")]
pub async fn get_user(db: web::Data<MongoDB>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let user = user_service::get_user(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": user })))
}

/// POST /api/v1/users
#[post("")]
pub async fn create_user(
    caller: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 POST /users by {}", caller.email);
    let user = user_service::create_user(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "user": user })))
}

/// PUT /api/v1/users/{id}
#[put("/{id}")]
pub async fn update_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::update_user(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": user })))
}

/// DELETE /api/v1/users/{id}
#[delete("/{id}")]
pub async fn delete_user(
    caller: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /users/{} by {}", path, caller.email);
    let deleted = user_service::delete_user(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": deleted })))
}
