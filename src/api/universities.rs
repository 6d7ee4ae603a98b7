use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    database::MongoDB,
    middleware::auth::AdminClaims,
    models::{CreateUniversityInput, ListQuery, UpdateUniversityInput},
    services::university_service,
    utils::error::AppError,
};

/// GET /api/v1/universities (public)
#[get("")]
pub async fn list_universities(
    db: web::Data<MongoDB>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let universities = university_service::list_universities(&db, &query).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "universities": universities,
        "total": universities.len()
    })))
}

/// GET /api/v1/universities/{id} (public)
#[get("/{id}")]
pub async fn get_university(db: web::Data<MongoDB>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let university = university_service::get_university(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "university": university })))
}

#[post("")]
pub async fn create_university(
    admin: AdminClaims,
    db: web::Data<MongoDB>,
    body: web::Json<CreateUniversityInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("🎓 POST /universities by {}", admin.0.email);
    let university = university_service::create_university(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "university": university })))
}

#[put("/{id}")]
pub async fn update_university(
    _admin: AdminClaims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateUniversityInput>,
) -> Result<HttpResponse, AppError> {
    let university = university_service::update_university(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "university": university })))
}

#[delete("/{id}")]
pub async fn delete_university(
    admin: AdminClaims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /universities/{} by {}", path, admin.0.email);
    let deleted = university_service::delete_university(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": deleted })))
}
