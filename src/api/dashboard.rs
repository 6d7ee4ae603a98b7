use actix_web::{web, HttpResponse};

use crate::{database::MongoDB, services::dashboard_service, utils::error::AppError};

/// GET /api/v1/dashboard/stats
pub async fn get_stats(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let stats = dashboard_service::dashboard_stats(&db).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "stats": stats })))
}
