use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::{is_admin_request, AdminClaims},
    models::{ApplyForJobInput, CreateJobInput, ListQuery, UpdateJobInput},
    services::job_service,
    utils::error::AppError,
};

/// GET /api/v1/jobs - open postings for visitors, everything for admins
#[get("")]
pub async fn list_jobs(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let is_admin = is_admin_request(&req, &config.jwt);
    let jobs = job_service::list_jobs(&db, &query, is_admin).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "jobs": jobs,
        "total": jobs.len()
    })))
}

/// GET /api/v1/jobs/{id} - applicants are only listed for admins
#[get("/{id}")]
pub async fn get_job(
    req: HttpRequest,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let is_admin = is_admin_request(&req, &config.jwt);
    let job = job_service::get_job(&db, &path, is_admin).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "job": job })))
}

#[post("")]
pub async fn create_job(
    admin: AdminClaims,
    db: web::Data<MongoDB>,
    body: web::Json<CreateJobInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("💼 POST /jobs by {}", admin.0.email);
    let job = job_service::create_job(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "job": job })))
}

#[put("/{id}")]
pub async fn update_job(
    _admin: AdminClaims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateJobInput>,
) -> Result<HttpResponse, AppError> {
    let job = job_service::update_job(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "job": job })))
}

#[delete("/{id}")]
pub async fn delete_job(
    admin: AdminClaims,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /jobs/{} by {}", path, admin.0.email);
    let deleted = job_service::delete_job(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": deleted })))
}

/// POST /api/v1/jobs/{id}/apply (public)
#[post("/{id}/apply")]
pub async fn apply_for_job(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<ApplyForJobInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("📨 POST /jobs/{}/apply - email: {}", path, body.email);
    let job = job_service::apply_for_job(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "job": job })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database::testing::lazy_handle;
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[actix_web::test]
    async fn test_job_writes_need_admin() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_handle().await))
                .app_data(web::Data::new(test_config()))
                .service(web::scope("/api/v1/jobs").service(create_job).service(delete_job)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/jobs")
            .set_json(serde_json::json!({
                "title": "Counsellor",
                "location": "Delhi",
                "description": "Advising",
                "experienceRequired": "None"
            }))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::delete()
            .uri("/api/v1/jobs/65f0c0ffee65f0c0ffee65f0")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_apply_rejects_bad_id_before_store() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_handle().await))
                .service(web::scope("/api/v1/jobs").service(apply_for_job)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/jobs/not-an-id/apply")
            .set_json(serde_json::json!({
                "name": "Ravi",
                "email": "ravi@x.com",
                "phone": "9876543210",
                "resumeUrl": "https://cv.example/ravi.pdf"
            }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "Invalid Job ID");
    }
}
