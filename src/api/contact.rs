use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    models::{ContactFormInput, PartnerInquiryInput},
    services::{contact_service, Mailer},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/v1/contact",
    tag = "Contact",
    request_body = ContactFormInput,
    responses(
        (status = 200, description = "Message forwarded to the consultancy inbox"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 503, description = "Mail delivery failed")
    )
)]
pub async fn submit_contact_form(
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<ContactFormInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("📬 POST /contact - email: {}", body.email);
    let sent = contact_service::submit_contact_form(&config, mailer.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": sent })))
}

#[utoipa::path(
    post,
    path = "/api/v1/contact/partners",
    tag = "Contact",
    request_body = PartnerInquiryInput,
    responses(
        (status = 200, description = "Inquiry forwarded to the partnerships inbox"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 503, description = "Mail delivery failed")
    )
)]
pub async fn submit_partner_inquiry(
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<PartnerInquiryInput>,
) -> Result<HttpResponse, AppError> {
    log::info!("🤝 POST /contact/partners - organization: {}", body.organization);
    let sent = contact_service::submit_partner_inquiry(&config, mailer.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": sent })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::services::mail_service::testing::RecordingMailer;
    use actix_web::{test as actix_test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_contact_form_is_mailed() {
        let recorder = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recorder.clone();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::from(mailer))
                .route("/api/v1/contact", web::post().to(submit_contact_form)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(serde_json::json!({
                "firstName": "Meera",
                "lastName": "Iyer",
                "email": "meera@x.com",
                "phone": "9123456789",
                "subject": "MBA in Canada",
                "message": "Which intakes are open?"
            }))
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(recorder.last().unwrap().to, "contact@example.com");
    }
}
