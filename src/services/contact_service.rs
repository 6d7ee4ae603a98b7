use crate::{
    config::AppConfig,
    models::{ContactFormInput, PartnerInquiryInput},
    services::mail_service::{Mailer, OutboundEmail},
    utils::{error::AppError, validation::normalize_email},
};

fn recipient<'a>(configured: &'a Option<String>, variable: &str) -> Result<&'a str, AppError> {
    configured.as_deref().ok_or_else(|| {
        log::error!("❌ {} is not configured", variable);
        AppError::Unavailable("Form delivery is not configured".to_string())
    })
}

async fn deliver(mailer: &dyn Mailer, email: OutboundEmail) -> Result<bool, AppError> {
    mailer.send(email).await.map_err(|e| {
        log::error!("❌ Form delivery failed: {}", e);
        AppError::Unavailable("Failed to send your message. Please try again later.".to_string())
    })?;
    Ok(true)
}

/// Forwards the contact form to `CONTACT_EMAIL`; nothing is stored.
pub async fn submit_contact_form(
    config: &AppConfig,
    mailer: &dyn Mailer,
    input: &ContactFormInput,
) -> Result<bool, AppError> {
    input.validate()?;
    let to = recipient(&config.contact_email, "CONTACT_EMAIL")?;

    log::info!("📬 Contact form from {}", input.email.trim());
    deliver(
        mailer,
        OutboundEmail {
            to: to.to_string(),
            subject: input.email_subject(),
            body: input.email_body(),
            reply_to: Some(normalize_email(&input.email)),
        },
    )
    .await
}

pub async fn submit_partner_inquiry(
    config: &AppConfig,
    mailer: &dyn Mailer,
    input: &PartnerInquiryInput,
) -> Result<bool, AppError> {
    input.validate()?;
    let to = recipient(&config.partners_email, "PARTNERS_EMAIL")?;

    log::info!("🤝 Partner inquiry from {}", input.organization.trim());
    deliver(
        mailer,
        OutboundEmail {
            to: to.to_string(),
            subject: input.email_subject(),
            body: input.email_body(),
            reply_to: Some(normalize_email(&input.email)),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::services::mail_service::{testing::RecordingMailer, DisabledMailer};

    fn form() -> ContactFormInput {
        ContactFormInput {
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            email: "Jo@X.com".into(),
            phone: "9999999999".into(),
            subject: "Scholarships".into(),
            message: "Any for nursing?".into(),
        }
    }

    #[tokio::test]
    async fn test_contact_form_goes_to_contact_inbox() {
        let mailer = RecordingMailer::default();
        assert!(submit_contact_form(&test_config(), &mailer, &form()).await.unwrap());

        let sent = mailer.last().unwrap();
        assert_eq!(sent.to, "contact@example.com");
        assert_eq!(sent.reply_to.as_deref(), Some("jo@x.com"));
        assert!(sent.body.contains("Any for nursing?"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let mailer = RecordingMailer::default();
        let mut bad = form();
        bad.subject = String::new();
        assert!(submit_contact_form(&test_config(), &mailer, &bad).await.is_err());
        assert!(mailer.last().is_none());
    }

    #[tokio::test]
    async fn test_delivery_failure_surfaces() {
        let err = submit_contact_form(&test_config(), &DisabledMailer, &form()).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));

        let mut config = test_config();
        config.partners_email = None;
        let inquiry = PartnerInquiryInput {
            name: "Sam".into(),
            email: "sam@uni.edu".into(),
            phone: "+441234567".into(),
            organization: "Uni".into(),
            country: Some("UK".into()),
            message: "Partnership".into(),
        };
        let err = submit_partner_inquiry(&config, &RecordingMailer::default(), &inquiry)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Form delivery is not configured");
    }
}
