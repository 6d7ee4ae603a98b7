use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{AppConfig, SmtpSettings};
use crate::utils::{error::AppError, otp::OTP_TTL_MINUTES};

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError>;
}

/// Delivers through the configured SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, String> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| format!("Invalid SMTP relay {}: {}", settings.host, e))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.user.clone(), settings.pass.clone()))
            .build();

        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid SMTP_FROM '{}': {}", settings.from, e))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::validation(format!("Invalid recipient address: {}", e)))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &email.reply_to {
            let reply_to = reply_to
                .parse::<Mailbox>()
                .map_err(|e| AppError::validation(format!("Invalid reply-to address: {}", e)))?;
            builder = builder.reply_to(reply_to);
        }

        let message = builder
            .body(email.body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            log::error!("❌ SMTP delivery to {} failed: {}", email.to, e);
            AppError::Internal(format!("SMTP delivery failed: {}", e))
        })?;

        log::info!("📧 Email sent to {}", email.to);
        Ok(())
    }
}

/// Development only: logs the email, including any OTP, instead of sending it.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        log::warn!(
            "📧 [console mailer] to: {} | subject: {}\n{}",
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}

/// Used when no SMTP credentials are configured and the console fallback is off.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        log::error!("❌ Email to {} dropped: delivery is not configured", email.to);
        Err(AppError::Unavailable("Email delivery is not configured".to_string()))
    }
}

pub fn build_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, String> {
    match (&config.smtp, config.mail_console_fallback) {
        (Some(smtp), _) => {
            log::info!("📧 SMTP mailer: {}:{} (secure: {})", smtp.host, smtp.port, smtp.secure);
            Ok(Arc::new(SmtpMailer::new(smtp)?))
        }
        (None, true) => {
            log::warn!("⚠️  SMTP not configured: MAIL_CONSOLE_FALLBACK is on, emails will be logged");
            Ok(Arc::new(ConsoleMailer))
        }
        (None, false) => {
            log::warn!("⚠️  SMTP not configured: outbound email is disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

pub fn otp_email(to: &str, name: &str, code: &str) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        subject: "Your verification code".to_string(),
        body: format!(
            "Hi {},\n\nYour verification code is {}. It expires in {} minutes.\n\nIf you did not sign up, you can ignore this email.\n",
            name.trim(),
            code,
            OTP_TTL_MINUTES
        ),
        reply_to: None,
    }
}
