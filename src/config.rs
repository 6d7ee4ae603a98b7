use std::env;

use crate::utils::jwt::{parse_expires_in, JwtSettings};

/// SMTP credentials. Present only when host, user and password are all set.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub jwt: JwtSettings,
    pub google_client_id: Option<String>,
    pub smtp: Option<SmtpSettings>,
    pub mail_console_fallback: bool,
    pub contact_email: Option<String>,
    pub partners_email: Option<String>,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    /// Rate limits key on forwarded client addresses instead of the peer.
    pub trust_proxy: bool,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenv().ok()`.
    pub fn from_env() -> Result<Self, String> {
        let mongodb_uri = required("MONGODB_URI")?;
        let secret = required("JWT_SECRET")?;
        let expires_in = parse_expires_in(&var_or("JWT_EXPIRES_IN", "7d"))?;

        let smtp = match (optional("SMTP_HOST"), optional("SMTP_USER"), optional("SMTP_PASS")) {
            (Some(host), Some(user), Some(pass)) => {
                let port = var_or("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|e| format!("Invalid SMTP_PORT: {}", e))?;
                let from = optional("SMTP_FROM").unwrap_or_else(|| user.clone());
                Some(SmtpSettings {
                    host,
                    port,
                    secure: flag("SMTP_SECURE"),
                    user,
                    pass,
                    from,
                })
            }
            _ => None,
        };

        let fallback_recipient = optional("SMTP_FROM");

        let seed_admin = match (optional("SEED_ADMIN_EMAIL"), optional("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                name: var_or("SEED_ADMIN_NAME", "Super Admin"),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "4000")
                .parse()
                .map_err(|e| format!("Invalid PORT: {}", e))?,
            mongodb_uri,
            jwt: JwtSettings { secret, expires_in },
            google_client_id: optional("GOOGLE_CLIENT_ID"),
            smtp,
            mail_console_fallback: flag("MAIL_CONSOLE_FALLBACK"),
            contact_email: optional("CONTACT_EMAIL").or_else(|| fallback_recipient.clone()),
            partners_email: optional("PARTNERS_EMAIL").or(fallback_recipient),
            cors_origins: var_or("CORS_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cookie_secure: flag("COOKIE_SECURE"),
            trust_proxy: flag("TRUST_PROXY"),
            seed_admin,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String, String> {
    optional(key).ok_or_else(|| format!("{} must be set", key))
}

fn var_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| {
        log::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn flag(key: &str) -> bool {
    matches!(
        optional(key).map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 4000,
        mongodb_uri: "mongodb://127.0.0.1:27017/consultancy_test".into(),
        jwt: JwtSettings {
            secret: "test-secret".into(),
            expires_in: chrono::Duration::days(7),
        },
        google_client_id: None,
        smtp: None,
        mail_console_fallback: true,
        contact_email: Some("contact@example.com".into()),
        partners_email: Some("partners@example.com".into()),
        cors_origins: vec!["http://localhost:3000".into()],
        cookie_secure: false,
        trust_proxy: false,
        seed_admin: None,
    }
}
