use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppError;

pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Roles that pass the admin gate.
pub const ADMIN_ROLES: [&str; 2] = ["Admin", "SuperAdmin"];

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expires_in: Duration,
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,   // document id
    pub email: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        ADMIN_ROLES.contains(&self.role.as_str())
    }
}

/// What a token is issued for.
pub struct TokenSubject<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

pub fn issue_token(settings: &JwtSettings, subject: &TokenSubject) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.id.to_string(),
        email: subject.email.to_string(),
        role: subject.role.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + settings.expires_in).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| {
        log::error!("❌ Failed to sign token: {}", e);
        AppError::Internal(format!("Failed to generate token: {}", e))
    })
}

/// Expired, tampered and malformed tokens all fail the same way.
pub fn verify_token(settings: &JwtSettings, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::debug!("Token rejected: {}", e);
        AppError::Unauthorized(INVALID_TOKEN.to_string())
    })
}

/// Parses `JWT_EXPIRES_IN` values such as `7d`, `12h`, `30m`, `45s` or `3600`.
pub fn parse_expires_in(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let value: i64 = digits
        .parse()
        .map_err(|_| format!("Invalid JWT_EXPIRES_IN: {}", raw))?;
    if value <= 0 {
        return Err(format!("Invalid JWT_EXPIRES_IN: {}", raw));
    }

    match unit {
        "d" => Ok(Duration::days(value)),
        "h" => Ok(Duration::hours(value)),
        "m" => Ok(Duration::minutes(value)),
        "s" => Ok(Duration::seconds(value)),
        _ => Err(format!("Invalid JWT_EXPIRES_IN unit: {}", raw)),
    }
}
