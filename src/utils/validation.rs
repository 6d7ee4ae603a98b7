use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid");
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex is valid");
}

/// Emails are compared and stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn require_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", label)));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    require_non_empty("Email", email)?;
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    require_non_empty("Phone", phone)?;
    let compact: String = phone.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if !PHONE_RE.is_match(&compact) {
        return Err(AppError::validation("Invalid phone number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("jo@x.com").is_ok());
        assert!(validate_email("  Jo@X.com ").is_ok());
        assert!(validate_email("jo@x").is_err());
        assert!(validate_email("").is_err());
        assert_eq!(normalize_email("  Jo@X.com "), "jo@x.com");
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("9999999999").is_ok());
        assert!(validate_phone("+91 99999-99999").is_ok());
        assert!(validate_phone("12ab").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
    }
}
