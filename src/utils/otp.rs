use chrono::{DateTime, Duration, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use rand::Rng;

use crate::models::User;
use crate::utils::error::AppError;

pub const OTP_TTL_MINUTES: i64 = 10;

/// Six-digit numeric signup code.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

pub fn otp_expiry(now: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis((now + Duration::minutes(OTP_TTL_MINUTES)).timestamp_millis())
}

/// Returns the stored OTP hash if the user is still waiting for verification
/// and the code has not expired at `now`.
pub fn pending_otp_hash(user: &User, now: DateTime<Utc>) -> Result<&str, AppError> {
    if user.is_verified {
        return Err(AppError::domain("User is already verified"));
    }

    let hash = user
        .otp
        .as_deref()
        .ok_or_else(|| AppError::domain("No OTP found. Please sign up again"))?;

    let expires = user
        .otp_expires
        .ok_or_else(|| AppError::domain("No OTP found. Please sign up again"))?;

    if expires.timestamp_millis() <= now.timestamp_millis() {
        return Err(AppError::domain("OTP has expired"));
    }

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthProvider, UserRole, UserStatus};

    fn pending_user(now: DateTime<Utc>) -> User {
        User {
            id: None,
            name: "Jo Doe".into(),
            email: "jo@x.com".into(),
            password: Some("$2b$hash".into()),
            phone: Some("9999999999".into()),
            interest: None,
            preferred_country: None,
            qualification: None,
            resume_url: None,
            notes: None,
            role: UserRole::Student,
            status: UserStatus::New,
            user_type: "student".into(),
            auth_provider: AuthProvider::Local,
            is_verified: false,
            otp: Some("$2b$otp-hash".into()),
            otp_expires: Some(otp_expiry(now)),
            created_at: BsonDateTime::now(),
            updated_at: BsonDateTime::now(),
        }
    }

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_expiry_is_ten_minutes_ahead() {
        let now = Utc::now();
        let expires = otp_expiry(now);
        assert_eq!(
            expires.timestamp_millis() - now.timestamp_millis(),
            10 * 60 * 1000
        );
    }

    #[test]
    fn test_pending_code_accepted_before_expiry() {
        let issued = Utc::now();
        let user = pending_user(issued);
        let hash = pending_otp_hash(&user, issued + Duration::minutes(9)).unwrap();
        assert_eq!(hash, "$2b$otp-hash");
    }

    #[test]
    fn test_code_rejected_at_and_after_expiry() {
        let issued = Utc::now();
        let user = pending_user(issued);
        let at_expiry = pending_otp_hash(&user, issued + Duration::minutes(10)).unwrap_err();
        assert_eq!(at_expiry.to_string(), "OTP has expired");
        assert!(pending_otp_hash(&user, issued + Duration::hours(1)).is_err());
    }

    #[test]
    fn test_verified_or_missing_code_rejected() {
        let now = Utc::now();
        let mut verified = pending_user(now);
        verified.is_verified = true;
        assert_eq!(
            pending_otp_hash(&verified, now).unwrap_err().to_string(),
            "User is already verified"
        );

        let mut cleared = pending_user(now);
        cleared.otp = None;
        cleared.otp_expires = None;
        assert_eq!(
            pending_otp_hash(&cleared, now).unwrap_err().to_string(),
            "No OTP found. Please sign up again"
        );
    }
}
