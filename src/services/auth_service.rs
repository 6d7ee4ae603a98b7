use chrono::Utc;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    database::{MongoDB, USERS},
    models::{default_user_type, AuthProvider, User, UserResponse, UserRole, UserStatus},
    services::mail_service::{otp_email, Mailer},
    utils::{
        error::{is_duplicate_key, AppError},
        hashing::{hash_secret, verify_secret},
        jwt::{issue_token, Claims, JwtSettings, TokenSubject},
        otp::{generate_otp, otp_expiry, pending_otp_hash},
        validation::{normalize_email, require_non_empty, validate_email, validate_password, validate_phone},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_type: Option<String>,
    pub interest: Option<String>,
    pub preferred_country: Option<String>,
    pub qualification: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GoogleAuthRequest {
    /// Google ID token from the sign-in button
    pub credential: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Subset of Google's tokeninfo payload
#[derive(Debug, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    pub email: Option<String>,
    /// Google sends `"true"` as a string for ID tokens.
    pub email_verified: Option<serde_json::Value>,
    pub name: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct GoogleIdentity {
    pub email: String,
    pub name: String,
}

pub fn validate_signup(request: &SignupRequest) -> Result<(), AppError> {
    require_non_empty("Name", &request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;
    validate_phone(&request.phone)?;
    if let Some(user_type) = &request.user_type {
        require_non_empty("User type", user_type)?;
    }
    Ok(())
}

fn user_token(jwt: &JwtSettings, user: &User) -> Result<String, AppError> {
    let id = user
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| AppError::Internal("User document without _id".to_string()))?;

    issue_token(
        jwt,
        &TokenSubject {
            id: &id,
            email: &user.email,
            role: user.role.as_str(),
        },
    )
}

fn auth_response(jwt: &JwtSettings, message: &str, user: User) -> Result<AuthResponse, AppError> {
    let token = user_token(jwt, &user)?;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: UserResponse::from(user),
    })
}

/// Creates a pending account and emails its verification code.
pub async fn signup(
    db: &MongoDB,
    mailer: &dyn Mailer,
    request: &SignupRequest,
) -> Result<SignupResponse, AppError> {
    validate_signup(request)?;

    let users = db.collection::<User>(USERS);
    let email = normalize_email(&request.email);

    if users.find_one(doc! { "email": &email }).await?.is_some() {
        return Err(AppError::Conflict("User already exists with this email".to_string()));
    }

    let password = hash_secret(&request.password).await?;
    let code = generate_otp();
    let otp_hash = hash_secret(&code).await?;
    let now = BsonDateTime::now();

    let user = User {
        id: None,
        name: request.name.trim().to_string(),
        email: email.clone(),
        password: Some(password),
        phone: Some(request.phone.trim().to_string()),
        interest: request.interest.clone(),
        preferred_country: request.preferred_country.clone(),
        qualification: request.qualification.clone(),
        resume_url: None,
        notes: None,
        role: UserRole::Student,
        status: UserStatus::New,
        user_type: request
            .user_type
            .as_deref()
            .map(|t| t.trim().to_string())
            .unwrap_or_else(default_user_type),
        auth_provider: AuthProvider::Local,
        is_verified: false,
        otp: Some(otp_hash),
        otp_expires: Some(otp_expiry(Utc::now())),
        created_at: now,
        updated_at: now,
    };

    let inserted = users.insert_one(&user).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::Conflict("User already exists with this email".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    if let Err(e) = mailer.send(otp_email(&email, &user.name, &code)).await {
        log::error!("❌ Verification email to {} failed: {}", email, e);
        // Roll back so the address can sign up again.
        if let Err(e) = users.delete_one(doc! { "_id": inserted.inserted_id }).await {
            log::error!("❌ Failed to remove pending user {}: {}", email, e);
        }
        return Err(AppError::Unavailable("Failed to send verification email".to_string()));
    }

    log::info!("✅ Pending signup created: {}", email);

    Ok(SignupResponse {
        message: "Signup successful. Please verify the OTP sent to your email.".to_string(),
        email,
    })
}

/// Confirms the signup code, marks the user verified and logs them in.
pub async fn verify_otp(
    db: &MongoDB,
    jwt: &JwtSettings,
    request: &VerifyOtpRequest,
) -> Result<AuthResponse, AppError> {
    validate_email(&request.email)?;
    require_non_empty("OTP", &request.otp)?;

    let users = db.collection::<User>(USERS);
    let email = normalize_email(&request.email);

    let user = users
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let otp_hash = pending_otp_hash(&user, Utc::now())?;

    if !verify_secret(request.otp.trim(), otp_hash).await? {
        log::warn!("❌ Wrong OTP for {}", email);
        return Err(AppError::domain("Invalid OTP"));
    }

    let id = user
        .id
        .ok_or_else(|| AppError::Internal("User document without _id".to_string()))?;

    let verified = users
        .find_one_and_update(
            doc! { "_id": id, "isVerified": false },
            doc! {
                "$set": { "isVerified": true, "updatedAt": BsonDateTime::now() },
                "$unset": { "otp": "", "otpExpires": "" },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::domain("User is already verified"))?;

    log::info!("✅ Email verified: {}", email);

    auth_response(jwt, "Email verified successfully", verified)
}

/// Unknown email, OAuth-only account and wrong password all fail identically.
pub async fn login(db: &MongoDB, jwt: &JwtSettings, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    require_non_empty("Email", &request.email)?;
    require_non_empty("Password", &request.password)?;

    let users = db.collection::<User>(USERS);
    let email = normalize_email(&request.email);

    let user = users
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let stored = user
        .password
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_secret(&request.password, stored).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.is_verified {
        return Err(AppError::Forbidden(
            "Please verify your email before logging in".to_string(),
        ));
    }

    auth_response(jwt, "Login successful", user)
}

pub fn check_google_identity(info: GoogleTokenInfo, client_id: &str) -> Result<GoogleIdentity, AppError> {
    if info.aud != client_id {
        return Err(AppError::Unauthorized("Invalid Google credential".to_string()));
    }

    let verified = match &info.email_verified {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        _ => false,
    };

    let email = info
        .email
        .filter(|_| verified)
        .ok_or_else(|| AppError::Unauthorized("Google account email is not verified".to_string()))?;

    let email = normalize_email(&email);
    let name = info
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(GoogleIdentity { email, name })
}

async fn fetch_google_token_info(credential: &str) -> Result<GoogleTokenInfo, AppError> {
    let url = format!(
        "{}?id_token={}",
        GOOGLE_TOKENINFO_URL,
        urlencoding::encode(credential)
    );

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| {
            log::error!("❌ Google tokeninfo request failed: {}", e);
            AppError::Unavailable("Could not reach Google".to_string())
        })?;

    if !response.status().is_success() {
        log::warn!("❌ Google rejected credential: HTTP {}", response.status());
        return Err(AppError::Unauthorized("Invalid Google credential".to_string()));
    }

    response.json::<GoogleTokenInfo>().await.map_err(|e| {
        log::error!("❌ Unexpected tokeninfo payload: {}", e);
        AppError::Unauthorized("Invalid Google credential".to_string())
    })
}

/// Signs in with a Google ID token, creating the account on first use.
pub async fn google_login(
    db: &MongoDB,
    config: &AppConfig,
    request: &GoogleAuthRequest,
) -> Result<AuthResponse, AppError> {
    let client_id = config
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::Unavailable("Google login is not configured".to_string()))?;
    require_non_empty("Credential", &request.credential)?;

    let info = fetch_google_token_info(&request.credential).await?;
    let identity = check_google_identity(info, client_id)?;

    let users = db.collection::<User>(USERS);

    if let Some(existing) = users.find_one(doc! { "email": &identity.email }).await? {
        // Google has proven ownership of the address.
        let user = if existing.is_verified {
            existing
        } else {
            users
                .find_one_and_update(
                    doc! { "email": &identity.email },
                    doc! {
                        "$set": { "isVerified": true, "updatedAt": BsonDateTime::now() },
                        "$unset": { "otp": "", "otpExpires": "" },
                    },
                )
                .return_document(ReturnDocument::After)
                .await?
                .ok_or_else(|| AppError::not_found("User"))?
        };
        log::info!("✅ Google login: {}", identity.email);
        return auth_response(&config.jwt, "Login successful", user);
    }

    let now = BsonDateTime::now();
    let mut user = User {
        id: None,
        name: identity.name,
        email: identity.email.clone(),
        password: None,
        phone: None,
        interest: None,
        preferred_country: None,
        qualification: None,
        resume_url: None,
        notes: None,
        role: UserRole::Student,
        status: UserStatus::New,
        user_type: default_user_type(),
        auth_provider: AuthProvider::Google,
        is_verified: true,
        otp: None,
        otp_expires: None,
        created_at: now,
        updated_at: now,
    };

    let inserted = users.insert_one(&user).await?;
    user.id = inserted.inserted_id.as_object_id();

    log::info!("✅ Google account created: {}", identity.email);

    auth_response(&config.jwt, "Login successful", user)
}

pub async fn current_user(db: &MongoDB, claims: &Claims) -> Result<UserResponse, AppError> {
    let id = crate::models::parse_object_id(&claims.sub, "User")?;
    db.collection::<User>(USERS)
        .find_one(doc! { "_id": id })
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| AppError::not_found("User"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::live_handle;
    use crate::services::mail_service::testing::RecordingMailer;
    use crate::utils::jwt::verify_token;

    fn jo_signup() -> SignupRequest {
        SignupRequest {
            name: "Jo Doe".into(),
            email: "jo@x.com".into(),
            password: "secret1".into(),
            phone: "9999999999".into(),
            user_type: Some("student".into()),
            interest: None,
            preferred_country: None,
            qualification: None,
        }
    }

    fn jwt() -> JwtSettings {
        crate::config::test_config().jwt
    }

    fn code_from(mailer: &RecordingMailer) -> String {
        let body = mailer.last().expect("an email was sent").body;
        body.split_whitespace()
            .find(|w| w.trim_end_matches('.').len() == 6 && w.trim_end_matches('.').chars().all(|c| c.is_ascii_digit()))
            .map(|w| w.trim_end_matches('.').to_string())
            .expect("code present in body")
    }

    #[test]
    fn test_signup_validation() {
        assert!(validate_signup(&jo_signup()).is_ok());

        let mut bad = jo_signup();
        bad.password = "12345".into();
        assert_eq!(
            validate_signup(&bad).unwrap_err().to_string(),
            "Password must be at least 6 characters"
        );

        let mut bad = jo_signup();
        bad.name = " ".into();
        assert_eq!(validate_signup(&bad).unwrap_err().to_string(), "Name is required");
    }

    #[test]
    fn test_google_identity_checks_audience_and_verification() {
        let info = |aud: &str, verified: serde_json::Value| GoogleTokenInfo {
            aud: aud.into(),
            email: Some("Jo@Gmail.com".into()),
            email_verified: Some(verified),
            name: None,
        };

        let ok = check_google_identity(info("client-1", "true".into()), "client-1").unwrap();
        assert_eq!(ok, GoogleIdentity { email: "jo@gmail.com".into(), name: "jo".into() });

        assert!(check_google_identity(info("client-2", "true".into()), "client-1").is_err());
        assert!(check_google_identity(info("client-1", "false".into()), "client-1").is_err());
        assert!(check_google_identity(info("client-1", true.into()), "client-1").is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_signup_then_verify() {
        let db = live_handle().await;
        let mailer = RecordingMailer::default();

        let response = signup(&db, &mailer, &jo_signup()).await.unwrap();
        assert_eq!(response.email, "jo@x.com");

        let pending = db
            .collection::<User>(USERS)
            .find_one(doc! { "email": "jo@x.com" })
            .await
            .unwrap()
            .unwrap();
        assert!(!pending.is_verified);
        let ttl = pending.otp_expires.unwrap().timestamp_millis() - pending.created_at.timestamp_millis();
        assert!((ttl - 600_000).abs() < 5_000);

        let again = signup(&db, &mailer, &jo_signup()).await.unwrap_err();
        assert!(matches!(again, AppError::Conflict(_)));

        let code = code_from(&mailer);
        let wrong = if code == "111111" { "222222" } else { "111111" };
        let err = verify_otp(&db, &jwt(), &VerifyOtpRequest { email: "jo@x.com".into(), otp: wrong.into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP");

        let verified = verify_otp(&db, &jwt(), &VerifyOtpRequest { email: "JO@x.com".into(), otp: code })
            .await
            .unwrap();
        assert!(verified.user.is_verified);
        assert_eq!(verify_token(&jwt(), &verified.token).unwrap().email, "jo@x.com");

        let stored = db
            .collection::<User>(USERS)
            .find_one(doc! { "email": "jo@x.com" })
            .await
            .unwrap()
            .unwrap();
        assert!(stored.otp.is_none());
        assert!(stored.otp_expires.is_none());

        db.database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_expired_code_leaves_user_unverified() {
        let db = live_handle().await;
        let mailer = RecordingMailer::default();
        signup(&db, &mailer, &jo_signup()).await.unwrap();
        let code = code_from(&mailer);

        db.collection::<User>(USERS)
            .update_one(
                doc! { "email": "jo@x.com" },
                doc! { "$set": { "otpExpires": BsonDateTime::from_millis(0) } },
            )
            .await
            .unwrap();

        let err = verify_otp(&db, &jwt(), &VerifyOtpRequest { email: "jo@x.com".into(), otp: code })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OTP has expired");

        let stored = db
            .collection::<User>(USERS)
            .find_one(doc! { "email": "jo@x.com" })
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_verified);

        db.database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_login_does_not_enumerate_emails() {
        let db = live_handle().await;
        let mailer = RecordingMailer::default();
        signup(&db, &mailer, &jo_signup()).await.unwrap();
        let code = code_from(&mailer);
        verify_otp(&db, &jwt(), &VerifyOtpRequest { email: "jo@x.com".into(), otp: code })
            .await
            .unwrap();

        let unknown = login(&db, &jwt(), &LoginRequest { email: "nobody@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        let wrong = login(&db, &jwt(), &LoginRequest { email: "jo@x.com".into(), password: "secret2".into() })
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), "Invalid credentials");
        assert_eq!(unknown, wrong);

        let ok = login(&db, &jwt(), &LoginRequest { email: "jo@x.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert_eq!(ok.user.email, "jo@x.com");

        db.database().drop().await.unwrap();
    }
}
