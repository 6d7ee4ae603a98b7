use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use super::{patch::Patch, to_rfc3339};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Admin => "Admin",
        }
    }
}

/// Lead pipeline status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
pub enum UserStatus {
    #[default]
    New,
    Contacted,
    InProcess,
    Closed,
}

impl UserStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "New" => Some(UserStatus::New),
            "Contacted" => Some(UserStatus::Contacted),
            "InProcess" => Some(UserStatus::InProcess),
            "Closed" => Some(UserStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Local,
    Google,
}

/// Student / lead account (stored in `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash; None for OAuth-only accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default = "default_user_type")]
    pub user_type: String,
    #[serde(default)]
    pub auth_provider: AuthProvider,
    #[serde(default)]
    pub is_verified: bool,
    /// bcrypt hash of the pending signup code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_expires: Option<BsonDateTime>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

pub fn default_user_type() -> String {
    "student".to_string()
}

/// Admin-side lead creation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub preferred_country: Option<String>,
    pub qualification: Option<String>,
    pub resume_url: Option<String>,
    pub notes: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub user_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub interest: Patch<String>,
    #[serde(default)]
    pub preferred_country: Patch<String>,
    #[serde(default)]
    pub qualification: Patch<String>,
    #[serde(default)]
    pub resume_url: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub role: Patch<UserRole>,
    #[serde(default)]
    pub status: Patch<UserStatus>,
    #[serde(default)]
    pub user_type: Patch<String>,
    #[serde(default)]
    pub is_verified: Patch<bool>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub preferred_country: Option<String>,
    pub qualification: Option<String>,
    pub resume_url: Option<String>,
    pub notes: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub user_type: String,
    pub auth_provider: AuthProvider,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: u.name,
            email: u.email,
            phone: u.phone,
            interest: u.interest,
            preferred_country: u.preferred_country,
            qualification: u.qualification,
            resume_url: u.resume_url,
            notes: u.notes,
            role: u.role,
            status: u.status,
            user_type: u.user_type,
            auth_provider: u.auth_provider,
            is_verified: u.is_verified,
            created_at: to_rfc3339(&u.created_at),
            updated_at: to_rfc3339(&u.updated_at),
        }
    }
}
