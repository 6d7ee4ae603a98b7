use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use super::{patch::Patch, to_rfc3339};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "Admin",
            AdminRole::SuperAdmin => "SuperAdmin",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AdminStatus {
    #[default]
    Active,
    Inactive,
}

/// Back-office account (stored in `admins`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default)]
    pub role: AdminRole,
    #[serde(default)]
    pub status: AdminStatus,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<AdminRole>,
    pub status: Option<AdminStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminInput {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub role: Patch<AdminRole>,
    #[serde(default)]
    pub status: Patch<AdminStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Admin> for AdminResponse {
    fn from(a: Admin) -> Self {
        AdminResponse {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: a.name,
            email: a.email,
            role: a.role,
            status: a.status,
            created_at: to_rfc3339(&a.created_at),
            updated_at: to_rfc3339(&a.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub admin: AdminResponse,
}
