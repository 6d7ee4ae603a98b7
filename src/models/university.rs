use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use super::{patch::Patch, to_rfc3339};
use crate::utils::{error::AppError, validation::require_non_empty};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UniversityStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl UniversityStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Active" => Some(UniversityStatus::Active),
            "Inactive" => Some(UniversityStatus::Inactive),
            "Pending" => Some(UniversityStatus::Pending),
            _ => None,
        }
    }
}

/// Embedded in its university; no identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub name: String,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition_fee: Option<f64>,
    pub intake_month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Course {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("Course name", &self.name)?;
        require_non_empty("Course level", &self.level)?;
        require_non_empty("Course intake month", &self.intake_month)?;
        if matches!(self.tuition_fee, Some(fee) if fee < 0.0 || !fee.is_finite()) {
            return Err(AppError::validation("Tuition fee must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub country: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: UniversityStatus,
    #[serde(default)]
    pub courses: Vec<Course>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUniversityInput {
    pub name: String,
    pub country: String,
    pub location: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<UniversityStatus>,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUniversityInput {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub country: Patch<String>,
    #[serde(default)]
    pub location: Patch<String>,
    #[serde(default)]
    pub logo_url: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status: Patch<UniversityStatus>,
    #[serde(default)]
    pub courses: Patch<Vec<Course>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityResponse {
    pub id: String,
    pub name: String,
    pub country: String,
    pub location: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub status: UniversityStatus,
    pub courses: Vec<Course>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<University> for UniversityResponse {
    fn from(u: University) -> Self {
        UniversityResponse {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: u.name,
            country: u.country,
            location: u.location,
            logo_url: u.logo_url,
            description: u.description,
            status: u.status,
            courses: u.courses,
            created_at: to_rfc3339(&u.created_at),
            updated_at: to_rfc3339(&u.updated_at),
        }
    }
}
