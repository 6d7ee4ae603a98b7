use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use super::{patch::Patch, to_rfc3339};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "Open",
            JobStatus::Closed => "Closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Open" => Some(JobStatus::Open),
            "Closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

/// Append-only; lives inside its job posting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: String,
    pub applied_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub location: String,
    pub description: String,
    pub experience_required: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub applications: Vec<Application>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobInput {
    pub title: String,
    pub location: String,
    pub description: String,
    pub experience_required: String,
    pub salary: Option<String>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobInput {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub location: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub experience_required: Patch<String>,
    #[serde(default)]
    pub salary: Patch<String>,
    #[serde(default)]
    pub status: Patch<JobStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyForJobInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: String,
    pub applied_at: String,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        ApplicationResponse {
            name: a.name,
            email: a.email,
            phone: a.phone,
            resume_url: a.resume_url,
            applied_at: to_rfc3339(&a.applied_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub location: String,
    pub description: String,
    pub experience_required: String,
    pub salary: Option<String>,
    pub status: JobStatus,
    pub application_count: usize,
    /// Only populated for admin callers; applicant details are not public.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<ApplicationResponse>>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobResponse {
    pub fn from_job(job: Job, with_applications: bool) -> Self {
        let application_count = job.applications.len();
        let applications = with_applications
            .then(|| job.applications.into_iter().map(ApplicationResponse::from).collect());

        JobResponse {
            id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: job.title,
            location: job.location,
            description: job.description,
            experience_required: job.experience_required,
            salary: job.salary,
            status: job.status,
            application_count,
            applications,
            created_at: to_rfc3339(&job.created_at),
            updated_at: to_rfc3339(&job.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_applicant() -> Job {
        let now = BsonDateTime::now();
        Job {
            id: Some(ObjectId::new()),
            title: "Counsellor".into(),
            location: "Delhi".into(),
            description: "Guide students".into(),
            experience_required: "2 years".into(),
            salary: None,
            status: JobStatus::Open,
            applications: vec![Application {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                phone: "9999999999".into(),
                resume_url: "https://cv.example/ana.pdf".into(),
                applied_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_view_hides_applicants() {
        let public = JobResponse::from_job(job_with_applicant(), false);
        assert_eq!(public.application_count, 1);
        assert!(public.applications.is_none());

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("applications").is_none());
        assert_eq!(json["applicationCount"], 1);
    }

    #[test]
    fn test_admin_view_lists_applicants() {
        let admin = JobResponse::from_job(job_with_applicant(), true);
        assert_eq!(admin.applications.unwrap()[0].email, "ana@x.com");
    }
}
