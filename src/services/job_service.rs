use futures::stream::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

use crate::{
    database::{MongoDB, JOBS},
    models::{
        parse_object_id, Application, ApplyForJobInput, CreateJobInput, Job, JobResponse, JobStatus,
        ListQuery, Patch, UpdateBuilder, UpdateJobInput,
    },
    utils::{
        error::AppError,
        validation::{normalize_email, require_non_empty, validate_email, validate_phone},
    },
};

const SORTABLE: &[&str] = &["createdAt", "updatedAt", "title", "location", "status"];
const CLOSED: &str = "This job is no longer accepting applications";

/// Public callers only see open postings unless they ask for a status.
pub async fn list_jobs(db: &MongoDB, query: &ListQuery, is_admin: bool) -> Result<Vec<JobResponse>, AppError> {
    let mut filter = Document::new();
    match query.status.as_deref() {
        Some(status) => {
            let status = JobStatus::parse(status)
                .ok_or_else(|| AppError::validation(format!("Unknown job status '{}'", status)))?;
            filter.insert("status", status.as_str());
        }
        None if !is_admin => {
            filter.insert("status", JobStatus::Open.as_str());
        }
        None => {}
    }

    let jobs: Vec<Job> = db
        .collection::<Job>(JOBS)
        .find(filter)
        .sort(query.sort_doc(SORTABLE)?)
        .await?
        .try_collect()
        .await?;

    Ok(jobs.into_iter().map(|job| JobResponse::from_job(job, is_admin)).collect())
}

pub async fn get_job(db: &MongoDB, id: &str, is_admin: bool) -> Result<JobResponse, AppError> {
    let id = parse_object_id(id, "Job")?;
    db.collection::<Job>(JOBS)
        .find_one(doc! { "_id": id })
        .await?
        .map(|job| JobResponse::from_job(job, is_admin))
        .ok_or_else(|| AppError::not_found("Job"))
}

pub async fn create_job(db: &MongoDB, input: CreateJobInput) -> Result<JobResponse, AppError> {
    require_non_empty("Title", &input.title)?;
    require_non_empty("Location", &input.location)?;
    require_non_empty("Description", &input.description)?;
    require_non_empty("Experience required", &input.experience_required)?;

    let now = BsonDateTime::now();
    let mut job = Job {
        id: None,
        title: input.title.trim().to_string(),
        location: input.location.trim().to_string(),
        description: input.description,
        experience_required: input.experience_required.trim().to_string(),
        salary: input.salary,
        status: input.status.unwrap_or_default(),
        applications: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let inserted = db.collection::<Job>(JOBS).insert_one(&job).await?;
    job.id = inserted.inserted_id.as_object_id();

    log::info!("✅ Job posted: {} ({})", job.title, job.location);
    Ok(JobResponse::from_job(job, true))
}

fn job_update_doc(input: &UpdateJobInput) -> Result<Document, AppError> {
    let required_text = [
        ("title", "Title", &input.title),
        ("location", "Location", &input.location),
        ("description", "Description", &input.description),
        ("experienceRequired", "Experience required", &input.experience_required),
    ];

    let mut update = UpdateBuilder::new();
    for (field, label, patch) in required_text {
        if let Patch::Value(value) = patch {
            require_non_empty(label, value)?;
        }
        update.required(field, label, patch)?;
    }
    update.optional("salary", &input.salary)?;
    update.required("status", "Status", &input.status)?;

    Ok(update.build())
}

/// Applications are never touched here; they only grow through `apply_for_job`.
pub async fn update_job(db: &MongoDB, id: &str, input: UpdateJobInput) -> Result<JobResponse, AppError> {
    let id = parse_object_id(id, "Job")?;
    let update = job_update_doc(&input)?;

    let updated = db
        .collection::<Job>(JOBS)
        .find_one_and_update(doc! { "_id": id }, update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::not_found("Job"))?;

    log::info!("✏️  Job updated: {} [{}]", updated.title, updated.status.as_str());
    Ok(JobResponse::from_job(updated, true))
}

pub async fn delete_job(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let id = parse_object_id(id, "Job")?;
    let result = db.collection::<Job>(JOBS).delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::not_found("Job"));
    }
    log::info!("🗑️ Job deleted: {}", id);
    Ok(true)
}

pub fn validate_application(input: &ApplyForJobInput) -> Result<(), AppError> {
    require_non_empty("Name", &input.name)?;
    validate_email(&input.email)?;
    validate_phone(&input.phone)?;
    require_non_empty("Resume URL", &input.resume_url)
}

/// Appends one application if, and only if, the job is still open. The status
/// check and the push are a single conditional update.
pub async fn apply_for_job(db: &MongoDB, job_id: &str, input: ApplyForJobInput) -> Result<JobResponse, AppError> {
    let id = parse_object_id(job_id, "Job")?;
    validate_application(&input)?;

    let application = Application {
        name: input.name.trim().to_string(),
        email: normalize_email(&input.email),
        phone: input.phone.trim().to_string(),
        resume_url: input.resume_url.trim().to_string(),
        applied_at: BsonDateTime::now(),
    };

    let jobs = db.collection::<Job>(JOBS);
    let updated = jobs
        .find_one_and_update(
            doc! { "_id": id, "status": JobStatus::Open.as_str() },
            doc! {
                "$push": { "applications": mongodb::bson::to_bson(&application)? },
                "$set": { "updatedAt": BsonDateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?;

    match updated {
        Some(job) => {
            log::info!("📨 Application received for '{}' from {}", job.title, application.email);
            Ok(JobResponse::from_job(job, false))
        }
        None => match jobs.find_one(doc! { "_id": id }).await? {
            Some(_) => Err(AppError::domain(CLOSED)),
            None => Err(AppError::not_found("Job")),
        },
    }
}
