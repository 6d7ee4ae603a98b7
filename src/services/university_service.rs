use futures::stream::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

use crate::{
    database::{MongoDB, UNIVERSITIES},
    models::{
        parse_object_id, Course, CreateUniversityInput, ListQuery, Patch, University,
        UniversityResponse, UniversityStatus, UpdateBuilder, UpdateUniversityInput,
    },
    utils::{error::AppError, validation::require_non_empty},
};

const SORTABLE: &[&str] = &["createdAt", "updatedAt", "name", "country", "status"];

fn validate_courses(courses: &[Course]) -> Result<(), AppError> {
    courses.iter().try_for_each(Course::validate)
}

pub async fn list_universities(db: &MongoDB, query: &ListQuery) -> Result<Vec<UniversityResponse>, AppError> {
    let mut filter = Document::new();
    if let Some(status) = &query.status {
        let status = UniversityStatus::parse(status)
            .ok_or_else(|| AppError::validation(format!("Unknown university status '{}'", status)))?;
        filter.insert("status", mongodb::bson::to_bson(&status)?);
    }

    let universities: Vec<University> = db
        .collection::<University>(UNIVERSITIES)
        .find(filter)
        .sort(query.sort_doc(SORTABLE)?)
        .await?
        .try_collect()
        .await?;

    Ok(universities.into_iter().map(UniversityResponse::from).collect())
}

pub async fn get_university(db: &MongoDB, id: &str) -> Result<UniversityResponse, AppError> {
    let id = parse_object_id(id, "University")?;
    db.collection::<University>(UNIVERSITIES)
        .find_one(doc! { "_id": id })
        .await?
        .map(UniversityResponse::from)
        .ok_or_else(|| AppError::not_found("University"))
}

pub async fn create_university(db: &MongoDB, input: CreateUniversityInput) -> Result<UniversityResponse, AppError> {
    require_non_empty("Name", &input.name)?;
    require_non_empty("Country", &input.country)?;
    require_non_empty("Location", &input.location)?;
    validate_courses(&input.courses)?;

    let now = BsonDateTime::now();
    let mut university = University {
        id: None,
        name: input.name.trim().to_string(),
        country: input.country.trim().to_string(),
        location: input.location.trim().to_string(),
        logo_url: input.logo_url,
        description: input.description,
        status: input.status.unwrap_or_default(),
        courses: input.courses,
        created_at: now,
        updated_at: now,
    };

    let inserted = db
        .collection::<University>(UNIVERSITIES)
        .insert_one(&university)
        .await?;
    university.id = inserted.inserted_id.as_object_id();

    log::info!("✅ University created: {} ({})", university.name, university.country);
    Ok(UniversityResponse::from(university))
}

fn university_update_doc(input: &UpdateUniversityInput) -> Result<Document, AppError> {
    let mut update = UpdateBuilder::new();

    for (label, patch) in [("Name", &input.name), ("Country", &input.country), ("Location", &input.location)] {
        if let Patch::Value(value) = patch {
            require_non_empty(label, value)?;
        }
    }
    if let Patch::Value(courses) = &input.courses {
        validate_courses(courses)?;
    }

    update.required("name", "Name", &input.name.clone().map(|v| v.trim().to_string()))?;
    update.required("country", "Country", &input.country.clone().map(|v| v.trim().to_string()))?;
    update.required("location", "Location", &input.location.clone().map(|v| v.trim().to_string()))?;
    update.optional("logoUrl", &input.logo_url)?;
    update.optional("description", &input.description)?;
    update.required("status", "Status", &input.status)?;
    update.required("courses", "Courses", &input.courses)?;

    Ok(update.build())
}

pub async fn update_university(
    db: &MongoDB,
    id: &str,
    input: UpdateUniversityInput,
) -> Result<UniversityResponse, AppError> {
    let id = parse_object_id(id, "University")?;
    let update = university_update_doc(&input)?;

    let updated = db
        .collection::<University>(UNIVERSITIES)
        .find_one_and_update(doc! { "_id": id }, update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::not_found("University"))?;

    log::info!("✏️  University updated: {}", updated.name);
    Ok(UniversityResponse::from(updated))
}

pub async fn delete_university(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let id = parse_object_id(id, "University")?;
    let result = db
        .collection::<University>(UNIVERSITIES)
        .delete_one(doc! { "_id": id })
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::not_found("University"));
    }
    log::info!("🗑️ University deleted: {}", id);
    Ok(true)
}
