use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

use crate::{
    database::{MongoDB, USERS},
    models::{
        default_user_type, parse_object_id, AuthProvider, CreateUserInput, ListQuery, Patch,
        UpdateBuilder, UpdateUserInput, User, UserResponse, UserStatus,
    },
    utils::{
        error::{is_duplicate_key, AppError},
        hashing::hash_secret,
        validation::{normalize_email, require_non_empty, validate_email, validate_password, validate_phone},
    },
};

const SORTABLE: &[&str] = &["createdAt", "updatedAt", "name", "email", "status", "preferredCountry"];
const DUPLICATE_EMAIL: &str = "User already exists with this email";

fn duplicate_or(e: mongodb::error::Error) -> AppError {
    if is_duplicate_key(&e) {
        AppError::Conflict(DUPLICATE_EMAIL.to_string())
    } else {
        AppError::from(e)
    }
}

async fn ensure_email_free(db: &MongoDB, email: &str, except: Option<ObjectId>) -> Result<(), AppError> {
    let mut filter = doc! { "email": email };
    if let Some(id) = except {
        filter.insert("_id", doc! { "$ne": id });
    }
    if db.collection::<User>(USERS).find_one(filter).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
    }
    Ok(())
}

pub async fn list_users(db: &MongoDB, query: &ListQuery) -> Result<Vec<UserResponse>, AppError> {
    let mut filter = Document::new();
    if let Some(status) = &query.status {
        let status = UserStatus::parse(status)
            .ok_or_else(|| AppError::validation(format!("Unknown user status '{}'", status)))?;
        filter.insert("status", mongodb::bson::to_bson(&status)?);
    }

    let users: Vec<User> = db
        .collection::<User>(USERS)
        .find(filter)
        .sort(query.sort_doc(SORTABLE)?)
        .await?
        .try_collect()
        .await?;

    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn get_user(db: &MongoDB, id: &str) -> Result<UserResponse, AppError> {
    let id = parse_object_id(id, "User")?;
    db.collection::<User>(USERS)
        .find_one(doc! { "_id": id })
        .await?
        .map(UserResponse::from)
        .ok_or_else(|| AppError::not_found("User"))
}

/// Back-office lead creation. Such accounts skip the OTP step.
pub async fn create_user(db: &MongoDB, input: CreateUserInput) -> Result<UserResponse, AppError> {
    require_non_empty("Name", &input.name)?;
    validate_email(&input.email)?;
    if let Some(phone) = &input.phone {
        validate_phone(phone)?;
    }

    let password = match &input.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash_secret(password).await?)
        }
        None => None,
    };

    let email = normalize_email(&input.email);
    ensure_email_free(db, &email, None).await?;

    let now = BsonDateTime::now();
    let mut user = User {
        id: None,
        name: input.name.trim().to_string(),
        email,
        password,
        phone: input.phone,
        interest: input.interest,
        preferred_country: input.preferred_country,
        qualification: input.qualification,
        resume_url: input.resume_url,
        notes: input.notes,
        role: input.role.unwrap_or_default(),
        status: input.status.unwrap_or_default(),
        user_type: input.user_type.unwrap_or_else(default_user_type),
        auth_provider: AuthProvider::Local,
        is_verified: true,
        otp: None,
        otp_expires: None,
        created_at: now,
        updated_at: now,
    };

    let inserted = db
        .collection::<User>(USERS)
        .insert_one(&user)
        .await
        .map_err(duplicate_or)?;
    user.id = inserted.inserted_id.as_object_id();

    log::info!("✅ User created: {}", user.email);
    Ok(UserResponse::from(user))
}

async fn user_update_doc(input: &UpdateUserInput) -> Result<Document, AppError> {
    let mut update = UpdateBuilder::new();

    if let Patch::Value(name) = &input.name {
        require_non_empty("Name", name)?;
    }
    update.required("name", "Name", &input.name.clone().map(|n| n.trim().to_string()))?;

    if let Patch::Value(email) = &input.email {
        validate_email(email)?;
    }
    update.required("email", "Email", &input.email.clone().map(|e| normalize_email(&e)))?;

    // Null clears the password, leaving an OAuth-only account.
    match &input.password {
        Patch::Missing => {}
        Patch::Null => {
            update.optional::<String>("password", &Patch::Null)?;
        }
        Patch::Value(password) => {
            validate_password(password)?;
            update.set("password", hash_secret(password).await?);
        }
    }

    if let Patch::Value(phone) = &input.phone {
        validate_phone(phone)?;
    }
    update.optional("phone", &input.phone)?;
    update.optional("interest", &input.interest)?;
    update.optional("preferredCountry", &input.preferred_country)?;
    update.optional("qualification", &input.qualification)?;
    update.optional("resumeUrl", &input.resume_url)?;
    update.optional("notes", &input.notes)?;
    update.required("role", "Role", &input.role)?;
    update.required("status", "Status", &input.status)?;
    update.required("userType", "User type", &input.user_type)?;
    update.required("isVerified", "Verification flag", &input.is_verified)?;

    Ok(update.build())
}

pub async fn update_user(db: &MongoDB, id: &str, input: UpdateUserInput) -> Result<UserResponse, AppError> {
    let id = parse_object_id(id, "User")?;

    if let Patch::Value(email) = &input.email {
        ensure_email_free(db, &normalize_email(email), Some(id)).await?;
    }

    let update = user_update_doc(&input).await?;

    let updated = db
        .collection::<User>(USERS)
        .find_one_and_update(doc! { "_id": id }, update)
        .return_document(ReturnDocument::After)
        .await
        .map_err(duplicate_or)?
        .ok_or_else(|| AppError::not_found("User"))?;

    log::info!("✏️  User updated: {}", updated.email);
    Ok(UserResponse::from(updated))
}

pub async fn delete_user(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let id = parse_object_id(id, "User")?;
    let result = db.collection::<User>(USERS).delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::not_found("User"));
    }
    log::info!("🗑️ User deleted: {}", id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::live_handle;

    #[tokio::test]
    async fn test_null_optional_field_is_unset() {
        let patch: UpdateUserInput =
            serde_json::from_str(r#"{"notes": null, "status": "Contacted"}"#).unwrap();
        let update = user_update_doc(&patch).await.unwrap();

        assert!(update.get_document("$unset").unwrap().contains_key("notes"));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "Contacted");
        assert!(!set.contains_key("phone"));
        assert!(!set.contains_key("name"));
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected() {
        let patch: UpdateUserInput = serde_json::from_str(r#"{"phone": "call me"}"#).unwrap();
        assert!(user_update_doc(&patch).await.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_partial_update_leaves_other_fields() {
        let db = live_handle().await;
        let created = create_user(
            &db,
            CreateUserInput {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                phone: Some("9999999999".into()),
                preferred_country: Some("Canada".into()),
                notes: Some("Wants MBA".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patch: UpdateUserInput = serde_json::from_str(r#"{"status": "InProcess"}"#).unwrap();
        let updated = update_user(&db, &created.id, patch).await.unwrap();
        assert_eq!(updated.status, UserStatus::InProcess);
        assert_eq!(updated.phone, created.phone);
        assert_eq!(updated.preferred_country, created.preferred_country);
        assert_eq!(updated.notes, created.notes);
        assert_eq!(updated.email, created.email);

        assert!(delete_user(&db, &created.id).await.unwrap());
        assert_eq!(delete_user(&db, &created.id).await.unwrap_err().to_string(), "User not found");

        db.database().drop().await.unwrap();
    }
}
