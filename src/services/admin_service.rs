use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;

use crate::{
    database::{MongoDB, ADMINS},
    models::{
        parse_object_id, Admin, AdminAuthResponse, AdminLoginInput, AdminResponse, AdminStatus,
        CreateAdminInput, ListQuery, Patch, UpdateAdminInput, UpdateBuilder,
    },
    utils::{
        error::{is_duplicate_key, AppError},
        hashing::{hash_secret, verify_secret},
        jwt::{issue_token, JwtSettings, TokenSubject},
        validation::{normalize_email, require_non_empty, validate_email, validate_password},
    },
};

const SORTABLE: &[&str] = &["createdAt", "updatedAt", "name", "email", "role", "status"];
const DUPLICATE_EMAIL: &str = "An admin with this email already exists";

fn duplicate_or(e: mongodb::error::Error) -> AppError {
    if is_duplicate_key(&e) {
        AppError::Conflict(DUPLICATE_EMAIL.to_string())
    } else {
        AppError::from(e)
    }
}

/// Rejects `email` if another admin (other than `except`) already uses it.
async fn ensure_email_free(db: &MongoDB, email: &str, except: Option<ObjectId>) -> Result<(), AppError> {
    let mut filter = doc! { "email": email };
    if let Some(id) = except {
        filter.insert("_id", doc! { "$ne": id });
    }
    if db.collection::<Admin>(ADMINS).find_one(filter).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
    }
    Ok(())
}

pub async fn list_admins(db: &MongoDB, query: &ListQuery) -> Result<Vec<AdminResponse>, AppError> {
    let mut filter = Document::new();
    if let Some(status) = &query.status {
        filter.insert("status", status.as_str());
    }

    let admins: Vec<Admin> = db
        .collection::<Admin>(ADMINS)
        .find(filter)
        .sort(query.sort_doc(SORTABLE)?)
        .await?
        .try_collect()
        .await?;

    Ok(admins.into_iter().map(AdminResponse::from).collect())
}

pub async fn get_admin(db: &MongoDB, id: &str) -> Result<AdminResponse, AppError> {
    let id = parse_object_id(id, "Admin")?;
    db.collection::<Admin>(ADMINS)
        .find_one(doc! { "_id": id })
        .await?
        .map(AdminResponse::from)
        .ok_or_else(|| AppError::not_found("Admin"))
}

pub async fn create_admin(db: &MongoDB, input: CreateAdminInput) -> Result<AdminResponse, AppError> {
    require_non_empty("Name", &input.name)?;
    validate_email(&input.email)?;
    validate_password(&input.password)?;

    let email = normalize_email(&input.email);
    ensure_email_free(db, &email, None).await?;

    let now = BsonDateTime::now();
    let mut admin = Admin {
        id: None,
        name: input.name.trim().to_string(),
        email,
        password: hash_secret(&input.password).await?,
        role: input.role.unwrap_or_default(),
        status: input.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    let inserted = db
        .collection::<Admin>(ADMINS)
        .insert_one(&admin)
        .await
        .map_err(duplicate_or)?;
    admin.id = inserted.inserted_id.as_object_id();

    log::info!("✅ Admin created: {} ({})", admin.email, admin.role.as_str());
    Ok(AdminResponse::from(admin))
}

/// Builds the update for the provided fields; a new password is re-hashed.
async fn admin_update_doc(input: &UpdateAdminInput) -> Result<Document, AppError> {
    let mut update = UpdateBuilder::new();

    if let Patch::Value(name) = &input.name {
        require_non_empty("Name", name)?;
    }
    update.required("name", "Name", &input.name.clone().map(|n| n.trim().to_string()))?;

    if let Patch::Value(email) = &input.email {
        validate_email(email)?;
    }
    update.required("email", "Email", &input.email.clone().map(|e| normalize_email(&e)))?;

    match &input.password {
        Patch::Missing => {}
        Patch::Null => return Err(AppError::validation("Password cannot be null")),
        Patch::Value(password) => {
            validate_password(password)?;
            update.set("password", hash_secret(password).await?);
        }
    }

    update.required("role", "Role", &input.role)?;
    update.required("status", "Status", &input.status)?;

    Ok(update.build())
}

pub async fn update_admin(db: &MongoDB, id: &str, input: UpdateAdminInput) -> Result<AdminResponse, AppError> {
    let id = parse_object_id(id, "Admin")?;

    if let Patch::Value(email) = &input.email {
        ensure_email_free(db, &normalize_email(email), Some(id)).await?;
    }

    let update = admin_update_doc(&input).await?;

    let updated = db
        .collection::<Admin>(ADMINS)
        .find_one_and_update(doc! { "_id": id }, update)
        .return_document(ReturnDocument::After)
        .await
        .map_err(duplicate_or)?
        .ok_or_else(|| AppError::not_found("Admin"))?;

    log::info!("✏️  Admin updated: {}", updated.email);
    Ok(AdminResponse::from(updated))
}

pub async fn delete_admin(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let id = parse_object_id(id, "Admin")?;
    let result = db.collection::<Admin>(ADMINS).delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::not_found("Admin"));
    }
    log::info!("🗑️ Admin deleted: {}", id);
    Ok(true)
}

pub async fn admin_login(db: &MongoDB, jwt: &JwtSettings, input: &AdminLoginInput) -> Result<AdminAuthResponse, AppError> {
    require_non_empty("Email", &input.email)?;
    require_non_empty("Password", &input.password)?;

    let email = normalize_email(&input.email);
    let admin = db
        .collection::<Admin>(ADMINS)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_secret(&input.password, &admin.password).await? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if admin.status == AdminStatus::Inactive {
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    let id = admin
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| AppError::Internal("Admin document without _id".to_string()))?;

    let token = issue_token(
        jwt,
        &TokenSubject {
            id: &id,
            email: &admin.email,
            role: admin.role.as_str(),
        },
    )?;

    log::info!("✅ Admin login: {}", admin.email);
    Ok(AdminAuthResponse {
        token,
        admin: AdminResponse::from(admin),
    })
}
