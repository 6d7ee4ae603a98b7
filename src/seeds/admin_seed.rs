use crate::config::SeedAdmin;
use crate::database::{MongoDB, ADMINS};
use crate::models::{AdminRole, AdminStatus, CreateAdminInput};
use crate::services::admin_service;
use mongodb::bson::{doc, Document};

/// Bootstraps a SuperAdmin from SEED_ADMIN_* when the admins collection is empty.
pub async fn seed_super_admin(db: &MongoDB, seed: Option<&SeedAdmin>) {
    let Some(seed) = seed else {
        log::info!("👤 Admin seed: SEED_ADMIN_EMAIL/SEED_ADMIN_PASSWORD not set, skipping");
        return;
    };

    let count = match db.collection::<Document>(ADMINS).count_documents(doc! {}).await {
        Ok(count) => count,
        Err(e) => {
            log::error!("   ❌ Admin seed: failed to count admins: {}", e);
            return;
        }
    };

    if count > 0 {
        log::info!("👤 Admin seed: {} admins already in DB, skipping", count);
        return;
    }

    let input = CreateAdminInput {
        name: seed.name.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        role: Some(AdminRole::SuperAdmin),
        status: Some(AdminStatus::Active),
    };

    match admin_service::create_admin(db, input).await {
        Ok(admin) => log::info!("   ✅ Seeded SuperAdmin {}", admin.email),
        Err(e) => log::error!("   ❌ Failed to seed SuperAdmin: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::live_handle;
    use crate::services::admin_service::list_admins;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_seeds_once() {
        let db = live_handle().await;
        let seed = SeedAdmin {
            name: "Owner".into(),
            email: "Owner@Example.com".into(),
            password: "bootstrap1".into(),
        };

        seed_super_admin(&db, Some(&seed)).await;
        seed_super_admin(&db, Some(&seed)).await;

        let admins = list_admins(&db, &Default::default()).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "owner@example.com");
        assert_eq!(admins[0].role, AdminRole::SuperAdmin);

        db.database().drop().await.unwrap();
    }
}
