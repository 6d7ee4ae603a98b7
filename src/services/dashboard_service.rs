use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use serde::Serialize;

use crate::{
    database::{MongoDB, ADMINS, JOBS, UNIVERSITIES, USERS},
    models::{JobStatus, UserStatus},
    utils::error::AppError,
};

#[derive(Debug, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub new_users: u64,
    pub total_admins: u64,
    pub total_universities: u64,
    pub total_jobs: u64,
    pub open_jobs: u64,
    pub total_applications: u64,
}

async fn count(db: &MongoDB, collection: &str, filter: Document) -> Result<u64, AppError> {
    Ok(db.collection::<Document>(collection).count_documents(filter).await?)
}

async fn count_applications(db: &MongoDB) -> Result<u64, AppError> {
    let pipeline = vec![
        doc! { "$project": { "n": { "$size": { "$ifNull": ["$applications", []] } } } },
        doc! { "$group": { "_id": null, "total": { "$sum": "$n" } } },
    ];

    let rows: Vec<Document> = db
        .collection::<Document>(JOBS)
        .aggregate(pipeline)
        .await?
        .try_collect()
        .await?;

    Ok(rows
        .first()
        .and_then(|row| match row.get("total") {
            Some(mongodb::bson::Bson::Int32(n)) => Some(*n as u64),
            Some(mongodb::bson::Bson::Int64(n)) => Some(*n as u64),
            _ => None,
        })
        .unwrap_or(0))
}

/// Sidebar / overview counts. The reads are independent, so they run together.
pub async fn dashboard_stats(db: &MongoDB) -> Result<DashboardStats, AppError> {
    let new_status = mongodb::bson::to_bson(&UserStatus::New)?;

    let (total_users, new_users, total_admins, total_universities, total_jobs, open_jobs, total_applications) =
        futures::try_join!(
            count(db, USERS, doc! {}),
            count(db, USERS, doc! { "status": new_status }),
            count(db, ADMINS, doc! {}),
            count(db, UNIVERSITIES, doc! {}),
            count(db, JOBS, doc! {}),
            count(db, JOBS, doc! { "status": JobStatus::Open.as_str() }),
            count_applications(db),
        )?;

    Ok(DashboardStats {
        total_users,
        new_users,
        total_admins,
        total_universities,
        total_jobs,
        open_jobs,
        total_applications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::live_handle;
    use crate::models::{ApplyForJobInput, CreateJobInput};
    use crate::services::job_service;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_counts() {
        let db = live_handle().await;
        assert_eq!(dashboard_stats(&db).await.unwrap(), DashboardStats::default());

        let job = job_service::create_job(
            &db,
            CreateJobInput {
                title: "Counsellor".into(),
                location: "Pune".into(),
                description: "Student advising".into(),
                experience_required: "None".into(),
                salary: None,
                status: None,
            },
        )
        .await
        .unwrap();
        for email in ["a@x.com", "b@x.com"] {
            job_service::apply_for_job(
                &db,
                &job.id,
                ApplyForJobInput {
                    name: "Applicant".into(),
                    email: email.into(),
                    phone: "9999999999".into(),
                    resume_url: "https://cv.example/a.pdf".into(),
                },
            )
            .await
            .unwrap();
        }

        let stats = dashboard_stats(&db).await.unwrap();
        assert_eq!(stats.total_jobs, 1);
        assert_eq!(stats.open_jobs, 1);
        assert_eq!(stats.total_applications, 2);

        db.database().drop().await.unwrap();
    }
}
