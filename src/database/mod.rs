use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use std::error::Error;

pub const ADMINS: &str = "admins";
pub const USERS: &str = "users";
pub const UNIVERSITIES: &str = "universities";
pub const JOBS: &str = "jobs";

const DEFAULT_DB_NAME: &str = "consultancy";

/// Connection handle created once at startup and shared with every handler.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let mongodb = Self::from_client(client, database_name(uri));

        // Test connection
        mongodb.database().list_collection_names().await?;

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Wraps an existing client without touching the server.
    pub fn from_client(client: Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    /// Email uniqueness is enforced by the store as well as by the services.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        for name in [ADMINS, USERS] {
            let index = IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();

            match self.collection::<Document>(name).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: {}(email) unique", name),
                Err(e) => {
                    log::error!("   ❌ Failed to create unique index on {}(email): {}", name, e);
                    return Err(Box::new(e));
                }
            }
        }

        let jobs_status = IndexModel::builder().keys(doc! { "status": 1, "createdAt": -1 }).build();
        match self.collection::<Document>(JOBS).create_index(jobs_status).await {
            Ok(_) => log::info!("   ✅ Index ready: jobs(status, createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Database name from the URI path, e.g. `mongodb://host/consultancy?retryWrites=true`.
fn database_name(uri: &str) -> &str {
    let after_scheme = uri.split("://").nth(1).unwrap_or(uri);
    after_scheme
        .split_once('/')
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// A handle whose client never connects unless an operation is issued.
    pub async fn lazy_handle() -> MongoDB {
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .expect("static URI parses");
        MongoDB::from_client(client, "consultancy_unit")
    }

    /// A throwaway database on a running server.
    pub async fn live_handle() -> MongoDB {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_TEST_URI")
            .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
        let client = Client::with_uri_str(&uri).await.expect("MongoDB reachable");
        let name = format!("consultancy_test_{}", uuid::Uuid::new_v4().simple());
        let db = MongoDB::from_client(client, &name);
        db.ensure_indexes().await.expect("indexes created");
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/leads"), "leads");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster.example.net/leads?retryWrites=true"),
            "leads"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), DEFAULT_DB_NAME);
        assert_eq!(database_name("mongodb://localhost:27017/?w=majority"), DEFAULT_DB_NAME);
    }
}
