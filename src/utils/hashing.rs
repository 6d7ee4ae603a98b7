//! bcrypt is CPU-bound, so hashing and comparison run on tokio's blocking
//! pool instead of an actix worker thread.

use bcrypt::DEFAULT_COST;

use crate::utils::error::AppError;

async fn spawn_hashing<F, R>(f: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, bcrypt::BcryptError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

pub async fn hash_secret(plain: &str) -> Result<String, AppError> {
    let plain = plain.to_string();
    spawn_hashing(move || bcrypt::hash(plain, DEFAULT_COST)).await
}

pub async fn verify_secret(plain: &str, hashed: &str) -> Result<bool, AppError> {
    let plain = plain.to_string();
    let hashed = hashed.to_string();
    spawn_hashing(move || bcrypt::verify(plain, &hashed)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = hash_secret("secret1").await.unwrap();
        assert_ne!(hashed, "secret1");
        assert!(verify_secret("secret1", &hashed).await.unwrap());
        assert!(!verify_secret("secret2", &hashed).await.unwrap());
    }
}
