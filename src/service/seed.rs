use crate::auth::hash_password;
use crate::db::UsersStorage;
use crate::error::GeolensError;
use tracing::info;

pub const SEED_NAME: &str = "Test User";
pub const SEED_EMAIL: &str = "test@example.com";
pub const SEED_PASSWORD: &str = "password123";

/// Insert a user with a freshly hashed password. Re-running with an existing
/// email leaves the stored record untouched and returns `false`.
pub async fn seed_user(
    storage: &UsersStorage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<bool, GeolensError> {
    if email.is_empty() || password.is_empty() {
        return Err(GeolensError::validation("Email and password required"));
    }
    let hashed = hash_password(password)?;
    let inserted = storage.insert_or_ignore(name, email, &hashed).await?;
    if inserted {
        info!(email, "seeded user");
    } else {
        info!(email, "user already present; seed skipped");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::connect;

    #[tokio::test]
    async fn seeding_twice_keeps_the_first_hash() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("seed.sqlite").display());
        let storage = connect(&url).await.unwrap();

        assert!(seed_user(&storage, SEED_NAME, SEED_EMAIL, SEED_PASSWORD).await.unwrap());
        assert!(!seed_user(&storage, SEED_NAME, SEED_EMAIL, "changed").await.unwrap());

        let user = storage.get_by_email(SEED_EMAIL).await.unwrap().unwrap();
        assert!(verify_password(SEED_PASSWORD, &user.password).unwrap());
        assert_ne!(user.password, SEED_PASSWORD);
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("seed.sqlite").display());
        let storage = connect(&url).await.unwrap();
        let err = seed_user(&storage, "x", "x@example.com", "").await.unwrap_err();
        assert!(matches!(err, GeolensError::Validation(_)));
    }
}
