use crate::db::models::DbUser;
use crate::db::schema::SQLITE_INIT;
use crate::error::GeolensError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::future::Future;
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Read access to user records, as needed by authentication.
pub trait UserStore: Clone + Send + Sync + 'static {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<DbUser>, GeolensError>> + Send;
}

#[derive(Clone)]
pub struct UsersStorage {
    pool: SqlitePool,
}

/// Open (creating if missing) the database at `database_url` and ensure the schema exists.
pub async fn connect(database_url: &str) -> Result<UsersStorage, GeolensError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let storage = UsersStorage::new(pool);
    storage.init_schema().await?;
    debug!(database_url, "user store ready");
    Ok(storage)
}

impl UsersStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), GeolensError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a user unless the email is already taken.
    /// Returns `true` when a new row was written.
    pub async fn insert_or_ignore(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, GeolensError> {
        let result = sqlx::query("INSERT OR IGNORE INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<DbUser>, GeolensError> {
        let row = sqlx::query("SELECT id, name, email, password FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_model).transpose()
    }

    fn row_to_model(row: SqliteRow) -> Result<DbUser, GeolensError> {
        Ok(DbUser {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
        })
    }
}

impl UserStore for UsersStorage {
    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, GeolensError> {
        self.get_by_email(email).await
    }
}
