use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::errors::ClientError;

/// Well-known key the bearer token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// SQLite-backed key-value store for client state that must survive process
/// restarts. In practice it holds exactly one entry: the session token.
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    /// Opens (creating if necessary) the store at `database_url`, e.g.
    /// `sqlite:taskpad.db?mode=rwc` or `sqlite::memory:` for tests.
    pub async fn new(database_url: &str) -> Result<Self, ClientError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Opens the store at the platform default location,
    /// `<data_dir>/taskpad/client.db`.
    pub async fn open_default() -> Result<Self, ClientError> {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("taskpad");
        std::fs::create_dir_all(&dir)?;

        let path = dir.join("client.db");
        let url = format!("sqlite:{}?mode=rwc", path.display());
        Self::new(&url).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let row = sqlx::query("SELECT value FROM credentials WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), ClientError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM credentials WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
