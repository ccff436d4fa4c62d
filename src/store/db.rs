//! SQLite database for the panel.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use log::info;

use super::password::hash_password;
use super::settings::SettingKey;

/// Username and password of the administrator created on first run
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Handle on the record store
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Open (or create) the store at `path`, run migrations and seed defaults.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
                .map_err(|e| StoreError::Connection(e.to_string()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Record store opened at {}", path.display());

        let store = Self { pool };
        store.run_migrations().await?;
        store.seed_defaults().await?;

        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // A single connection that never idles out, or the database vanishes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        store.seed_defaults().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("Record store migrations complete");
        Ok(())
    }

    /// Seed the default administrator and settings.
    ///
    /// Idempotent: existing rows are never touched.
    async fn seed_defaults(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&mut *tx)
            .await?;

        if admins == 0 {
            let hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
            sqlx::query("INSERT INTO admins (username, password) VALUES (?, ?)")
                .bind(DEFAULT_ADMIN_USERNAME)
                .bind(hash)
                .execute(&mut *tx)
                .await?;
            log::warn!(
                "Created default administrator '{}' with the default password; change it in Settings",
                DEFAULT_ADMIN_USERNAME
            );
        }

        for key in SettingKey::ALL {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key.as_str())
                .bind(key.default_value())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write (duplicate username)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Password hashing error: {0}")]
    Hash(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Query(e.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for StoreError {
    fn from(e: argon2::password_hash::Error) -> Self {
        StoreError::Hash(e.to_string())
    }
}
