use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::errors::DomainResult;

/// Connection URL used when DATABASE_URL is not set.
const DEFAULT_DATABASE_URL: &str = "sqlite:clinic.db";

/// DbConnection manages the SQLite pool and schema.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> DomainResult<Self> {
        // Foreign keys must be enabled on every pooled connection so that
        // deleting a patient cascades to its appointments.
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the database named by the DATABASE_URL environment
    /// variable, falling back to a local file database.
    pub async fn init() -> DomainResult<Self> {
        let url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> DomainResult<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> DomainResult<()> {
        // The NOCASE unique column is the source of truth for the
        // email-uniqueness invariant; the service-level check only exists
        // for friendlier errors.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                email TEXT NOT NULL COLLATE NOCASE UNIQUE,
                address TEXT NOT NULL,
                medical_history TEXT,
                registered_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Index for the most-recent-first listing order
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_patients_registered_at
            ON patients(registered_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                doctor_name TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                reason TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Scheduled',
                notes TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_patient_id
            ON appointments(patient_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        // Running setup again against the same pool must not fail
        DbConnection::setup_schema(db.pool())
            .await
            .expect("Schema setup should be idempotent");
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        // An appointment without a backing patient must be rejected
        let result = sqlx::query(
            r#"
            INSERT INTO appointments (patient_id, doctor_name, scheduled_at, reason, created_at)
            VALUES (999, 'Dr. Nobody', '2025-10-01T09:00:00Z', 'Checkup', '2025-09-01T08:00:00Z')
            "#,
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err(), "Foreign key violation should fail");
    }
}
