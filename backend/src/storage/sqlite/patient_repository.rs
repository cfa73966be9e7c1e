use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::patient::{NewPatient, Patient};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::PatientStore;

/// SQLite-backed patient repository.
#[derive(Clone)]
pub struct PatientRepository {
    db: DbConnection,
}

impl PatientRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_patient(row: &SqliteRow) -> Patient {
        Patient {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            date_of_birth: row.get("date_of_birth"),
            phone_number: row.get("phone_number"),
            email: row.get("email"),
            address: row.get("address"),
            medical_history: row.get("medical_history"),
            registered_at: row.get("registered_at"),
        }
    }
}

/// Escape LIKE wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn insert_patient(&self, patient: &NewPatient) -> DomainResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO patients
                (first_name, last_name, date_of_birth, phone_number, email,
                 address, medical_history, registered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.date_of_birth)
        .bind(&patient.phone_number)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(patient.medical_history.as_deref())
        .bind(patient.registered_at)
        .execute(self.db.pool())
        .await
        .map_err(|e| match &e {
            // The NOCASE unique column rejects a second registration that
            // slipped past the service-level pre-check.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DomainError::DuplicateEmail(patient.email.clone())
            }
            _ => DomainError::from(e),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn get_patient(&self, id: i64) -> DomainResult<Option<Patient>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, date_of_birth, phone_number,
                   email, address, medical_history, registered_at
            FROM patients
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Self::row_to_patient(&r)))
    }

    async fn get_patient_by_email(&self, email: &str) -> DomainResult<Option<Patient>> {
        // The email column is COLLATE NOCASE, so equality is
        // case-insensitive here.
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, date_of_birth, phone_number,
                   email, address, medical_history, registered_at
            FROM patients
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Self::row_to_patient(&r)))
    }

    async fn list_patients(&self) -> DomainResult<Vec<Patient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, date_of_birth, phone_number,
                   email, address, medical_history, registered_at
            FROM patients
            ORDER BY registered_at DESC, id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_patient).collect())
    }

    async fn search_patients(&self, term: &str) -> DomainResult<Vec<Patient>> {
        let pattern = format!("%{}%", escape_like(term)).to_lowercase();

        // LIKE for the case-insensitive fields; instr for the phone number,
        // which matches case-sensitively and needs no wildcard escaping
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, date_of_birth, phone_number,
                   email, address, medical_history, registered_at
            FROM patients
            WHERE LOWER(first_name) LIKE ? ESCAPE '\'
               OR LOWER(last_name) LIKE ? ESCAPE '\'
               OR LOWER(email) LIKE ? ESCAPE '\'
               OR instr(phone_number, ?) > 0
            ORDER BY registered_at DESC, id DESC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(term)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_patient).collect())
    }

    async fn count_patients_with_email(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> DomainResult<i64> {
        let query = if let Some(exclude_id) = exclude_id {
            sqlx::query(
                r#"
                SELECT COUNT(*) AS count FROM patients
                WHERE email = ? AND id != ?
                "#,
            )
            .bind(email)
            .bind(exclude_id)
        } else {
            sqlx::query(
                r#"
                SELECT COUNT(*) AS count FROM patients
                WHERE email = ?
                "#,
            )
            .bind(email)
        };

        let row = query.fetch_one(self.db.pool()).await?;
        Ok(row.get("count"))
    }

    async fn update_patient(&self, patient: &Patient) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET first_name = ?, last_name = ?, date_of_birth = ?,
                phone_number = ?, email = ?, address = ?,
                medical_history = ?, registered_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.date_of_birth)
        .bind(&patient.phone_number)
        .bind(&patient.email)
        .bind(&patient.address)
        .bind(patient.medical_history.as_deref())
        .bind(patient.registered_at)
        .bind(patient.id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_patient(&self, id: i64) -> DomainResult<bool> {
        // ON DELETE CASCADE takes the patient's appointments with it
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    async fn setup_test() -> PatientRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        PatientRepository::new(db)
    }

    fn new_patient(first_name: &str, email: &str, registered_secs: i64) -> NewPatient {
        NewPatient {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            phone_number: "555-123-4567".to_string(),
            email: email.to_string(),
            address: "123 Test Street".to_string(),
            medical_history: Some("No known issues".to_string()),
            registered_at: Utc.timestamp_opt(1_700_000_000 + registered_secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_patient() {
        let repo = setup_test().await;
        let candidate = new_patient("John", "john.doe@test.com", 0);

        let id = repo.insert_patient(&candidate).await.expect("Failed to insert patient");
        assert!(id > 0);

        let stored = repo
            .get_patient(id)
            .await
            .expect("Failed to get patient")
            .expect("Patient should exist");
        assert_eq!(stored, candidate.into_patient(id));
    }

    #[tokio::test]
    async fn test_get_nonexistent_patient() {
        let repo = setup_test().await;
        let result = repo.get_patient(12345).await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unique_email_constraint_is_case_insensitive() {
        let repo = setup_test().await;
        repo.insert_patient(&new_patient("John", "John.Doe@Test.com", 0))
            .await
            .expect("First insert should succeed");

        let result = repo
            .insert_patient(&new_patient("Jane", "john.doe@TEST.COM", 1))
            .await;
        assert!(matches!(result, Err(DomainError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_patient_by_email_ignores_case() {
        let repo = setup_test().await;
        let id = repo
            .insert_patient(&new_patient("John", "john.doe@test.com", 0))
            .await
            .unwrap();

        let found = repo
            .get_patient_by_email("JOHN.DOE@test.COM")
            .await
            .expect("Query failed")
            .expect("Should match case-insensitively");
        assert_eq!(found.id, id);

        let missing = repo.get_patient_by_email("other@test.com").await.expect("Query failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_patients_most_recent_first() {
        let repo = setup_test().await;
        repo.insert_patient(&new_patient("First", "first@test.com", 0)).await.unwrap();
        repo.insert_patient(&new_patient("Second", "second@test.com", 60)).await.unwrap();
        repo.insert_patient(&new_patient("Third", "third@test.com", 120)).await.unwrap();

        let patients = repo.list_patients().await.expect("Failed to list patients");
        let names: Vec<&str> = patients.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_list_breaks_timestamp_ties_by_id() {
        let repo = setup_test().await;
        // Same registration instant; the later insert wins
        repo.insert_patient(&new_patient("Older", "older@test.com", 0)).await.unwrap();
        repo.insert_patient(&new_patient("Newer", "newer@test.com", 0)).await.unwrap();

        let patients = repo.list_patients().await.unwrap();
        assert_eq!(patients[0].first_name, "Newer");
        assert_eq!(patients[1].first_name, "Older");
    }

    #[tokio::test]
    async fn test_search_matches_each_field() {
        let repo = setup_test().await;
        let mut by_phone = new_patient("Alice", "alice@example.com", 0);
        by_phone.phone_number = "555-999-0000".to_string();
        repo.insert_patient(&by_phone).await.unwrap();
        repo.insert_patient(&new_patient("Bob", "bob@clinic.org", 1)).await.unwrap();

        // First name, case-insensitive
        let hits = repo.search_patients("aLiCe").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Alice");

        // Email substring
        let hits = repo.search_patients("clinic.org").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Bob");

        // Phone substring
        let hits = repo.search_patients("999-0000").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Alice");

        // Last name is shared by the fixture records
        let hits = repo.search_patients("doe").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_as_literals() {
        let repo = setup_test().await;
        repo.insert_patient(&new_patient("Percy", "percy@test.com", 0)).await.unwrap();

        // A bare '%' would match everything if passed through unescaped
        let hits = repo.search_patients("%").await.unwrap();
        assert!(hits.is_empty());

        let hits = repo.search_patients("_").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_count_patients_with_email() {
        let repo = setup_test().await;
        let id = repo
            .insert_patient(&new_patient("John", "john@test.com", 0))
            .await
            .unwrap();

        assert_eq!(repo.count_patients_with_email("JOHN@test.com", None).await.unwrap(), 1);
        assert_eq!(repo.count_patients_with_email("john@test.com", Some(id)).await.unwrap(), 0);
        assert_eq!(repo.count_patients_with_email("other@test.com", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_patient() {
        let repo = setup_test().await;
        let id = repo
            .insert_patient(&new_patient("John", "john@test.com", 0))
            .await
            .unwrap();

        let mut patient = repo.get_patient(id).await.unwrap().unwrap();
        patient.first_name = "Jonathan".to_string();
        patient.medical_history = None;

        let updated = repo.update_patient(&patient).await.expect("Update failed");
        assert!(updated);

        let stored = repo.get_patient(id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Jonathan");
        assert_eq!(stored.medical_history, None);
    }

    #[tokio::test]
    async fn test_update_unknown_patient_reports_false() {
        let repo = setup_test().await;
        let patient = new_patient("Ghost", "ghost@test.com", 0).into_patient(4242);

        let updated = repo.update_patient(&patient).await.expect("Update query failed");
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_patient() {
        let repo = setup_test().await;
        let id = repo
            .insert_patient(&new_patient("John", "john@test.com", 0))
            .await
            .unwrap();

        assert!(repo.delete_patient(id).await.expect("Delete failed"));
        assert!(repo.get_patient(id).await.unwrap().is_none());

        // Second delete finds nothing
        assert!(!repo.delete_patient(id).await.expect("Delete failed"));
    }
}
