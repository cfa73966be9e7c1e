use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::errors::DomainResult;
use crate::domain::models::appointment::{Appointment, NewAppointment};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::AppointmentStore;

/// SQLite-backed appointment repository.
#[derive(Clone)]
pub struct AppointmentRepository {
    db: DbConnection,
}

impl AppointmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_appointment(row: &SqliteRow) -> Appointment {
        Appointment {
            id: row.get("id"),
            patient_id: row.get("patient_id"),
            doctor_name: row.get("doctor_name"),
            scheduled_at: row.get("scheduled_at"),
            reason: row.get("reason"),
            status: row.get("status"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn insert_appointment(&self, appointment: &NewAppointment) -> DomainResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO appointments
                (patient_id, doctor_name, scheduled_at, reason, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(appointment.patient_id)
        .bind(&appointment.doctor_name)
        .bind(appointment.scheduled_at)
        .bind(&appointment.reason)
        .bind(&appointment.status)
        .bind(appointment.notes.as_deref())
        .bind(appointment.created_at)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_appointment(&self, id: i64) -> DomainResult<Option<Appointment>> {
        let row = sqlx::query(
            r#"
            SELECT id, patient_id, doctor_name, scheduled_at, reason, status,
                   notes, created_at
            FROM appointments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| Self::row_to_appointment(&r)))
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> DomainResult<Vec<Appointment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, doctor_name, scheduled_at, reason, status,
                   notes, created_at
            FROM appointments
            WHERE patient_id = ?
            ORDER BY scheduled_at ASC, id ASC
            "#,
        )
        .bind(patient_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_appointment).collect())
    }

    async fn delete_appointment(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
