use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to a newly scheduled appointment when none is supplied.
/// Status is free text; no transition rules are enforced.
pub const DEFAULT_APPOINTMENT_STATUS: &str = "Scheduled";

/// Domain model for a scheduled visit. Many appointments reference one
/// patient; they are removed together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A candidate appointment before the store has assigned an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    /// Attach the identifier assigned by the store.
    pub fn into_appointment(self, id: i64) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_name: self.doctor_name,
            scheduled_at: self.scheduled_at,
            reason: self.reason,
            status: self.status,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}
