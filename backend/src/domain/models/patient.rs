use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain model for a registered patient.
///
/// The email is unique across all patients, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub medical_history: Option<String>,
    /// Assigned once at registration; updates carry it forward unchanged.
    pub registered_at: DateTime<Utc>,
}

/// A candidate record before the store has assigned an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl NewPatient {
    /// Attach the identifier assigned by the store.
    pub fn into_patient(self, id: i64) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            phone_number: self.phone_number,
            email: self.email,
            address: self.address,
            medical_history: self.medical_history,
            registered_at: self.registered_at,
        }
    }
}
