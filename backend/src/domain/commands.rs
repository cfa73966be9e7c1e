//! Domain-level command types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod patients {
    use chrono::NaiveDate;

    /// Input for registering a new patient. Shape validation has already
    /// happened by the time a command is built; the service only enforces
    /// business rules on it.
    #[derive(Debug, Clone)]
    pub struct RegisterPatientCommand {
        pub first_name: String,
        pub last_name: String,
        pub date_of_birth: NaiveDate,
        pub phone_number: String,
        pub email: String,
        pub address: String,
        pub medical_history: Option<String>,
    }

    /// Input for replacing an existing patient record wholesale.
    #[derive(Debug, Clone)]
    pub struct UpdatePatientCommand {
        pub id: i64,
        pub first_name: String,
        pub last_name: String,
        pub date_of_birth: NaiveDate,
        pub phone_number: String,
        pub email: String,
        pub address: String,
        pub medical_history: Option<String>,
    }
}

pub mod appointments {
    use chrono::{DateTime, Utc};

    /// Input for scheduling a visit for an existing patient.
    #[derive(Debug, Clone)]
    pub struct ScheduleAppointmentCommand {
        pub patient_id: i64,
        pub doctor_name: String,
        pub scheduled_at: DateTime<Utc>,
        pub reason: String,
        /// Falls back to the default status when absent.
        pub status: Option<String>,
        pub notes: Option<String>,
    }
}
