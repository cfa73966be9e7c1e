//! # Storage Traits
//!
//! The storage abstraction the domain layer is written against. Adapters
//! (SQLite, in-process memory) implement these traits and can be swapped
//! without touching the services.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::appointment::{Appointment, NewAppointment};
use crate::domain::models::patient::{NewPatient, Patient};

/// Interface for patient persistence.
///
/// Every adapter must hold the email-uniqueness invariant: inserting a
/// patient whose email matches an existing one case-insensitively fails
/// with `DomainError::DuplicateEmail`.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Insert a new patient and return the identifier assigned by the store.
    async fn insert_patient(&self, patient: &NewPatient) -> DomainResult<i64>;

    /// Retrieve a patient by identifier. A miss is not an error.
    async fn get_patient(&self, id: i64) -> DomainResult<Option<Patient>>;

    /// Case-insensitive exact email match.
    async fn get_patient_by_email(&self, email: &str) -> DomainResult<Option<Patient>>;

    /// All patients ordered by registration time, most recent first.
    async fn list_patients(&self) -> DomainResult<Vec<Patient>>;

    /// Case-insensitive substring match over first name, last name and
    /// email, case-sensitive over phone number; same ordering as
    /// `list_patients`. The term is a literal substring, not a pattern.
    async fn search_patients(&self, term: &str) -> DomainResult<Vec<Patient>>;

    /// Number of patients holding this email (case-insensitively),
    /// optionally ignoring the record with `exclude_id`.
    async fn count_patients_with_email(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> DomainResult<i64>;

    /// Replace a whole record by identifier.
    /// Returns false when no such identifier exists.
    async fn update_patient(&self, patient: &Patient) -> DomainResult<bool>;

    /// Delete a patient by identifier, along with any appointments that
    /// reference it. Returns whether a record was removed.
    async fn delete_patient(&self, id: i64) -> DomainResult<bool>;
}

/// Interface for appointment persistence.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert a new appointment and return the identifier assigned by the
    /// store. The referenced patient must exist.
    async fn insert_appointment(&self, appointment: &NewAppointment) -> DomainResult<i64>;

    /// Retrieve an appointment by identifier. A miss is not an error.
    async fn get_appointment(&self, id: i64) -> DomainResult<Option<Appointment>>;

    /// Appointments for one patient ordered by scheduled time, earliest
    /// first.
    async fn list_appointments_for_patient(&self, patient_id: i64)
        -> DomainResult<Vec<Appointment>>;

    /// Delete an appointment by identifier. Returns whether a record was
    /// removed.
    async fn delete_appointment(&self, id: i64) -> DomainResult<bool>;
}
