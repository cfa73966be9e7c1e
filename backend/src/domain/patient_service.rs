use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::commands::patients::{RegisterPatientCommand, UpdatePatientCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::patient::{NewPatient, Patient};
use crate::storage::traits::PatientStore;

/// Sole gateway to patient data. Every business rule lives here; the
/// storage adapters only add defense-in-depth constraints.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    /// Register a new patient.
    ///
    /// Fails with [`DomainError::DuplicateEmail`] when the email is already
    /// in use, compared case-insensitively. The pre-check here produces the
    /// friendly error; under concurrent registration the store's unique
    /// constraint is what actually holds the invariant, and its violation
    /// surfaces as the same error.
    pub async fn register_patient(
        &self,
        command: RegisterPatientCommand,
    ) -> DomainResult<Patient> {
        info!(
            "Registering patient: {} {}",
            command.first_name, command.last_name
        );

        if let Some(existing) = self.store.get_patient_by_email(&command.email).await? {
            warn!(
                "Registration rejected, email already in use by patient {}",
                existing.id
            );
            return Err(DomainError::DuplicateEmail(command.email));
        }

        let candidate = NewPatient {
            first_name: command.first_name,
            last_name: command.last_name,
            date_of_birth: command.date_of_birth,
            phone_number: command.phone_number,
            email: command.email,
            address: command.address,
            medical_history: command.medical_history,
            registered_at: Utc::now(),
        };

        let id = self.store.insert_patient(&candidate).await?;
        info!("Registered patient {} ({})", id, candidate.email);

        Ok(candidate.into_patient(id))
    }

    /// Look up a patient by identifier. A miss is not an error.
    pub async fn get_patient(&self, id: i64) -> DomainResult<Option<Patient>> {
        self.store.get_patient(id).await
    }

    /// Case-insensitive exact email lookup.
    pub async fn get_patient_by_email(&self, email: &str) -> DomainResult<Option<Patient>> {
        self.store.get_patient_by_email(email).await
    }

    /// Every patient, most recently registered first.
    pub async fn list_patients(&self) -> DomainResult<Vec<Patient>> {
        self.store.list_patients().await
    }

    /// Substring search over first name, last name, email (all
    /// case-insensitive) and phone number (case-sensitive). An empty or
    /// whitespace-only term lists everyone.
    pub async fn search_patients(&self, term: &str) -> DomainResult<Vec<Patient>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_patients().await;
        }

        info!("Searching patients for {:?}", term);
        self.store.search_patients(term).await
    }

    /// True when no patient other than `exclude_id` holds this email,
    /// compared case-insensitively.
    pub async fn is_email_unique(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> DomainResult<bool> {
        let count = self.store.count_patients_with_email(email, exclude_id).await?;
        Ok(count == 0)
    }

    /// Replace an existing record wholesale, keeping its original
    /// registration time. Reports success instead of failing hard: an
    /// unknown id or a storage rejection comes back as `false`.
    ///
    /// Email uniqueness is deliberately not re-checked here; on the SQLite
    /// adapter the unique column still rejects a collision, which this
    /// method reports as `false`.
    pub async fn update_patient(&self, command: UpdatePatientCommand) -> DomainResult<bool> {
        info!("Updating patient {}", command.id);

        let existing = match self.store.get_patient(command.id).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                warn!("Update skipped, no patient with id {}", command.id);
                return Ok(false);
            }
            Err(e) => {
                warn!("Update of patient {} failed: {}", command.id, e);
                return Ok(false);
            }
        };

        let patient = Patient {
            id: command.id,
            first_name: command.first_name,
            last_name: command.last_name,
            date_of_birth: command.date_of_birth,
            phone_number: command.phone_number,
            email: command.email,
            address: command.address,
            medical_history: command.medical_history,
            registered_at: existing.registered_at,
        };

        match self.store.update_patient(&patient).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                warn!("Update of patient {} failed: {}", command.id, e);
                Ok(false)
            }
        }
    }

    /// Remove a patient and, with it, any appointments on file. Returns
    /// whether a record was removed.
    pub async fn delete_patient(&self, id: i64) -> DomainResult<bool> {
        info!("Deleting patient {}", id);

        let deleted = self.store.delete_patient(id).await?;
        if !deleted {
            warn!("No patient to delete with id {}", id);
        }
        Ok(deleted)
    }
}
