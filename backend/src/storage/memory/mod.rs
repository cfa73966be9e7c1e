//! # In-Process Storage Adapter
//!
//! Keeps every record in a Mutex-guarded structure behind the same traits
//! as the SQLite adapter. Nothing survives a restart; intended for tests
//! and ephemeral runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::appointment::{Appointment, NewAppointment};
use crate::domain::models::patient::{NewPatient, Patient};
use crate::storage::traits::{AppointmentStore, PatientStore};

#[derive(Debug, Default)]
struct MemoryInner {
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    next_patient_id: i64,
    next_appointment_id: i64,
}

/// Mutex-guarded in-process store implementing both storage traits.
///
/// The email invariant is upheld the same way the SQLite schema does it:
/// an insert against an existing email (ASCII case-insensitive, matching
/// NOCASE) is rejected with `DuplicateEmail`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

fn most_recent_first(patients: &mut [Patient]) {
    patients.sort_by(|a, b| (b.registered_at, b.id).cmp(&(a.registered_at, a.id)));
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn insert_patient(&self, patient: &NewPatient) -> DomainResult<i64> {
        let mut inner = self.lock();

        if inner
            .patients
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&patient.email))
        {
            return Err(DomainError::DuplicateEmail(patient.email.clone()));
        }

        inner.next_patient_id += 1;
        let id = inner.next_patient_id;
        inner.patients.push(patient.clone().into_patient(id));
        Ok(id)
    }

    async fn get_patient(&self, id: i64) -> DomainResult<Option<Patient>> {
        let inner = self.lock();
        Ok(inner.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn get_patient_by_email(&self, email: &str) -> DomainResult<Option<Patient>> {
        let inner = self.lock();
        Ok(inner
            .patients
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_patients(&self) -> DomainResult<Vec<Patient>> {
        let mut patients = self.lock().patients.clone();
        most_recent_first(&mut patients);
        Ok(patients)
    }

    async fn search_patients(&self, term: &str) -> DomainResult<Vec<Patient>> {
        let lowered = term.to_lowercase();
        let mut patients: Vec<Patient> = self
            .lock()
            .patients
            .iter()
            .filter(|p| {
                p.first_name.to_lowercase().contains(&lowered)
                    || p.last_name.to_lowercase().contains(&lowered)
                    || p.email.to_lowercase().contains(&lowered)
                    || p.phone_number.contains(term)
            })
            .cloned()
            .collect();
        most_recent_first(&mut patients);
        Ok(patients)
    }

    async fn count_patients_with_email(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> DomainResult<i64> {
        let inner = self.lock();
        let count = inner
            .patients
            .iter()
            .filter(|p| p.email.eq_ignore_ascii_case(email) && Some(p.id) != exclude_id)
            .count();
        Ok(count as i64)
    }

    async fn update_patient(&self, patient: &Patient) -> DomainResult<bool> {
        let mut inner = self.lock();
        match inner.patients.iter_mut().find(|p| p.id == patient.id) {
            Some(existing) => {
                *existing = patient.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_patient(&self, id: i64) -> DomainResult<bool> {
        let mut inner = self.lock();
        let before = inner.patients.len();
        inner.patients.retain(|p| p.id != id);
        let deleted = inner.patients.len() < before;
        if deleted {
            // Mirror the SQLite cascade
            inner.appointments.retain(|a| a.patient_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert_appointment(&self, appointment: &NewAppointment) -> DomainResult<i64> {
        let mut inner = self.lock();

        // Mirror the SQLite foreign key
        if !inner.patients.iter().any(|p| p.id == appointment.patient_id) {
            return Err(DomainError::PatientNotFound(appointment.patient_id));
        }

        inner.next_appointment_id += 1;
        let id = inner.next_appointment_id;
        inner.appointments.push(appointment.clone().into_appointment(id));
        Ok(id)
    }

    async fn get_appointment(&self, id: i64) -> DomainResult<Option<Appointment>> {
        let inner = self.lock();
        Ok(inner.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> DomainResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .lock()
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| (a.scheduled_at, a.id).cmp(&(b.scheduled_at, b.id)));
        Ok(appointments)
    }

    async fn delete_appointment(&self, id: i64) -> DomainResult<bool> {
        let mut inner = self.lock();
        let before = inner.appointments.len();
        inner.appointments.retain(|a| a.id != id);
        Ok(inner.appointments.len() < before)
    }
}
