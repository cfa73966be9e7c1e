use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::commands::appointments::ScheduleAppointmentCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::appointment::{
    Appointment, NewAppointment, DEFAULT_APPOINTMENT_STATUS,
};
use crate::storage::traits::{AppointmentStore, PatientStore};

/// Manages scheduled visits. Appointments always hang off an existing
/// patient; beyond the default status there is no transition logic.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
    patients: Arc<dyn PatientStore>,
}

impl AppointmentService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, patients: Arc<dyn PatientStore>) -> Self {
        Self {
            appointments,
            patients,
        }
    }

    /// Schedule a visit for an existing patient.
    ///
    /// Fails with [`DomainError::PatientNotFound`] when the referenced
    /// patient does not exist.
    pub async fn schedule_appointment(
        &self,
        command: ScheduleAppointmentCommand,
    ) -> DomainResult<Appointment> {
        info!(
            "Scheduling appointment for patient {} with {}",
            command.patient_id, command.doctor_name
        );

        if self.patients.get_patient(command.patient_id).await?.is_none() {
            warn!("No patient with id {}", command.patient_id);
            return Err(DomainError::PatientNotFound(command.patient_id));
        }

        let candidate = NewAppointment {
            patient_id: command.patient_id,
            doctor_name: command.doctor_name,
            scheduled_at: command.scheduled_at,
            reason: command.reason,
            status: command
                .status
                .unwrap_or_else(|| DEFAULT_APPOINTMENT_STATUS.to_string()),
            notes: command.notes,
            created_at: Utc::now(),
        };

        let id = self.appointments.insert_appointment(&candidate).await?;
        info!("Scheduled appointment {} for patient {}", id, candidate.patient_id);

        Ok(candidate.into_appointment(id))
    }

    /// Look up an appointment by identifier. A miss is not an error.
    pub async fn get_appointment(&self, id: i64) -> DomainResult<Option<Appointment>> {
        self.appointments.get_appointment(id).await
    }

    /// A patient's appointments, earliest first.
    pub async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> DomainResult<Vec<Appointment>> {
        self.appointments.list_appointments_for_patient(patient_id).await
    }

    /// Remove an appointment. Returns whether a record was removed.
    pub async fn delete_appointment(&self, id: i64) -> DomainResult<bool> {
        info!("Deleting appointment {}", id);
        self.appointments.delete_appointment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::patients::RegisterPatientCommand;
    use crate::domain::patient_service::PatientService;
    use crate::storage::memory::MemoryStore;
    use chrono::NaiveDate;

    fn setup_test() -> (PatientService, AppointmentService) {
        let store = Arc::new(MemoryStore::new());
        let patient_service = PatientService::new(store.clone());
        let appointment_service = AppointmentService::new(store.clone(), store);
        (patient_service, appointment_service)
    }

    async fn register_patient(service: &PatientService) -> i64 {
        service
            .register_patient(RegisterPatientCommand {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
                phone_number: "555-123-4567".to_string(),
                email: "john.doe@test.com".to_string(),
                address: "123 Test Street".to_string(),
                medical_history: None,
            })
            .await
            .unwrap()
            .id
    }

    fn schedule_command(patient_id: i64, scheduled_at: &str) -> ScheduleAppointmentCommand {
        ScheduleAppointmentCommand {
            patient_id,
            doctor_name: "Dr. Smith".to_string(),
            scheduled_at: scheduled_at.parse().unwrap(),
            reason: "Annual checkup".to_string(),
            status: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_schedule_defaults_status() {
        let (patients, appointments) = setup_test();
        let patient_id = register_patient(&patients).await;

        let scheduled = appointments
            .schedule_appointment(schedule_command(patient_id, "2025-10-01T09:30:00Z"))
            .await
            .unwrap();
        assert_eq!(scheduled.status, DEFAULT_APPOINTMENT_STATUS);
        assert_eq!(scheduled.patient_id, patient_id);

        let stored = appointments.get_appointment(scheduled.id).await.unwrap().unwrap();
        assert_eq!(stored, scheduled);
    }

    #[tokio::test]
    async fn test_schedule_keeps_explicit_status() {
        let (patients, appointments) = setup_test();
        let patient_id = register_patient(&patients).await;

        let mut command = schedule_command(patient_id, "2025-10-01T09:30:00Z");
        command.status = Some("Confirmed".to_string());
        command.notes = Some("Bring referral letter".to_string());

        let scheduled = appointments.schedule_appointment(command).await.unwrap();
        assert_eq!(scheduled.status, "Confirmed");
        assert_eq!(scheduled.notes.as_deref(), Some("Bring referral letter"));
    }

    #[tokio::test]
    async fn test_schedule_requires_existing_patient() {
        let (_patients, appointments) = setup_test();

        let result = appointments
            .schedule_appointment(schedule_command(999, "2025-10-01T09:30:00Z"))
            .await;
        assert!(matches!(result, Err(DomainError::PatientNotFound(999))));
    }

    #[tokio::test]
    async fn test_list_for_patient_earliest_first() {
        let (patients, appointments) = setup_test();
        let patient_id = register_patient(&patients).await;

        appointments
            .schedule_appointment(schedule_command(patient_id, "2025-10-02T14:00:00Z"))
            .await
            .unwrap();
        appointments
            .schedule_appointment(schedule_command(patient_id, "2025-10-01T09:30:00Z"))
            .await
            .unwrap();

        let listed = appointments
            .list_appointments_for_patient(patient_id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].scheduled_at < listed[1].scheduled_at);
    }

    #[tokio::test]
    async fn test_delete_appointment() {
        let (patients, appointments) = setup_test();
        let patient_id = register_patient(&patients).await;
        let scheduled = appointments
            .schedule_appointment(schedule_command(patient_id, "2025-10-01T09:30:00Z"))
            .await
            .unwrap();

        assert!(appointments.delete_appointment(scheduled.id).await.unwrap());
        assert!(!appointments.delete_appointment(scheduled.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_patient_removes_appointments() {
        let (patients, appointments) = setup_test();
        let patient_id = register_patient(&patients).await;
        appointments
            .schedule_appointment(schedule_command(patient_id, "2025-10-01T09:30:00Z"))
            .await
            .unwrap();

        assert!(patients.delete_patient(patient_id).await.unwrap());
        assert!(appointments
            .list_appointments_for_patient(patient_id)
            .await
            .unwrap()
            .is_empty());
    }
}
