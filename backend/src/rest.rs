use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    AppointmentDto, AppointmentListResponse, AppointmentRequest, EmailUniqueResponse, ErrorResponse,
    FieldError, PatientDto, PatientListResponse, PatientRequest, RegisterPatientResponse,
};
use tracing::info;

use crate::domain::commands::appointments::ScheduleAppointmentCommand;
use crate::domain::commands::patients::{RegisterPatientCommand, UpdatePatientCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::appointment::Appointment;
use crate::domain::models::patient::Patient;
use crate::domain::{AppointmentService, PatientService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
    pub appointment_service: AppointmentService,
}

impl AppState {
    pub fn new(patient_service: PatientService, appointment_service: AppointmentService) -> Self {
        Self {
            patient_service,
            appointment_service,
        }
    }
}

/// Routes served under `/api`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patients", post(register_patient).get(list_patients))
        .route("/patients/email-check", get(check_email))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/patients/:id/appointments", get(list_patient_appointments))
        .route("/appointments", post(schedule_appointment))
        .route("/appointments/:id", delete(delete_appointment))
}

/// Query parameters for the patient list endpoint
#[derive(Deserialize, Debug)]
pub struct PatientListQuery {
    pub search: Option<String>,
}

/// Query parameters for the email uniqueness check
#[derive(Deserialize, Debug)]
pub struct EmailCheckQuery {
    pub email: String,
    pub exclude_id: Option<i64>,
}

/// Axum handler for POST /api/patients
pub async fn register_patient(
    State(state): State<AppState>,
    Json(request): Json<PatientRequest>,
) -> impl IntoResponse {
    info!("POST /api/patients - email: {}", request.email);

    if let Err(field_errors) = request.validate() {
        return validation_error_response(field_errors);
    }

    match state
        .patient_service
        .register_patient(register_command(request))
        .await
    {
        Ok(patient) => (
            StatusCode::CREATED,
            Json(RegisterPatientResponse { id: patient.id }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for GET /api/patients
///
/// With a `search` parameter this is a substring search; without one (or
/// with a blank term) it lists every patient, most recently registered
/// first.
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> impl IntoResponse {
    info!("GET /api/patients - query: {:?}", query);

    let term = query.search.as_deref().unwrap_or("");
    match state.patient_service.search_patients(term).await {
        Ok(patients) => (
            StatusCode::OK,
            Json(PatientListResponse {
                patients: patients.into_iter().map(patient_to_dto).collect(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for GET /api/patients/:id
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/patients/{}", id);

    match state.patient_service.get_patient(id).await {
        Ok(Some(patient)) => (StatusCode::OK, Json(patient_to_dto(patient))).into_response(),
        Ok(None) => not_found_response(id),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for PUT /api/patients/:id
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<PatientRequest>,
) -> impl IntoResponse {
    info!("PUT /api/patients/{}", id);

    if let Err(field_errors) = request.validate() {
        return validation_error_response(field_errors);
    }

    match state
        .patient_service
        .update_patient(update_command(id, request))
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found_response(id),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for DELETE /api/patients/:id
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/patients/{}", id);

    match state.patient_service.delete_patient(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found_response(id),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for GET /api/patients/email-check
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> impl IntoResponse {
    info!("GET /api/patients/email-check - email: {}", query.email);

    match state
        .patient_service
        .is_email_unique(&query.email, query.exclude_id)
        .await
    {
        Ok(unique) => (StatusCode::OK, Json(EmailUniqueResponse { unique })).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for POST /api/appointments
pub async fn schedule_appointment(
    State(state): State<AppState>,
    Json(request): Json<AppointmentRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/appointments - patient: {}",
        request.patient_id
    );

    if let Err(field_errors) = request.validate() {
        return validation_error_response(field_errors);
    }

    match state
        .appointment_service
        .schedule_appointment(schedule_command(request))
        .await
    {
        Ok(appointment) => {
            (StatusCode::CREATED, Json(appointment_to_dto(appointment))).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for GET /api/patients/:id/appointments
pub async fn list_patient_appointments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/patients/{}/appointments", id);

    match state
        .appointment_service
        .list_appointments_for_patient(id)
        .await
    {
        Ok(appointments) => (
            StatusCode::OK,
            Json(AppointmentListResponse {
                appointments: appointments.into_iter().map(appointment_to_dto).collect(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// Axum handler for DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/appointments/{}", id);

    match state.appointment_service.delete_appointment(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::message(format!("Appointment not found: {id}"))),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

fn register_command(request: PatientRequest) -> RegisterPatientCommand {
    RegisterPatientCommand {
        first_name: request.first_name,
        last_name: request.last_name,
        date_of_birth: request.date_of_birth,
        phone_number: request.phone_number,
        email: request.email,
        address: request.address,
        medical_history: request.medical_history,
    }
}

fn update_command(id: i64, request: PatientRequest) -> UpdatePatientCommand {
    UpdatePatientCommand {
        id,
        first_name: request.first_name,
        last_name: request.last_name,
        date_of_birth: request.date_of_birth,
        phone_number: request.phone_number,
        email: request.email,
        address: request.address,
        medical_history: request.medical_history,
    }
}

fn schedule_command(request: AppointmentRequest) -> ScheduleAppointmentCommand {
    ScheduleAppointmentCommand {
        patient_id: request.patient_id,
        doctor_name: request.doctor_name,
        scheduled_at: request.scheduled_at,
        reason: request.reason,
        status: request.status,
        notes: request.notes,
    }
}

fn patient_to_dto(patient: Patient) -> PatientDto {
    PatientDto {
        id: patient.id,
        first_name: patient.first_name,
        last_name: patient.last_name,
        date_of_birth: patient.date_of_birth,
        phone_number: patient.phone_number,
        email: patient.email,
        address: patient.address,
        medical_history: patient.medical_history,
        registered_at: patient.registered_at,
    }
}

fn appointment_to_dto(appointment: Appointment) -> AppointmentDto {
    AppointmentDto {
        id: appointment.id,
        patient_id: appointment.patient_id,
        doctor_name: appointment.doctor_name,
        scheduled_at: appointment.scheduled_at,
        reason: appointment.reason,
        status: appointment.status,
        notes: appointment.notes,
        created_at: appointment.created_at,
    }
}

fn validation_error_response(field_errors: Vec<FieldError>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_fields("Validation failed", field_errors)),
    )
        .into_response()
}

fn not_found_response(id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::message(format!("Patient not found: {id}"))),
    )
        .into_response()
}

/// Map a domain error onto a status code and body. Duplicate emails are
/// the only error attributed to a field; storage failures stay opaque.
fn domain_error_response(error: DomainError) -> Response {
    match error {
        DomainError::DuplicateEmail(email) => {
            let message = format!(
                "A patient with email '{email}' is already registered. Please use a different email address."
            );
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse::with_fields(
                    message.clone(),
                    vec![FieldError::new("email", message)],
                )),
            )
                .into_response()
        }
        DomainError::PatientNotFound(id) => not_found_response(id),
        DomainError::Database(e) => {
            tracing::error!("Storage failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::message("The operation could not be completed")),
            )
                .into_response()
        }
    }
}
