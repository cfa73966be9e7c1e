use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Field length bounds enforced before a request reaches the domain layer.
/// These match the column widths in the backing schema.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_MEDICAL_HISTORY_LEN: usize = 2000;
pub const MAX_DOCTOR_NAME_LEN: usize = 100;
pub const MAX_REASON_LEN: usize = 500;
pub const MAX_STATUS_LEN: usize = 50;
pub const MAX_NOTES_LEN: usize = 1000;

/// A validation failure attributed to a single input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Error body returned by the API. `field_errors` is populated for
/// validation failures and duplicate-email conflicts; other failures carry
/// only the top-level message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn with_fields(error: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        Self {
            error: error.into(),
            field_errors,
        }
    }
}

/// Patient payload used for both registration (POST) and full-record
/// replacement (PUT). The identifier never travels in the body; it is
/// assigned by the store on registration and taken from the path on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRequest {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 calendar date (YYYY-MM-DD)
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    /// Optional free-text medical history
    pub medical_history: Option<String>,
}

impl PatientRequest {
    /// Shape validation: presence, length bounds, and basic format checks.
    /// Business rules (email uniqueness) are the domain layer's concern.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        require_text(&mut errors, "first_name", &self.first_name, MAX_NAME_LEN);
        require_text(&mut errors, "last_name", &self.last_name, MAX_NAME_LEN);
        require_text(&mut errors, "phone_number", &self.phone_number, MAX_PHONE_LEN);
        require_text(&mut errors, "email", &self.email, MAX_EMAIL_LEN);
        require_text(&mut errors, "address", &self.address, MAX_ADDRESS_LEN);

        if !self.phone_number.trim().is_empty() && !is_valid_phone(&self.phone_number) {
            errors.push(FieldError::new(
                "phone_number",
                "phone_number is not a valid phone number",
            ));
        }
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "email is not a valid email address"));
        }
        if let Some(history) = &self.medical_history {
            check_len(&mut errors, "medical_history", history, MAX_MEDICAL_HISTORY_LEN);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A stored patient as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub medical_history: Option<String>,
    /// Set by the server at registration (RFC 3339, UTC)
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPatientResponse {
    /// Identifier assigned by the store
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientListResponse {
    pub patients: Vec<PatientDto>,
}

/// Result of the registration form's live email check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailUniqueResponse {
    pub unique: bool,
}

/// Payload for scheduling an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: i64,
    pub doctor_name: String,
    /// Appointment date and time (RFC 3339)
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    /// Defaults to "Scheduled" when omitted
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.patient_id <= 0 {
            errors.push(FieldError::new("patient_id", "patient_id is required"));
        }
        require_text(&mut errors, "doctor_name", &self.doctor_name, MAX_DOCTOR_NAME_LEN);
        require_text(&mut errors, "reason", &self.reason, MAX_REASON_LEN);
        if let Some(status) = &self.status {
            require_text(&mut errors, "status", status, MAX_STATUS_LEN);
        }
        if let Some(notes) = &self.notes {
            check_len(&mut errors, "notes", notes, MAX_NOTES_LEN);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A stored appointment as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDto {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentDto>,
}

fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
    } else {
        check_len(errors, field, value, max_len);
    }
}

fn check_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max_len: usize) {
    if value.chars().count() > max_len {
        errors.push(FieldError::new(
            field,
            format!("{field} cannot exceed {max_len} characters"),
        ));
    }
}

/// A single '@' with a non-empty name on each side and no whitespace.
/// Deliberately permissive; deliverability is not a shape concern.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// At least one digit, and nothing outside digits and common separators.
fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
}
