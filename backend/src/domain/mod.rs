//! # Domain Module
//!
//! Business logic for the clinic manager, independent of storage backend
//! and HTTP framework.
//!
//! - **patient_service**: registration with the email-uniqueness rule,
//!   lookup, listing, substring search, full-record update, deletion
//! - **appointment_service**: scheduling visits against existing patients
//! - **commands**: internal command types the REST layer maps DTOs onto
//! - **models**: the `Patient` and `Appointment` entities
//! - **errors**: the typed error surface shared by services and adapters

pub mod appointment_service;
pub mod commands;
pub mod errors;
pub mod models;
pub mod patient_service;

pub use appointment_service::AppointmentService;
pub use errors::{DomainError, DomainResult};
pub use patient_service::PatientService;
