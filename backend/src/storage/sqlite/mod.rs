//! # SQLite Storage Adapter
//!
//! The durable storage backend: SQLite through sqlx with a shared
//! connection pool. The schema carries the invariants the domain relies
//! on — the case-insensitive unique email column and the
//! patient→appointment delete cascade.

pub mod appointment_repository;
pub mod connection;
pub mod patient_repository;

// Re-export the main types that other modules need
pub use appointment_repository::AppointmentRepository;
pub use connection::DbConnection;
pub use patient_repository::PatientRepository;
