use thiserror::Error;

/// Errors raised by the domain services.
///
/// `DuplicateEmail` is the only explicit business-rule failure; callers can
/// attribute it to the email field. Everything the database throws at us
/// beyond that is wrapped opaquely and reported as a generic failure.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("a patient with email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("patient not found: {0}")]
    PatientNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
