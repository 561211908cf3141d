use crate::constants::INCOMPLETE_DATA_MESSAGE;
use crate::patient::PatientId;
use chrono::NaiveDate;
use medilabo_types::TextError;

/// Patient data that cannot be assessed.
///
/// Every variant is a permanent input problem: retrying the same call yields the same error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("patient {patient_id}: birth date is missing")]
    MissingBirthDate { patient_id: PatientId },
    #[error("patient {patient_id}: invalid birth date '{value}' (expected YYYY-MM-DD)")]
    InvalidBirthDate { patient_id: PatientId, value: String },
    #[error(
        "patient {patient_id}: birth date {birth_date} is after the reference date {reference_date}"
    )]
    BirthDateInFuture {
        patient_id: PatientId,
        birth_date: NaiveDate,
        reference_date: NaiveDate,
    },
    #[error("patient {patient_id}: unrecognised gender '{value}'")]
    UnrecognisedGender { patient_id: PatientId, value: String },
}

impl ValidationError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        INCOMPLETE_DATA_MESSAGE
    }

    /// The patient whose record failed validation.
    pub fn patient_id(&self) -> PatientId {
        match self {
            ValidationError::MissingBirthDate { patient_id }
            | ValidationError::InvalidBirthDate { patient_id, .. }
            | ValidationError::BirthDateInFuture { patient_id, .. }
            | ValidationError::UnrecognisedGender { patient_id, .. } => *patient_id,
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("trigger vocabulary cannot be empty")]
    EmptyVocabulary,
    #[error("invalid trigger term: {0}")]
    InvalidTerm(#[from] TextError),
    #[error("duplicate trigger term: '{0}'")]
    DuplicateTerm(String),
    #[error("invalid decision table: {0}")]
    InvalidDecisionTable(String),
    #[error("failed to read config file {}: {source}", .path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config schema mismatch at {path}: {message}")]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("duplicate patient id {0}")]
    DuplicatePatient(PatientId),
    #[error("failed to read records file {}: {source}", .path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("records schema mismatch at {path}: {message}")]
    Parse { path: String, message: String },
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Umbrella error for operations that span records and the engine.
#[derive(Debug, thiserror::Error)]
pub enum MedilaboError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type MedilaboResult<T> = std::result::Result<T, MedilaboError>;

/// Turn a `serde_path_to_error` failure into a `(path, message)` pair.
///
/// An empty path means the failure is at the document root.
pub(crate) fn describe_path_error<E: std::fmt::Display>(
    err: serde_path_to_error::Error<E>,
) -> (String, String) {
    let path = err.path().to_string();
    let message = err.into_inner().to_string();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    (path, message)
}
