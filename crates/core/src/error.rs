use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create patient directory: {0}")]
    PatientDirCreation(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to delete patient directory: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize patient: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patient: {0}")]
    Deserialization(serde_json::Error),
    #[error("patient store lock poisoned")]
    LockPoisoned,
}

/// The three outcomes a caller has to tell apart when a patient operation fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The id names no record (including ids that are not well-formed).
    NotFound,
    /// The payload failed a required-field, enum or pattern check.
    ValidationFailed,
    /// The store itself failed.
    StoreError,
}

impl PatientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatientError::NotFound(_) => ErrorKind::NotFound,
            PatientError::InvalidInput(_) | PatientError::Validation(_) => {
                ErrorKind::ValidationFailed
            }
            PatientError::StorageDirCreation(_)
            | PatientError::PatientDirCreation(_)
            | PatientError::FileWrite(_)
            | PatientError::FileRead(_)
            | PatientError::FileDelete(_)
            | PatientError::Serialization(_)
            | PatientError::Deserialization(_)
            | PatientError::LockPoisoned => ErrorKind::StoreError,
        }
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
