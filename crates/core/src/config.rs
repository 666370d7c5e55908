//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and service.
//! Request handling never reads process-wide environment variables.

use crate::constants::{DEFAULT_PATIENT_DATA_DIR, PATIENTS_DIR_NAME};
use crate::{PatientError, PatientResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which [`PatientStore`](crate::store::PatientStore) implementation backs the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON documents on disk under the patient data directory.
    #[default]
    File,
    /// Process-local store; contents are lost on exit.
    Memory,
}

impl FromStr for StoreKind {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(PatientError::InvalidInput(format!(
                "unknown store kind '{other}' (expected 'file' or 'memory')"
            ))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::File => f.write_str("file"),
            StoreKind::Memory => f.write_str("memory"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    store_kind: StoreKind,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `patient_data_dir` is empty.
    pub fn new(patient_data_dir: PathBuf, store_kind: StoreKind) -> PatientResult<Self> {
        if patient_data_dir.as_os_str().is_empty() {
            return Err(PatientError::InvalidInput(
                "patient data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            store_kind,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }
}

/// Resolve the patient data directory from an optional string value.
///
/// `None` or a blank value falls back to [`DEFAULT_PATIENT_DATA_DIR`].
pub fn patient_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_DIR))
}

/// Parse the store kind from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StoreKind::File`].
pub fn store_kind_from_env_value(value: Option<String>) -> PatientResult<StoreKind> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<StoreKind>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}
