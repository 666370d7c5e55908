//! Constants used throughout the registry core crate.
//!
//! Path and filename constants live here so the store and configuration agree on the on-disk
//! layout.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name, under the patient data directory, holding one sharded folder per patient.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Filename of the JSON document inside each patient folder.
pub const PATIENT_JSON_FILENAME: &str = "patient.json";

/// Suffix for in-flight document writes, renamed over [`PATIENT_JSON_FILENAME`] once complete.
pub const TEMP_FILE_SUFFIX: &str = "tmp";
