//! Patient documents on the local filesystem.
//!
//! ## Storage Layout
//!
//! ```text
//! <patient_data_dir>/
//!   patients/
//!     <s1>/
//!       <s2>/
//!         <id>/
//!           patient.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the id.
//!
//! Documents are written to a uniquely named temporary file in the patient folder and renamed
//! over `patient.json`, so readers see either the old or the new document, never a torn one.
//! Deleting a record removes its whole folder.

use super::{next_updated_at, now, MergeFn, PatientStore};
use crate::config::CoreConfig;
use crate::constants::{PATIENT_JSON_FILENAME, TEMP_FILE_SUFFIX};
use crate::error::{PatientError, PatientResult};
use crate::patient::{Patient, PatientDraft};
use registry_uuid::ShardableUuid;
use uuid::Uuid;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON-document store rooted at `<patient_data_dir>/patients`.
#[derive(Clone, Debug)]
pub struct FileStore {
    patients_dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating the patients directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageDirCreation`] if the directory cannot be created.
    pub fn open(cfg: &CoreConfig) -> PatientResult<Self> {
        let patients_dir = cfg.patients_dir();
        fs::create_dir_all(&patients_dir).map_err(PatientError::StorageDirCreation)?;
        tracing::debug!(dir = %patients_dir.display(), "file store ready");
        Ok(Self { patients_dir })
    }

    fn patient_dir(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.patients_dir)
    }

    /// Read one document. A missing file means the record does not exist.
    fn read_document(path: &Path) -> PatientResult<Option<Patient>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PatientError::FileRead(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(PatientError::Deserialization)
    }

    /// Atomically replace the document in `patient_dir`. The directory must already exist.
    fn write_document(patient_dir: &Path, patient: &Patient) -> Result<(), WriteError> {
        let json = serde_json::to_string_pretty(patient)
            .map_err(|e| WriteError::Other(PatientError::Serialization(e)))?;

        let temp_path = patient_dir.join(format!(
            "{PATIENT_JSON_FILENAME}.{}.{TEMP_FILE_SUFFIX}",
            Uuid::new_v4().simple()
        ));
        fs::write(&temp_path, json).map_err(|e| match e.kind() {
            ErrorKind::NotFound => WriteError::DirectoryGone,
            _ => WriteError::Other(PatientError::FileWrite(e)),
        })?;

        if let Err(e) = fs::rename(&temp_path, patient_dir.join(PATIENT_JSON_FILENAME)) {
            let _ = fs::remove_file(&temp_path);
            return Err(match e.kind() {
                ErrorKind::NotFound => WriteError::DirectoryGone,
                _ => WriteError::Other(PatientError::FileWrite(e)),
            });
        }
        Ok(())
    }

    /// Subdirectories of `dir`, skipping plain files.
    fn child_dirs(dir: &Path) -> PatientResult<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(dir).map_err(PatientError::FileRead)? {
            let path = entry.map_err(PatientError::FileRead)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }
}

/// Outcome of a failed document write.
enum WriteError {
    /// The patient folder vanished underneath the write (a concurrent delete).
    DirectoryGone,
    Other(PatientError),
}

impl From<WriteError> for PatientError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::DirectoryGone => PatientError::FileWrite(std::io::Error::new(
                ErrorKind::NotFound,
                "patient directory removed during write",
            )),
            WriteError::Other(e) => e,
        }
    }
}

/// Remove a patient folder, retrying once if a concurrent update dropped a temporary file into
/// it mid-removal. The update's rename then fails and it reports the record as gone.
fn remove_patient_dir(
    dir: &Path,
    remove: impl Fn(&Path) -> std::io::Result<()>,
) -> std::io::Result<()> {
    match remove(dir) {
        Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
            tracing::debug!(dir = %dir.display(), "patient folder changed during delete, retrying");
            remove(dir)
        }
        result => result,
    }
}

impl PatientStore for FileStore {
    fn insert(&self, draft: PatientDraft) -> PatientResult<Patient> {
        let patient = draft.into_patient(ShardableUuid::new(), now());
        let patient_dir = self.patient_dir(&patient.id);

        fs::create_dir_all(&patient_dir).map_err(PatientError::PatientDirCreation)?;
        Self::write_document(&patient_dir, &patient)?;

        Ok(patient)
    }

    fn find_all(&self) -> PatientResult<Vec<Patient>> {
        let mut patients = Vec::new();

        for s1 in Self::child_dirs(&self.patients_dir)? {
            for s2 in Self::child_dirs(&s1)? {
                for patient_dir in Self::child_dirs(&s2)? {
                    // Folders without a document are inserts still in flight.
                    if let Some(patient) =
                        Self::read_document(&patient_dir.join(PATIENT_JSON_FILENAME))?
                    {
                        patients.push(patient);
                    }
                }
            }
        }

        patients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(patients)
    }

    fn find_by_id(&self, id: &ShardableUuid) -> PatientResult<Option<Patient>> {
        Self::read_document(&self.patient_dir(id).join(PATIENT_JSON_FILENAME))
    }

    fn update_by_id(
        &self,
        id: &ShardableUuid,
        merge: &MergeFn<'_>,
    ) -> PatientResult<Option<Patient>> {
        let patient_dir = self.patient_dir(id);
        let Some(mut patient) = Self::read_document(&patient_dir.join(PATIENT_JSON_FILENAME))?
        else {
            return Ok(None);
        };

        let previous = patient.updated_at;
        merge(&mut patient)?;
        patient.updated_at = next_updated_at(previous);

        match Self::write_document(&patient_dir, &patient) {
            Ok(()) => Ok(Some(patient)),
            Err(WriteError::DirectoryGone) => {
                tracing::debug!(%id, "patient deleted while being updated");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_id(&self, id: &ShardableUuid) -> PatientResult<bool> {
        match remove_patient_dir(&self.patient_dir(id), |dir| fs::remove_dir_all(dir)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PatientError::FileDelete(e)),
        }
    }
}
