//! In-process patient store.

use super::{next_updated_at, now, MergeFn, PatientStore};
use crate::error::{PatientError, PatientResult};
use crate::patient::{Patient, PatientDraft};
use registry_uuid::ShardableUuid;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Insertion-ordered store held in memory. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patients: RwLock<Vec<Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PatientResult<RwLockReadGuard<'_, Vec<Patient>>> {
        self.patients.read().map_err(|_| PatientError::LockPoisoned)
    }

    fn write(&self) -> PatientResult<RwLockWriteGuard<'_, Vec<Patient>>> {
        self.patients.write().map_err(|_| PatientError::LockPoisoned)
    }
}

impl PatientStore for MemoryStore {
    fn insert(&self, draft: PatientDraft) -> PatientResult<Patient> {
        let patient = draft.into_patient(ShardableUuid::new(), now());
        self.write()?.push(patient.clone());
        Ok(patient)
    }

    fn find_all(&self) -> PatientResult<Vec<Patient>> {
        Ok(self.read()?.clone())
    }

    fn find_by_id(&self, id: &ShardableUuid) -> PatientResult<Option<Patient>> {
        Ok(self.read()?.iter().find(|p| &p.id == id).cloned())
    }

    fn update_by_id(
        &self,
        id: &ShardableUuid,
        merge: &MergeFn<'_>,
    ) -> PatientResult<Option<Patient>> {
        let mut patients = self.write()?;
        let Some(slot) = patients.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };

        let mut updated = slot.clone();
        merge(&mut updated)?;
        updated.updated_at = next_updated_at(slot.updated_at);
        *slot = updated.clone();
        Ok(Some(updated))
    }

    fn delete_by_id(&self, id: &ShardableUuid) -> PatientResult<bool> {
        let mut patients = self.write()?;
        let before = patients.len();
        patients.retain(|p| &p.id != id);
        Ok(patients.len() != before)
    }
}
