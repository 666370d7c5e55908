//! Patient record service.
//!
//! Validates and maps request payloads, runs exactly one store operation per call, and reports
//! failures as [`PatientError`]s whose [`kind`](PatientError::kind) tells callers whether the
//! record was missing, the payload was invalid, or the store failed.

use crate::error::{PatientError, PatientResult};
use crate::patient::Patient;
use crate::store::PatientStore;
use crate::validation::{CreatePatientRequest, UpdatePayload};
use registry_uuid::ShardableUuid;
use std::sync::Arc;

/// Pure patient data operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    /// Creates a service backed by `store`.
    ///
    /// The store handle is created once at startup and shared by every clone of the service.
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    /// Every persisted patient, oldest first. An empty store yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns a store error if the store cannot be read.
    pub fn list_all(&self) -> PatientResult<Vec<Patient>> {
        self.store.find_all()
    }

    /// The patient with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record has this id, including when `id` is not a
    /// well-formed record id. Returns a store error if the lookup itself fails.
    pub fn get_by_id(&self, id: &str) -> PatientResult<Patient> {
        let record_id = parse_id(id)?;
        self.store
            .find_by_id(&record_id)?
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Validate `request` and persist it as a new patient.
    ///
    /// Identical requests create distinct records.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Validation`] without writing anything if any required field is
    /// missing or malformed, or a store error if the insert fails.
    pub fn create(&self, request: CreatePatientRequest) -> PatientResult<Patient> {
        let draft = request.into_draft()?;
        let patient = self.store.insert(draft)?;
        tracing::info!(id = %patient.id, "patient created");
        Ok(patient)
    }

    /// Merge the supplied fields of `payload` over the stored patient.
    ///
    /// The store decides existence before the payload is looked at, so an unknown id is reported
    /// as not found whatever the payload holds.
    ///
    /// # Errors
    ///
    /// - [`PatientError::NotFound`] if no record has this id; nothing is written.
    /// - [`PatientError::Validation`] if the payload is undecodable or a supplied field is
    ///   invalid; nothing is written.
    /// - A store error if reading or writing the record fails.
    pub fn update(&self, id: &str, payload: UpdatePayload) -> PatientResult<Patient> {
        let record_id = parse_id(id)?;
        let changes = payload.and_then(|request| request.into_changes(&record_id));

        let merge = |patient: &mut Patient| -> PatientResult<()> {
            let changes = changes.as_ref().map_err(|e| e.clone())?;
            patient.apply(changes);
            Ok(())
        };

        let patient = self
            .store
            .update_by_id(&record_id, &merge)?
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;
        tracing::info!(id = %patient.id, "patient updated");
        Ok(patient)
    }

    /// Remove the patient permanently.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record has this id, or a store error if the
    /// removal fails.
    pub fn delete(&self, id: &str) -> PatientResult<()> {
        let record_id = parse_id(id)?;
        if !self.store.delete_by_id(&record_id)? {
            return Err(PatientError::NotFound(id.to_string()));
        }
        tracing::info!(%id, "patient deleted");
        Ok(())
    }
}

/// An id that is not canonical cannot name any stored record, so it is reported as not found.
fn parse_id(id: &str) -> PatientResult<ShardableUuid> {
    ShardableUuid::parse(id).map_err(|_| PatientError::NotFound(id.to_string()))
}
