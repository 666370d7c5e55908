//! # Registry Core
//!
//! Core business logic for the patient registry.
//!
//! This crate contains pure data operations and document storage:
//! - Patient validation, creation, partial update and deletion
//! - Sharded JSON document storage under `PATIENT_DATA_DIR`, or an in-memory store
//!
//! **No API concerns**: HTTP servers, routing and response shapes belong in `api-rest` or
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod service;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, StoreKind};
pub use error::{ErrorKind, PatientError, PatientResult};
pub use patient::{Address, Patient, PatientStatus};
pub use service::PatientService;
pub use store::{open_store, FileStore, MemoryStore, PatientStore};
pub use validation::{
    AddressRequest, AddressUpdateRequest, CreatePatientRequest, UpdatePatientRequest,
    UpdatePayload, ValidationError,
};
