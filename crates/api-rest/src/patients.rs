//! `/api/patients` handlers.

use crate::error::{ApiError, Operation};
use crate::AppState;
use api_shared::MessageRes;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use registry_core::{
    CreatePatientRequest, Patient, PatientError, UpdatePatientRequest, ValidationError,
};

/// Decode failures (malformed JSON, wrong types, unknown fields, unknown status) are validation
/// failures, not axum's default 422.
fn decode_failure(rejection: JsonRejection) -> ValidationError {
    ValidationError::single(rejection.body_text())
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "All patients, oldest first", body = [Patient]),
        (status = 500, description = "Store failure", body = MessageRes)
    )
)]
/// List all patients in the registry
///
/// An empty registry yields an empty array.
pub(crate) async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    state
        .patient_service
        .list_all()
        .map(Json)
        .map_err(|e| ApiError::new(Operation::List, e))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "No patient has this id", body = MessageRes),
        (status = 500, description = "Store failure", body = MessageRes)
    )
)]
/// Fetch one patient by id
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    state
        .patient_service
        .get_by_id(&id)
        .map(Json)
        .map_err(|e| ApiError::new(Operation::Fetch, e))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid payload", body = MessageRes),
        (status = 500, description = "Store failure", body = MessageRes)
    )
)]
/// Create a new patient record
///
/// The store assigns the id and both timestamps. Every required field is checked before
/// anything is written.
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(
            Operation::Create,
            PatientError::Validation(decode_failure(rejection)),
        )
    })?;

    let patient = state
        .patient_service
        .create(request)
        .map_err(|e| ApiError::new(Operation::Create, e))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Invalid payload", body = MessageRes),
        (status = 404, description = "No patient has this id", body = MessageRes),
        (status = 500, description = "Store failure", body = MessageRes)
    )
)]
/// Partially update a patient
///
/// Supplied fields replace stored ones; everything else is kept. An unknown id is reported as
/// not found whatever the body holds.
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let payload = payload
        .map(|Json(request)| request)
        .map_err(decode_failure);

    state
        .patient_service
        .update(&id, payload)
        .map(Json)
        .map_err(|e| ApiError::new(Operation::Update, e))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "No patient has this id", body = MessageRes),
        (status = 500, description = "Store failure", body = MessageRes)
    )
)]
/// Permanently delete a patient
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    state
        .patient_service
        .delete(&id)
        .map_err(|e| ApiError::new(Operation::Delete, e))?;
    Ok(Json(MessageRes::new("Patient deleted successfully")))
}
