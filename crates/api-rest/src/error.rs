//! Mapping from service failures to HTTP responses.

use api_shared::MessageRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use registry_core::{ErrorKind, PatientError};

pub const NOT_FOUND_MESSAGE: &str = "Patient not found";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// The patient operation a request was performing, used to word its failure message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Error fetching patients",
            Operation::Fetch => "Error fetching patient",
            Operation::Create => "Error creating patient",
            Operation::Update => "Error updating patient",
            Operation::Delete => "Error deleting patient",
        }
    }
}

/// A failed patient operation, rendered as `{message, error?}` with the status for its kind.
#[derive(Debug)]
pub struct ApiError {
    operation: Operation,
    source: PatientError,
}

impl ApiError {
    pub fn new(operation: Operation, source: PatientError) -> Self {
        Self { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self.source.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.source.kind() {
            ErrorKind::NotFound => {
                tracing::warn!(operation = ?self.operation, error = %self.source, "patient not found");
                MessageRes::new(NOT_FOUND_MESSAGE)
            }
            ErrorKind::ValidationFailed => {
                tracing::warn!(operation = ?self.operation, error = %self.source, "rejected patient payload");
                MessageRes::with_error(self.operation.failure_message(), self.source.to_string())
            }
            ErrorKind::StoreError => {
                tracing::error!(operation = ?self.operation, error = %self.source, "patient store failure");
                MessageRes::with_error(self.operation.failure_message(), self.source.to_string())
            }
        };
        (status, Json(body)).into_response()
    }
}
