//! Request payloads and their validation.
//!
//! Payloads arrive loosely typed: every field is optional so that a missing field is reported
//! as a readable validation problem rather than a decode failure. Unknown fields are rejected at
//! decode time. Validation collects every problem in the payload before failing, and produces
//! either a [`PatientDraft`] (create) or a [`PatientChanges`] (update).

use crate::patient::{Address, AddressChanges, PatientChanges, PatientDraft, PatientStatus};
use chrono::{DateTime, NaiveDate, Utc};
use registry_types::{NonEmptyText, ZipCode};
use registry_uuid::ShardableUuid;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One or more problems found in a patient payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", .problems.join("; "))]
pub struct ValidationError {
    problems: Vec<String>,
}

impl ValidationError {
    /// A validation error with a single problem, e.g. a body that could not be decoded.
    pub fn single(problem: impl Into<String>) -> Self {
        Self {
            problems: vec![problem.into()],
        }
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

/// Address as supplied by a client.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[schema(example = "54321")]
    pub zip_code: Option<String>,
}

/// Body of a create request: a patient minus id and timestamps.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "1995-10-20")]
    pub date_of_birth: Option<String>,
    pub status: Option<PatientStatus>,
    pub address: Option<AddressRequest>,
}

/// Body of an update request: any subset of patient fields.
///
/// Each field is doubly optional so an omitted field (`None`, leave unchanged) is told apart from
/// an explicit `null` (`Some(None)`). Only `middleName` may be nulled; a null on any required
/// field is a validation problem.
///
/// Clients editing a fetched record send it back whole, so the server-managed `id`, `createdAt`
/// and `updatedAt` fields are accepted. The timestamps must be well-formed but are otherwise
/// ignored; `id` must match the record being updated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePatientRequest {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub middle_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "1995-10-20")]
    pub date_of_birth: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<PatientStatus>)]
    pub status: Option<Option<PatientStatus>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<AddressUpdateRequest>)]
    pub address: Option<Option<AddressUpdateRequest>>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Address subfields of an update request, with the same omitted/null distinction.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressUpdateRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub street: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "54321")]
    pub zip_code: Option<Option<String>>,
}

/// A field that appears in the body, possibly as `null`. Absent fields fall back to `default`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An update body as received at the boundary: decoded, or the reason it could not be.
pub type UpdatePayload = Result<UpdatePatientRequest, ValidationError>;

#[derive(Default)]
struct Problems(Vec<String>);

impl Problems {
    fn required_text(&mut self, field: &str, value: Option<String>) -> Option<NonEmptyText> {
        match value {
            Some(v) => self.text(field, v),
            None => {
                self.0.push(format!("{field} is required"));
                None
            }
        }
    }

    fn text(&mut self, field: &str, value: String) -> Option<NonEmptyText> {
        match NonEmptyText::new(&value) {
            Ok(text) => Some(text),
            Err(_) => {
                self.0.push(format!("{field} cannot be empty"));
                None
            }
        }
    }

    fn zip_code(&mut self, field: &str, value: Option<String>) -> Option<ZipCode> {
        let Some(value) = value else {
            self.0.push(format!("{field} is required"));
            return None;
        };
        match ZipCode::new(&value) {
            Ok(zip) => Some(zip),
            Err(e) => {
                self.0.push(format!("{field}: {e}"));
                None
            }
        }
    }

    fn date_of_birth(&mut self, value: String) -> Option<NaiveDate> {
        match parse_date_of_birth(&value) {
            Ok(date) => Some(date),
            Err(problem) => {
                self.0.push(problem);
                None
            }
        }
    }

    /// Unwrap an update field. An explicit `null` on a required field is recorded as a problem.
    fn changed<T>(&mut self, field: &str, value: Option<Option<T>>) -> Option<T> {
        match value {
            Some(Some(v)) => Some(v),
            Some(None) => {
                self.0.push(format!("{field} cannot be null"));
                None
            }
            None => None,
        }
    }

    fn changed_text(&mut self, field: &str, value: Option<Option<String>>) -> Option<NonEmptyText> {
        self.changed(field, value).and_then(|v| self.text(field, v))
    }

    fn push(&mut self, problem: impl Into<String>) {
        self.0.push(problem.into());
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(ValidationError { problems: self.0 }),
        }
    }
}

/// Parse a date of birth given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// For a timestamp the calendar date is taken as written, in the offset it carries.
pub fn parse_date_of_birth(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("dateOfBirth must be an ISO-8601 date (YYYY-MM-DD), got: '{input}'"))
}

/// Empty or whitespace-only middle names are stored as absent.
fn normalise_middle_name(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl CreatePatientRequest {
    /// Check every required field and build the record to insert.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every missing or malformed field.
    pub fn into_draft(self) -> Result<PatientDraft, ValidationError> {
        let mut problems = Problems::default();

        let first_name = problems.required_text("firstName", self.first_name);
        let last_name = problems.required_text("lastName", self.last_name);
        let date_of_birth = match self.date_of_birth {
            Some(v) => problems.date_of_birth(v),
            None => {
                problems.push("dateOfBirth is required");
                None
            }
        };
        if self.status.is_none() {
            problems.push("status is required");
        }

        let address = match self.address {
            Some(address) => {
                let street = problems.required_text("address.street", address.street);
                let city = problems.required_text("address.city", address.city);
                let state = problems.required_text("address.state", address.state);
                let zip_code = problems.zip_code("address.zipCode", address.zip_code);
                match (street, city, state, zip_code) {
                    (Some(street), Some(city), Some(state), Some(zip_code)) => Some(Address {
                        street,
                        city,
                        state,
                        zip_code,
                    }),
                    _ => None,
                }
            }
            None => {
                problems.push("address is required");
                None
            }
        };

        let draft = match (first_name, last_name, date_of_birth, self.status, address) {
            (Some(first_name), Some(last_name), Some(date_of_birth), Some(status), Some(address)) => {
                Some(PatientDraft {
                    first_name,
                    middle_name: self.middle_name.and_then(normalise_middle_name),
                    last_name,
                    date_of_birth,
                    status,
                    address,
                })
            }
            _ => None,
        };

        problems.finish(draft)
    }
}

impl UpdatePatientRequest {
    /// Validate each supplied field on its own and build the changes to merge into record `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every malformed field, or an `id` that does not match.
    pub fn into_changes(self, id: &ShardableUuid) -> Result<PatientChanges, ValidationError> {
        let mut problems = Problems::default();

        if let Some(body_id) = &self.id {
            if *body_id != id.to_string() {
                problems.push(format!("id cannot be changed (got '{body_id}')"));
            }
        }

        let mut changes = PatientChanges {
            first_name: problems.changed_text("firstName", self.first_name),
            middle_name: self
                .middle_name
                .map(|v| v.and_then(normalise_middle_name)),
            last_name: problems.changed_text("lastName", self.last_name),
            date_of_birth: problems
                .changed("dateOfBirth", self.date_of_birth)
                .and_then(|v| problems.date_of_birth(v)),
            status: problems.changed("status", self.status),
            address: AddressChanges::default(),
        };

        if let Some(address) = problems.changed("address", self.address) {
            changes.address = AddressChanges {
                street: problems.changed_text("address.street", address.street),
                city: problems.changed_text("address.city", address.city),
                state: problems.changed_text("address.state", address.state),
                zip_code: problems
                    .changed("address.zipCode", address.zip_code)
                    .and_then(|v| problems.zip_code("address.zipCode", Some(v))),
            };
        }

        problems.finish(Some(changes))
    }
}
