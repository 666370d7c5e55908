//! The patient entity and the shapes used to create and change it.
//!
//! [`Patient`] is the persisted document. [`PatientDraft`] is a fully validated record that has
//! not been assigned an id or timestamps yet; [`PatientChanges`] is a validated partial update.
//! Both are produced by [`crate::validation`] and consumed by the store.

use chrono::{DateTime, NaiveDate, Utc};
use registry_types::{NonEmptyText, ZipCode};
use registry_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a patient sits in the onboarding funnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PatientStatus {
    Inquiry,
    Onboarding,
    Active,
    Churned,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Inquiry,
        PatientStatus::Onboarding,
        PatientStatus::Active,
        PatientStatus::Churned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Inquiry => "Inquiry",
            PatientStatus::Onboarding => "Onboarding",
            PatientStatus::Active => "Active",
            PatientStatus::Churned => "Churned",
        }
    }
}

impl std::str::FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!("status must be one of Inquiry, Onboarding, Active, Churned, got: '{s}'")
            })
    }
}

/// Postal address. Always complete once persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[schema(value_type = String, example = "789 Pine St")]
    pub street: NonEmptyText,
    #[schema(value_type = String, example = "Elsewhere")]
    pub city: NonEmptyText,
    #[schema(value_type = String, example = "TX")]
    pub state: NonEmptyText,
    #[schema(value_type = String, example = "54321")]
    pub zip_code: ZipCode,
}

/// A persisted patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[schema(value_type = String, example = "550e8400e29b41d4a716446655440000")]
    pub id: ShardableUuid,
    #[schema(value_type = String, example = "Alice")]
    pub first_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[schema(value_type = String, example = "Johnson")]
    pub last_name: NonEmptyText,
    #[schema(value_type = String, format = Date, example = "1995-10-20")]
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub address: Address,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Merge `changes` over this record. Fields absent from `changes` are left as they are.
    ///
    /// Never touches `id`, `created_at` or `updated_at`; refreshing `updated_at` is the store's
    /// job.
    pub fn apply(&mut self, changes: &PatientChanges) {
        if let Some(first_name) = &changes.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(middle_name) = &changes.middle_name {
            self.middle_name = middle_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }

        let address = &changes.address;
        if let Some(street) = &address.street {
            self.address.street = street.clone();
        }
        if let Some(city) = &address.city {
            self.address.city = city.clone();
        }
        if let Some(state) = &address.state {
            self.address.state = state.clone();
        }
        if let Some(zip_code) = &address.zip_code {
            self.address.zip_code = zip_code.clone();
        }
    }
}

/// A validated patient awaiting insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientDraft {
    pub first_name: NonEmptyText,
    pub middle_name: Option<String>,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub address: Address,
}

impl PatientDraft {
    /// Stamp the draft with its store-assigned id and creation time.
    pub fn into_patient(self, id: ShardableUuid, created_at: DateTime<Utc>) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            status: self.status,
            address: self.address,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A validated partial update. `None` means "leave unchanged".
///
/// `middle_name` is doubly optional: `Some(None)` clears the stored middle name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientChanges {
    pub first_name: Option<NonEmptyText>,
    pub middle_name: Option<Option<String>>,
    pub last_name: Option<NonEmptyText>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: Option<PatientStatus>,
    pub address: AddressChanges,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressChanges {
    pub street: Option<NonEmptyText>,
    pub city: Option<NonEmptyText>,
    pub state: Option<NonEmptyText>,
    pub zip_code: Option<ZipCode>,
}
