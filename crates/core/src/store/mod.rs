//! Patient document stores.
//!
//! The [`PatientStore`] trait is the one seam between the record service and persistence. Each
//! method is a single store operation; the service never combines two of them for one request.
//!
//! Stores own id generation and timestamps:
//! - `insert` assigns a fresh id and stamps `created_at == updated_at`.
//! - `update_by_id` refreshes `updated_at`, always moving it forward.
//!
//! There is no locking across requests and no version token. Two writers racing on the same
//! record resolve last-write-wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{CoreConfig, StoreKind};
use crate::error::PatientResult;
use crate::patient::{Patient, PatientDraft};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use registry_uuid::ShardableUuid;
use std::sync::Arc;

/// Merge step run by [`PatientStore::update_by_id`] against the current document.
///
/// Returning an error aborts the update without writing anything.
pub type MergeFn<'a> = dyn Fn(&mut Patient) -> PatientResult<()> + 'a;

pub trait PatientStore: Send + Sync {
    /// Persist a new record, assigning its id and timestamps.
    fn insert(&self, draft: PatientDraft) -> PatientResult<Patient>;

    /// Every record, oldest first.
    fn find_all(&self) -> PatientResult<Vec<Patient>>;

    fn find_by_id(&self, id: &ShardableUuid) -> PatientResult<Option<Patient>>;

    /// Apply `merge` to the stored record, refresh `updated_at` and persist.
    ///
    /// Returns `Ok(None)` if no record has this id; `merge` is not called in that case.
    fn update_by_id(
        &self,
        id: &ShardableUuid,
        merge: &MergeFn<'_>,
    ) -> PatientResult<Option<Patient>>;

    /// Remove the record. Returns `false` if no record has this id.
    fn delete_by_id(&self, id: &ShardableUuid) -> PatientResult<bool>;
}

/// Open the store selected by `cfg`.
///
/// Called once at startup; the returned handle is shared by every request.
pub fn open_store(cfg: &CoreConfig) -> PatientResult<Arc<dyn PatientStore>> {
    let store: Arc<dyn PatientStore> = match cfg.store_kind() {
        StoreKind::File => Arc::new(FileStore::open(cfg)?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(kind = %cfg.store_kind(), "patient store opened");
    Ok(store)
}

/// Current time at the millisecond precision stored in documents.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Next `updated_at` for a record last updated at `previous`.
///
/// Strictly greater than `previous`, bumped by 1 ms when the clock has not moved past it.
pub(crate) fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now <= previous {
        previous + Duration::milliseconds(1)
    } else {
        now
    }
}
