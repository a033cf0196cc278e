// Copyright 2025 Cowboy AI, LLC.

//! Workflow instances and their storage
//!
//! A workflow instance is the mutable status sub-document embedded in a
//! purchase or a reward redemption. It is created together with its owning
//! aggregate, mutated exclusively through the transition coordinator, and
//! destroyed only with its owner. There is no generic "set any field"
//! path.

use crate::entity::AggregateRoot;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::identifiers::{InstanceId, OwnerId, StatusId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Which aggregate a workflow instance is embedded in
///
/// Purchases and reward redemptions carry an identically shaped status
/// sub-document; the kind only distinguishes the two call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    /// The instance belongs to a purchase
    Purchase,
    /// The instance belongs to a reward redemption
    RewardRedeem,
}

/// The embedded status sub-document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    /// Reference to the current status; required at all times
    pub status_id: StatusId,

    /// Whether the current status's confirmation step has already run
    pub confirmed: bool,

    /// When the current status was confirmed
    pub confirmed_at: Option<DateTime<Utc>>,

    /// When the status last changed
    ///
    /// `None` means never explicitly changed since creation; assigning
    /// the default at creation does not count as a change.
    pub status_changed_at: Option<DateTime<Utc>>,

    /// Read receipt for the last status change
    ///
    /// Flipped to true only by an explicit mark-viewed call.
    pub status_change_viewed: bool,

    /// End of the timer started by a `StartTimer` confirmation
    ///
    /// Recorded as data; nothing in this crate reads it back to advance
    /// the status when it elapses.
    pub timer_end_time: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    /// A fresh sub-document on the given status
    pub fn new(status_id: StatusId) -> Self {
        Self {
            status_id,
            confirmed: false,
            confirmed_at: None,
            status_changed_at: None,
            status_change_viewed: false,
            timer_end_time: None,
        }
    }

    /// Whether this instance counts as an unread status change
    pub fn is_unread(&self) -> bool {
        !self.status_change_viewed && self.status_changed_at.is_some()
    }
}

/// A workflow instance together with its ownership and version
///
/// This is the unit the repository stores: the embedded sub-document plus
/// the identity of the owning aggregate's account and the aggregate kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    /// Identity of this instance
    pub id: InstanceId,

    /// Account that owns the purchase or redemption
    pub owner: OwnerId,

    /// Whether a purchase or a redemption embeds this instance
    pub kind: OwnerKind,

    /// The status sub-document
    pub workflow: WorkflowInstance,

    /// Version for optimistic concurrency, bumped on every mutation
    version: u64,
}

impl InstanceRecord {
    /// Create a record for a new owning aggregate
    pub fn new(owner: OwnerId, kind: OwnerKind, status_id: StatusId) -> Self {
        Self {
            id: InstanceId::new(),
            owner,
            kind,
            workflow: WorkflowInstance::new(status_id),
            version: 0,
        }
    }
}

impl AggregateRoot for InstanceRecord {
    type Id = InstanceId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}

/// Storage for workflow instances
///
/// `update` is the only mutation path after insertion. It must apply the
/// closure as one atomic read-modify-write against the record: the read
/// of `confirmed` and the write that flips it may never be separated by
/// a concurrent update on the same instance. Two concurrent confirms
/// therefore cannot both succeed - the second observes the flag the
/// first set.
pub trait InstanceRepository: Send + Sync {
    /// Store a newly created record
    fn insert(&self, record: InstanceRecord) -> WorkflowResult<()>;

    /// Look up a record by id
    fn get(&self, id: InstanceId) -> Option<InstanceRecord>;

    /// All records belonging to an owner
    fn by_owner(&self, owner: OwnerId) -> Vec<InstanceRecord>;

    /// Atomically apply `mutate` to the record with the given id
    ///
    /// When the closure fails the record is left exactly as it was.
    /// On success the version is bumped and the updated record returned.
    fn update(
        &self,
        id: InstanceId,
        mutate: &mut dyn FnMut(&mut InstanceRecord) -> WorkflowResult<()>,
    ) -> WorkflowResult<InstanceRecord>;
}

/// In-memory instance storage
///
/// The write lock makes each `update` a single atomic step, which is the
/// conditional-update guarantee the confirm path relies on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInstanceRepository {
    records: Arc<RwLock<HashMap<InstanceId, InstanceRecord>>>,
}

impl InMemoryInstanceRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl InstanceRepository for InMemoryInstanceRepository {
    fn insert(&self, record: InstanceRecord) -> WorkflowResult<()> {
        self.records.write().unwrap().insert(record.id, record);
        Ok(())
    }

    fn get(&self, id: InstanceId) -> Option<InstanceRecord> {
        self.records.read().unwrap().get(&id).cloned()
    }

    fn by_owner(&self, owner: OwnerId) -> Vec<InstanceRecord> {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect()
    }

    fn update(
        &self,
        id: InstanceId,
        mutate: &mut dyn FnMut(&mut InstanceRecord) -> WorkflowResult<()>,
    ) -> WorkflowResult<InstanceRecord> {
        let mut guard = self.records.write().unwrap();
        let stored = guard
            .get_mut(&id)
            .ok_or(WorkflowError::InstanceNotFound(id))?;

        // Mutate a working copy so a failed closure leaves the record
        // exactly as it was.
        let mut working = stored.clone();
        mutate(&mut working)?;
        working.increment_version();

        *stored = working.clone();
        Ok(working)
    }
}
