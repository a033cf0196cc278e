//! # Storefront Workflow
//!
//! Status workflow engine for a virtual-goods storefront. Every purchase
//! and every reward redemption carries a mutable status that is not a
//! hardcoded enum but a graph of admin-authored status nodes, each
//! optionally carrying a confirmation action: stay put, start a timer, or
//! chain to another named status.
//!
//! The crate guarantees three things the storefront's correctness hangs on:
//!
//! 1. **No cycles**: the admin-editable `ChangeStatus` graph is
//!    re-validated globally on every mutation, so a confirmation can never
//!    loop forever.
//! 2. **At-most-once confirmation**: a status occupancy is confirmed
//!    exactly once; the check and the flag flip are one atomic update.
//! 3. **Exhaustive action dispatch**: the three confirmation kinds are a
//!    closed sum type, so adding or auditing a kind is a compile-time
//!    checked exercise.
//!
//! ## Components
//!
//! - [`StatusNodeStore`] / [`InMemoryStatusStore`]: the persisted status
//!   catalog with cycle validation and the atomic default swap
//! - [`TransitionCoordinator`]: the only writer of a workflow instance's
//!   status sub-document (assign default, force-set, confirm)
//! - [`NotificationTracker`]: unread status change queries and mark-viewed
//! - [`WorkflowEvent`] / [`EventPublisher`]: how downstream effects
//!   (stock, gold, XP) observe status changes without being part of them

#![warn(missing_docs)]

mod chain;
mod coordinator;
mod entity;
mod errors;
mod events;
mod identifiers;
mod instance;
mod notifications;
mod status;
mod store;

// Re-export core types
pub use chain::{validate_chains, walk_chain};
pub use coordinator::TransitionCoordinator;
pub use entity::{AggregateRoot, EntityId, InstanceMarker, OwnerMarker, StatusMarker};
pub use errors::{WorkflowError, WorkflowResult};
pub use events::{ChangeTrigger, EventPublisher, MockEventPublisher, WorkflowEvent};
pub use identifiers::{InstanceId, OwnerId, StatusId};
pub use instance::{
    InMemoryInstanceRepository, InstanceRecord, InstanceRepository, OwnerKind, WorkflowInstance,
};
pub use notifications::NotificationTracker;
pub use status::{
    ConfirmationAction, StatusNode, StatusNodePayload, DEFAULT_CONFIRMATION_PROMPT,
};
pub use store::{InMemoryStatusStore, StatusNodeStore};
