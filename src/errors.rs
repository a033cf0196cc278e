// Copyright 2025 Cowboy AI, LLC.

//! Error types for status workflow operations

use crate::identifiers::{InstanceId, StatusId};
use thiserror::Error;

/// Errors that can occur in status workflow operations
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// A chain of `ChangeStatus` confirmation actions revisits a node
    #[error("Cycle detected in confirmation chain starting at status {start}")]
    CycleDetected {
        /// Status whose outgoing chain loops back on itself
        start: StatusId,
    },

    /// A `ChangeStatus` action references a status that does not exist
    #[error("Target status not found: {0}")]
    TargetStatusNotFound(StatusId),

    /// A status requires confirmation but no action was supplied
    #[error("Status '{name}' requires confirmation but no confirmation action was provided")]
    MissingConfirmationAction {
        /// Name of the offending status
        name: String,
    },

    /// No status is flagged as the default for new instances
    #[error("No default status configured; cannot create workflow instance")]
    NoDefaultStatusConfigured,

    /// Confirm was called on a status that does not require confirmation
    #[error("Status '{name}' does not require confirmation")]
    ConfirmationNotRequired {
        /// Name of the current status
        name: String,
    },

    /// Confirm was called twice for the same status occupancy
    #[error("Workflow instance {0} is already confirmed for its current status")]
    AlreadyConfirmed(InstanceId),

    /// No workflow instance with the given id exists
    #[error("Workflow instance not found: {0}")]
    InstanceNotFound(InstanceId),

    /// No status definition with the given id exists
    #[error("Status not found: {0}")]
    StatusNotFound(StatusId),

    /// Another status already uses the requested name
    #[error("A status named '{0}' already exists")]
    DuplicateStatusName(String),

    /// A status cannot be deleted while a confirmation chain targets it
    #[error("Status {target} is the chain target of status '{referrer}' and cannot be deleted")]
    TargetStatusInUse {
        /// Status being deleted
        target: StatusId,
        /// Name of a status whose chain still points at it
        referrer: String,
    },

    /// Payload failed field validation
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for status workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    /// Check if this is a not-found error (404-class)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WorkflowError::InstanceNotFound(_)
                | WorkflowError::StatusNotFound(_)
                | WorkflowError::TargetStatusNotFound(_)
        )
    }

    /// Check if this is a validation or invariant error (400-class)
    ///
    /// These are rejected before any mutation and are recoverable by
    /// retrying with a corrected payload.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_)
                | WorkflowError::CycleDetected { .. }
                | WorkflowError::MissingConfirmationAction { .. }
                | WorkflowError::DuplicateStatusName(_)
                | WorkflowError::TargetStatusInUse { .. }
        )
    }

    /// Check if this is an expected state conflict
    ///
    /// Callers should treat these as "no-op, already in the state you
    /// wanted" rather than as failures requiring a retry.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            WorkflowError::AlreadyConfirmed(_) | WorkflowError::ConfirmationNotRequired { .. }
        )
    }
}
