// Copyright 2025 Cowboy AI, LLC.

//! Status definitions and confirmation actions
//!
//! A status is an admin-authored node in the order/redemption status graph.
//! Each node optionally carries a confirmation action - the behavior that
//! runs when the owner of a purchase or redemption confirms the current
//! status. The three action kinds form a closed sum type so that dispatch
//! in the transition coordinator is exhaustively checked at compile time.

use crate::errors::{WorkflowError, WorkflowResult};
use crate::identifiers::StatusId;
use serde::{Deserialize, Serialize};

/// Label used for the confirming action when the payload does not name one
pub const DEFAULT_CONFIRMATION_PROMPT: &str = "Confirm";

/// The behavior triggered when a user confirms the current status
///
/// Exactly one kind applies per status. `ChangeStatus` edges reference
/// their target by id and are resolved through the store, which keeps
/// cycle detection a graph walk over ids rather than a pointer chase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConfirmationAction {
    /// Record the confirmation and stay on the current status
    None,

    /// Record the confirmation and start a timer of the given length
    ///
    /// The timer end is stored on the instance; nothing in this crate
    /// consumes it later (see `WorkflowInstance::timer_end_time`).
    #[serde(rename_all = "camelCase")]
    StartTimer {
        /// Timer length in minutes, must be positive
        minutes: u32,
    },

    /// Move the instance to another status upon confirmation
    #[serde(rename_all = "camelCase")]
    ChangeStatus {
        /// Status the instance advances to
        target_status_id: StatusId,
    },
}

impl ConfirmationAction {
    /// Whether this action ends a confirmation chain
    ///
    /// `None` and `StartTimer` are terminal links; only `ChangeStatus`
    /// continues a chain.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationAction::ChangeStatus { .. })
    }

    /// The chain target, if this action continues a chain
    pub fn chain_target(&self) -> Option<StatusId> {
        match self {
            ConfirmationAction::ChangeStatus { target_status_id } => Some(*target_status_id),
            _ => None,
        }
    }
}

/// An admin-authored node in the status graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNode {
    /// Stable identity of this status
    pub id: StatusId,

    /// Unique human label, e.g. "pending" or "completed"
    pub name: String,

    /// Whether new workflow instances start on this status
    ///
    /// At most one node holds this flag at any time; the store swaps it
    /// atomically when another node claims it.
    pub is_default: bool,

    /// Display text shown to the purchaser
    pub description: String,

    /// Display color, no behavioral effect
    pub color: String,

    /// Whether the owner must confirm this status
    pub requires_confirmation: bool,

    /// Label for the confirming action
    pub confirmation_prompt: String,

    /// What confirming this status does
    ///
    /// Meaningful only when `requires_confirmation` is true; stored as
    /// `None` otherwise.
    pub confirmation_action: ConfirmationAction,
}

/// Input payload for creating or updating a status
///
/// The id is assigned by the store on create and preserved on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNodePayload {
    /// Unique human label
    pub name: String,
    /// Whether new workflow instances start on this status
    #[serde(default)]
    pub is_default: bool,
    /// Display text
    pub description: String,
    /// Display color
    pub color: String,
    /// Whether the owner must confirm this status
    #[serde(default)]
    pub requires_confirmation: bool,
    /// Label for the confirming action; defaults to "Confirm"
    #[serde(default)]
    pub confirmation_prompt: Option<String>,
    /// Required when `requires_confirmation` is true, forbidden otherwise
    #[serde(default)]
    pub confirmation_action: Option<ConfirmationAction>,
}

impl StatusNodePayload {
    /// Validate the payload's internal shape
    ///
    /// Checks that do not need the rest of the graph: non-empty display
    /// fields, confirmation action presence, and positive timer length.
    /// Name uniqueness, target existence, and cycle freedom are checked
    /// by the store against the full node catalog.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Validation("status name must not be empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "status description must not be empty".to_string(),
            ));
        }
        if self.color.trim().is_empty() {
            return Err(WorkflowError::Validation("status color must not be empty".to_string()));
        }

        match (self.requires_confirmation, &self.confirmation_action) {
            (true, None) => Err(WorkflowError::MissingConfirmationAction {
                name: self.name.clone(),
            }),
            (false, Some(_)) => Err(WorkflowError::Validation(format!(
                "status '{}' does not require confirmation and must not carry a confirmation action",
                self.name
            ))),
            (_, Some(ConfirmationAction::StartTimer { minutes: 0 })) => Err(
                WorkflowError::Validation("timer length must be a positive number of minutes".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Materialize this payload into a node with the given id
    ///
    /// Callers validate first; this only fills defaults.
    pub fn into_node(self, id: StatusId) -> StatusNode {
        StatusNode {
            id,
            name: self.name,
            is_default: self.is_default,
            description: self.description,
            color: self.color,
            requires_confirmation: self.requires_confirmation,
            confirmation_prompt: self
                .confirmation_prompt
                .unwrap_or_else(|| DEFAULT_CONFIRMATION_PROMPT.to_string()),
            confirmation_action: self.confirmation_action.unwrap_or(ConfirmationAction::None),
        }
    }
}
