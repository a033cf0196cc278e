// Copyright 2025 Cowboy AI, LLC.

//! Domain events emitted by the transition coordinator
//!
//! Downstream effects of a status change - stock decrement, gold and XP
//! awards, notification fan-out - are observers of these events, never
//! inputs to the workflow itself.

use crate::identifiers::{InstanceId, StatusId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// What caused a status change on an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeTrigger {
    /// An administrator force-set the status
    AdminOverride,
    /// A confirmed `ChangeStatus` action advanced the instance
    ChainedConfirmation,
}

/// Events describing workflow instance mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkflowEvent {
    /// A new instance was created on the default status
    #[serde(rename_all = "camelCase")]
    DefaultAssigned {
        /// The created instance
        instance_id: InstanceId,
        /// The default status it starts on
        status_id: StatusId,
        /// When the instance was created
        at: DateTime<Utc>,
    },

    /// The instance moved to a different status
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        /// The mutated instance
        instance_id: InstanceId,
        /// Status before the change
        from: StatusId,
        /// Status after the change
        to: StatusId,
        /// Whether an admin or a confirmed chain caused the change
        trigger: ChangeTrigger,
        /// When the change happened
        at: DateTime<Utc>,
    },

    /// The current status was confirmed without leaving it
    #[serde(rename_all = "camelCase")]
    StatusConfirmed {
        /// The confirmed instance
        instance_id: InstanceId,
        /// The status that was confirmed
        status_id: StatusId,
        /// Timer end recorded by a `StartTimer` action, if any
        timer_end_time: Option<DateTime<Utc>>,
        /// When the confirmation happened
        at: DateTime<Utc>,
    },

    /// The owner acknowledged a status change
    #[serde(rename_all = "camelCase")]
    StatusChangeViewed {
        /// The acknowledged instance
        instance_id: InstanceId,
        /// When it was acknowledged
        at: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// Name of the event variant, for logging and test assertions
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::DefaultAssigned { .. } => "DefaultAssigned",
            WorkflowEvent::StatusChanged { .. } => "StatusChanged",
            WorkflowEvent::StatusConfirmed { .. } => "StatusConfirmed",
            WorkflowEvent::StatusChangeViewed { .. } => "StatusChangeViewed",
        }
    }

    /// The instance this event concerns
    pub fn instance_id(&self) -> InstanceId {
        match self {
            WorkflowEvent::DefaultAssigned { instance_id, .. }
            | WorkflowEvent::StatusChanged { instance_id, .. }
            | WorkflowEvent::StatusConfirmed { instance_id, .. }
            | WorkflowEvent::StatusChangeViewed { instance_id, .. } => *instance_id,
        }
    }
}

/// Event publisher trait for the coordinator to emit events
pub trait EventPublisher: Send + Sync {
    /// Publish a workflow event
    fn publish(&self, event: WorkflowEvent) -> Result<(), String>;
}

/// Mock event publisher for testing
#[derive(Clone, Default)]
pub struct MockEventPublisher {
    published: Arc<RwLock<Vec<WorkflowEvent>>>,
}

impl MockEventPublisher {
    /// Create a new mock event publisher for testing
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all published events for verification in tests
    pub fn published(&self) -> Vec<WorkflowEvent> {
        self.published.read().unwrap().clone()
    }

    /// Get the published event type names, in order
    pub fn event_types(&self) -> Vec<&'static str> {
        self.published
            .read()
            .unwrap()
            .iter()
            .map(|e| e.event_type())
            .collect()
    }
}

impl EventPublisher for MockEventPublisher {
    fn publish(&self, event: WorkflowEvent) -> Result<(), String> {
        self.published.write().unwrap().push(event);
        Ok(())
    }
}
