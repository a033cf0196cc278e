// Copyright 2025 Cowboy AI, LLC.

//! Transition coordinator
//!
//! The coordinator is the only component that mutates a workflow
//! instance's status sub-document. It exposes three operations: assign
//! the default status at creation, force-set a status (admin override),
//! and confirm the current status (user-driven, action-dependent).
//!
//! Confirm runs its whole read-check-write inside one repository update,
//! so the check of `confirmed` and the write that flips it are a single
//! atomic step. Two concurrent confirms on the same instance cannot both
//! succeed; the second observes the flag set by the first and fails with
//! `AlreadyConfirmed`.

use crate::errors::{WorkflowError, WorkflowResult};
use crate::events::{ChangeTrigger, EventPublisher, WorkflowEvent};
use crate::identifiers::{InstanceId, OwnerId, StatusId};
use crate::instance::{InstanceRecord, InstanceRepository, OwnerKind, WorkflowInstance};
use crate::status::ConfirmationAction;
use crate::store::StatusNodeStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Coordinates all status mutations on workflow instances
pub struct TransitionCoordinator {
    statuses: Arc<dyn StatusNodeStore>,
    instances: Arc<dyn InstanceRepository>,
    publisher: Arc<dyn EventPublisher>,
}

/// What a successful confirm did, recorded for event publication
enum ConfirmOutcome {
    /// Confirmation recorded, instance stays on its status
    Confirmed {
        status_id: StatusId,
        timer_end_time: Option<DateTime<Utc>>,
    },
    /// A chained action moved the instance to another status
    Chained { from: StatusId, to: StatusId },
}

impl TransitionCoordinator {
    /// Create a coordinator over the given store, repository, and publisher
    pub fn new(
        statuses: Arc<dyn StatusNodeStore>,
        instances: Arc<dyn InstanceRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            statuses,
            instances,
            publisher,
        }
    }

    /// Create a workflow instance on the current default status
    ///
    /// Called once when the owning purchase or redemption is created.
    /// Fails with `NoDefaultStatusConfigured` when the catalog has no
    /// default; the owning aggregate's creation cannot proceed.
    pub fn assign_default(&self, owner: OwnerId, kind: OwnerKind) -> WorkflowResult<InstanceRecord> {
        let default = self
            .statuses
            .default_status()
            .ok_or(WorkflowError::NoDefaultStatusConfigured)?;

        let record = InstanceRecord::new(owner, kind, default.id);
        self.instances.insert(record.clone())?;

        info!(
            instance_id = %record.id,
            status = %default.name,
            ?kind,
            "workflow instance created on default status"
        );
        self.emit(WorkflowEvent::DefaultAssigned {
            instance_id: record.id,
            status_id: default.id,
            at: Utc::now(),
        });

        Ok(record)
    }

    /// Force-set an instance's status (administrative override)
    ///
    /// Unconditional: it may be invoked regardless of the current
    /// status's confirmation state, never executes a confirmation
    /// action, and always arrives unconfirmed.
    pub fn force_set_status(
        &self,
        instance_id: InstanceId,
        status_id: StatusId,
    ) -> WorkflowResult<InstanceRecord> {
        let target = self
            .statuses
            .get(status_id)
            .ok_or(WorkflowError::TargetStatusNotFound(status_id))?;

        let now = Utc::now();
        let mut from = None;
        let record = self.instances.update(instance_id, &mut |r| {
            from = Some(r.workflow.status_id);
            apply_status_change(&mut r.workflow, target.id, now);
            Ok(())
        })?;

        let from = from.unwrap_or(status_id);
        info!(
            %instance_id,
            %from,
            to = %status_id,
            status = %target.name,
            "status force-set by admin"
        );
        self.emit(WorkflowEvent::StatusChanged {
            instance_id,
            from,
            to: status_id,
            trigger: ChangeTrigger::AdminOverride,
            at: now,
        });

        Ok(record)
    }

    /// Confirm an instance's current status
    ///
    /// Preconditions are checked in order: the current status must
    /// require confirmation (`ConfirmationNotRequired`), and the
    /// instance must not already be confirmed (`AlreadyConfirmed` - the
    /// single idempotency guarantee: a confirmation runs exactly once
    /// per status occupancy). Exactly one action branch then executes.
    ///
    /// A chained `ChangeStatus` arrives at its target unconfirmed, so a
    /// chain of confirmation-requiring statuses takes one confirm call
    /// per hop; nothing cascades within a single call.
    pub fn confirm(&self, instance_id: InstanceId) -> WorkflowResult<InstanceRecord> {
        let now = Utc::now();
        let mut outcome = None;

        let record = self.instances.update(instance_id, &mut |r| {
            let current = self
                .statuses
                .get(r.workflow.status_id)
                .ok_or(WorkflowError::StatusNotFound(r.workflow.status_id))?;

            if !current.requires_confirmation {
                return Err(WorkflowError::ConfirmationNotRequired {
                    name: current.name.clone(),
                });
            }
            if r.workflow.confirmed {
                return Err(WorkflowError::AlreadyConfirmed(instance_id));
            }

            match current.confirmation_action {
                ConfirmationAction::None => {
                    r.workflow.confirmed = true;
                    r.workflow.confirmed_at = Some(now);
                    outcome = Some(ConfirmOutcome::Confirmed {
                        status_id: current.id,
                        timer_end_time: None,
                    });
                }
                ConfirmationAction::StartTimer { minutes } => {
                    let end = now + Duration::minutes(i64::from(minutes));
                    r.workflow.timer_end_time = Some(end);
                    r.workflow.confirmed = true;
                    r.workflow.confirmed_at = Some(now);
                    outcome = Some(ConfirmOutcome::Confirmed {
                        status_id: current.id,
                        timer_end_time: Some(end),
                    });
                }
                ConfirmationAction::ChangeStatus { target_status_id } => {
                    let target = self.statuses.get(target_status_id).ok_or_else(|| {
                        // The chain target was deleted after authoring;
                        // the catalog is inconsistent with live chains.
                        warn!(
                            %instance_id,
                            status = %current.name,
                            target = %target_status_id,
                            "confirmation chain target no longer exists"
                        );
                        WorkflowError::TargetStatusNotFound(target_status_id)
                    })?;

                    let from = r.workflow.status_id;
                    apply_status_change(&mut r.workflow, target.id, now);
                    outcome = Some(ConfirmOutcome::Chained {
                        from,
                        to: target.id,
                    });
                }
            }
            Ok(())
        })?;

        match outcome {
            Some(ConfirmOutcome::Confirmed {
                status_id,
                timer_end_time,
            }) => {
                info!(%instance_id, status = %status_id, "status confirmed");
                self.emit(WorkflowEvent::StatusConfirmed {
                    instance_id,
                    status_id,
                    timer_end_time,
                    at: now,
                });
            }
            Some(ConfirmOutcome::Chained { from, to }) => {
                info!(%instance_id, %from, %to, "confirmation advanced status");
                self.emit(WorkflowEvent::StatusChanged {
                    instance_id,
                    from,
                    to,
                    trigger: ChangeTrigger::ChainedConfirmation,
                    at: now,
                });
            }
            // update succeeded, so exactly one branch ran
            None => unreachable!("confirm succeeded without an outcome"),
        }

        Ok(record)
    }

    /// Publish an event without failing the already-committed mutation
    ///
    /// Downstream effects are observers of status changes, not inputs to
    /// them; a publisher failure is logged and the operation's result
    /// stands.
    fn emit(&self, event: WorkflowEvent) {
        if let Err(e) = self.publisher.publish(event) {
            error!(error = %e, "failed to publish workflow event");
        }
    }
}

/// Replace the current status on a sub-document
///
/// Shared by the admin override and the chained transition: both arrive
/// at the new status unconfirmed, with the change recorded as unviewed.
fn apply_status_change(workflow: &mut WorkflowInstance, to: StatusId, at: DateTime<Utc>) {
    workflow.status_id = to;
    workflow.confirmed = false;
    workflow.confirmed_at = None;
    workflow.status_changed_at = Some(at);
    workflow.status_change_viewed = false;
}
