// Copyright 2025 Cowboy AI, LLC.

//! Unread status change tracking
//!
//! A derived read side over the `status_changed_at` / `status_change_viewed`
//! pair maintained by the transition coordinator. The tracker holds no
//! state of its own: it is a projection over the instance repository plus
//! the one mark-viewed setter.

use crate::errors::WorkflowResult;
use crate::events::{EventPublisher, WorkflowEvent};
use crate::identifiers::{InstanceId, OwnerId};
use crate::instance::{InstanceRecord, InstanceRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

/// Read-side queries over unread status changes
pub struct NotificationTracker {
    instances: Arc<dyn InstanceRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl NotificationTracker {
    /// Create a tracker over the given repository and publisher
    pub fn new(instances: Arc<dyn InstanceRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            instances,
            publisher,
        }
    }

    /// All of an owner's instances with an unviewed status change
    ///
    /// Ordered by change time descending, most recent first.
    pub fn unread_for_owner(&self, owner: OwnerId) -> Vec<InstanceRecord> {
        let mut unread: Vec<InstanceRecord> = self
            .instances
            .by_owner(owner)
            .into_iter()
            .filter(|r| r.workflow.is_unread())
            .collect();

        unread.sort_by(|a, b| b.workflow.status_changed_at.cmp(&a.workflow.status_changed_at));

        debug!(%owner, count = unread.len(), "unread status changes read");
        unread
    }

    /// How many of an owner's instances have an unviewed status change
    pub fn unread_count(&self, owner: OwnerId) -> usize {
        self.instances
            .by_owner(owner)
            .iter()
            .filter(|r| r.workflow.is_unread())
            .count()
    }

    /// Acknowledge an instance's status change
    ///
    /// Idempotent: a second call finds the flag already set and is a
    /// no-op. Fails with `InstanceNotFound` for unknown ids.
    pub fn mark_viewed(&self, instance_id: InstanceId) -> WorkflowResult<InstanceRecord> {
        let mut was_unviewed = false;
        let record = self.instances.update(instance_id, &mut |r| {
            was_unviewed = !r.workflow.status_change_viewed;
            r.workflow.status_change_viewed = true;
            Ok(())
        })?;

        if was_unviewed {
            let event = WorkflowEvent::StatusChangeViewed {
                instance_id,
                at: Utc::now(),
            };
            if let Err(e) = self.publisher.publish(event) {
                error!(error = %e, "failed to publish workflow event");
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WorkflowError;
    use crate::events::MockEventPublisher;
    use crate::identifiers::StatusId;
    use crate::instance::{InMemoryInstanceRepository, OwnerKind};
    use chrono::Duration;

    fn seeded_record(
        repo: &InMemoryInstanceRepository,
        owner: OwnerId,
        changed_minutes_ago: Option<i64>,
        viewed: bool,
    ) -> InstanceId {
        let mut record = InstanceRecord::new(owner, OwnerKind::Purchase, StatusId::new());
        record.workflow.status_changed_at =
            changed_minutes_ago.map(|m| Utc::now() - Duration::minutes(m));
        record.workflow.status_change_viewed = viewed;
        let id = record.id;
        repo.insert(record).unwrap();
        id
    }

    fn tracker(repo: Arc<InMemoryInstanceRepository>) -> (MockEventPublisher, NotificationTracker) {
        let publisher = MockEventPublisher::new();
        let tracker = NotificationTracker::new(repo, Arc::new(publisher.clone()));
        (publisher, tracker)
    }

    #[test]
    fn test_unread_excludes_viewed_and_never_changed() {
        let repo = Arc::new(InMemoryInstanceRepository::new());
        let owner = OwnerId::new();

        let unread_id = seeded_record(&repo, owner, Some(5), false);
        seeded_record(&repo, owner, Some(10), true); // viewed
        seeded_record(&repo, owner, None, false); // never changed

        let (_, tracker) = tracker(repo);
        let unread = tracker.unread_for_owner(owner);

        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, unread_id);
        assert_eq!(tracker.unread_count(owner), 1);
    }

    #[test]
    fn test_unread_is_scoped_to_owner() {
        let repo = Arc::new(InMemoryInstanceRepository::new());
        let owner = OwnerId::new();
        let other = OwnerId::new();

        seeded_record(&repo, owner, Some(1), false);
        seeded_record(&repo, other, Some(1), false);

        let (_, tracker) = tracker(repo);
        assert_eq!(tracker.unread_count(owner), 1);
        assert_eq!(tracker.unread_count(other), 1);
    }

    #[test]
    fn test_unread_ordered_most_recent_first() {
        let repo = Arc::new(InMemoryInstanceRepository::new());
        let owner = OwnerId::new();

        let oldest = seeded_record(&repo, owner, Some(60), false);
        let newest = seeded_record(&repo, owner, Some(1), false);
        let middle = seeded_record(&repo, owner, Some(30), false);

        let (_, tracker) = tracker(repo);
        let ids: Vec<InstanceId> = tracker
            .unread_for_owner(owner)
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec![newest, middle, oldest]);
    }

    #[test]
    fn test_mark_viewed_is_idempotent() {
        let repo = Arc::new(InMemoryInstanceRepository::new());
        let owner = OwnerId::new();
        let id = seeded_record(&repo, owner, Some(5), false);

        let (publisher, tracker) = tracker(repo);

        let first = tracker.mark_viewed(id).unwrap();
        assert!(first.workflow.status_change_viewed);
        assert_eq!(tracker.unread_count(owner), 0);

        // Second call is a no-op, not an error, and publishes nothing new
        let second = tracker.mark_viewed(id).unwrap();
        assert!(second.workflow.status_change_viewed);
        assert_eq!(publisher.event_types(), vec!["StatusChangeViewed"]);
    }

    #[test]
    fn test_mark_viewed_unknown_instance() {
        let repo = Arc::new(InMemoryInstanceRepository::new());
        let (_, tracker) = tracker(repo);

        assert!(matches!(
            tracker.mark_viewed(InstanceId::new()),
            Err(WorkflowError::InstanceNotFound(_))
        ));
    }
}
