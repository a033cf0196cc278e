// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for statuses, workflow instances, and owners

use crate::entity::{EntityId, InstanceMarker, OwnerMarker, StatusMarker};

/// Identifies an admin-authored status definition
///
/// Statuses are entities with global identity: a `ChangeStatus` chain edge
/// references its target by `StatusId` and resolves it through the store,
/// never by embedding the target node directly.
pub type StatusId = EntityId<StatusMarker>;

/// Identifies a workflow instance
///
/// A workflow instance is the status sub-document embedded in a purchase
/// or a reward redemption. It shares its identity with the owning
/// aggregate's status record.
pub type InstanceId = EntityId<InstanceMarker>;

/// Identifies the account that owns a purchase or redemption
pub type OwnerId = EntityId<OwnerMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the identifier aliases stay distinct types
    ///
    /// ```mermaid
    /// graph LR
    ///     A[StatusId] -->|phantom type| B[EntityId<StatusMarker>]
    ///     C[InstanceId] -->|phantom type| D[EntityId<InstanceMarker>]
    ///     B -->|Not interchangeable| D
    /// ```
    #[test]
    fn test_identifier_aliases() {
        let status_id = StatusId::new();
        let instance_id = InstanceId::new();
        let owner_id = OwnerId::new();

        assert_ne!(status_id.as_uuid(), instance_id.as_uuid());
        assert_ne!(instance_id.as_uuid(), owner_id.as_uuid());
    }

    #[test]
    fn test_identifier_serde() {
        let id = StatusId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: StatusId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
