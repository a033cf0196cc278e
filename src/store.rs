// Copyright 2025 Cowboy AI, LLC.

//! Status catalog storage
//!
//! The store is read by many concurrent workflow operations but mutated
//! rarely (admin configuration). Mutations apply the candidate change to a
//! scratch copy of the whole catalog, re-validate every confirmation chain
//! against it, and only then commit - all under one write lock, so two
//! concurrent edits cannot jointly introduce a cycle that neither edit
//! alone would create.

use crate::chain::validate_chains;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::identifiers::StatusId;
use crate::status::{StatusNode, StatusNodePayload};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Persisted catalog of status definitions
///
/// The transition coordinator resolves statuses through this trait rather
/// than an ambient global, so the dependency is explicit and swappable in
/// tests.
pub trait StatusNodeStore: Send + Sync {
    /// Create a new status from the payload
    fn create(&self, payload: StatusNodePayload) -> WorkflowResult<StatusNode>;

    /// Replace an existing status's definition, preserving its id
    fn update(&self, id: StatusId, payload: StatusNodePayload) -> WorkflowResult<StatusNode>;

    /// Remove a status that no confirmation chain targets
    fn delete(&self, id: StatusId) -> WorkflowResult<()>;

    /// Look up a status by id
    fn get(&self, id: StatusId) -> Option<StatusNode>;

    /// All statuses in authoring order
    fn list(&self) -> Vec<StatusNode>;

    /// The status assigned to newly created instances, if one is configured
    fn default_status(&self) -> Option<StatusNode>;
}

/// In-memory status catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusStore {
    nodes: Arc<RwLock<IndexMap<StatusId, StatusNode>>>,
}

impl InMemoryStatusStore {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Validate and commit a candidate node into the catalog
    ///
    /// Shared by create and update. The caller holds the write lock via
    /// `guard`; the candidate map is only committed once every check has
    /// passed, so a failed mutation leaves the catalog untouched.
    fn commit(
        guard: &mut IndexMap<StatusId, StatusNode>,
        node: StatusNode,
    ) -> WorkflowResult<StatusNode> {
        let mut candidate = guard.clone();
        candidate.insert(node.id, node.clone());

        if node.is_default {
            for (id, other) in candidate.iter_mut() {
                if *id != node.id {
                    other.is_default = false;
                }
            }
        }

        validate_chains(&candidate)?;

        *guard = candidate;
        Ok(node)
    }
}

impl StatusNodeStore for InMemoryStatusStore {
    fn create(&self, payload: StatusNodePayload) -> WorkflowResult<StatusNode> {
        payload.validate()?;

        let mut guard = self.nodes.write().unwrap();

        if guard.values().any(|n| n.name == payload.name) {
            return Err(WorkflowError::DuplicateStatusName(payload.name));
        }

        let node = payload.into_node(StatusId::new());
        let node = Self::commit(&mut guard, node)?;

        info!(status_id = %node.id, name = %node.name, "status created");
        Ok(node)
    }

    fn update(&self, id: StatusId, payload: StatusNodePayload) -> WorkflowResult<StatusNode> {
        payload.validate()?;

        let mut guard = self.nodes.write().unwrap();

        if !guard.contains_key(&id) {
            return Err(WorkflowError::StatusNotFound(id));
        }
        if guard.values().any(|n| n.id != id && n.name == payload.name) {
            return Err(WorkflowError::DuplicateStatusName(payload.name));
        }

        let node = payload.into_node(id);
        let node = Self::commit(&mut guard, node)?;

        info!(status_id = %id, name = %node.name, "status updated");
        Ok(node)
    }

    fn delete(&self, id: StatusId) -> WorkflowResult<()> {
        let mut guard = self.nodes.write().unwrap();

        let node = guard.get(&id).ok_or(WorkflowError::StatusNotFound(id))?;

        if node.is_default {
            return Err(WorkflowError::Validation(format!(
                "status '{}' is the default and cannot be deleted",
                node.name
            )));
        }
        if let Some(referrer) = guard
            .values()
            .find(|n| n.id != id && n.confirmation_action.chain_target() == Some(id))
        {
            return Err(WorkflowError::TargetStatusInUse {
                target: id,
                referrer: referrer.name.clone(),
            });
        }

        // shift_remove keeps authoring order for the remaining nodes
        let removed = guard.shift_remove(&id);
        debug_assert!(removed.is_some());

        info!(status_id = %id, "status deleted");
        Ok(())
    }

    fn get(&self, id: StatusId) -> Option<StatusNode> {
        self.nodes.read().unwrap().get(&id).cloned()
    }

    fn list(&self) -> Vec<StatusNode> {
        self.nodes.read().unwrap().values().cloned().collect()
    }

    fn default_status(&self) -> Option<StatusNode> {
        self.nodes
            .read()
            .unwrap()
            .values()
            .find(|n| n.is_default)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ConfirmationAction;

    fn payload(name: &str) -> StatusNodePayload {
        StatusNodePayload {
            name: name.to_string(),
            is_default: false,
            description: format!("The {name} status"),
            color: "#336699".to_string(),
            requires_confirmation: false,
            confirmation_prompt: None,
            confirmation_action: None,
        }
    }

    fn chained(name: &str, target: StatusId) -> StatusNodePayload {
        let mut p = payload(name);
        p.requires_confirmation = true;
        p.confirmation_action = Some(ConfirmationAction::ChangeStatus {
            target_status_id: target,
        });
        p
    }

    #[test]
    fn test_create_and_list_preserves_order() {
        let store = InMemoryStatusStore::new();
        store.create(payload("pending")).unwrap();
        store.create(payload("paid")).unwrap();
        store.create(payload("completed")).unwrap();

        let names: Vec<String> = store.list().into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["pending", "paid", "completed"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let store = InMemoryStatusStore::new();
        store.create(payload("pending")).unwrap();

        match store.create(payload("pending")).unwrap_err() {
            WorkflowError::DuplicateStatusName(name) => assert_eq!(name, "pending"),
            other => panic!("expected DuplicateStatusName, got {other:?}"),
        }
    }

    #[test]
    fn test_update_keeps_name_on_same_node() {
        let store = InMemoryStatusStore::new();
        let node = store.create(payload("pending")).unwrap();

        // Re-submitting the node's own name is not a duplicate
        let updated = store.update(node.id, payload("pending")).unwrap();
        assert_eq!(updated.id, node.id);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let store = InMemoryStatusStore::new();
        assert!(matches!(
            store.update(StatusId::new(), payload("ghost")),
            Err(WorkflowError::StatusNotFound(_))
        ));
    }

    #[test]
    fn test_default_swap_leaves_exactly_one_default() {
        let store = InMemoryStatusStore::new();

        let mut first = payload("pending");
        first.is_default = true;
        let first = store.create(first).unwrap();
        assert!(store.get(first.id).unwrap().is_default);

        let mut second = payload("received");
        second.is_default = true;
        let second = store.create(second).unwrap();

        assert!(!store.get(first.id).unwrap().is_default);
        assert!(store.get(second.id).unwrap().is_default);
        assert_eq!(store.list().iter().filter(|n| n.is_default).count(), 1);
        assert_eq!(store.default_status().unwrap().id, second.id);
    }

    #[test]
    fn test_no_default_before_first_setup() {
        let store = InMemoryStatusStore::new();
        store.create(payload("pending")).unwrap();
        assert!(store.default_status().is_none());
    }

    #[test]
    fn test_self_loop_rejected_on_create() {
        let store = InMemoryStatusStore::new();
        let node = store.create(payload("placeholder")).unwrap();

        // Point the node at itself via update
        let result = store.update(node.id, chained("placeholder", node.id));
        assert!(matches!(result, Err(WorkflowError::CycleDetected { .. })));

        // The failed mutation left the stored node untouched
        assert_eq!(
            store.get(node.id).unwrap().confirmation_action,
            ConfirmationAction::None
        );
    }

    #[test]
    fn test_remote_edit_introducing_cycle_rejected() {
        // a -> b -> c, then editing c to chain back to a must fail even
        // though the edit itself touches neither a nor b.
        let store = InMemoryStatusStore::new();
        let c = store.create(payload("c")).unwrap();
        let b = store.create(chained("b", c.id)).unwrap();
        let a = store.create(chained("a", b.id)).unwrap();

        let result = store.update(c.id, chained("c", a.id));
        assert!(matches!(result, Err(WorkflowError::CycleDetected { .. })));
    }

    #[test]
    fn test_chain_target_must_exist() {
        let store = InMemoryStatusStore::new();
        let result = store.create(chained("orphan", StatusId::new()));
        assert!(matches!(result, Err(WorkflowError::TargetStatusNotFound(_))));
    }

    #[test]
    fn test_delete_refuses_chain_target() {
        let store = InMemoryStatusStore::new();
        let end = store.create(payload("end")).unwrap();
        store.create(chained("start", end.id)).unwrap();

        match store.delete(end.id).unwrap_err() {
            WorkflowError::TargetStatusInUse { target, referrer } => {
                assert_eq!(target, end.id);
                assert_eq!(referrer, "start");
            }
            other => panic!("expected TargetStatusInUse, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_refuses_default() {
        let store = InMemoryStatusStore::new();
        let mut p = payload("pending");
        p.is_default = true;
        let node = store.create(p).unwrap();

        assert!(store.delete(node.id).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_delete_unreferenced_node() {
        let store = InMemoryStatusStore::new();
        let node = store.create(payload("stale")).unwrap();

        store.delete(node.id).unwrap();
        assert!(store.get(node.id).is_none());
        assert!(matches!(
            store.delete(node.id),
            Err(WorkflowError::StatusNotFound(_))
        ));
    }
}
