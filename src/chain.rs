// Copyright 2025 Cowboy AI, LLC.

//! Confirmation chain validation
//!
//! `ChangeStatus` confirmation actions form directed edges between status
//! nodes. Because the graph is admin-editable at runtime, every mutation
//! must re-establish that no chain of edges loops: a cycle would let a
//! sequence of confirmations advance forever. The check is global - an
//! edit several hops away from a node can turn that node's previously
//! acyclic chain into a cycle - so it walks the outgoing chain of every
//! node in the catalog, not only the edited one.

use crate::errors::{WorkflowError, WorkflowResult};
use crate::identifiers::StatusId;
use crate::status::StatusNode;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Follow the confirmation chain from `start` to its terminal node
///
/// Returns the ids visited along the way, starting node included. Fails
/// with `CycleDetected` when an id repeats before a terminal link
/// (`None` or `StartTimer` action) is reached, and `TargetStatusNotFound`
/// when an edge points at a node missing from the catalog.
pub fn walk_chain(
    start: StatusId,
    nodes: &IndexMap<StatusId, StatusNode>,
) -> WorkflowResult<Vec<StatusId>> {
    let mut visited: HashSet<StatusId> = HashSet::new();
    let mut path = Vec::new();
    let mut current = start;

    loop {
        if !visited.insert(current) {
            return Err(WorkflowError::CycleDetected { start });
        }
        path.push(current);

        let node = nodes
            .get(&current)
            .ok_or(WorkflowError::TargetStatusNotFound(current))?;

        match node.confirmation_action.chain_target() {
            Some(target) => current = target,
            None => return Ok(path),
        }
    }
}

/// Validate every confirmation chain in the catalog
///
/// Run after each candidate mutation has been applied to a scratch copy
/// of the node map and before the mutation commits.
pub fn validate_chains(nodes: &IndexMap<StatusId, StatusNode>) -> WorkflowResult<()> {
    for (id, node) in nodes {
        if !node.confirmation_action.is_terminal() {
            walk_chain(*id, nodes)?;
        }
    }
    Ok(())
}
