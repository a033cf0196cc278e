// Copyright 2025 Cowboy AI, LLC.

//! Entity types with identity and lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// A typed entity ID using phantom types for type safety
///
/// These IDs are globally unique and persistent. The phantom type
/// parameter ensures that IDs for different entity types cannot be
/// mixed up at compile time: a `StatusId` is never accepted where an
/// `InstanceId` is required.
///
/// # Examples
///
/// ```rust
/// use storefront_workflow::EntityId;
///
/// struct Order;
/// struct Coupon;
///
/// let order_id = EntityId::<Order>::new();
/// let coupon_id = EntityId::<Coupon>::new();
///
/// // These are different types - won't compile if mixed up:
/// // let _: EntityId<Order> = coupon_id; // ERROR!
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            _phantom: PhantomData,
        }
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }
}

// Manual impls so `T` is not required to satisfy the derived bounds.
impl<T> Clone for EntityId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityId<T> {}

impl<T> PartialEq for EntityId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for EntityId<T> {}

impl<T> std::hash::Hash for EntityId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> From<&EntityId<T>> for Uuid {
    fn from(id: &EntityId<T>) -> Self {
        id.id
    }
}

/// Marker trait for aggregate roots
///
/// Aggregate roots are the entry points for modifying aggregates.
/// All changes to entities within an aggregate must go through the root,
/// and every mutation bumps the version for optimistic concurrency.
pub trait AggregateRoot {
    /// The type of this aggregate's ID
    type Id;

    /// Get the aggregate's ID
    fn id(&self) -> Self::Id;

    /// Get the current version
    fn version(&self) -> u64;

    /// Increment the version after a change
    fn increment_version(&mut self);
}

/// Marker for status definition entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusMarker;

/// Marker for workflow instance entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceMarker;

/// Marker for owners of workflow instances (storefront accounts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerMarker;
