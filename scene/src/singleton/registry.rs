//! Slot storage for registered singleton instances.
//!
//! This module provides [`SingletonRegistry`], the service that records which
//! node claimed the singleton slot for each behavior type. It is an explicit
//! value rather than process-global state: every [`Scene`](crate::scene::Scene)
//! owns one behind an `Arc`, and scenes constructed with
//! [`Scene::with_registry`](crate::scene::Scene::with_registry) can share it.
//!
//! # Claim Model
//!
//! Slots are first-wins and write-once. [`try_set`](SingletonRegistry::try_set)
//! claims atomically, so when several instances of one type race during an
//! awake pass exactly one of them wins. Nothing ever unsets a slot; a claim
//! whose node has since despawned simply stops resolving at the scene level.
//!
//! # Thread Safety
//!
//! The registry is backed by a concurrent map and is safe to share across
//! threads without external locking.

use std::any::TypeId;

use dashmap::DashMap;

use crate::{node::NodeId, singleton::Singleton};

/// Per-type slot storage mapping each singleton type to its claiming node.
///
/// Keys are [`TypeId`]s, so lookups never consult a name table, and each
/// type can hold at most one claim.
#[derive(Debug, Default)]
pub struct SingletonRegistry {
    slots: DashMap<TypeId, NodeId>,
}

impl SingletonRegistry {
    /// Creates a new, empty registry.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let registry = SingletonRegistry::new();
    /// assert!(!registry.contains::<GameManager>());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Records `node` as the singleton instance of `S`, unless some node
    /// already claimed that slot. Returns `true` on a successful claim.
    ///
    /// The occupancy check and the write happen under the map's entry guard,
    /// so two racing claims for one type resolve to exactly one winner.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert!(registry.try_set::<GameManager>(first));
    /// assert!(!registry.try_set::<GameManager>(second));
    /// assert_eq!(registry.get::<GameManager>(), Some(first));
    /// ```
    pub fn try_set<S: Singleton>(&self, node: NodeId) -> bool {
        match self.slots.entry(TypeId::of::<S>()) {
            dashmap::Entry::Occupied(_) => false,
            dashmap::Entry::Vacant(vacant) => {
                vacant.insert(node);
                true
            }
        }
    }

    /// Returns the node that claimed the slot for `S`, if any.
    ///
    /// The claim is returned as recorded. Whether that node is still alive is
    /// for the owning scene to decide.
    #[inline]
    pub fn get<S: Singleton>(&self) -> Option<NodeId> {
        self.slots.get(&TypeId::of::<S>()).map(|slot| *slot.value())
    }

    /// Returns `true` if the slot for `S` has been claimed.
    #[inline]
    pub fn contains<S: Singleton>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<S>())
    }

    /// Returns the number of claimed slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot has been claimed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ==== Tests ====
