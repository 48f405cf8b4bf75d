//! Node identity for the scene graph.
//!
//! This module provides the handle types and the allocation machinery behind
//! every node in a [`Scene`](crate::scene::Scene). Nodes themselves live in the
//! scene's arena; what moves around the rest of the crate is the lightweight
//! [`NodeId`] handle defined here.
//!
//! # Architecture
//!
//! - **[`NodeId`]**: A unique handle combining an [`Id`] and a [`Generation`].
//!   The ID names the arena slot, the generation counts how many times that
//!   slot has been reused. A handle whose generation no longer matches the
//!   slot's current generation is stale and resolves to nothing.
//!
//! - **[`Allocator`]**: Hands out node IDs and recycles despawned ones through
//!   a dead pool. Reuse keeps the ID space compact so slot-indexed storage
//!   stays dense.
//!
//! # Generation Tracking
//!
//! When a node is despawned its slot generation is bumped before the ID
//! returns to the dead pool. Any handle still pointing at the old node carries
//! the previous generation and fails validation from then on:
//!
//! ```rust,ignore
//! let node = allocator.alloc(); // NodeId { id: 0, generation: 0 }
//! allocator.free(node);
//! let reused = allocator.alloc(); // NodeId { id: 0, generation: 1 }
//! // The original handle no longer resolves.
//! ```

use std::sync::{
    RwLock,
    atomic::{AtomicU32, Ordering},
};

use crossbeam::queue::SegQueue;

/// The generation of a node slot. Starts at `FIRST` and is incremented every
/// time the slot's previous occupant is despawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of a slot.
    const FIRST: Self = Self(0);
}

/// A node slot identifier, unique among live nodes of one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A handle to a node in a scene.
/// The `id` names the arena slot and the `generation` ties the handle to one
/// particular occupancy of that slot, so handles left over from a despawned
/// node can be told apart from the slot's next tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// The slot identifier.
    id: Id,

    /// The occupancy generation of the slot.
    generation: Generation,
}

impl NodeId {
    /// Construct a handle with just an id, defaulting to the first generation.
    ///
    /// This is primarily used for testing.
    #[inline]
    pub(crate) fn new(id: impl Into<Id>) -> Self {
        Self::new_with_generation(id.into(), Generation::FIRST)
    }

    /// Construct a handle with an id and a known generation.
    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the slot identifier of this handle.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the generation of this handle.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Get the index of this handle for slot-indexed storage (e.g. Vec).
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }
}

/// Implement ordering for NodeId based on id and generation.
impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Implement ordering for NodeId based on id and generation.
impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.id.cmp(&other.id) {
            std::cmp::Ordering::Equal => self.generation.cmp(&other.generation),
            ord => ord,
        }
    }
}

/// An allocator for node handles.
///
/// Hands out unique IDs and recycles despawned ones to avoid ID exhaustion.
/// Freeing bumps the slot generation before the ID re-enters the dead pool,
/// which invalidates every handle still pointing at the old occupant.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Current generation per slot, indexed by ID.
    generations: RwLock<Vec<AtomicU32>>,

    /// Pool of IDs available for reuse (just the ID, not a full handle).
    dead_pool: SegQueue<Id>,

    /// Next fresh ID to allocate.
    next_id: AtomicU32,
}

impl Allocator {
    /// Construct a new allocator starting from ID 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            generations: RwLock::new(Vec::new()),
            dead_pool: SegQueue::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Allocate a handle, either by reusing an ID from the dead pool or by
    /// minting a fresh one.
    pub fn alloc(&self) -> NodeId {
        // Try to reuse from the dead pool first
        if let Some(id) = self.dead_pool.pop() {
            return NodeId::new_with_generation(id, self.current_generation(id));
        }

        // Allocate fresh ID
        let id = Id(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.ensure_capacity(id);
        NodeId::new(id)
    }

    /// Free a handle for reuse (lock-free in the common path).
    pub fn free(&self, node: NodeId) {
        let id = node.id();
        self.ensure_capacity(id);
        {
            // Bump the slot generation atomically
            let generations = self.generations.read().unwrap();
            generations[id.0 as usize].fetch_add(1, Ordering::Release);
        }
        // Return the ID to the pool
        self.dead_pool.push(id);
    }

    fn current_generation(&self, id: Id) -> Generation {
        let generations = self.generations.read().unwrap();
        Generation(
            generations
                .get(id.0 as usize)
                .map(|slot| slot.load(Ordering::Acquire))
                .unwrap_or(0),
        )
    }

    fn ensure_capacity(&self, id: Id) {
        let needed = id.0 as usize + 1;
        if self.generations.read().unwrap().len() >= needed {
            return;
        }

        let mut generations = self.generations.write().unwrap();
        while generations.len() < needed {
            generations.push(AtomicU32::new(0));
        }
    }
}

#[test]
fn allocator_uniqueness() {
    // Given
    let allocator = Allocator::default();

    // When
    let mut nodes = Vec::new();
    for _ in 0..200 {
        nodes.push(allocator.alloc());
    }

    // Then - No dupes handed out
    let pre_len = nodes.len();
    nodes.sort();
    nodes.dedup();
    assert_eq!(pre_len, nodes.len());
}

#[test]
fn allocator_reuse() {
    // Given
    let allocator = Allocator::default();

    // When
    let mut nodes = Vec::new();
    for _ in 0..10 {
        nodes.push(allocator.alloc());
    }

    for node in nodes.drain(..) {
        allocator.free(node);
    }

    let mut reused = Vec::new();
    for _ in 0..10 {
        reused.push(allocator.alloc());
    }

    // Then - IDs come back with an incremented generation
    reused.sort();
    for (i, node) in reused.iter().enumerate() {
        assert_eq!(node.id.0, i as u32);
        assert_eq!(node.generation.0, 1);
    }
}

#[test]
fn allocator_free_and_reuse_cycle() {
    // Given
    let allocator = Allocator::default();

    // When - Allocate 5 handles
    let mut nodes = Vec::new();
    for _ in 0..5 {
        nodes.push(allocator.alloc());
    }

    // Then - Pool should be empty
    assert_eq!(allocator.dead_pool.len(), 0);

    // When - Free them all
    for node in nodes.drain(..) {
        allocator.free(node);
    }

    // Then - Pool should hold 5 IDs
    assert_eq!(allocator.dead_pool.len(), 5);

    // When - Allocate 6 (more than pool size)
    let mut fresh = Vec::new();
    for _ in 0..6 {
        fresh.push(allocator.alloc());
    }

    // Then - Pool drained, exactly one brand-new ID minted
    assert_eq!(allocator.dead_pool.len(), 0);
    let new_count = fresh.iter().filter(|node| node.generation.0 == 0).count();
    let reused_count = fresh.iter().filter(|node| node.generation.0 == 1).count();
    assert_eq!(new_count, 1);
    assert_eq!(reused_count, 5);
}

#[test]
fn allocator_multiple_generations() {
    // Given
    let allocator = Allocator::default();
    let node = allocator.alloc();
    let original_id = node.id;

    // When - Free and reallocate a few times over
    allocator.free(node);
    let gen1 = allocator.alloc();

    allocator.free(gen1);
    let gen2 = allocator.alloc();

    allocator.free(gen2);
    let gen3 = allocator.alloc();

    // Then - Same ID, climbing generations
    assert_eq!(gen1.id, original_id);
    assert_eq!(gen1.generation.0, 1);

    assert_eq!(gen2.id, original_id);
    assert_eq!(gen2.generation.0, 2);

    assert_eq!(gen3.id, original_id);
    assert_eq!(gen3.generation.0, 3);
}

#[test]
fn node_id_ordering() {
    // Given
    let n1 = NodeId::new(Id(1));
    let n2 = NodeId::new(Id(2));
    let n1_gen1 = NodeId::new_with_generation(Id(1), Generation(1));

    // Then - Ordered by ID first, then generation
    assert!(n1 < n2);
    assert!(n1 < n1_gen1);
    assert!(n1_gen1 < n2);
}

#[test]
fn node_id_equality() {
    // Given
    let n1 = NodeId::new(Id(7));
    let n2 = NodeId::new(Id(7));
    let n3 = NodeId::new(Id(8));
    let n1_gen1 = NodeId::new_with_generation(Id(7), Generation(1));

    // Then
    assert_eq!(n1, n2);
    assert_ne!(n1, n3);
    assert_ne!(n1, n1_gen1); // Different generation
}

#[test]
fn node_id_index() {
    // Given
    let n1 = NodeId::new(Id(0));
    let n2 = NodeId::new(Id(42));
    let n3 = NodeId::new(Id(1000));

    // Then
    assert_eq!(n1.index(), 0);
    assert_eq!(n2.index(), 42);
    assert_eq!(n3.index(), 1000);
}

#[test]
fn id_from_u32() {
    // Given
    let id1 = Id::from(42);
    let id2 = Id::from(1000);

    // Then
    assert_eq!(id1.0, 42);
    assert_eq!(id2.0, 1000);
}
