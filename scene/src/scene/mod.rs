//! The scene graph: named nodes in a hierarchy, hosting behaviors.
//!
//! # Architecture
//!
//! - **[`Scene`]**: Owns the node arena, the handle allocator, and the
//!   singleton registry. All structural mutation goes through it.
//!
//! - **Nodes**: Arena slots addressed by [`NodeId`]. Every node carries a
//!   display name, a [`Transform`] anchoring it in the hierarchy, and its
//!   attached behaviors. The transform counts as the node's first component.
//!
//! - **Awake pass**: Guarded behaviors attached through
//!   [`attach_singleton`](Scene::attach_singleton) queue up until
//!   [`awaken`](Scene::awaken) runs them, once each, in attach order.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut scene = Scene::new();
//! let game = scene.spawn("Game");
//! scene.attach_singleton(game, GameManager::default());
//!
//! let world = scene.spawn("World");
//! let player = scene.spawn_child(world, "Player").unwrap();
//! scene.attach(player, Health { current: 100 });
//!
//! let report = scene.awaken();
//! assert!(report.is_empty());
//! ```

use std::{any::TypeId, sync::Arc};

use log::warn;

use crate::{
    behavior::{Behavior, Cell},
    diagnostics::Report,
    node::{Allocator, Generation, Id, NodeId},
    singleton::{self, Singleton, SingletonRegistry},
};

/// The structural component every node carries: its place in the hierarchy.
#[derive(Debug, Default)]
struct Transform {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A live node: slot generation, display name, transform, attached behaviors.
struct Node {
    generation: Generation,
    name: String,
    transform: Transform,
    cells: Vec<Cell>,
}

/// One arena slot. Vacant slots keep their index reserved for handle reuse.
enum Slot {
    Occupied(Node),
    Vacant,
}

/// A scene graph with singleton guarding.
///
/// The scene itself is single-threaded; the [`SingletonRegistry`] it carries
/// is the concurrent piece and may be shared with other scenes.
pub struct Scene {
    slots: Vec<Slot>,
    allocator: Allocator,
    registry: Arc<SingletonRegistry>,

    /// Guarded cells waiting for the next awake pass, in attach order.
    pending: Vec<(NodeId, usize)>,
}

impl Scene {
    /// Construct an empty scene with its own private singleton registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(SingletonRegistry::new()))
    }

    /// Construct an empty scene registering singletons in `registry`.
    ///
    /// Scenes built over one shared registry also share slot claims: the
    /// first instance of a type to wake up in any of them takes the slot
    /// for all of them.
    pub fn with_registry(registry: Arc<SingletonRegistry>) -> Self {
        Self {
            slots: Vec::new(),
            allocator: Allocator::new(),
            registry,
            pending: Vec::new(),
        }
    }

    /// The singleton registry this scene records claims in.
    #[inline]
    pub fn registry(&self) -> &SingletonRegistry {
        &self.registry
    }

    // ==== Structure ====

    /// Spawn a new root node with the given display name.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.allocator.alloc();
        let node = Node {
            generation: id.generation(),
            name: name.into(),
            transform: Transform::default(),
            cells: Vec::new(),
        };
        self.ensure_capacity(id.index());
        self.slots[id.index()] = Slot::Occupied(node);
        id
    }

    /// Spawn a new node parented under `parent`.
    ///
    /// Returns `None` if the parent is not alive.
    pub fn spawn_child(&mut self, parent: NodeId, name: impl Into<String>) -> Option<NodeId> {
        if !self.is_alive(parent) {
            warn!(
                "attempted to spawn a child under a node that is not alive: {:?}",
                parent
            );
            return None;
        }

        let child = self.spawn(name);
        self.link(child, parent);
        Some(child)
    }

    /// Move `node` under a new parent, or to the root when `parent` is
    /// `None`. Returns `false` and leaves the graph untouched if either
    /// handle is dead or the move would make a node its own ancestor.
    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> bool {
        if !self.is_alive(node) {
            warn!("attempted to reparent a node that is not alive: {:?}", node);
            return false;
        }

        match parent {
            None => {
                self.unlink(node);
                true
            }
            Some(parent) => {
                if !self.is_alive(parent) {
                    warn!(
                        "attempted to reparent under a node that is not alive: {:?}",
                        parent
                    );
                    return false;
                }
                if parent == node || self.is_ancestor(node, parent) {
                    warn!("refusing to reparent {:?} into its own subtree", node);
                    return false;
                }

                self.unlink(node);
                self.link(node, parent);
                true
            }
        }
    }

    /// Despawn a node and its whole subtree.
    ///
    /// Handles to the removed nodes go stale immediately; their slots are
    /// recycled with a bumped generation. Singleton slot claims held by
    /// removed nodes are left in place and simply stop resolving.
    pub fn despawn(&mut self, node: NodeId) -> bool {
        if !self.is_alive(node) {
            warn!("attempted to despawn a node that is not alive: {:?}", node);
            return false;
        }

        self.unlink(node);
        self.despawn_subtree(node);
        true
    }

    fn despawn_subtree(&mut self, node: NodeId) {
        let children = match self.node(node) {
            Some(found) => found.transform.children.clone(),
            None => return,
        };
        for child in children {
            self.despawn_subtree(child);
        }

        self.slots[node.index()] = Slot::Vacant;
        self.allocator.free(node);
    }

    // ==== Inspection ====

    /// Whether `node` still resolves to a live node.
    #[inline]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Whether `node` is alive and sits at the scene root.
    pub fn is_root(&self, node: NodeId) -> bool {
        matches!(self.node(node), Some(found) if found.transform.parent.is_none())
    }

    /// The display name of `node`, if it is alive.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|found| found.name.as_str())
    }

    /// The parent of `node`. `None` for roots and dead handles alike.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|found| found.transform.parent)
    }

    /// The children of `node`, in attach order.
    pub fn children(&self, node: NodeId) -> Option<&[NodeId]> {
        self.node(node)
            .map(|found| found.transform.children.as_slice())
    }

    /// Number of components on `node`, counting the transform as the first.
    pub fn component_count(&self, node: NodeId) -> Option<usize> {
        self.node(node).map(|found| 1 + found.cells.len())
    }

    /// Number of live nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count()
    }

    // ==== Behaviors ====

    /// Attach a behavior to `node`. Returns `false` if the node is dead.
    ///
    /// A node can host any number of behaviors, including several of one
    /// type; typed access resolves to the first match in attach order.
    pub fn attach<B: Behavior>(&mut self, node: NodeId, value: B) -> bool {
        self.attach_cell(node, Cell::new(value, None)).is_some()
    }

    /// Attach a singleton-guarded behavior to `node`. The guard does not run
    /// here; the instance is validated and offered its slot during the next
    /// [`awaken`](Scene::awaken) call.
    pub fn attach_singleton<S: Singleton>(&mut self, node: NodeId, value: S) -> bool {
        match self.attach_cell(node, Cell::new(value, Some(singleton::awake::<S>))) {
            Some(index) => {
                self.pending.push((node, index));
                true
            }
            None => false,
        }
    }

    fn attach_cell(&mut self, node: NodeId, cell: Cell) -> Option<usize> {
        match self.node_mut(node) {
            Some(found) => {
                found.cells.push(cell);
                Some(found.cells.len() - 1)
            }
            None => {
                warn!(
                    "attempted to attach a behavior to a node that is not alive: {:?}",
                    node
                );
                None
            }
        }
    }

    /// Returns a reference to the first `B` attached to `node`, if any.
    pub fn get<B: Behavior>(&self, node: NodeId) -> Option<&B> {
        self.node(node)?
            .cells
            .iter()
            .find_map(|cell| cell.downcast_ref::<B>())
    }

    /// Returns a mutable reference to the first `B` attached to `node`.
    pub fn get_mut<B: Behavior>(&mut self, node: NodeId) -> Option<&mut B> {
        self.node_mut(node)?
            .cells
            .iter_mut()
            .find_map(|cell| cell.downcast_mut::<B>())
    }

    /// Count attached instances of `B` across all live nodes.
    pub fn count_instances<B: Behavior>(&self) -> usize {
        let type_id = TypeId::of::<B>();
        self.live()
            .map(|(_, node)| {
                node.cells
                    .iter()
                    .filter(|cell| cell.type_id() == type_id)
                    .count()
            })
            .sum()
    }

    /// All live nodes hosting at least one `B`, in arena order.
    pub fn nodes_with<B: Behavior>(&self) -> Vec<NodeId> {
        let type_id = TypeId::of::<B>();
        self.live()
            .filter(|(_, node)| node.cells.iter().any(|cell| cell.type_id() == type_id))
            .map(|(id, _)| id)
            .collect()
    }

    // ==== Singletons ====

    /// Resolve the registered singleton instance of `S`.
    ///
    /// Returns `None` when no instance claimed the slot yet, or when the
    /// claiming node has since despawned. Claims are never unset, so a stale
    /// claim keeps the slot occupied while resolving to nothing.
    pub fn singleton<S: Singleton>(&self) -> Option<&S> {
        let node = self.registry.get::<S>()?;
        self.get::<S>(node)
    }

    /// Resolve the registered singleton instance of `S` mutably.
    pub fn singleton_mut<S: Singleton>(&mut self) -> Option<&mut S> {
        let node = self.registry.get::<S>()?;
        self.get_mut::<S>(node)
    }

    // ==== Awake Pass ====

    /// Run the awake pass: every guarded behavior attached since the last
    /// pass is validated against its config and offered its singleton slot,
    /// once, in attach order.
    ///
    /// Violations are logged as they are found and collected into the
    /// returned [`Report`]. The pass never removes anything: offending
    /// instances stay attached, they just may not hold the slot. Instances
    /// whose node despawned before the pass are skipped entirely.
    pub fn awaken(&mut self) -> Report {
        let mut violations = Vec::new();

        let pending = std::mem::take(&mut self.pending);
        for (node, index) in pending {
            // Detach the value so the entry point can borrow the rest of the
            // scene while holding it mutably.
            let (awake, mut value) = {
                let Some(cell) = self.cell_mut(node, index) else {
                    continue;
                };
                let Some(awake) = cell.awake() else {
                    continue;
                };
                let Some(value) = cell.take_value() else {
                    continue;
                };
                (awake, value)
            };

            awake(&*self, node, &mut value, &mut violations);

            if let Some(cell) = self.cell_mut(node, index) {
                cell.restore_value(value);
            }
        }

        Report::new(violations)
    }

    // ==== Internals ====

    fn node(&self, node: NodeId) -> Option<&Node> {
        match self.slots.get(node.index()) {
            Some(Slot::Occupied(found)) if found.generation == node.generation() => Some(found),
            _ => None,
        }
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        match self.slots.get_mut(node.index()) {
            Some(Slot::Occupied(found)) if found.generation == node.generation() => Some(found),
            _ => None,
        }
    }

    fn cell_mut(&mut self, node: NodeId, index: usize) -> Option<&mut Cell> {
        self.node_mut(node)?.cells.get_mut(index)
    }

    fn live(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied(node) => Some((
                    NodeId::new_with_generation(Id::from(index as u32), node.generation),
                    node,
                )),
                Slot::Vacant => None,
            })
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.transform.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.transform.children.push(child);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let parent = match self.node(child) {
            Some(node) => node.transform.parent,
            None => return,
        };
        let Some(parent) = parent else {
            return;
        };

        if let Some(node) = self.node_mut(parent) {
            node.transform.children.retain(|existing| *existing != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.transform.parent = None;
        }
    }

    /// Whether `candidate` appears on the ancestor chain of `node`.
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    fn ensure_capacity(&mut self, index: usize) {
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || Slot::Vacant);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

// ==== Tests ====

#[cfg(test)]
mod tests {
    use lone_macros::Behavior;

    use super::*;

    #[derive(Behavior, Debug, PartialEq)]
    struct Health {
        current: u32,
    }

    #[derive(Behavior)]
    struct Stamina;

    // ==================== Spawning ====================

    #[test]
    fn spawn_creates_live_named_roots() {
        // Given
        let mut scene = Scene::new();

        // When
        let game = scene.spawn("Game");
        let world = scene.spawn("World");

        // Then
        assert!(scene.is_alive(game));
        assert!(scene.is_root(game));
        assert_eq!(scene.name(game), Some("Game"));
        assert_eq!(scene.name(world), Some("World"));
        assert_eq!(scene.node_count(), 2);
        assert_ne!(game, world);
    }

    #[test]
    fn spawn_child_links_both_sides() {
        // Given
        let mut scene = Scene::new();
        let world = scene.spawn("World");

        // When
        let player = scene.spawn_child(world, "Player").unwrap();
        let camera = scene.spawn_child(world, "Camera").unwrap();

        // Then
        assert_eq!(scene.parent(player), Some(world));
        assert_eq!(scene.parent(camera), Some(world));
        assert_eq!(scene.children(world), Some(&[player, camera][..]));
        assert!(!scene.is_root(player));
    }

    #[test]
    fn spawn_child_under_dead_parent_fails() {
        // Given
        let mut scene = Scene::new();
        let doomed = scene.spawn("Doomed");
        scene.despawn(doomed);

        // When / Then
        assert!(scene.spawn_child(doomed, "Orphan").is_none());
        assert_eq!(scene.node_count(), 0);
    }

    // ==================== Reparenting ====================

    #[test]
    fn set_parent_moves_a_node() {
        // Given
        let mut scene = Scene::new();
        let old_home = scene.spawn("Old");
        let new_home = scene.spawn("New");
        let child = scene.spawn_child(old_home, "Child").unwrap();

        // When
        assert!(scene.set_parent(child, Some(new_home)));

        // Then
        assert_eq!(scene.parent(child), Some(new_home));
        assert_eq!(scene.children(old_home), Some(&[][..]));
        assert_eq!(scene.children(new_home), Some(&[child][..]));
    }

    #[test]
    fn set_parent_none_detaches_to_root() {
        // Given
        let mut scene = Scene::new();
        let world = scene.spawn("World");
        let child = scene.spawn_child(world, "Child").unwrap();

        // When
        assert!(scene.set_parent(child, None));

        // Then
        assert!(scene.is_root(child));
        assert_eq!(scene.children(world), Some(&[][..]));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        // Given - grandparent -> parent -> child
        let mut scene = Scene::new();
        let grandparent = scene.spawn("Grandparent");
        let parent = scene.spawn_child(grandparent, "Parent").unwrap();
        let child = scene.spawn_child(parent, "Child").unwrap();

        // When / Then - No node may move into its own subtree
        assert!(!scene.set_parent(grandparent, Some(child)));
        assert!(!scene.set_parent(parent, Some(child)));
        assert!(!scene.set_parent(child, Some(child)));

        // Then - The graph is untouched
        assert!(scene.is_root(grandparent));
        assert_eq!(scene.parent(parent), Some(grandparent));
        assert_eq!(scene.parent(child), Some(parent));
    }

    #[test]
    fn set_parent_with_dead_handles_fails() {
        // Given
        let mut scene = Scene::new();
        let node = scene.spawn("Node");
        let doomed = scene.spawn("Doomed");
        scene.despawn(doomed);

        // When / Then
        assert!(!scene.set_parent(node, Some(doomed)));
        assert!(!scene.set_parent(doomed, Some(node)));
        assert!(scene.is_root(node));
    }

    // ==================== Despawning ====================

    #[test]
    fn despawn_removes_the_whole_subtree() {
        // Given
        let mut scene = Scene::new();
        let world = scene.spawn("World");
        let player = scene.spawn_child(world, "Player").unwrap();
        let weapon = scene.spawn_child(player, "Weapon").unwrap();
        let other = scene.spawn("Other");

        // When
        assert!(scene.despawn(world));

        // Then
        assert!(!scene.is_alive(world));
        assert!(!scene.is_alive(player));
        assert!(!scene.is_alive(weapon));
        assert!(scene.is_alive(other));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn despawn_unlinks_from_the_parent() {
        // Given
        let mut scene = Scene::new();
        let world = scene.spawn("World");
        let player = scene.spawn_child(world, "Player").unwrap();
        let camera = scene.spawn_child(world, "Camera").unwrap();

        // When
        scene.despawn(player);

        // Then
        assert_eq!(scene.children(world), Some(&[camera][..]));
    }

    #[test]
    fn despawn_twice_returns_false() {
        // Given
        let mut scene = Scene::new();
        let node = scene.spawn("Node");

        // When / Then
        assert!(scene.despawn(node));
        assert!(!scene.despawn(node));
    }

    #[test]
    fn stale_handles_do_not_resolve_after_slot_reuse() {
        // Given
        let mut scene = Scene::new();
        let old = scene.spawn("Old");
        scene.despawn(old);

        // When - The slot is recycled for a new node
        let new = scene.spawn("New");

        // Then - Same index, different generation
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(!scene.is_alive(old));
        assert!(scene.is_alive(new));
        assert_eq!(scene.name(old), None);
        assert_eq!(scene.name(new), Some("New"));
    }

    // ==================== Behaviors ====================

    #[test]
    fn attach_and_typed_access() {
        // Given
        let mut scene = Scene::new();
        let player = scene.spawn("Player");

        // When
        assert!(scene.attach(player, Health { current: 100 }));

        // Then
        assert_eq!(scene.get::<Health>(player), Some(&Health { current: 100 }));
        assert!(scene.get::<Stamina>(player).is_none());

        // When - Mutate through the typed view
        if let Some(health) = scene.get_mut::<Health>(player) {
            health.current -= 30;
        }

        // Then
        assert_eq!(scene.get::<Health>(player), Some(&Health { current: 70 }));
    }

    #[test]
    fn same_type_behaviors_stack_on_one_node() {
        // Given
        let mut scene = Scene::new();
        let player = scene.spawn("Player");

        // When - Two instances of one type land on the same node
        scene.attach(player, Health { current: 100 });
        scene.attach(player, Health { current: 25 });

        // Then - Typed access resolves to the first in attach order
        assert_eq!(scene.get::<Health>(player), Some(&Health { current: 100 }));
        assert_eq!(scene.component_count(player), Some(3));
        assert_eq!(scene.count_instances::<Health>(), 2);
        assert_eq!(scene.nodes_with::<Health>(), vec![player]);

        // When - Mutation goes through the same resolution
        if let Some(health) = scene.get_mut::<Health>(player) {
            health.current = 70;
        }

        // Then - The first instance changed, both remain attached
        assert_eq!(scene.get::<Health>(player), Some(&Health { current: 70 }));
        assert_eq!(scene.count_instances::<Health>(), 2);
    }

    #[test]
    fn attach_to_a_dead_node_fails() {
        // Given
        let mut scene = Scene::new();
        let doomed = scene.spawn("Doomed");
        scene.despawn(doomed);

        // When / Then
        assert!(!scene.attach(doomed, Health { current: 1 }));
        assert_eq!(scene.count_instances::<Health>(), 0);
    }

    #[test]
    fn component_count_includes_the_transform() {
        // Given
        let mut scene = Scene::new();
        let node = scene.spawn("Node");

        // Then - A bare node still counts its transform
        assert_eq!(scene.component_count(node), Some(1));

        // When
        scene.attach(node, Health { current: 5 });
        scene.attach(node, Stamina);

        // Then
        assert_eq!(scene.component_count(node), Some(3));
        assert_eq!(scene.component_count(NodeId::new(Id::from(99))), None);
    }

    #[test]
    fn count_instances_spans_the_scene() {
        // Given
        let mut scene = Scene::new();
        let a = scene.spawn("A");
        let b = scene.spawn("B");
        let c = scene.spawn("C");
        scene.attach(a, Health { current: 1 });
        scene.attach(b, Health { current: 2 });
        scene.attach(b, Stamina);

        // Then
        assert_eq!(scene.count_instances::<Health>(), 2);
        assert_eq!(scene.count_instances::<Stamina>(), 1);
        assert_eq!(scene.nodes_with::<Health>(), vec![a, b]);
        assert_eq!(scene.nodes_with::<Stamina>(), vec![b]);
        assert!(scene.nodes_with::<Health>().iter().all(|n| *n != c));

        // When - One host despawns
        scene.despawn(b);

        // Then
        assert_eq!(scene.count_instances::<Health>(), 1);
        assert_eq!(scene.nodes_with::<Health>(), vec![a]);
    }

    #[test]
    fn awaken_with_nothing_pending_is_a_no_op() {
        // Given
        let mut scene = Scene::new();
        let node = scene.spawn("Node");
        scene.attach(node, Health { current: 9 });

        // When - Only plain behaviors attached, nothing guarded
        let report = scene.awaken();

        // Then
        assert!(report.is_empty());
        assert!(scene.registry().is_empty());
    }
}
