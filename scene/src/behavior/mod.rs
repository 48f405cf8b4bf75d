//! Behaviors attachable to scene nodes.
//!
//! A behavior is plain user data that rides on a node. The scene stores
//! behaviors type-erased; the typed view comes back through downcasts keyed
//! by [`TypeId`].

use std::any::{Any, TypeId};

use crate::{diagnostics::Violation, node::NodeId, scene::Scene};

/// A trait representing a behavior attachable to a scene node.
///
/// At present this doesn't require any specific functionality, but sets the
/// required trait bounds for anything stored in a scene. Types can use the
/// derive macro to implement this trait:
///
/// ```rust,ignore
/// #[derive(Behavior)]
/// struct Health {
///     current: u32,
///     max: u32,
/// }
/// ```
pub trait Behavior: 'static + Sized + Send + Sync {}

/// Type-erased box holding an attached behavior value.
pub(crate) type BoxedBehavior = Box<dyn Any + Send + Sync>;

/// Monomorphized entry point stored for guarded behaviors and invoked by the
/// scene's awake pass. The value is passed back in detached from the arena so
/// the routine can read the rest of the scene while holding it mutably.
pub(crate) type AwakeFn = fn(&Scene, NodeId, &mut BoxedBehavior, &mut Vec<Violation>);

/// One behavior attached to a node.
///
/// Keeps the erased value together with its `TypeId` so typed queries can
/// skip non-matching cells without downcasting, plus the optional awake
/// entry point captured at attach time.
pub(crate) struct Cell {
    /// The attached value. `None` only while the value is detached for its
    /// own awake call.
    value: Option<BoxedBehavior>,

    /// Cached `TypeId` of the attached type.
    type_id: TypeId,

    /// Awake entry point, present only for guarded behaviors.
    awake: Option<AwakeFn>,
}

impl Cell {
    pub(crate) fn new<B: Behavior>(value: B, awake: Option<AwakeFn>) -> Self {
        Self {
            value: Some(Box::new(value)),
            type_id: TypeId::of::<B>(),
            awake,
        }
    }

    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub(crate) fn awake(&self) -> Option<AwakeFn> {
        self.awake
    }

    pub(crate) fn downcast_ref<B: Behavior>(&self) -> Option<&B> {
        self.value.as_ref().and_then(|value| value.downcast_ref())
    }

    pub(crate) fn downcast_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        self.value.as_mut().and_then(|value| value.downcast_mut())
    }

    /// Detach the value so the awake pass can hand it to its entry point
    /// alongside a shared view of the scene.
    pub(crate) fn take_value(&mut self) -> Option<BoxedBehavior> {
        self.value.take()
    }

    /// Put a detached value back after its awake call returned.
    pub(crate) fn restore_value(&mut self, value: BoxedBehavior) {
        self.value = Some(value);
    }
}

// ==== Tests ====
