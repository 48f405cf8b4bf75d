//! The awake routine behind guarded behaviors.
//!
//! [`awake`] is monomorphized per singleton type and captured as a plain
//! function pointer when the behavior is attached. The scene's awake pass
//! calls it once per pending instance, in attach order.
//!
//! Checks run in a fixed order: config presence, node exclusivity, root
//! placement, scene-wide uniqueness. Every violation is logged and collected
//! but none of them stops the pass or detaches the instance. Slot
//! registration runs last and is first-wins; only the claiming instance gets
//! its `on_ready` call.

use log::error;

use crate::{
    behavior::BoxedBehavior,
    diagnostics::{Violation, ViolationKind},
    node::NodeId,
    scene::Scene,
    singleton::Singleton,
};

/// Validate one guarded instance against its declared config, then offer it
/// the singleton slot for `S`.
pub(crate) fn awake<S: Singleton>(
    scene: &Scene,
    node: NodeId,
    value: &mut BoxedBehavior,
    out: &mut Vec<Violation>,
) {
    match S::CONFIG {
        // No config declared. Flag it and skip the structural checks; the
        // instance still competes for the slot.
        None => report::<S>(scene, node, ViolationKind::MissingConfig, out),
        Some(config) => {
            if config.exclusive_on_node
                && let Some(count) = scene.component_count(node)
                && count > 2
            {
                report::<S>(scene, node, ViolationKind::ExtraComponents { count }, out);
            }

            if config.root_only && scene.parent(node).is_some() {
                report::<S>(scene, node, ViolationKind::NotAtRoot, out);
            }

            if config.unique_in_scene {
                let count = scene.count_instances::<S>();
                if count > 1 {
                    report::<S>(scene, node, ViolationKind::DuplicateInstances { count }, out);
                }
            }
        }
    }

    // First instance through claims the slot. Later instances stay attached
    // and alive, just unregistered.
    if scene.registry().try_set::<S>(node)
        && let Some(instance) = value.downcast_mut::<S>()
    {
        instance.on_ready();
    }
}

fn report<S: Singleton>(
    scene: &Scene,
    node: NodeId,
    kind: ViolationKind,
    out: &mut Vec<Violation>,
) {
    let name = scene.name(node).unwrap_or("<unknown>");
    let violation = Violation::new(node, name, std::any::type_name::<S>(), kind);
    error!("{}", violation);
    out.push(violation);
}

// ==== Tests ====
