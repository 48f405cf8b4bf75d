//! Singleton behaviors and the guard that enforces them.
//!
//! A singleton is a behavior that should exist once per scene, typically a
//! service object such as a game manager or an audio hub. The pieces here:
//!
//! - **[`Singleton`]**: The capability trait. Declares the type's
//!   [`GuardConfig`] and the `on_ready` hook invoked once the instance claims
//!   its slot.
//!
//! - **[`GuardConfig`]**: The structural requirements a type opts into,
//!   checked when the instance wakes up.
//!
//! - **[`SingletonRegistry`]**: The slot storage mapping each singleton type
//!   to the node that claimed it. Shareable across scenes through an `Arc`.
//!
//! The guard is advisory. A violated requirement is logged and reported but
//! the instance stays attached and alive; only slot registration is
//! first-wins.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Behavior, Singleton)]
//! #[singleton(root_only)]
//! struct AudioHub {
//!     volume: f32,
//! }
//!
//! let mut scene = Scene::new();
//! let node = scene.spawn("Audio");
//! scene.attach_singleton(node, AudioHub { volume: 0.8 });
//! let report = scene.awaken();
//! assert!(report.is_empty());
//! assert_eq!(scene.singleton::<AudioHub>().map(|hub| hub.volume), Some(0.8));
//! ```

mod guard;
mod registry;

pub(crate) use guard::awake;
pub use registry::SingletonRegistry;

use crate::behavior::Behavior;

/// Structural requirements checked when a singleton behavior wakes up.
///
/// Constructible in const context so types can declare their configuration
/// as an associated constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// Nothing beyond the node's transform and the guarded behavior itself
    /// may occupy the hosting node.
    pub exclusive_on_node: bool,

    /// The hosting node must have no parent.
    pub root_only: bool,

    /// At most one live instance of the type may exist in the scene.
    pub unique_in_scene: bool,
}

impl GuardConfig {
    /// The baseline requirements: uniqueness on, placement checks off.
    pub const fn new() -> Self {
        Self {
            exclusive_on_node: false,
            root_only: false,
            unique_in_scene: true,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A behavior guarded to exist once per scene.
///
/// Implementors declare their structural requirements through [`CONFIG`] and
/// may override [`on_ready`] for one-time setup. The derive macro covers the
/// common case:
///
/// ```rust,ignore
/// #[derive(Behavior, Singleton)]
/// #[singleton(exclusive_on_node, root_only)]
/// struct GameManager {
///     score: u32,
/// }
/// ```
///
/// Types that need the `on_ready` hook implement the trait by hand instead:
///
/// ```rust,ignore
/// impl Singleton for GameManager {
///     const CONFIG: Option<GuardConfig> = Some(GuardConfig::new());
///
///     fn on_ready(&mut self) {
///         self.score = 0;
///     }
/// }
/// ```
///
/// [`CONFIG`]: Singleton::CONFIG
/// [`on_ready`]: Singleton::on_ready
pub trait Singleton: Behavior {
    /// Guard configuration declared by the type author.
    ///
    /// Leaving the `None` default in place is flagged as a missing config
    /// when the instance wakes up. The structural checks are then skipped,
    /// but slot registration still runs.
    const CONFIG: Option<GuardConfig> = None;

    /// One-time setup hook, invoked after this instance claims the slot for
    /// its type. Instances that lose the claim never see this call.
    fn on_ready(&mut self) {}
}

// ==== Tests ====

#[cfg(test)]
mod tests {
    use lone_macros::{Behavior, Singleton};

    use super::*;

    #[test]
    fn config_baseline_defaults() {
        // Given
        let config = GuardConfig::new();

        // Then - Uniqueness on, placement checks off
        assert!(!config.exclusive_on_node);
        assert!(!config.root_only);
        assert!(config.unique_in_scene);
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn derive_without_attribute_keeps_no_config() {
        // Given
        #[derive(Behavior, Singleton)]
        struct Bare;

        // Then
        assert_eq!(Bare::CONFIG, None);
    }

    #[test]
    fn derive_with_empty_attribute_takes_baseline() {
        // Given
        #[derive(Behavior, Singleton)]
        #[singleton()]
        struct Plain;

        // Then
        assert_eq!(Plain::CONFIG, Some(GuardConfig::new()));
    }

    #[test]
    fn derive_with_bare_attribute_takes_baseline() {
        // Given
        #[derive(Behavior, Singleton)]
        #[singleton]
        struct Marked;

        // Then
        assert_eq!(Marked::CONFIG, Some(GuardConfig::new()));
    }

    #[test]
    fn derive_with_bare_flags() {
        // Given
        #[derive(Behavior, Singleton)]
        #[singleton(exclusive_on_node, root_only)]
        struct Strict;

        // Then
        assert_eq!(
            Strict::CONFIG,
            Some(GuardConfig {
                exclusive_on_node: true,
                root_only: true,
                unique_in_scene: true,
            })
        );
    }

    #[test]
    fn derive_with_explicit_values() {
        // Given
        #[derive(Behavior, Singleton)]
        #[singleton(root_only = true, unique_in_scene = false)]
        struct Loose;

        // Then
        assert_eq!(
            Loose::CONFIG,
            Some(GuardConfig {
                exclusive_on_node: false,
                root_only: true,
                unique_in_scene: false,
            })
        );
    }

    #[test]
    fn manual_impl_with_hook() {
        // Given
        struct Counter {
            ready_calls: u32,
        }
        impl crate::behavior::Behavior for Counter {}
        impl Singleton for Counter {
            const CONFIG: Option<GuardConfig> = Some(GuardConfig::new());

            fn on_ready(&mut self) {
                self.ready_calls += 1;
            }
        }

        // When
        let mut counter = Counter { ready_calls: 0 };
        counter.on_ready();

        // Then
        assert_eq!(Counter::CONFIG, Some(GuardConfig::new()));
        assert_eq!(counter.ready_calls, 1);
    }
}
