//! Scene-object singletons with structural guarding.
//!
//! This crate provides a small scene graph whose nodes host behaviors, plus
//! a guard for behaviors that should exist exactly once per scene. A
//! singleton type declares its requirements as a const config; the scene's
//! awake pass checks the requirements, logs and reports what it finds, and
//! registers the first instance of each type in a [`SingletonRegistry`].
//!
//! ```rust,ignore
//! use lone_macros::{Behavior, Singleton};
//! use lone_scene::Scene;
//!
//! #[derive(Behavior, Singleton)]
//! #[singleton(root_only)]
//! struct GameManager {
//!     score: u32,
//! }
//!
//! let mut scene = Scene::new();
//! let node = scene.spawn("Game");
//! scene.attach_singleton(node, GameManager { score: 0 });
//! let report = scene.awaken();
//! assert!(report.is_empty());
//! ```

// Allows the absolute `::lone_scene` paths emitted by the derive macros to
// resolve inside this crate's own tests.
extern crate self as lone_scene;

pub mod behavior;
pub mod diagnostics;
pub mod node;
pub mod scene;
pub mod singleton;

pub use behavior::Behavior;
pub use diagnostics::{Report, Violation, ViolationKind};
pub use node::NodeId;
pub use scene::Scene;
pub use singleton::{GuardConfig, Singleton, SingletonRegistry};
