//! Diagnostics produced by the singleton guard.
//!
//! Violations are advisory. The awake pass logs each one through [`log`] and
//! collects it into a [`Report`], but never panics and never tears the
//! offending node down.

use core::fmt;

use crate::node::NodeId;

/// The class of structural problem found while a guarded behavior woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The behavior type declared no guard configuration.
    MissingConfig,

    /// The node hosts more components than the guarded behavior allows.
    ExtraComponents {
        /// Total components on the node, the transform included.
        count: usize,
    },

    /// The node sits below a parent although root placement was required.
    NotAtRoot,

    /// More than one live instance of the type exists in the scene.
    DuplicateInstances {
        /// Live instances found, this one included.
        count: usize,
    },
}

/// A single structural violation, tied to the node and behavior type that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    node: NodeId,
    node_name: String,
    type_name: &'static str,
    kind: ViolationKind,
}

impl Violation {
    pub(crate) fn new(
        node: NodeId,
        node_name: impl Into<String>,
        type_name: &'static str,
        kind: ViolationKind,
    ) -> Self {
        Self {
            node,
            node_name: node_name.into(),
            type_name,
            kind,
        }
    }

    /// The node the guarded behavior was attached to.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The display name of that node at the time of the awake pass.
    #[inline]
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The behavior type that tripped the guard.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// What went wrong.
    #[inline]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::MissingConfig => write!(
                f,
                "no singleton config declared for {} (node '{}')",
                self.type_name, self.node_name
            ),
            ViolationKind::ExtraComponents { count } => write!(
                f,
                "{} must be the only behavior on node '{}', found {} components",
                self.type_name, self.node_name, count
            ),
            ViolationKind::NotAtRoot => write!(
                f,
                "{} on node '{}' must sit at the scene root, found a parent",
                self.type_name, self.node_name
            ),
            ViolationKind::DuplicateInstances { count } => write!(
                f,
                "{} instances of singleton {} in the scene, expected exactly one",
                count, self.type_name
            ),
        }
    }
}

/// Everything the guard flagged during one awake pass, in the order the
/// offending behaviors woke up.
#[derive(Debug, Default)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// All violations collected by the pass.
    #[inline]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations collected.
    #[inline]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the pass finished without flagging anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

// ==== Tests ====
