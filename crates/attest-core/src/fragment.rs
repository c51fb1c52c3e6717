//! # Assurance Case Fragments
//!
//! Self-contained, reusable argument fragments with declared ports.
//!
//! A fragment is immutable once published; composition reads fragments and
//! merges them by value into a case, never mutating them in place. Ports
//! are the node ids exposed for cross-fragment wiring.

use crate::graph::ArgumentGraph;
use crate::{ArgumentNode, AttestError, Confidence, EdgeKind, NodeId, NodeKind};

/// A published, immutable argument fragment.
#[derive(Debug, Clone)]
pub struct Fragment {
    name: String,
    graph: ArgumentGraph,
    ports: Vec<NodeId>,
}

impl Fragment {
    /// The fragment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the fragment's subgraph.
    #[must_use]
    pub fn graph(&self) -> &ArgumentGraph {
        &self.graph
    }

    /// Declared ports, in declaration order.
    #[must_use]
    pub fn ports(&self) -> &[NodeId] {
        &self.ports
    }

    /// Assemble a fragment directly from parts, validating ports.
    pub fn publish(
        name: impl Into<String>,
        graph: ArgumentGraph,
        ports: Vec<NodeId>,
    ) -> Result<Self, AttestError> {
        for port in &ports {
            if !graph.contains_node(port) {
                return Err(AttestError::validation(format!(
                    "dangling port {port}: no such node in fragment"
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            graph,
            ports,
        })
    }

    /// Strength assessment: completeness of evidence plus structural
    /// weaknesses. Findings are data; this never errors.
    #[must_use]
    pub fn assess_strength(&self) -> StrengthReport {
        let mut required: u64 = 0;
        let mut linked: u64 = 0;
        for node in self.graph.nodes() {
            required = required.saturating_add(u64::from(node.required_evidence));
            let evidence = self
                .graph
                .incoming_edges(&node.id)
                .filter(|e| e.kind == EdgeKind::Evidence)
                .count() as u64;
            linked = linked.saturating_add(evidence.min(u64::from(node.required_evidence)));
        }
        let completeness = if required == 0 {
            1.0
        } else {
            linked as f64 / required as f64
        };

        let mut weaknesses = Vec::new();
        if self.graph.node_count() == 0 {
            weaknesses.push("fragment has no argument structure".to_string());
        }
        if self.graph.root_goals().is_empty() && self.graph.node_count() > 0 {
            weaknesses.push("fragment has no root goal".to_string());
        }
        if required > linked {
            weaknesses.push(format!("{} evidence links missing", required - linked));
        }

        let structure = if self.graph.node_count() > 0 && !self.graph.root_goals().is_empty() {
            1.0
        } else {
            0.0
        };
        let strength = Confidence::new(structure * 0.4 + completeness * 0.6);

        StrengthReport {
            strength,
            completeness: Confidence::new(completeness),
            weaknesses,
        }
    }
}

/// Outcome of a fragment strength assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthReport {
    /// Overall strength in [0, 1].
    pub strength: Confidence,
    /// Linked-over-required evidence ratio in [0, 1].
    pub completeness: Confidence,
    /// Human-readable weakness descriptions.
    pub weaknesses: Vec<String>,
}

// =============================================================================
// BUILDER
// =============================================================================

/// Fluent builder for fragments.
///
/// Errors from intermediate steps (duplicate ids, missing parents) are
/// deferred: the chain keeps accepting calls and `publish` reports the
/// first failure.
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    name: String,
    graph: ArgumentGraph,
    ports: Vec<NodeId>,
    current: Option<NodeId>,
    error: Option<AttestError>,
}

impl FragmentBuilder {
    /// Start building a named fragment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a goal node and make it current.
    #[must_use]
    pub fn goal(self, id: &str, title: &str) -> Self {
        self.push(ArgumentNode::new(NodeId::new(id), NodeKind::Goal, title))
    }

    /// Add a strategy node and make it current.
    #[must_use]
    pub fn strategy(self, id: &str, title: &str) -> Self {
        self.push(ArgumentNode::new(NodeId::new(id), NodeKind::Strategy, title))
    }

    /// Add a solution node with a base confidence and make it current.
    #[must_use]
    pub fn solution(self, id: &str, title: &str, confidence: Confidence) -> Self {
        self.push(
            ArgumentNode::new(NodeId::new(id), NodeKind::Solution, title)
                .with_confidence(confidence),
        )
    }

    /// Add a context node and make it current.
    #[must_use]
    pub fn context(self, id: &str, title: &str) -> Self {
        self.push(ArgumentNode::new(NodeId::new(id), NodeKind::Context, title))
    }

    /// Add a pre-built node and make it current.
    #[must_use]
    pub fn node(self, node: ArgumentNode) -> Self {
        self.push(node)
    }

    /// Link the current node under a parent with a relation matching the
    /// current node's kind (CONTEXT/ASSUMPTION attach as themselves,
    /// everything else supports).
    #[must_use]
    pub fn under(mut self, parent: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(current) = self.current.clone() else {
            self.error = Some(AttestError::validation("no current node to link"));
            return self;
        };
        let kind = match self.graph.node(&current).map(|n| n.kind) {
            Some(NodeKind::Context) => EdgeKind::Context,
            Some(NodeKind::Assumption) => EdgeKind::Assumption,
            _ => EdgeKind::Supports,
        };
        if let Err(e) = self
            .graph
            .add_edge(&current, &NodeId::new(parent), kind, Confidence::FULL)
        {
            self.error = Some(e);
        }
        self
    }

    /// Attach the current node as a DECOMPOSES sub-goal of a parent.
    #[must_use]
    pub fn refines(mut self, parent: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(current) = self.current.clone() else {
            self.error = Some(AttestError::validation("no current node to link"));
            return self;
        };
        if let Err(e) = self.graph.add_edge(
            &NodeId::new(parent),
            &current,
            EdgeKind::Decomposes,
            Confidence::FULL,
        ) {
            self.error = Some(e);
        }
        self
    }

    /// Declare a node id as a port.
    #[must_use]
    pub fn port(mut self, id: &str) -> Self {
        self.ports.push(NodeId::new(id));
        self
    }

    /// Finish the build, reporting the first deferred error if any.
    pub fn publish(self) -> Result<Fragment, AttestError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Fragment::publish(self.name, self.graph, self.ports)
    }

    fn push(mut self, node: ArgumentNode) -> Self {
        if self.error.is_some() {
            return self;
        }
        let id = node.id.clone();
        match self.graph.add_node(node) {
            Ok(()) => self.current = Some(id),
            Err(e) => self.error = Some(e),
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
