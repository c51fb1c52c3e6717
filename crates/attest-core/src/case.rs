//! # Assurance Case
//!
//! The live, mutable composed argument: an `ArgumentGraph` plus the
//! defeaters registered against it and the subgraphs retained by
//! abstraction.
//!
//! Logical findings (unsupported solutions, undeveloped goals, orphans)
//! are returned as `Issue` data from `validate`; only invariant breaches
//! error.

use crate::graph::ArgumentGraph;
use crate::{
    ArgumentNode, AttestError, Defeater, DefeaterId, DefeaterTarget, Edge, EdgeKind, Issue,
    IssueKind, NodeId, NodeKind,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A subgraph removed by `abstract`, retained for later inspection.
///
/// Re-expansion is not guaranteed; the mapping records what was collapsed,
/// not how to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedSubgraph {
    /// Nodes removed, in their original insertion order.
    pub nodes: Vec<ArgumentNode>,
    /// Edges removed, in their original insertion order.
    pub edges: Vec<Edge>,
}

/// Node and edge tallies for a case, by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaseStatistics {
    /// Total node count.
    pub node_count: usize,
    /// Total edge count.
    pub edge_count: usize,
    /// Total defeater count (any status).
    pub defeater_count: usize,
    /// Node counts keyed by kind name.
    pub nodes_by_kind: BTreeMap<String, usize>,
    /// Edge counts keyed by relation name.
    pub edges_by_kind: BTreeMap<String, usize>,
}

/// A complete assurance argument under construction or analysis.
#[derive(Debug, Clone, Default)]
pub struct AssuranceCase {
    /// Case identifier.
    pub id: String,
    /// Case title.
    pub title: String,
    graph: ArgumentGraph,
    defeaters: BTreeMap<DefeaterId, Defeater>,
    abstractions: BTreeMap<NodeId, CollapsedSubgraph>,
}

impl AssuranceCase {
    /// Create an empty case.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// The underlying argument graph.
    #[must_use]
    pub fn graph(&self) -> &ArgumentGraph {
        &self.graph
    }

    /// Mutable access to the underlying argument graph.
    pub fn graph_mut(&mut self) -> &mut ArgumentGraph {
        &mut self.graph
    }

    // =========================================================================
    // DEFEATERS
    // =========================================================================

    /// Register a defeater. The target node or edge must exist.
    pub fn add_defeater(&mut self, defeater: Defeater) -> Result<(), AttestError> {
        match &defeater.target {
            DefeaterTarget::Node(node) => {
                if !self.graph.contains_node(node) {
                    return Err(AttestError::validation(format!(
                        "defeater target node {node} not found"
                    )));
                }
            }
            DefeaterTarget::Edge(edge) => {
                if self.graph.edge(*edge).is_none() {
                    return Err(AttestError::validation(format!(
                        "defeater target edge {} not found",
                        edge.value()
                    )));
                }
            }
        }
        if self.defeaters.contains_key(&defeater.id) {
            return Err(AttestError::validation(format!(
                "defeater id {} already exists",
                defeater.id.as_str()
            )));
        }
        self.defeaters.insert(defeater.id.clone(), defeater);
        Ok(())
    }

    /// Mark a defeater resolved.
    pub fn resolve_defeater(&mut self, id: &DefeaterId) -> Result<(), AttestError> {
        let defeater = self.defeaters.get_mut(id).ok_or_else(|| {
            AttestError::validation(format!("defeater {} not found", id.as_str()))
        })?;
        defeater.status = crate::DefeaterStatus::Resolved;
        Ok(())
    }

    /// All defeaters, ordered by id.
    pub fn defeaters(&self) -> impl Iterator<Item = &Defeater> {
        self.defeaters.values()
    }

    /// Active defeaters targeting a specific node.
    pub fn defeaters_on_node<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Defeater> {
        self.defeaters.values().filter(move |d| {
            d.is_active() && matches!(&d.target, DefeaterTarget::Node(n) if n == node)
        })
    }

    /// Active defeaters targeting a specific edge.
    pub fn defeaters_on_edge(&self, edge: crate::EdgeId) -> impl Iterator<Item = &Defeater> {
        self.defeaters.values().filter(move |d| {
            d.is_active() && matches!(&d.target, DefeaterTarget::Edge(e) if *e == edge)
        })
    }

    // =========================================================================
    // ABSTRACTION MAP
    // =========================================================================

    /// Retain the subgraph collapsed behind a placeholder node.
    pub fn retain_abstraction(&mut self, placeholder: NodeId, collapsed: CollapsedSubgraph) {
        self.abstractions.insert(placeholder, collapsed);
    }

    /// The subgraph collapsed behind a placeholder, if any.
    #[must_use]
    pub fn abstraction(&self, placeholder: &NodeId) -> Option<&CollapsedSubgraph> {
        self.abstractions.get(placeholder)
    }

    // =========================================================================
    // MERGE
    // =========================================================================

    /// Union another case into this one.
    ///
    /// Nodes with identical ids are deduplicated; a node whose attributes
    /// (everything except the reasoner-owned confidence) differ from the
    /// existing one is a conflict. Edges deduplicate on the
    /// (from, to, relation) triple, defeaters on id.
    pub fn merge_from(&mut self, other: &AssuranceCase) -> Result<(), AttestError> {
        for node in other.graph.nodes() {
            match self.graph.node(&node.id) {
                None => self.graph.add_node(node.clone())?,
                Some(existing) => {
                    if !same_attributes(existing, node) {
                        return Err(AttestError::validation(format!(
                            "conflicting attributes for node {} during merge",
                            node.id
                        )));
                    }
                }
            }
        }

        for edge in other.graph.edges() {
            let duplicate = self
                .graph
                .edges()
                .any(|e| e.from == edge.from && e.to == edge.to && e.kind == edge.kind);
            if !duplicate {
                let id = self
                    .graph
                    .add_edge(&edge.from, &edge.to, edge.kind, edge.weight)?;
                if let Some(checksum) = &edge.recorded_checksum {
                    self.graph.record_checksum(id, checksum.clone())?;
                }
            }
        }

        for defeater in other.defeaters.values() {
            match self.defeaters.get(&defeater.id) {
                None => {
                    // Edge-targeted defeaters do not survive the merge: the
                    // edge ids of `other` have no meaning in this graph.
                    if matches!(defeater.target, DefeaterTarget::Node(_)) {
                        self.add_defeater(defeater.clone())?;
                    }
                }
                Some(existing) => {
                    if existing.kind != defeater.kind || existing.target != defeater.target {
                        return Err(AttestError::validation(format!(
                            "conflicting defeater {} during merge",
                            defeater.id.as_str()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Union a bare graph into this case, deduplicating identical node ids
    /// and (from, to, relation) edge triples. Used by composition, which
    /// merges fragments by value.
    pub(crate) fn absorb_graph(&mut self, graph: &ArgumentGraph) -> Result<(), AttestError> {
        for node in graph.nodes() {
            match self.graph.node(&node.id) {
                None => self.graph.add_node(node.clone())?,
                Some(existing) => {
                    if !same_attributes(existing, node) {
                        return Err(AttestError::validation(format!(
                            "conflicting attributes for node {} during composition",
                            node.id
                        )));
                    }
                }
            }
        }
        for edge in graph.edges() {
            let duplicate = self
                .graph
                .edges()
                .any(|e| e.from == edge.from && e.to == edge.to && e.kind == edge.kind);
            if !duplicate {
                let id = self
                    .graph
                    .add_edge(&edge.from, &edge.to, edge.kind, edge.weight)?;
                if let Some(checksum) = &edge.recorded_checksum {
                    self.graph.record_checksum(id, checksum.clone())?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Structural checks over the case. Findings are data, never errors.
    #[must_use]
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for node in self.graph.nodes() {
            let children = self.graph.child_edges(&node.id);
            match node.kind {
                NodeKind::Goal => {
                    if children.is_empty() && node.status != crate::NodeStatus::Assumed {
                        issues.push(Issue::new(
                            IssueKind::Incomplete,
                            node.id.clone(),
                            "goal has no supporting argument",
                        ));
                    }
                }
                NodeKind::Strategy => {
                    if children.is_empty() {
                        issues.push(Issue::new(
                            IssueKind::Incomplete,
                            node.id.clone(),
                            "strategy has no sub-goals",
                        ));
                    }
                }
                NodeKind::Solution => {
                    let evidence = children
                        .iter()
                        .filter(|e| e.kind == EdgeKind::Evidence)
                        .count();
                    if evidence == 0 && node.required_evidence > 0 {
                        issues.push(Issue::new(
                            IssueKind::Unsupported,
                            node.id.clone(),
                            "solution has no linked evidence",
                        ));
                    }
                }
                NodeKind::Context | NodeKind::Assumption | NodeKind::Justification => {}
            }
        }

        // Orphans: nodes unreachable from every root goal.
        let roots = self.graph.root_goals();
        if !roots.is_empty() {
            let mut reachable = std::collections::BTreeSet::new();
            for root in &roots {
                reachable.extend(self.graph.traverse_from(root));
            }
            for node in self.graph.nodes() {
                if !reachable.contains(&node.id) && !roots.contains(&node.id) {
                    issues.push(Issue::new(
                        IssueKind::Incomplete,
                        node.id.clone(),
                        "node is not connected to any root goal",
                    ));
                }
            }
        }

        issues
    }

    /// Node/edge/defeater tallies.
    #[must_use]
    pub fn statistics(&self) -> CaseStatistics {
        let mut stats = CaseStatistics {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            defeater_count: self.defeaters.len(),
            ..CaseStatistics::default()
        };
        for node in self.graph.nodes() {
            *stats
                .nodes_by_kind
                .entry(node.kind.as_str().to_string())
                .or_default() += 1;
        }
        for edge in self.graph.edges() {
            *stats
                .edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_default() += 1;
        }
        stats
    }
}

/// Node equality ignoring the reasoner-owned confidence field.
fn same_attributes(a: &ArgumentNode, b: &ArgumentNode) -> bool {
    a.kind == b.kind
        && a.title == b.title
        && a.rationale == b.rationale
        && a.status == b.status
        && a.contradicts == b.contradicts
        && a.required_evidence == b.required_evidence
}

// =============================================================================
// TESTS
// =============================================================================
