//! # Dependency Tracker
//!
//! Typed dependency edges over the node-id namespace, independent of the
//! argument graph's own edges. Answers change-impact queries, detects
//! dependency cycles, and keeps per-node version counters with an
//! append-only changelog.
//!
//! Cycles and impact sets are logical findings returned as data; only
//! self-loop insertion errors.

use crate::{AttestError, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of dependency between two tracked nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRelation {
    /// The source cannot stand without the target.
    Requires,
    /// The source realizes the target.
    Implements,
    /// The source exercises the target.
    Tests,
    /// The source checks the target.
    Validates,
    /// The source was derived from the target.
    DerivesFrom,
    /// Loose association.
    RelatedTo,
}

impl DependencyRelation {
    /// Lowercase name used in structured records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Implements => "implements",
            Self::Tests => "tests",
            Self::Validates => "validates",
            Self::DerivesFrom => "derives_from",
            Self::RelatedTo => "related_to",
        }
    }
}

/// A directed dependency: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent node.
    pub from: NodeId,
    /// The node depended upon.
    pub to: NodeId,
    /// Dependency kind.
    pub relation: DependencyRelation,
}

/// One append-only changelog entry for a node version bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Version before the bump.
    pub old_version: u64,
    /// Version after the bump.
    pub new_version: u64,
    /// Wall-clock milliseconds since the Unix epoch at bump time.
    pub timestamp_ms: u64,
    /// Why the node changed.
    pub cause: String,
}

/// A node reached by impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEntry {
    /// The impacted node.
    pub node: NodeId,
    /// Relation through which the node was first reached.
    pub relation: DependencyRelation,
    /// Distance from the changed node in dependency hops.
    pub hops: usize,
}

/// Dependency tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DependencyStatistics {
    /// Total dependency count.
    pub dependency_count: usize,
    /// Distinct nodes appearing in any dependency.
    pub node_count: usize,
    /// Dependency counts keyed by relation name.
    pub by_relation: BTreeMap<String, usize>,
}

/// Node state for the three-color cycle search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// The dependency tracker.
#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    /// Insertion-ordered dependency list.
    deps: Vec<DependencyEdge>,
    /// Triple set for idempotence checks.
    triples: BTreeSet<(NodeId, NodeId, DependencyRelation)>,
    /// Forward adjacency: from-node -> indexes into `deps`.
    forward: BTreeMap<NodeId, Vec<usize>>,
    /// Reverse adjacency: to-node -> indexes into `deps`.
    reverse: BTreeMap<NodeId, Vec<usize>>,
    /// First-seen order of node ids; drives DFS root order.
    node_order: Vec<NodeId>,
    /// Version counters; absent means version 1, never bumped.
    versions: BTreeMap<NodeId, u64>,
    /// Per-node append-only changelogs.
    changelog: BTreeMap<NodeId, Vec<ChangeRecord>>,
}

impl DependencyTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // DEPENDENCIES
    // =========================================================================

    /// Record that `from` depends on `to`.
    ///
    /// Idempotent on the full triple; self-loops are rejected.
    pub fn add_dependency(
        &mut self,
        from: NodeId,
        to: NodeId,
        relation: DependencyRelation,
    ) -> Result<(), AttestError> {
        if from == to {
            return Err(AttestError::validation(format!(
                "self-loop dependency on {from} rejected"
            )));
        }
        if !self.triples.insert((from.clone(), to.clone(), relation)) {
            return Ok(());
        }

        self.note_node(&from);
        self.note_node(&to);

        let index = self.deps.len();
        self.forward.entry(from.clone()).or_default().push(index);
        self.reverse.entry(to.clone()).or_default().push(index);
        self.deps.push(DependencyEdge { from, to, relation });
        Ok(())
    }

    /// All dependencies in insertion order.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.deps
    }

    /// Total dependency count.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.deps.len()
    }

    /// Whether `a` depends on `b`, directly or transitively.
    #[must_use]
    pub fn depends_on(&self, a: &NodeId, b: &NodeId) -> bool {
        if a == b {
            return false;
        }
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(a.clone());
        queue.push_back(a.clone());

        while let Some(current) = queue.pop_front() {
            for &index in self.forward.get(&current).into_iter().flatten() {
                let target = &self.deps[index].to;
                if target == b {
                    return true;
                }
                if visited.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
            }
        }
        false
    }

    // =========================================================================
    // IMPACT ANALYSIS
    // =========================================================================

    /// Every node whose standing is affected by a change to `changed`.
    ///
    /// Breadth-first over reverse dependency edges; output ordered by BFS
    /// level with ties broken by dependency insertion order.
    #[must_use]
    pub fn analyze_impact(&self, changed: &NodeId) -> Vec<ImpactEntry> {
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        visited.insert(changed.clone());
        queue.push_back((changed.clone(), 0));

        while let Some((current, hops)) = queue.pop_front() {
            for &index in self.reverse.get(&current).into_iter().flatten() {
                let edge = &self.deps[index];
                if visited.insert(edge.from.clone()) {
                    result.push(ImpactEntry {
                        node: edge.from.clone(),
                        relation: edge.relation,
                        hops: hops.saturating_add(1),
                    });
                    queue.push_back((edge.from.clone(), hops.saturating_add(1)));
                }
            }
        }
        result
    }

    // =========================================================================
    // CYCLE DETECTION
    // =========================================================================

    /// Find every dependency cycle.
    ///
    /// Three-color depth-first search over the dependency graph, O(V+E).
    /// Each cycle is reported as the ordered node-id sequence starting at
    /// the node where the back edge closed. Findings are data, never
    /// errors.
    #[must_use]
    pub fn detect_circular_dependencies(&self) -> Vec<Vec<NodeId>> {
        let mut colors: BTreeMap<NodeId, Color> = self
            .node_order
            .iter()
            .map(|n| (n.clone(), Color::White))
            .collect();
        let mut cycles = Vec::new();
        let mut path: Vec<NodeId> = Vec::new();

        for root in &self.node_order {
            if colors.get(root) == Some(&Color::White) {
                self.visit(root, &mut colors, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn visit(
        &self,
        node: &NodeId,
        colors: &mut BTreeMap<NodeId, Color>,
        path: &mut Vec<NodeId>,
        cycles: &mut Vec<Vec<NodeId>>,
    ) {
        colors.insert(node.clone(), Color::Gray);
        path.push(node.clone());

        for &index in self.forward.get(node).into_iter().flatten() {
            let next = &self.deps[index].to;
            match colors.get(next).copied().unwrap_or(Color::White) {
                Color::White => self.visit(next, colors, path, cycles),
                Color::Gray => {
                    if let Some(start) = path.iter().position(|n| n == next) {
                        cycles.push(path[start..].to_vec());
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors.insert(node.clone(), Color::Black);
    }

    // =========================================================================
    // VERSIONS & CHANGELOG
    // =========================================================================

    /// Current version of a node (1 if never bumped).
    #[must_use]
    pub fn version(&self, node: &NodeId) -> u64 {
        self.versions.get(node).copied().unwrap_or(1)
    }

    /// Increment a node's version and append an immutable changelog entry.
    pub fn bump_version(&mut self, node: &NodeId, cause: impl Into<String>) -> ChangeRecord {
        let old_version = self.version(node);
        let new_version = old_version.saturating_add(1);
        self.versions.insert(node.clone(), new_version);
        self.note_node(node);

        let record = ChangeRecord {
            old_version,
            new_version,
            timestamp_ms: now_ms(),
            cause: cause.into(),
        };
        self.changelog
            .entry(node.clone())
            .or_default()
            .push(record.clone());
        record
    }

    /// The append-only changelog of a node, oldest first.
    #[must_use]
    pub fn changelog(&self, node: &NodeId) -> &[ChangeRecord] {
        self.changelog.get(node).map_or(&[], Vec::as_slice)
    }

    // =========================================================================
    // STATISTICS
    // =========================================================================

    /// Dependency tallies.
    #[must_use]
    pub fn statistics(&self) -> DependencyStatistics {
        let mut stats = DependencyStatistics {
            dependency_count: self.deps.len(),
            node_count: self.node_order.len(),
            ..DependencyStatistics::default()
        };
        for dep in &self.deps {
            *stats
                .by_relation
                .entry(dep.relation.as_str().to_string())
                .or_default() += 1;
        }
        stats
    }

    fn note_node(&mut self, node: &NodeId) {
        if !self.node_order.contains(node) {
            self.node_order.push(node.clone());
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// TESTS
// =============================================================================
