//! # Argument Graph Store
//!
//! Deterministic storage for argument elements and their typed relations.
//!
//! The graph is an arena of nodes addressed by opaque string ids, with
//! relation lookups kept in side adjacency indexes rather than embedded
//! references. All containers are `BTreeMap`/`BTreeSet`; insertion order is
//! tracked explicitly where an operation's output is defined by it.
//!
//! Direction convention: supporting element -> supported node for
//! SUPPORTS, EVIDENCE, CONTEXT, and ASSUMPTION; parent goal -> sub-goal
//! for DECOMPOSES. `get_children` presents both as "the elements one level
//! below a node in the argument".

use crate::primitives::MAX_TRAVERSAL_DEPTH;
use crate::{ArgumentNode, AttestError, Confidence, Edge, EdgeId, EdgeKind, NodeId, NodeKind};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The argument graph: an arena of nodes plus typed-edge adjacency indexes.
#[derive(Debug, Clone, Default)]
pub struct ArgumentGraph {
    /// Node storage: id -> node.
    nodes: BTreeMap<NodeId, ArgumentNode>,

    /// Node insertion order; drives candidate ordering everywhere.
    order: Vec<NodeId>,

    /// Edge storage: EdgeId -> edge. Ids are monotonic, so iteration over
    /// this map is insertion order.
    edges: BTreeMap<EdgeId, Edge>,

    /// Outgoing adjacency: from-node -> edge ids in insertion order.
    outgoing: BTreeMap<NodeId, Vec<EdgeId>>,

    /// Incoming adjacency: to-node -> edge ids in insertion order.
    incoming: BTreeMap<NodeId, Vec<EdgeId>>,

    /// Next available edge id.
    next_edge_id: u64,
}

impl ArgumentGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Add a node. Fails if the id is already taken.
    pub fn add_node(&mut self, node: ArgumentNode) -> Result<(), AttestError> {
        if self.nodes.contains_key(&node.id) {
            return Err(AttestError::validation(format!(
                "node id {} already exists",
                node.id
            )));
        }
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node, cascading all incident edges. Returns the node.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<ArgumentNode, AttestError> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| AttestError::validation(format!("node {id} not found")))?;

        let mut incident: Vec<EdgeId> = Vec::new();
        incident.extend(self.outgoing.remove(id).unwrap_or_default());
        incident.extend(self.incoming.remove(id).unwrap_or_default());
        for edge_id in incident {
            self.detach_edge(edge_id);
        }

        self.order.retain(|n| n != id);
        Ok(node)
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&ArgumentNode> {
        self.nodes.get(id)
    }

    /// Mutable lookup of a node by id.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut ArgumentNode> {
        self.nodes.get_mut(id)
    }

    /// Check if a node exists.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ArgumentNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node ids in insertion order.
    #[must_use]
    pub fn node_order(&self) -> &[NodeId] {
        &self.order
    }

    /// All nodes of a given kind, in insertion order.
    pub fn nodes_by_kind(&self, kind: NodeKind) -> impl Iterator<Item = &ArgumentNode> {
        self.nodes().filter(move |n| n.kind == kind)
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Insert a typed edge between two existing nodes.
    ///
    /// Fails when an endpoint is missing, when the edge would be a
    /// self-loop, or when a DECOMPOSES edge would close a cycle.
    pub fn add_edge(
        &mut self,
        from: &NodeId,
        to: &NodeId,
        kind: EdgeKind,
        weight: Confidence,
    ) -> Result<EdgeId, AttestError> {
        if !self.nodes.contains_key(from) {
            return Err(AttestError::validation(format!(
                "edge endpoint {from} not found"
            )));
        }
        if !self.nodes.contains_key(to) {
            return Err(AttestError::validation(format!(
                "edge endpoint {to} not found"
            )));
        }
        if from == to {
            return Err(AttestError::validation(format!(
                "self-loop on {from} rejected"
            )));
        }
        if kind == EdgeKind::Decomposes && self.decomposes_reaches(to, from) {
            return Err(AttestError::validation(format!(
                "DECOMPOSES edge {from} -> {to} would form a cycle"
            )));
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id = self.next_edge_id.saturating_add(1);
        self.edges.insert(
            id,
            Edge {
                id,
                from: from.clone(),
                to: to.clone(),
                kind,
                weight,
                recorded_checksum: None,
            },
        );
        self.outgoing.entry(from.clone()).or_default().push(id);
        self.incoming.entry(to.clone()).or_default().push(id);
        Ok(id)
    }

    /// Insert an edge preserving its original id (for import operations).
    ///
    /// Validates the same invariants as `add_edge` and refuses an id that
    /// is already taken.
    pub fn import_edge(&mut self, edge: Edge) -> Result<(), AttestError> {
        if self.edges.contains_key(&edge.id) {
            return Err(AttestError::validation(format!(
                "edge id {} already exists",
                edge.id.value()
            )));
        }
        let id = self.add_edge(&edge.from, &edge.to, edge.kind, edge.weight)?;
        // add_edge assigned a fresh id; move the entry onto the original.
        let mut stored = self.remove_edge(id)?;
        stored.id = edge.id;
        stored.recorded_checksum = edge.recorded_checksum;
        self.outgoing
            .entry(stored.from.clone())
            .or_default()
            .push(stored.id);
        self.incoming
            .entry(stored.to.clone())
            .or_default()
            .push(stored.id);
        if edge.id.value() >= self.next_edge_id {
            self.next_edge_id = edge.id.value().saturating_add(1);
        }
        self.edges.insert(stored.id, stored);
        Ok(())
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, AttestError> {
        let edge = self
            .edges
            .get(&id)
            .cloned()
            .ok_or_else(|| AttestError::validation(format!("edge {} not found", id.value())))?;
        if let Some(out) = self.outgoing.get_mut(&edge.from) {
            out.retain(|e| *e != id);
        }
        if let Some(inc) = self.incoming.get_mut(&edge.to) {
            inc.retain(|e| *e != id);
        }
        self.edges.remove(&id);
        Ok(edge)
    }

    /// Lookup an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Record the evidence checksum captured at link time.
    pub fn record_checksum(&mut self, id: EdgeId, checksum: String) -> Result<(), AttestError> {
        let edge = self
            .edges
            .get_mut(&id)
            .ok_or_else(|| AttestError::validation(format!("edge {} not found", id.value())))?;
        edge.recorded_checksum = Some(checksum);
        Ok(())
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a node in insertion order.
    pub fn outgoing_edges(&self, node: &NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    /// Incoming edges of a node in insertion order.
    pub fn incoming_edges(&self, node: &NodeId) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    // =========================================================================
    // ARGUMENT STRUCTURE
    // =========================================================================

    /// The elements one level below `node` under a given relation, in edge
    /// insertion order.
    ///
    /// For DECOMPOSES these are targets of outgoing edges; for every other
    /// relation they are sources of incoming edges.
    #[must_use]
    pub fn get_children(&self, node: &NodeId, relation: EdgeKind) -> Vec<NodeId> {
        match relation {
            EdgeKind::Decomposes => self
                .outgoing_edges(node)
                .filter(|e| e.kind == EdgeKind::Decomposes)
                .map(|e| e.to.clone())
                .collect(),
            _ => self
                .incoming_edges(node)
                .filter(|e| e.kind == relation)
                .map(|e| e.from.clone())
                .collect(),
        }
    }

    /// Edges carrying a child's contribution into `node`: incoming
    /// SUPPORTS/EVIDENCE plus outgoing DECOMPOSES.
    ///
    /// CONTEXT and ASSUMPTION attachments never contribute to confidence
    /// and are not listed here.
    #[must_use]
    pub fn child_edges(&self, node: &NodeId) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self
            .incoming_edges(node)
            .filter(|e| matches!(e.kind, EdgeKind::Supports | EdgeKind::Evidence))
            .collect();
        edges.extend(
            self.outgoing_edges(node)
                .filter(|e| e.kind == EdgeKind::Decomposes),
        );
        edges.sort_by_key(|e| e.id);
        edges
    }

    /// The node a child edge contributes from (the child endpoint).
    #[must_use]
    pub fn child_of_edge<'a>(&self, edge: &'a Edge, parent: &NodeId) -> &'a NodeId {
        if edge.kind == EdgeKind::Decomposes && edge.from == *parent {
            &edge.to
        } else {
            &edge.from
        }
    }

    /// Direct parents of a node: targets of its outgoing support edges plus
    /// sources of incoming DECOMPOSES edges.
    #[must_use]
    pub fn parents(&self, node: &NodeId) -> Vec<NodeId> {
        let mut parents: Vec<NodeId> = Vec::new();
        for edge in self.outgoing_edges(node) {
            if edge.kind != EdgeKind::Decomposes && !parents.contains(&edge.to) {
                parents.push(edge.to.clone());
            }
        }
        for edge in self.incoming_edges(node) {
            if edge.kind == EdgeKind::Decomposes && !parents.contains(&edge.from) {
                parents.push(edge.from.clone());
            }
        }
        parents
    }

    /// All ancestors of a node (transitive parents), in BFS order.
    #[must_use]
    pub fn get_ancestors(&self, node: &NodeId) -> Vec<NodeId> {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
        queue.push_back((node.clone(), 0));
        seen.insert(node.clone());

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= MAX_TRAVERSAL_DEPTH {
                continue;
            }
            for parent in self.parents(&current) {
                if seen.insert(parent.clone()) {
                    result.push(parent.clone());
                    queue.push_back((parent, depth.saturating_add(1)));
                }
            }
        }
        result
    }

    /// Goal nodes with no parents, in insertion order.
    #[must_use]
    pub fn root_goals(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.kind == NodeKind::Goal && self.parents(&n.id).is_empty())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Shortest path from `a` to `b` by edge count over directed edges.
    ///
    /// BFS with neighbors expanded in edge insertion order, which is the
    /// deterministic tie-break between equal-length paths.
    #[must_use]
    pub fn find_path(&self, a: &NodeId, b: &NodeId) -> Option<Vec<NodeId>> {
        if !self.contains_node(a) || !self.contains_node(b) {
            return None;
        }
        if a == b {
            return Some(vec![a.clone()]);
        }

        let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(a.clone());
        queue.push_back(a.clone());

        'search: while let Some(current) = queue.pop_front() {
            for edge in self.outgoing_edges(&current) {
                if visited.insert(edge.to.clone()) {
                    prev.insert(edge.to.clone(), current.clone());
                    if edge.to == *b {
                        break 'search;
                    }
                    queue.push_back(edge.to.clone());
                }
            }
        }

        if !prev.contains_key(b) {
            return None;
        }
        let mut path = vec![b.clone()];
        let mut current = b;
        while let Some(p) = prev.get(current) {
            path.push(p.clone());
            current = p;
        }
        path.reverse();
        Some(path)
    }

    /// Depth-first listing of the argument below a root, children in edge
    /// insertion order.
    #[must_use]
    pub fn traverse_from(&self, root: &NodeId) -> Vec<NodeId> {
        if !self.contains_node(root) {
            return Vec::new();
        }
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut result = Vec::new();
        self.dfs_children(root, &mut visited, &mut result);
        result
    }

    fn dfs_children(
        &self,
        current: &NodeId,
        visited: &mut BTreeSet<NodeId>,
        result: &mut Vec<NodeId>,
    ) {
        if !visited.insert(current.clone()) {
            return;
        }
        result.push(current.clone());
        let children: Vec<NodeId> = self
            .child_edges(current)
            .into_iter()
            .map(|e| self.child_of_edge(e, current).clone())
            .collect();
        for child in children {
            self.dfs_children(&child, visited, result);
        }
    }

    /// The support closure of a node: the node itself plus every element
    /// whose contribution (transitively) flows into it.
    #[must_use]
    pub fn support_closure(&self, node: &NodeId) -> BTreeSet<NodeId> {
        let mut closure: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        closure.insert(node.clone());
        queue.push_back(node.clone());

        while let Some(current) = queue.pop_front() {
            let children: Vec<NodeId> = self
                .child_edges(&current)
                .into_iter()
                .map(|e| self.child_of_edge(e, &current).clone())
                .collect();
            for child in children {
                if closure.insert(child.clone()) {
                    queue.push_back(child);
                }
            }
        }
        closure
    }

    // =========================================================================
    // REWIRING
    // =========================================================================

    /// Move every edge incident to `from` onto `to`, dropping edges that
    /// would become self-loops. `from` keeps its node entry; callers remove
    /// it afterwards if the substitution is permanent.
    pub fn rewire(&mut self, from: &NodeId, to: &NodeId) -> Result<(), AttestError> {
        if !self.contains_node(from) {
            return Err(AttestError::validation(format!("node {from} not found")));
        }
        if !self.contains_node(to) {
            return Err(AttestError::validation(format!("node {to} not found")));
        }

        // Check the DECOMPOSES subgraph stays acyclic under the rewire
        // before touching anything.
        if self.rewire_closes_decomposes_cycle(from, to) {
            return Err(AttestError::validation(format!(
                "substituting {from} with {to} would form a DECOMPOSES cycle"
            )));
        }

        let incident: Vec<EdgeId> = self
            .outgoing
            .get(from)
            .into_iter()
            .flatten()
            .chain(self.incoming.get(from).into_iter().flatten())
            .copied()
            .collect();

        for edge_id in incident {
            let Some(edge) = self.edges.get(&edge_id).cloned() else {
                continue;
            };
            self.detach_edge(edge_id);
            let new_from = if edge.from == *from { to } else { &edge.from };
            let new_to = if edge.to == *from { to } else { &edge.to };
            if new_from == new_to {
                continue;
            }
            // A parallel edge with the same endpoints and relation already
            // says everything this one would; drop the duplicate.
            let duplicate = self
                .edges
                .values()
                .any(|e| e.from == *new_from && e.to == *new_to && e.kind == edge.kind);
            if duplicate {
                continue;
            }
            self.edges.insert(
                edge_id,
                Edge {
                    from: new_from.clone(),
                    to: new_to.clone(),
                    ..edge
                },
            );
            self.outgoing
                .entry(new_from.clone())
                .or_default()
                .push(edge_id);
            self.incoming.entry(new_to.clone()).or_default().push(edge_id);
        }
        Ok(())
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Drop an edge from storage and both adjacency indexes.
    fn detach_edge(&mut self, id: EdgeId) {
        if let Some(edge) = self.edges.remove(&id) {
            if let Some(out) = self.outgoing.get_mut(&edge.from) {
                out.retain(|e| *e != id);
            }
            if let Some(inc) = self.incoming.get_mut(&edge.to) {
                inc.retain(|e| *e != id);
            }
        }
    }

    /// Whether `goal` is reachable from `start` over DECOMPOSES edges.
    fn decomposes_reaches(&self, start: &NodeId, goal: &NodeId) -> bool {
        if start == goal {
            return true;
        }
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing_edges(&current) {
                if edge.kind != EdgeKind::Decomposes {
                    continue;
                }
                if edge.to == *goal {
                    return true;
                }
                if visited.insert(edge.to.clone()) {
                    queue.push_back(edge.to.clone());
                }
            }
        }
        false
    }

    /// Simulate the DECOMPOSES subgraph with `from` replaced by `to` and
    /// check whether `to` would reach itself.
    fn rewire_closes_decomposes_cycle(&self, from: &NodeId, to: &NodeId) -> bool {
        let alias = |id: &NodeId| -> NodeId {
            if id == from { to.clone() } else { id.clone() }
        };
        let mut adjacency: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for edge in self.edges.values() {
            if edge.kind == EdgeKind::Decomposes {
                let f = alias(&edge.from);
                let t = alias(&edge.to);
                if f != t {
                    adjacency.entry(f).or_default().push(t);
                }
            }
        }

        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(to.clone());
        while let Some(current) = queue.pop_front() {
            for next in adjacency.get(&current).into_iter().flatten() {
                if next == to {
                    return true;
                }
                if visited.insert(next.clone()) {
                    queue.push_back(next.clone());
                }
            }
        }
        false
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn goal(id: &str) -> ArgumentNode {
        ArgumentNode::new(NodeId::new(id), NodeKind::Goal, format!("goal {id}"))
    }

    fn strategy(id: &str) -> ArgumentNode {
        ArgumentNode::new(NodeId::new(id), NodeKind::Strategy, format!("strategy {id}"))
    }

    #[test]
    fn add_and_lookup_node() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");

        assert!(graph.contains_node(&NodeId::new("G1")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");

        let result = graph.add_node(goal("G1"));
        assert!(matches!(result, Err(AttestError::Validation(_))));
    }

    #[test]
    fn edge_requires_both_endpoints() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");

        let result = graph.add_edge(
            &NodeId::new("G1"),
            &NodeId::new("missing"),
            EdgeKind::Supports,
            Confidence::FULL,
        );
        assert!(matches!(result, Err(AttestError::Validation(_))));
    }

    #[test]
    fn self_loop_rejected() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");

        let g1 = NodeId::new("G1");
        let result = graph.add_edge(&g1, &g1, EdgeKind::Supports, Confidence::FULL);
        assert!(matches!(result, Err(AttestError::Validation(_))));
    }

    #[test]
    fn decomposes_cycle_rejected() {
        let mut graph = ArgumentGraph::new();
        for id in ["G1", "G2", "G3"] {
            graph.add_node(goal(id)).expect("add");
        }
        let (g1, g2, g3) = (NodeId::new("G1"), NodeId::new("G2"), NodeId::new("G3"));

        graph
            .add_edge(&g1, &g2, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &g3, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");

        let result = graph.add_edge(&g3, &g1, EdgeKind::Decomposes, Confidence::FULL);
        assert!(matches!(result, Err(AttestError::Validation(_))));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn supports_cycle_allowed() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        let (g1, g2) = (NodeId::new("G1"), NodeId::new("G2"));

        graph
            .add_edge(&g1, &g2, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(strategy("S1")).expect("add");
        let (g1, s1) = (NodeId::new("G1"), NodeId::new("S1"));
        graph
            .add_edge(&s1, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        graph.remove_node(&s1).expect("remove");

        assert_eq!(graph.edge_count(), 0);
        assert!(graph.incoming_edges(&g1).next().is_none());
    }

    #[test]
    fn children_by_relation() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(strategy("S1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        let (g1, s1, g2) = (NodeId::new("G1"), NodeId::new("S1"), NodeId::new("G2"));

        graph
            .add_edge(&s1, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g1, &g2, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");

        assert_eq!(graph.get_children(&g1, EdgeKind::Supports), vec![s1]);
        assert_eq!(graph.get_children(&g1, EdgeKind::Decomposes), vec![g2]);
    }

    #[test]
    fn ancestors_walk_upward() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(strategy("S1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        let (g1, s1, g2) = (NodeId::new("G1"), NodeId::new("S1"), NodeId::new("G2"));

        // G2 supports S1 supports G1
        graph
            .add_edge(&s1, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &s1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        assert_eq!(graph.get_ancestors(&g2), vec![s1, g1]);
    }

    #[test]
    fn find_path_shortest_by_edge_count() {
        let mut graph = ArgumentGraph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_node(goal(id)).expect("add");
        }
        let ids: Vec<NodeId> = ["A", "B", "C", "D"].iter().map(|s| NodeId::new(*s)).collect();

        // A -> B -> D (long, inserted first) and A -> D (short)
        graph
            .add_edge(&ids[0], &ids[1], EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&ids[1], &ids[3], EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&ids[0], &ids[3], EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        let path = graph.find_path(&ids[0], &ids[3]).expect("path");
        assert_eq!(path, vec![ids[0].clone(), ids[3].clone()]);
    }

    #[test]
    fn find_path_tie_break_is_insertion_order() {
        let mut graph = ArgumentGraph::new();
        for id in ["A", "B", "C", "D"] {
            graph.add_node(goal(id)).expect("add");
        }
        let a = NodeId::new("A");
        let b = NodeId::new("B");
        let c = NodeId::new("C");
        let d = NodeId::new("D");

        // Two 2-hop routes; the first-inserted edge wins.
        graph
            .add_edge(&a, &b, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&a, &c, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&b, &d, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&c, &d, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        let path = graph.find_path(&a, &d).expect("path");
        assert_eq!(path, vec![a, b, d]);
    }

    #[test]
    fn find_path_missing_endpoint_is_none() {
        let graph = ArgumentGraph::new();
        assert!(
            graph
                .find_path(&NodeId::new("A"), &NodeId::new("B"))
                .is_none()
        );
    }

    #[test]
    fn rewire_moves_edges_and_drops_self_loops() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        graph.add_node(strategy("S1")).expect("add");
        let (g1, g2, s1) = (NodeId::new("G1"), NodeId::new("G2"), NodeId::new("S1"));

        graph
            .add_edge(&s1, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        // Replace G1 by G2: S1->G1 becomes S1->G2, G2->G1 becomes a
        // self-loop and is dropped.
        graph.rewire(&g1, &g2).expect("rewire");

        assert_eq!(graph.get_children(&g2, EdgeKind::Supports), vec![s1]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn rewire_rejects_decomposes_cycle() {
        let mut graph = ArgumentGraph::new();
        for id in ["G1", "G2", "G3"] {
            graph.add_node(goal(id)).expect("add");
        }
        let (g1, g2, g3) = (NodeId::new("G1"), NodeId::new("G2"), NodeId::new("G3"));

        graph
            .add_edge(&g1, &g2, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &g3, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");

        // Substituting G3 with G1 would make G1 -> G2 -> G1.
        let result = graph.rewire(&g3, &g1);
        assert!(matches!(result, Err(AttestError::Validation(_))));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn traverse_from_lists_support_subtree() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(strategy("S1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        let (g1, s1, g2) = (NodeId::new("G1"), NodeId::new("S1"), NodeId::new("G2"));

        graph
            .add_edge(&s1, &g1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");
        graph
            .add_edge(&g2, &s1, EdgeKind::Supports, Confidence::FULL)
            .expect("edge");

        assert_eq!(graph.traverse_from(&g1), vec![g1, s1, g2]);
    }

    #[test]
    fn root_goals_are_parentless_goals() {
        let mut graph = ArgumentGraph::new();
        graph.add_node(goal("G1")).expect("add");
        graph.add_node(goal("G2")).expect("add");
        let (g1, g2) = (NodeId::new("G1"), NodeId::new("G2"));

        graph
            .add_edge(&g1, &g2, EdgeKind::Decomposes, Confidence::FULL)
            .expect("edge");

        assert_eq!(graph.root_goals(), vec![g1]);
    }
}
