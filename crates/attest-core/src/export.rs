//! # Canonical Export
//!
//! The neutral persistence structure and its bit-exact byte encoding.
//!
//! Cases and fragments serialize to a `NeutralCase` — plain serde structs
//! holding nodes, edges, defeaters, and dependencies — via pure
//! `export_case`/`import_case` functions. Any storage technology may
//! implement the actual read/write; the core defines only this
//! structured-record boundary.
//!
//! The byte encoding is a length-prefixed `postcard` stream:
//!
//! ```text
//! [header_len: u32 LE] [CanonicalHeader (postcard)] [NeutralCase (postcard)]
//! ```
//!
//! Node and edge order inside the structure is the case's insertion order,
//! which is part of case state; identical cases therefore produce
//! identical bytes.

use crate::case::AssuranceCase;
use crate::dependency::{DependencyEdge, DependencyTracker};
use crate::fragment::Fragment;
use crate::graph::ArgumentGraph;
use crate::primitives::{
    CANONICAL_MAGIC, CANONICAL_VERSION, MAX_IMPORT_EDGE_COUNT, MAX_IMPORT_NODE_COUNT,
};
use crate::{ArgumentNode, AttestError, Defeater, Edge, NodeId};
use serde::{Deserialize, Serialize};

// =============================================================================
// NEUTRAL STRUCTURE
// =============================================================================

/// Header for canonical export streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes identifying the format.
    pub magic: [u8; 4],
    /// Format version.
    pub version: u8,
    /// Number of nodes in the payload.
    pub node_count: u64,
    /// Number of edges in the payload.
    pub edge_count: u64,
    /// XOR-rotate checksum of the payload.
    pub checksum: u64,
}

impl CanonicalHeader {
    /// Create a header with the given counts.
    #[must_use]
    pub fn new(node_count: u64, edge_count: u64, checksum: u64) -> Self {
        Self {
            magic: CANONICAL_MAGIC,
            version: CANONICAL_VERSION,
            node_count,
            edge_count,
            checksum,
        }
    }

    /// Validate magic and version.
    pub fn validate(&self) -> Result<(), AttestError> {
        if self.magic != CANONICAL_MAGIC {
            return Err(AttestError::Serialization("invalid file format".to_string()));
        }
        if self.version != CANONICAL_VERSION {
            return Err(AttestError::Serialization(
                "unsupported file version".to_string(),
            ));
        }
        Ok(())
    }
}

/// The neutral persistence structure for cases and fragments.
///
/// Node and edge vectors are in insertion order; `ports` is non-empty only
/// for exported fragments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NeutralCase {
    /// Case or fragment identifier.
    pub id: String,
    /// Case title (empty for fragments).
    pub title: String,
    /// Nodes in insertion order.
    pub nodes: Vec<ArgumentNode>,
    /// Edges in insertion order.
    pub edges: Vec<Edge>,
    /// Defeaters ordered by id.
    pub defeaters: Vec<Defeater>,
    /// Dependency triples in insertion order.
    pub dependencies: Vec<DependencyEdge>,
    /// Declared ports (fragments only).
    pub ports: Vec<NodeId>,
}

impl NeutralCase {
    /// Compute a deterministic checksum of the structure.
    ///
    /// XOR-rotate hashing: cheap, stable, and adequate for corruption
    /// detection. It is NOT a cryptographic hash; callers needing tamper
    /// resistance should hash the exported bytes externally.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hash: u64 = 0;
        let mut mix = |bytes: &[u8], rot: u32| {
            for b in bytes {
                hash ^= u64::from(*b).rotate_left(rot);
                hash = hash.rotate_left(1);
            }
        };

        mix(self.id.as_bytes(), 3);
        mix(self.title.as_bytes(), 5);
        for node in &self.nodes {
            mix(node.id.as_str().as_bytes(), 7);
            mix(node.kind.as_str().as_bytes(), 11);
            mix(node.title.as_bytes(), 13);
            mix(&node.confidence.value().to_bits().to_le_bytes(), 17);
        }
        for edge in &self.edges {
            mix(&edge.id.value().to_le_bytes(), 19);
            mix(edge.from.as_str().as_bytes(), 23);
            mix(edge.to.as_str().as_bytes(), 29);
            mix(edge.kind.as_str().as_bytes(), 31);
            mix(&edge.weight.value().to_bits().to_le_bytes(), 37);
        }
        for defeater in &self.defeaters {
            mix(defeater.id.as_str().as_bytes(), 41);
            mix(&defeater.severity.value().to_bits().to_le_bytes(), 43);
        }
        for dep in &self.dependencies {
            mix(dep.from.as_str().as_bytes(), 47);
            mix(dep.to.as_str().as_bytes(), 53);
            mix(dep.relation.as_str().as_bytes(), 59);
        }
        for port in &self.ports {
            mix(port.as_str().as_bytes(), 61);
        }
        hash
    }
}

// =============================================================================
// PURE EXPORT / IMPORT
// =============================================================================

/// Export a case (and the dependencies tracked alongside it) to the
/// neutral structure.
#[must_use]
pub fn export_case(case: &AssuranceCase, tracker: &DependencyTracker) -> NeutralCase {
    NeutralCase {
        id: case.id.clone(),
        title: case.title.clone(),
        nodes: case.graph().nodes().cloned().collect(),
        edges: case.graph().edges().cloned().collect(),
        defeaters: case.defeaters().cloned().collect(),
        dependencies: tracker.dependencies().to_vec(),
        ports: Vec::new(),
    }
}

/// Export a fragment to the neutral structure.
#[must_use]
pub fn export_fragment(fragment: &Fragment) -> NeutralCase {
    NeutralCase {
        id: fragment.name().to_string(),
        title: String::new(),
        nodes: fragment.graph().nodes().cloned().collect(),
        edges: fragment.graph().edges().cloned().collect(),
        defeaters: Vec::new(),
        dependencies: Vec::new(),
        ports: fragment.ports().to_vec(),
    }
}

/// Rebuild a case and dependency tracker from the neutral structure.
///
/// Every adjacency index is re-derived; endpoint-less edges and duplicate
/// ids surface as ValidationError.
pub fn import_case(data: &NeutralCase) -> Result<(AssuranceCase, DependencyTracker), AttestError> {
    let mut case = AssuranceCase::new(data.id.clone(), data.title.clone());
    build_graph(case.graph_mut(), data)?;
    for defeater in &data.defeaters {
        case.add_defeater(defeater.clone())?;
    }

    let mut tracker = DependencyTracker::new();
    for dep in &data.dependencies {
        tracker.add_dependency(dep.from.clone(), dep.to.clone(), dep.relation)?;
    }
    Ok((case, tracker))
}

/// Rebuild a fragment from the neutral structure.
pub fn import_fragment(data: &NeutralCase) -> Result<Fragment, AttestError> {
    let mut graph = ArgumentGraph::new();
    build_graph(&mut graph, data)?;
    Fragment::publish(data.id.clone(), graph, data.ports.clone())
}

fn build_graph(graph: &mut ArgumentGraph, data: &NeutralCase) -> Result<(), AttestError> {
    for node in &data.nodes {
        graph.add_node(node.clone())?;
    }
    for edge in &data.edges {
        graph.import_edge(edge.clone())?;
    }
    Ok(())
}

// =============================================================================
// CANONICAL BYTES
// =============================================================================

/// Serialize a case to the canonical byte stream.
pub fn export_canonical(
    case: &AssuranceCase,
    tracker: &DependencyTracker,
) -> Result<Vec<u8>, AttestError> {
    let neutral = export_case(case, tracker);
    let header = CanonicalHeader::new(
        neutral.nodes.len() as u64,
        neutral.edges.len() as u64,
        neutral.checksum(),
    );

    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| AttestError::Serialization(format!("header: {e}")))?;
    let data_bytes = postcard::to_allocvec(&neutral)
        .map_err(|e| AttestError::Serialization(format!("data: {e}")))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + data_bytes.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&data_bytes);
    Ok(result)
}

/// Rebuild a case and tracker from the canonical byte stream.
pub fn import_canonical(data: &[u8]) -> Result<(AssuranceCase, DependencyTracker), AttestError> {
    if data.len() < 4 {
        return Err(AttestError::Serialization("data too short".to_string()));
    }
    let header_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < 4 + header_len {
        return Err(AttestError::Serialization(
            "data too short for header".to_string(),
        ));
    }

    let header: CanonicalHeader = postcard::from_bytes(&data[4..4 + header_len])
        .map_err(|e| AttestError::Serialization(format!("header: {e}")))?;
    header.validate()?;

    // Enforce size limits BEFORE deserializing the full payload.
    if header.node_count > MAX_IMPORT_NODE_COUNT {
        return Err(AttestError::Serialization(format!(
            "node count {} exceeds maximum allowed {MAX_IMPORT_NODE_COUNT}",
            header.node_count
        )));
    }
    if header.edge_count > MAX_IMPORT_EDGE_COUNT {
        return Err(AttestError::Serialization(format!(
            "edge count {} exceeds maximum allowed {MAX_IMPORT_EDGE_COUNT}",
            header.edge_count
        )));
    }

    let neutral: NeutralCase = postcard::from_bytes(&data[4 + header_len..])
        .map_err(|e| AttestError::Serialization(format!("data: {e}")))?;

    if neutral.checksum() != header.checksum {
        return Err(AttestError::Serialization(format!(
            "checksum mismatch: expected {}, got {}",
            header.checksum,
            neutral.checksum()
        )));
    }
    if neutral.nodes.len() as u64 != header.node_count {
        return Err(AttestError::Serialization("node count mismatch".to_string()));
    }
    if neutral.edges.len() as u64 != header.edge_count {
        return Err(AttestError::Serialization("edge count mismatch".to_string()));
    }

    import_case(&neutral)
}

/// Verify that a case matches a canonical export.
pub fn verify_canonical(
    case: &AssuranceCase,
    tracker: &DependencyTracker,
    canonical_data: &[u8],
) -> Result<bool, AttestError> {
    let (imported_case, imported_tracker) = import_canonical(canonical_data)?;
    let ours = export_case(case, tracker);
    let theirs = export_case(&imported_case, &imported_tracker);
    Ok(ours == theirs)
}

/// Checksum of a case's canonical structure, for quick equality checks.
#[must_use]
pub fn canonical_checksum(case: &AssuranceCase, tracker: &DependencyTracker) -> u64 {
    export_case(case, tracker).checksum()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencyRelation;
    use crate::fragment::FragmentBuilder;
    use crate::{
        Confidence, Defeater, DefeaterId, DefeaterKind, DefeaterTarget, EdgeKind, NodeKind,
    };

    fn sample() -> (AssuranceCase, DependencyTracker) {
        let mut case = AssuranceCase::new("c1", "Export sample");
        case.graph_mut()
            .add_node(ArgumentNode::new(
                NodeId::new("G1"),
                NodeKind::Goal,
                "System is safe",
            ))
            .expect("add");
        case.graph_mut()
            .add_node(
                ArgumentNode::new(NodeId::new("Sn1"), NodeKind::Solution, "Test report")
                    .with_confidence(Confidence::new(0.8)),
            )
            .expect("add");
        let edge = case
            .graph_mut()
            .add_edge(
                &NodeId::new("Sn1"),
                &NodeId::new("G1"),
                EdgeKind::Supports,
                Confidence::new(0.9),
            )
            .expect("edge");
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(edge),
            DefeaterKind::Undermining,
            Confidence::new(0.4),
        ))
        .expect("defeater");

        let mut tracker = DependencyTracker::new();
        tracker
            .add_dependency(NodeId::new("G1"), NodeId::new("Sn1"), DependencyRelation::Requires)
            .expect("dep");
        (case, tracker)
    }

    #[test]
    fn neutral_roundtrip_preserves_sets() {
        let (case, tracker) = sample();
        let neutral = export_case(&case, &tracker);
        let (restored_case, restored_tracker) = import_case(&neutral).expect("import");

        assert_eq!(restored_case.graph().node_count(), 2);
        assert_eq!(restored_case.graph().edge_count(), 1);
        assert_eq!(restored_case.defeaters().count(), 1);
        assert_eq!(restored_tracker.dependency_count(), 1);
        assert_eq!(export_case(&restored_case, &restored_tracker), neutral);
    }

    #[test]
    fn neutral_structure_is_json_compatible() {
        let (case, tracker) = sample();
        let neutral = export_case(&case, &tracker);

        let json = serde_json::to_string(&neutral).expect("to json");
        let back: NeutralCase = serde_json::from_str(&json).expect("from json");
        assert_eq!(back, neutral);
    }

    #[test]
    fn canonical_roundtrip() {
        let (case, tracker) = sample();
        let bytes = export_canonical(&case, &tracker).expect("export");
        let (restored_case, restored_tracker) = import_canonical(&bytes).expect("import");

        assert!(
            verify_canonical(&restored_case, &restored_tracker, &bytes).expect("verify")
        );
        assert_eq!(
            canonical_checksum(&case, &tracker),
            canonical_checksum(&restored_case, &restored_tracker)
        );
    }

    #[test]
    fn canonical_export_is_deterministic() {
        let (case, tracker) = sample();
        let first = export_canonical(&case, &tracker).expect("export");
        let second = export_canonical(&case, &tracker).expect("export");
        assert_eq!(first, second);
    }

    #[test]
    fn corrupted_bytes_fail_import() {
        let (case, tracker) = sample();
        let mut bytes = export_canonical(&case, &tracker).expect("export");
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        assert!(import_canonical(&bytes).is_err());
    }

    #[test]
    fn truncated_bytes_fail_import() {
        assert!(import_canonical(&[1, 2]).is_err());
    }

    #[test]
    fn wrong_magic_rejected() {
        let header = CanonicalHeader {
            magic: *b"NOPE",
            version: CANONICAL_VERSION,
            node_count: 0,
            edge_count: 0,
            checksum: 0,
        };
        assert!(header.validate().is_err());
    }

    #[test]
    fn import_rejects_dangling_edge() {
        let (case, tracker) = sample();
        let mut neutral = export_case(&case, &tracker);
        neutral.edges[0].to = NodeId::new("ghost");

        assert!(matches!(
            import_case(&neutral),
            Err(AttestError::Validation(_))
        ));
    }

    #[test]
    fn import_rejects_duplicate_node_ids() {
        let (case, tracker) = sample();
        let mut neutral = export_case(&case, &tracker);
        let duplicate = neutral.nodes[0].clone();
        neutral.nodes.push(duplicate);

        assert!(matches!(
            import_case(&neutral),
            Err(AttestError::Validation(_))
        ));
    }

    #[test]
    fn fragment_roundtrip_keeps_ports() {
        let fragment = FragmentBuilder::new("frag_a")
            .goal("G1", "claim")
            .port("G1")
            .publish()
            .expect("publish");

        let neutral = export_fragment(&fragment);
        let restored = import_fragment(&neutral).expect("import");
        assert_eq!(restored.name(), "frag_a");
        assert_eq!(restored.ports(), &[NodeId::new("G1")]);
    }

    #[test]
    fn edge_ids_survive_roundtrip_for_defeater_targets() {
        let (case, tracker) = sample();
        let neutral = export_case(&case, &tracker);
        let (restored, _) = import_case(&neutral).expect("import");

        let defeater = restored.defeaters().next().expect("defeater");
        let DefeaterTarget::Edge(edge_id) = &defeater.target else {
            unreachable!("sample defeater targets an edge");
        };
        let edge = restored.graph().edge(*edge_id).expect("edge");
        assert_eq!(edge.from, NodeId::new("Sn1"));
    }
}
