//! # Scenario Tests
//!
//! End-to-end walks across the engines: script-driven composition, query
//! selection over reasoned state, defeater propagation, and canonical
//! round-trips.

use attest_core::{
    ArgumentNode, AssuranceCase, Confidence, Defeater, DefeaterId, DefeaterKind, DefeaterTarget,
    EdgeId, EdgeKind, EvalContext, EvaluatorRegistry, EvidenceProvider, FragmentBuilder,
    Interpreter, NodeId, NodeKind, QueryEngine, Reasoner, ReasoningBudget, Session,
};
use std::collections::BTreeMap;

/// In-memory evidence store fake.
struct FakeEvidence {
    items: BTreeMap<String, String>,
}

impl FakeEvidence {
    fn empty() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl EvidenceProvider for FakeEvidence {
    fn evidence_exists(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    fn evidence_checksum(&self, id: &str) -> String {
        self.items.get(id).cloned().unwrap_or_default()
    }
}

fn reason(case: &mut AssuranceCase) {
    Reasoner::run(
        case,
        &EvaluatorRegistry::new(),
        &EvalContext::new(),
        ReasoningBudget::default(),
    )
    .expect("reasoning");
}

/// Goal G1 supported by S1 (0.9) and S2 (0.1); returns S1's support edge.
fn weakest_link_case() -> (AssuranceCase, EdgeId) {
    let mut case = AssuranceCase::new("c1", "Weakest link");
    case.graph_mut()
        .add_node(ArgumentNode::new(
            NodeId::new("G1"),
            NodeKind::Goal,
            "System is acceptably safe",
        ))
        .expect("add");
    case.graph_mut()
        .add_node(
            ArgumentNode::new(NodeId::new("S1"), NodeKind::Strategy, "Argue over testing")
                .with_confidence(Confidence::new(0.9)),
        )
        .expect("add");
    case.graph_mut()
        .add_node(
            ArgumentNode::new(NodeId::new("S2"), NodeKind::Strategy, "Argue over review")
                .with_confidence(Confidence::new(0.1)),
        )
        .expect("add");
    let s1_edge = case
        .graph_mut()
        .add_edge(
            &NodeId::new("S1"),
            &NodeId::new("G1"),
            EdgeKind::Supports,
            Confidence::FULL,
        )
        .expect("edge");
    case.graph_mut()
        .add_edge(
            &NodeId::new("S2"),
            &NodeId::new("G1"),
            EdgeKind::Supports,
            Confidence::FULL,
        )
        .expect("edge");
    (case, s1_edge)
}

// =============================================================================
// SCRIPT-DRIVEN COMPOSITION
// =============================================================================

#[test]
fn compose_link_validate_produces_three_entry_log() {
    let mut session = Session::new();
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_a")
                .goal("goal_g1", "Component A meets its requirements")
                .port("goal_g1")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_b")
                .goal("goal_g2", "Component B meets its requirements")
                .port("goal_g2")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");

    let script = "\
compose fragment_a with fragment_b as combined_case
link evidence_001 to goal_g1 in combined_case
validate combined_case
";
    let report = Interpreter::execute(&mut session, script);

    assert!(report.succeeded(), "error: {:?}", report.error);
    assert_eq!(report.log.len(), 3);

    // Entry 2 produced an EVIDENCE edge from evidence_001 to goal_g1.
    let case = session.case("combined_case").expect("case");
    let edge = case
        .graph()
        .edges()
        .find(|e| e.kind == EdgeKind::Evidence)
        .expect("evidence edge");
    assert_eq!(edge.from, NodeId::new("evidence_001"));
    assert_eq!(edge.to, NodeId::new("goal_g1"));

    // Entry 3 returned an issue list without raising.
    assert_eq!(report.validations.len(), 1);
    assert!(report.log[2].success);
}

#[test]
fn composed_case_survives_canonical_roundtrip() {
    let mut session = Session::new();
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_a")
                .goal("goal_g1", "claim a")
                .port("goal_g1")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_b")
                .goal("goal_g2", "claim b")
                .port("goal_g2")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");

    let report = Interpreter::execute(
        &mut session,
        "compose fragment_a with fragment_b as combined",
    );
    assert!(report.succeeded());

    let case = session.case("combined").expect("case");
    let bytes = attest_core::export_canonical(case, session.tracker()).expect("export");
    let (restored, _) = attest_core::import_canonical(&bytes).expect("import");

    assert_eq!(restored.graph().node_count(), case.graph().node_count());
    assert_eq!(restored.graph().node_order(), case.graph().node_order());
}

// =============================================================================
// REASONING OVER COMPOSED STATE
// =============================================================================

#[test]
fn rebutting_defeater_drives_goal_to_surviving_support() {
    let (mut case, s1_edge) = weakest_link_case();
    reason(&mut case);
    // Weakest link before the attack.
    let g1 = case.graph().node(&NodeId::new("G1")).expect("node");
    assert!((g1.confidence.value() - 0.1).abs() < 1e-9);

    case.add_defeater(Defeater::new(
        DefeaterId::new("D1"),
        DefeaterTarget::Edge(s1_edge),
        DefeaterKind::Rebutting,
        Confidence::FULL,
    ))
    .expect("defeater");
    reason(&mut case);

    // G1 falls to the value contributable by S2 alone.
    let g1 = case.graph().node(&NodeId::new("G1")).expect("node");
    assert!((g1.confidence.value() - 0.1).abs() < 1e-9);

    let found = Reasoner::find_defeaters(&case, &NodeId::new("G1"));
    assert!(found.iter().any(|d| d.id == DefeaterId::new("D1")));
}

#[test]
fn repeated_reasoning_is_stable() {
    let (mut case, _) = weakest_link_case();
    reason(&mut case);
    let snapshot: Vec<f64> = case
        .graph()
        .nodes()
        .map(|n| n.confidence.value())
        .collect();

    for _ in 0..3 {
        reason(&mut case);
    }
    let after: Vec<f64> = case
        .graph()
        .nodes()
        .map(|n| n.confidence.value())
        .collect();
    assert_eq!(snapshot, after);
}

// =============================================================================
// QUERIES OVER REASONED STATE
// =============================================================================

#[test]
fn query_selects_weak_underevidenced_strategies() {
    let mut session = Session::new();
    let (case, _) = weakest_link_case();
    session.bind_case("case", case);

    // Attach two evidence solutions under S1 so it is well-evidenced.
    {
        let case = session.case_mut("case").expect("case");
        for ev in ["ev_1", "ev_2"] {
            case.graph_mut()
                .add_node(ArgumentNode::new(
                    NodeId::new(ev),
                    NodeKind::Solution,
                    format!("evidence {ev}"),
                ))
                .expect("add");
            case.graph_mut()
                .add_edge(
                    &NodeId::new(ev),
                    &NodeId::new("S1"),
                    EdgeKind::Evidence,
                    Confidence::FULL,
                )
                .expect("edge");
        }
    }

    let result = QueryEngine::execute(
        &session,
        &FakeEvidence::empty(),
        "SELECT strategies FROM case WHERE evidence_count < 2 AND confidence < 0.7",
    )
    .expect("query");

    // S1 fails the evidence_count condition, S2 satisfies both.
    assert_eq!(result.ids(), vec!["S2"]);
}

#[test]
fn query_confidence_reflects_reasoned_values() {
    let mut session = Session::new();
    let (mut case, _) = weakest_link_case();
    reason(&mut case);
    session.bind_case("case", case);

    // G1's propagated confidence is 0.1 under the weakest-link rule.
    let result = QueryEngine::execute(
        &session,
        &FakeEvidence::empty(),
        "SELECT goals FROM case WHERE confidence < 0.2",
    )
    .expect("query");
    assert_eq!(result.ids(), vec!["G1"]);
}

// =============================================================================
// TRANSFORMATION / ANALYSIS INTERPLAY
// =============================================================================

#[test]
fn decompose_then_reason_propagates_through_subgoals() {
    let mut session = Session::new();
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_a")
                .goal("goal_g1", "top claim")
                .port("goal_g1")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");
    session
        .publish_fragment(
            FragmentBuilder::new("fragment_b")
                .goal("goal_g2", "side claim")
                .port("goal_g2")
                .publish()
                .expect("publish"),
        )
        .expect("session publish");

    let script = "\
compose fragment_a with fragment_b as c
decompose goal_g1 into [g1_a, g1_b] in c
link evidence_001 to g1_a in c
";
    let report = Interpreter::execute(&mut session, script);
    assert!(report.succeeded(), "error: {:?}", report.error);

    let case = session.case_mut("c").expect("case");
    // Pin the sub-goal bases so propagation is visible.
    case.graph_mut()
        .node_mut(&NodeId::new("g1_b"))
        .expect("node")
        .confidence = Confidence::new(0.6);
    reason(case);

    // goal_g1 takes the weakest of its sub-goals: g1_a is backed by
    // assumed evidence (1.0), g1_b carries 0.6.
    let g1 = case.graph().node(&NodeId::new("goal_g1")).expect("node");
    assert!((g1.confidence.value() - 0.6).abs() < 1e-9);
}

#[test]
fn session_isolation_between_cases() {
    let mut session = Session::new();
    let (case_a, _) = weakest_link_case();
    let (case_b, _) = weakest_link_case();
    session.bind_case("a", case_a);
    session.bind_case("b", case_b);

    // Mutating case a never touches case b.
    session
        .case_mut("a")
        .expect("case")
        .graph_mut()
        .remove_node(&NodeId::new("S2"))
        .expect("remove");

    assert_eq!(session.case("a").expect("case").graph().node_count(), 2);
    assert_eq!(session.case("b").expect("case").graph().node_count(), 3);
}
