//! # Confidence Reasoner
//!
//! Fixed-order propagation passes run to a fixpoint over an assurance case:
//!
//! 1. **Structural**: weakest-link — a non-leaf takes the minimum over its
//!    children's live contributions; a required slot with no live
//!    contribution forces 0. Leaves keep their externally supplied base.
//! 2. **Behavioral**: an optional registered evaluator may override the
//!    factor applied to a node.
//! 3. **Probabilistic**: final = structural x behavioral factor, clamped.
//! 4. **Defeater**: rebutting pins a targeted node to 0; undermining
//!    discounts the targeted edge's weight by severity; undercutting zeroes
//!    the edge's weight without removing it. Zero-weight edges are excluded
//!    from aggregation, so an attack on an edge removes that child's
//!    contribution rather than dragging the minimum to 0.
//!
//! The fixpoint is bounded: exhausting the iteration budget without
//! convergence returns `BudgetExceeded`. Logical findings come back as an
//! `Issue` list, never as errors.
//!
//! A run consumes each leaf's current confidence as its base and writes
//! the propagated values back. Without evaluators a rerun on an unchanged
//! graph is a no-op; with an evaluator bound, the factor applies to the
//! written-back value on each run, so callers re-running with evaluators
//! should reset bases first or treat `ReasoningOutcome::confidence` as
//! the result of record.

use crate::case::AssuranceCase;
use crate::{
    ArgumentNode, AttestError, Confidence, Defeater, DefeaterKind, DefeaterTarget, EdgeId,
    EdgeKind, Issue, IssueKind, NodeId, NodeKind, NodeStatus,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// External context handed to behavioral evaluators.
pub type EvalContext = BTreeMap<String, f64>;

/// A pure behavioral evaluator: node plus external context in, factor out.
pub type EvaluatorFn = Box<dyn Fn(&ArgumentNode, &EvalContext) -> f64>;

/// Named-function registry injected per reasoning run, keyed by node id.
///
/// There is no process-wide registry; callers build one, pass it in, and
/// drop it.
#[derive(Default)]
pub struct EvaluatorRegistry {
    evaluators: BTreeMap<NodeId, EvaluatorFn>,
}

impl EvaluatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an evaluator for a node id, replacing any previous one.
    pub fn register(
        &mut self,
        node: NodeId,
        evaluator: impl Fn(&ArgumentNode, &EvalContext) -> f64 + 'static,
    ) {
        self.evaluators.insert(node, Box::new(evaluator));
    }

    /// The evaluator bound to a node, if any.
    #[must_use]
    pub fn get(&self, node: &NodeId) -> Option<&EvaluatorFn> {
        self.evaluators.get(node)
    }

    /// Number of registered evaluators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// True iff no evaluators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("nodes", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Iteration budget for a reasoning run.
///
/// With no explicit cap, the run is bounded by the graph's node count plus
/// one pass to observe convergence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasoningBudget {
    /// Explicit iteration cap, if any.
    pub max_iterations: Option<usize>,
}

impl ReasoningBudget {
    /// Budget with an explicit iteration cap.
    #[must_use]
    pub const fn iterations(cap: usize) -> Self {
        Self {
            max_iterations: Some(cap),
        }
    }

    fn cap_for(&self, node_count: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| node_count.saturating_add(1).max(1))
    }
}

/// Result of a reasoning run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningOutcome {
    /// Propagated confidence per node.
    pub confidence: BTreeMap<NodeId, Confidence>,
    /// Logical findings, in node insertion order per category sweep.
    pub issues: Vec<Issue>,
    /// Passes executed before the fixpoint was observed.
    pub iterations: usize,
}

/// Risk band derived from a reasoning outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Risk score below 0.4.
    Low,
    /// Risk score in [0.4, 0.7).
    Medium,
    /// Risk score at or above 0.7.
    High,
}

/// Risk estimate over a reasoned case.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskEstimate {
    /// Risk score in [0, 1]; higher is worse.
    pub score: Confidence,
    /// Banded risk level.
    pub level: RiskLevel,
    /// Active defeaters that contributed to the score.
    pub active_defeaters: usize,
}

/// The confidence propagation engine.
pub struct Reasoner;

impl Reasoner {
    /// Run all passes to a fixpoint and write propagated confidences back
    /// into the case.
    ///
    /// Returns `BudgetExceeded` when the iteration cap is exhausted before
    /// two consecutive passes agree.
    pub fn run(
        case: &mut AssuranceCase,
        evaluators: &EvaluatorRegistry,
        context: &EvalContext,
        budget: ReasoningBudget,
    ) -> Result<ReasoningOutcome, AttestError> {
        let node_count = case.graph().node_count();
        let cap = budget.cap_for(node_count);

        let effective = Self::effective_weights(case);
        let rebutted = Self::rebutted_nodes(case);

        // Base values are whatever the nodes carried coming in; leaves keep
        // them across runs, which is what makes rerunning a fixpoint no-op.
        let mut values: BTreeMap<NodeId, f64> = case
            .graph()
            .nodes()
            .map(|n| (n.id.clone(), n.confidence.value()))
            .collect();
        let order: Vec<NodeId> = case.graph().node_order().to_vec();

        let mut iterations = 0;
        let mut converged = node_count == 0;
        while iterations < cap && !converged {
            iterations += 1;
            let mut changed = false;

            for id in &order {
                let Some(node) = case.graph().node(id) else {
                    continue;
                };

                // Pass 1: structural (weakest link over live contributions).
                let child_edges = case.graph().child_edges(id);
                let structural = if child_edges.is_empty() {
                    node.confidence.value()
                } else {
                    let mut minimum: Option<f64> = None;
                    for edge in &child_edges {
                        let weight = effective.get(&edge.id).copied().unwrap_or(0.0);
                        if weight == 0.0 {
                            continue;
                        }
                        let child = case.graph().child_of_edge(edge, id);
                        let contribution = values.get(child).copied().unwrap_or(0.0) * weight;
                        minimum = Some(match minimum {
                            Some(m) => m.min(contribution),
                            None => contribution,
                        });
                    }
                    // Every contribution dead means the required slot is
                    // unfilled.
                    minimum.unwrap_or(0.0)
                };

                // Pass 2: behavioral override, if an evaluator is bound.
                let factor = evaluators
                    .get(id)
                    .map_or(1.0, |f| f(node, context).clamp(0.0, 1.0));

                // Pass 3: probabilistic combination.
                let mut value = Confidence::new(structural * factor).value();

                // Pass 4: rebutting defeaters pin the node to zero.
                if rebutted.contains(id) {
                    value = 0.0;
                }

                let previous = values.get(id).copied().unwrap_or(0.0);
                if previous != value {
                    changed = true;
                    values.insert(id.clone(), value);
                }
            }

            debug!(iteration = iterations, changed, "reasoning pass complete");
            converged = !changed;
        }

        if !converged {
            warn!(iterations, "reasoning fixpoint not reached within budget");
            return Err(AttestError::BudgetExceeded { iterations });
        }

        // Write propagated values back; the reasoner owns this field.
        let confidence: BTreeMap<NodeId, Confidence> = values
            .iter()
            .map(|(id, v)| (id.clone(), Confidence::new(*v)))
            .collect();
        for (id, value) in &confidence {
            if let Some(node) = case.graph_mut().node_mut(id) {
                node.confidence = *value;
            }
        }

        let issues = Self::collect_issues(case, &effective, &rebutted);
        Ok(ReasoningOutcome {
            confidence,
            issues,
            iterations,
        })
    }

    /// Defeaters on the node itself plus defeaters on any support edge
    /// whose contribution flows into the node.
    #[must_use]
    pub fn find_defeaters<'a>(case: &'a AssuranceCase, node: &NodeId) -> Vec<&'a Defeater> {
        let closure = case.graph().support_closure(node);
        case.defeaters()
            .filter(|d| match &d.target {
                DefeaterTarget::Node(n) => n == node,
                DefeaterTarget::Edge(e) => case
                    .graph()
                    .edge(*e)
                    .is_some_and(|edge| closure.contains(&edge.to)),
            })
            .collect()
    }

    /// Risk estimate over a reasoned case: the inverse of the weakest root
    /// goal's confidence, bumped by active defeater severities.
    #[must_use]
    pub fn estimate_risk(case: &AssuranceCase) -> RiskEstimate {
        let roots = case.graph().root_goals();
        let weakest_root = roots
            .iter()
            .filter_map(|r| case.graph().node(r))
            .map(|n| n.confidence.value())
            .fold(None::<f64>, |acc, v| {
                Some(acc.map_or(v, |m: f64| m.min(v)))
            });

        let mut score = 1.0 - weakest_root.unwrap_or(0.0);
        let mut active = 0;
        for defeater in case.defeaters().filter(|d| d.is_active()) {
            active += 1;
            if defeater.severity.value() >= 0.8 {
                score += 0.3;
            } else if defeater.severity.value() >= 0.5 {
                score += 0.15;
            }
        }
        let score = Confidence::new(score);
        let level = if score.value() >= 0.7 {
            RiskLevel::High
        } else if score.value() >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        RiskEstimate {
            score,
            level,
            active_defeaters: active,
        }
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Per-edge weights after applying active edge-targeted defeaters.
    fn effective_weights(case: &AssuranceCase) -> BTreeMap<EdgeId, f64> {
        let mut weights: BTreeMap<EdgeId, f64> = case
            .graph()
            .edges()
            .map(|e| (e.id, e.weight.value()))
            .collect();
        for defeater in case.defeaters().filter(|d| d.is_active()) {
            let DefeaterTarget::Edge(edge) = &defeater.target else {
                continue;
            };
            let Some(weight) = weights.get_mut(edge) else {
                continue;
            };
            match defeater.kind {
                DefeaterKind::Rebutting | DefeaterKind::Undercutting => *weight = 0.0,
                DefeaterKind::Undermining => {
                    *weight *= 1.0 - defeater.severity.value();
                }
            }
        }
        weights
    }

    /// Nodes pinned to zero by an active rebutting defeater.
    fn rebutted_nodes(case: &AssuranceCase) -> BTreeSet<NodeId> {
        case.defeaters()
            .filter(|d| d.is_active() && d.kind == DefeaterKind::Rebutting)
            .filter_map(|d| match &d.target {
                DefeaterTarget::Node(n) => Some(n.clone()),
                DefeaterTarget::Edge(_) => None,
            })
            .collect()
    }

    /// Logical findings over the reasoned case.
    fn collect_issues(
        case: &AssuranceCase,
        effective: &BTreeMap<EdgeId, f64>,
        rebutted: &BTreeSet<NodeId>,
    ) -> Vec<Issue> {
        let mut issues = Vec::new();

        // INCOMPLETE / UNSUPPORTED sweeps, in insertion order.
        for node in case.graph().nodes() {
            let child_edges = case.graph().child_edges(&node.id);
            let live = child_edges
                .iter()
                .filter(|e| effective.get(&e.id).copied().unwrap_or(0.0) > 0.0)
                .count();

            match node.kind {
                NodeKind::Goal => {
                    if node.status != NodeStatus::Assumed
                        && (child_edges.is_empty() || live == 0)
                    {
                        issues.push(Issue::new(
                            IssueKind::Incomplete,
                            node.id.clone(),
                            "goal has no live supporting argument",
                        ));
                    }
                }
                NodeKind::Strategy => {
                    if !child_edges.is_empty() && live == 0 {
                        issues.push(Issue::new(
                            IssueKind::Incomplete,
                            node.id.clone(),
                            "all sub-goal contributions are defeated",
                        ));
                    }
                }
                NodeKind::Solution => {
                    let evidence = child_edges
                        .iter()
                        .filter(|e| e.kind == EdgeKind::Evidence)
                        .count();
                    if node.required_evidence > 0 && evidence == 0 {
                        issues.push(Issue::new(
                            IssueKind::Unsupported,
                            node.id.clone(),
                            format!(
                                "solution requires {} evidence links, none present",
                                node.required_evidence
                            ),
                        ));
                    }
                }
                NodeKind::Context | NodeKind::Assumption | NodeKind::Justification => {}
            }
        }

        // INCONSISTENT: contradiction tags between active sibling
        // strategies under the same goal.
        for goal in case.graph().nodes_by_kind(NodeKind::Goal) {
            let siblings: Vec<&ArgumentNode> = case
                .graph()
                .get_children(&goal.id, EdgeKind::Supports)
                .iter()
                .filter_map(|id| case.graph().node(id))
                .filter(|n| n.kind == NodeKind::Strategy && !rebutted.contains(&n.id))
                .collect();
            for (i, s1) in siblings.iter().enumerate() {
                for s2 in siblings.iter().skip(i + 1) {
                    if s1.contradicts.contains(&s2.id) || s2.contradicts.contains(&s1.id) {
                        issues.push(Issue::new(
                            IssueKind::Inconsistent,
                            goal.id.clone(),
                            format!(
                                "strategies {} and {} assert contradictory claims",
                                s1.id, s2.id
                            ),
                        ));
                    }
                }
            }
        }

        // DEFEATED: rebutted nodes, plus targets of defeated edges.
        for node in case.graph().nodes() {
            if rebutted.contains(&node.id) {
                issues.push(Issue::new(
                    IssueKind::Defeated,
                    node.id.clone(),
                    "claim is rebutted by an active defeater",
                ));
            }
        }
        for defeater in case.defeaters().filter(|d| d.is_active()) {
            if let DefeaterTarget::Edge(edge_id) = &defeater.target {
                if let Some(edge) = case.graph().edge(*edge_id) {
                    issues.push(Issue::new(
                        IssueKind::Defeated,
                        edge.to.clone(),
                        format!(
                            "support edge from {} is attacked by defeater {}",
                            edge.from,
                            defeater.id.as_str()
                        ),
                    ));
                }
            }
        }

        issues
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Defeater, DefeaterId};

    fn run(case: &mut AssuranceCase) -> ReasoningOutcome {
        Reasoner::run(
            case,
            &EvaluatorRegistry::new(),
            &EvalContext::new(),
            ReasoningBudget::default(),
        )
        .expect("reasoning")
    }

    fn node(id: &str, kind: NodeKind, confidence: f64) -> ArgumentNode {
        ArgumentNode::new(NodeId::new(id), kind, format!("{kind:?} {id}"))
            .with_confidence(Confidence::new(confidence))
    }

    /// G1 supported by strategies S1 (0.9) and S2 (0.1).
    fn weakest_link_case() -> (AssuranceCase, EdgeId) {
        let mut case = AssuranceCase::new("case_1", "Weakest link");
        case.graph_mut()
            .add_node(node("G1", NodeKind::Goal, 1.0))
            .expect("add");
        case.graph_mut()
            .add_node(node("S1", NodeKind::Strategy, 0.9))
            .expect("add");
        case.graph_mut()
            .add_node(node("S2", NodeKind::Strategy, 0.1))
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

    #[test]
    fn leaf_solution_keeps_base_value() {
        let mut case = AssuranceCase::new("case_1", "Leaf");
        case.graph_mut()
            .add_node(node("Sn1", NodeKind::Solution, 0.75))
            .expect("add");

        let outcome = run(&mut case);
        assert_eq!(
            outcome.confidence.get(&NodeId::new("Sn1")),
            Some(&Confidence::new(0.75))
        );
    }

    #[test]
    fn rerun_is_a_fixpoint() {
        let (mut case, _) = weakest_link_case();
        let first = run(&mut case);
        let second = run(&mut case);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn weakest_link_takes_minimum() {
        let (mut case, _) = weakest_link_case();
        let outcome = run(&mut case);

        let g1 = outcome
            .confidence
            .get(&NodeId::new("G1"))
            .expect("confidence");
        assert!((g1.value() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn rebutting_edge_defeater_excludes_contribution() {
        let (mut case, s1_edge) = weakest_link_case();
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(s1_edge),
            DefeaterKind::Rebutting,
            Confidence::FULL,
        ))
        .expect("defeater");

        let outcome = run(&mut case);

        // With S1's support cut, G1 falls to what S2 alone contributes.
        let g1 = outcome
            .confidence
            .get(&NodeId::new("G1"))
            .expect("confidence");
        assert!((g1.value() - 0.1).abs() < 1e-9);

        let found = Reasoner::find_defeaters(&case, &NodeId::new("G1"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, DefeaterId::new("D1"));
    }

    #[test]
    fn rebutting_node_defeater_zeroes_and_propagates() {
        let (mut case, _) = weakest_link_case();
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Node(NodeId::new("S2")),
            DefeaterKind::Rebutting,
            Confidence::FULL,
        ))
        .expect("defeater");

        let outcome = run(&mut case);

        // The rebutted node contributes an explicit zero.
        assert!(
            outcome
                .confidence
                .get(&NodeId::new("S2"))
                .expect("confidence")
                .is_zero()
        );
        assert!(
            outcome
                .confidence
                .get(&NodeId::new("G1"))
                .expect("confidence")
                .is_zero()
        );
        assert!(
            outcome
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::Defeated && i.node == NodeId::new("S2"))
        );
    }

    #[test]
    fn undermining_discounts_edge_weight() {
        let (mut case, s1_edge) = weakest_link_case();
        // Remove S2 so the minimum tracks S1's discounted contribution.
        case.graph_mut()
            .remove_node(&NodeId::new("S2"))
            .expect("remove");
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(s1_edge),
            DefeaterKind::Undermining,
            Confidence::new(0.5),
        ))
        .expect("defeater");

        let outcome = run(&mut case);
        let g1 = outcome
            .confidence
            .get(&NodeId::new("G1"))
            .expect("confidence");
        assert!((g1.value() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn all_support_defeated_forces_zero() {
        let (mut case, s1_edge) = weakest_link_case();
        case.graph_mut()
            .remove_node(&NodeId::new("S2"))
            .expect("remove");
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(s1_edge),
            DefeaterKind::Undercutting,
            Confidence::FULL,
        ))
        .expect("defeater");

        let outcome = run(&mut case);
        assert!(
            outcome
                .confidence
                .get(&NodeId::new("G1"))
                .expect("confidence")
                .is_zero()
        );
        assert!(
            outcome
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::Incomplete && i.node == NodeId::new("G1"))
        );
    }

    #[test]
    fn resolved_defeater_has_no_effect() {
        let (mut case, s1_edge) = weakest_link_case();
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(s1_edge),
            DefeaterKind::Undercutting,
            Confidence::FULL,
        ))
        .expect("defeater");
        case.resolve_defeater(&DefeaterId::new("D1")).expect("resolve");

        let outcome = run(&mut case);
        let g1 = outcome
            .confidence
            .get(&NodeId::new("G1"))
            .expect("confidence");
        assert!((g1.value() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn behavioral_evaluator_scales_confidence() {
        let mut case = AssuranceCase::new("case_1", "Behavioral");
        case.graph_mut()
            .add_node(node("Sn1", NodeKind::Solution, 0.8))
            .expect("add");

        let mut registry = EvaluatorRegistry::new();
        registry.register(NodeId::new("Sn1"), |_, ctx| {
            ctx.get("test_pass_rate").copied().unwrap_or(1.0)
        });
        let mut context = EvalContext::new();
        context.insert("test_pass_rate".to_string(), 0.5);

        let outcome = Reasoner::run(
            &mut case,
            &registry,
            &context,
            ReasoningBudget::default(),
        )
        .expect("reasoning");

        let sn1 = outcome
            .confidence
            .get(&NodeId::new("Sn1"))
            .expect("confidence");
        assert!((sn1.value() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn decaying_support_cycle_exhausts_budget() {
        let mut case = AssuranceCase::new("case_1", "Cycle");
        case.graph_mut()
            .add_node(node("G1", NodeKind::Goal, 1.0))
            .expect("add");
        case.graph_mut()
            .add_node(node("G2", NodeKind::Goal, 1.0))
            .expect("add");
        case.graph_mut()
            .add_edge(
                &NodeId::new("G1"),
                &NodeId::new("G2"),
                EdgeKind::Supports,
                Confidence::new(0.5),
            )
            .expect("edge");
        case.graph_mut()
            .add_edge(
                &NodeId::new("G2"),
                &NodeId::new("G1"),
                EdgeKind::Supports,
                Confidence::new(0.5),
            )
            .expect("edge");

        let result = Reasoner::run(
            &mut case,
            &EvaluatorRegistry::new(),
            &EvalContext::new(),
            ReasoningBudget::iterations(5),
        );
        assert!(matches!(result, Err(AttestError::BudgetExceeded { .. })));
    }

    #[test]
    fn undercut_support_cycle_converges() {
        let mut case = AssuranceCase::new("case_1", "Cut cycle");
        case.graph_mut()
            .add_node(node("G1", NodeKind::Goal, 1.0))
            .expect("add");
        case.graph_mut()
            .add_node(node("G2", NodeKind::Goal, 1.0))
            .expect("add");
        let cycle_edge = case
            .graph_mut()
            .add_edge(
                &NodeId::new("G1"),
                &NodeId::new("G2"),
                EdgeKind::Supports,
                Confidence::new(0.5),
            )
            .expect("edge");
        case.graph_mut()
            .add_edge(
                &NodeId::new("G2"),
                &NodeId::new("G1"),
                EdgeKind::Supports,
                Confidence::new(0.5),
            )
            .expect("edge");
        case.add_defeater(Defeater::new(
            DefeaterId::new("D1"),
            DefeaterTarget::Edge(cycle_edge),
            DefeaterKind::Undercutting,
            Confidence::FULL,
        ))
        .expect("defeater");

        let outcome = run(&mut case);
        // Breaking one direction of the cycle lets both sides settle at 0.
        assert!(
            outcome
                .confidence
                .get(&NodeId::new("G2"))
                .expect("confidence")
                .is_zero()
        );
    }

    #[test]
    fn inconsistent_sibling_strategies_reported() {
        let mut case = AssuranceCase::new("case_1", "Contradiction");
        case.graph_mut()
            .add_node(node("G1", NodeKind::Goal, 1.0))
            .expect("add");
        case.graph_mut()
            .add_node(
                node("S1", NodeKind::Strategy, 0.9).contradicting(NodeId::new("S2")),
            )
            .expect("add");
        case.graph_mut()
            .add_node(node("S2", NodeKind::Strategy, 0.8))
            .expect("add");
        for s in ["S1", "S2"] {
            case.graph_mut()
                .add_edge(
                    &NodeId::new(s),
                    &NodeId::new("G1"),
                    EdgeKind::Supports,
                    Confidence::FULL,
                )
                .expect("edge");
        }

        let outcome = run(&mut case);
        assert!(
            outcome
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::Inconsistent && i.node == NodeId::new("G1"))
        );
    }

    #[test]
    fn risk_estimate_tracks_root_confidence() {
        let (mut case, _) = weakest_link_case();
        run(&mut case);

        let risk = Reasoner::estimate_risk(&case);
        assert_eq!(risk.level, RiskLevel::High);
        assert!((risk.score.value() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn empty_case_reasons_trivially() {
        let mut case = AssuranceCase::new("case_1", "Empty");
        let outcome = run(&mut case);
        assert!(outcome.confidence.is_empty());
        assert!(outcome.issues.is_empty());
    }
}
