//! # Core Type Definitions
//!
//! This module contains all core types for the Attest argument substrate:
//! - Identifiers (`NodeId`, `EdgeId`, `DefeaterId`)
//! - Argument elements (`ArgumentNode`, `NodeKind`, `NodeStatus`)
//! - Typed relations (`Edge`, `EdgeKind`)
//! - Counter-arguments (`Defeater`, `DefeaterKind`, `DefeaterTarget`)
//! - Analysis findings (`Issue`, `IssueKind`)
//! - Error types (`AttestError`)
//! - The `EvidenceProvider` collaborator trait
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` where they serve as `BTreeMap`/`BTreeSet` keys
//! - Keep confidence and severity inside [0, 1] via the `Confidence` newtype
//! - Use saturating arithmetic for counters to prevent overflow

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of an argument element within a case.
///
/// Node ids are caller-chosen strings (`"G1"`, `"evidence_001"`) and are
/// unique within a case. Uniqueness is enforced by the graph store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a typed edge, assigned by the graph store in insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Stable identifier of a defeater.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DefeaterId(pub String);

impl DefeaterId {
    /// Create a defeater id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// CONFIDENCE
// =============================================================================

/// A confidence or weight value clamped to [0, 1].
///
/// Construction clamps out-of-range values (NaN collapses to 0), so every
/// `Confidence` in the system is a valid probability-like weight.
/// Deserialization goes through the same clamp, so imported data cannot
/// smuggle in out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Default)]
pub struct Confidence(f64);

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

impl Confidence {
    /// Zero confidence.
    pub const ZERO: Self = Self(0.0);

    /// Full confidence.
    pub const FULL: Self = Self(1.0);

    /// Create a confidence value, clamping into [0, 1].
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Multiply by a factor, clamped back into [0, 1].
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.0 * factor)
    }

    /// True iff the value is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

// =============================================================================
// ARGUMENT NODES
// =============================================================================

/// Kind of an argument element, following standard goal-structuring notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A claim the argument seeks to justify.
    Goal,
    /// An inference step decomposing or supporting a goal.
    Strategy,
    /// An evidence-backed leaf supporting a goal.
    Solution,
    /// Contextual information scoping the argument.
    Context,
    /// A condition accepted as true without evidence.
    Assumption,
    /// Rationale for a strategy choice.
    Justification,
}

impl NodeKind {
    /// Lowercase name used in structured records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Strategy => "strategy",
            Self::Solution => "solution",
            Self::Context => "context",
            Self::Assumption => "assumption",
            Self::Justification => "justification",
        }
    }
}

/// Development status of an argument element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Claim stated but not yet argued.
    #[default]
    Undeveloped,
    /// Claim with supporting structure attached.
    Developed,
    /// Claim accepted without supporting structure.
    Assumed,
}

impl NodeStatus {
    /// Lowercase name used in structured records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undeveloped => "undeveloped",
            Self::Developed => "developed",
            Self::Assumed => "assumed",
        }
    }
}

/// An argument element in the case graph.
///
/// `confidence` is the element's base value until a reasoning run replaces
/// it with the propagated value; the reasoner owns this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentNode {
    /// Stable, case-unique identifier.
    pub id: NodeId,
    /// Element kind.
    pub kind: NodeKind,
    /// Short claim or description text.
    pub title: String,
    /// Free-form rationale.
    pub rationale: String,
    /// Development status.
    pub status: NodeStatus,
    /// Base or propagated confidence.
    pub confidence: Confidence,
    /// Ids of elements whose claims this element contradicts.
    ///
    /// Consistency analysis treats two active sibling strategies as
    /// contradictory when either names the other here.
    pub contradicts: BTreeSet<NodeId>,
    /// Number of evidence links the element's argument pattern demands.
    pub required_evidence: u32,
}

impl ArgumentNode {
    /// Create a node with default status, full base confidence, and no
    /// evidence requirement.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            rationale: String::new(),
            status: NodeStatus::Undeveloped,
            confidence: Confidence::FULL,
            contradicts: BTreeSet::new(),
            required_evidence: 0,
        }
    }

    /// Set the base confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the rationale text.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Set the development status.
    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the required evidence count.
    #[must_use]
    pub fn with_required_evidence(mut self, count: u32) -> Self {
        self.required_evidence = count;
        self
    }

    /// Mark this element as contradicting another.
    #[must_use]
    pub fn contradicting(mut self, other: NodeId) -> Self {
        self.contradicts.insert(other);
        self
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// Typed relation between two argument elements.
///
/// Direction convention: supporting element points at the supported node
/// for `Supports`, `Evidence`, `Context`, and `Assumption`; a parent goal
/// points at its sub-goals for `Decomposes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Strategy or solution supporting a claim.
    Supports,
    /// Parent goal broken into an explicit sub-goal.
    Decomposes,
    /// Context attached to an element.
    Context,
    /// Evidence backing an element.
    Evidence,
    /// Assumption attached to an element.
    Assumption,
}

impl EdgeKind {
    /// Uppercase name used in structured records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supports => "SUPPORTS",
            Self::Decomposes => "DECOMPOSES",
            Self::Context => "CONTEXT",
            Self::Evidence => "EVIDENCE",
            Self::Assumption => "ASSUMPTION",
        }
    }
}

/// A directed, typed edge between two existing nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge identifier, assigned in insertion order.
    pub id: EdgeId,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Relation kind.
    pub kind: EdgeKind,
    /// Provenance/confidence weight.
    pub weight: Confidence,
    /// Checksum captured when an evidence link was notarized, if any.
    pub recorded_checksum: Option<String>,
}

// =============================================================================
// DEFEATERS
// =============================================================================

/// How a defeater attacks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeaterKind {
    /// Directly contradicts the claim: zeroes the target's contribution.
    Rebutting,
    /// Attacks the supporting evidence: discounts the edge weight by severity.
    Undermining,
    /// Attacks the inference: breaks the edge's weight to 0 without removal.
    Undercutting,
}

/// Whether a defeater currently applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefeaterStatus {
    /// The defeater applies during reasoning.
    #[default]
    Active,
    /// The defeater has been answered and is ignored.
    Resolved,
}

/// What a defeater attacks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefeaterTarget {
    /// A node's claim.
    Node(NodeId),
    /// A specific support edge.
    Edge(EdgeId),
}

/// A structured counter-argument against a node or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defeater {
    /// Stable identifier.
    pub id: DefeaterId,
    /// Node or edge under attack.
    pub target: DefeaterTarget,
    /// Attack mode.
    pub kind: DefeaterKind,
    /// Strength of the attack in [0, 1].
    pub severity: Confidence,
    /// Whether the defeater currently applies.
    pub status: DefeaterStatus,
}

impl Defeater {
    /// Create an active defeater.
    #[must_use]
    pub fn new(
        id: DefeaterId,
        target: DefeaterTarget,
        kind: DefeaterKind,
        severity: Confidence,
    ) -> Self {
        Self {
            id,
            target,
            kind,
            severity,
            status: DefeaterStatus::Active,
        }
    }

    /// True iff the defeater participates in reasoning.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DefeaterStatus::Active
    }
}

// =============================================================================
// ISSUES
// =============================================================================

/// Category of a logical finding.
///
/// Findings are returned as data, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Sibling strategies assert contradictory claims.
    Inconsistent,
    /// A required child slot of the argument pattern is unfilled.
    Incomplete,
    /// A solution lacks evidence links.
    Unsupported,
    /// An active defeater zeroed the element.
    Defeated,
}

/// A logical finding attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Finding category.
    pub kind: IssueKind,
    /// The node the finding is about.
    pub node: NodeId,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Create an issue.
    #[must_use]
    pub fn new(kind: IssueKind, node: NodeId, message: impl Into<String>) -> Self {
        Self {
            kind,
            node,
            message: message.into(),
        }
    }
}

// =============================================================================
// EVIDENCE COLLABORATOR
// =============================================================================

/// The evidence-store collaborator.
///
/// The core never fetches or stores evidence payloads; it only asks an
/// external store whether an item exists and what its current checksum is.
///
/// # Extension Point
///
/// This trait is intentionally defined without in-crate implementations
/// (tests use a local fake). Implementors should be stateless and pure.
pub trait EvidenceProvider {
    /// Whether the evidence item exists in the external store.
    fn evidence_exists(&self, id: &str) -> bool;

    /// The current checksum of the evidence item, empty if unknown.
    fn evidence_checksum(&self, id: &str) -> String;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the Attest core.
///
/// Logical findings (inconsistency, incompleteness, low confidence, cycles
/// found) are returned as data; only malformed input, invariant breaches,
/// and exhausted budgets surface here.
#[derive(Debug, Error)]
pub enum AttestError {
    /// Malformed ArgTL or ACQL syntax.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// What was wrong.
        message: String,
    },

    /// Unknown fragment or case identifier.
    #[error("unknown name: {0}")]
    Name(String),

    /// Structural invariant violation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown ACQL field or macro.
    #[error("query error: unknown token {0}")]
    Query(String),

    /// Iteration or time cap exhausted.
    #[error("budget exceeded after {iterations} iterations")]
    BudgetExceeded {
        /// Iterations completed before giving up.
        iterations: usize,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AttestError {
    /// Shorthand for a parse error.
    #[must_use]
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Shorthand for a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// =============================================================================
// TESTS
// =============================================================================
