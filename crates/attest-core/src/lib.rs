//! # attest-core
//!
//! The assurance-case reasoning and query core for Attest - THE LOGIC.
//!
//! This crate owns the argument graph model (goals, strategies, evidence
//! and their typed relations) and the four engines operating on it:
//!
//! - **ArgTL**: a composition/transformation interpreter mutating named
//!   cases in a session
//! - **ACQL**: a read-only analytic query language over a case
//! - **Reasoner**: bounded fixpoint confidence propagation with
//!   defeater handling
//! - **Dependency tracker**: change-impact and cycle analysis over the
//!   node-id namespace
//!
//! ## Architectural Constraints
//!
//! - Single-threaded, synchronous, deterministic; no network or disk I/O.
//!   Evidence storage, persistence backends, and rendering are external
//!   collaborators behind the structured-record boundary (`NeutralCase`,
//!   execution logs, query results, issue lists).
//! - Logical findings (inconsistency, incompleteness, low confidence,
//!   cycles) are returned as data; only malformed input, invariant
//!   breaches, and exhausted budgets are errors.
//! - If embedded in a multi-user service, guard each case with
//!   single-writer/multiple-reader discipline; different cases are fully
//!   independent.

// =============================================================================
// MODULES
// =============================================================================

pub mod acql;
pub mod argtl;
pub mod case;
pub mod dependency;
pub mod export;
pub mod fragment;
pub mod graph;
pub mod primitives;
pub mod reasoner;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ArgumentNode, AttestError, Confidence, Defeater, DefeaterId, DefeaterKind, DefeaterStatus,
    DefeaterTarget, Edge, EdgeId, EdgeKind, EvidenceProvider, Issue, IssueKind, NodeId, NodeKind,
    NodeStatus,
};

// =============================================================================
// RE-EXPORTS: Graph & Case Model
// =============================================================================

pub use case::{AssuranceCase, CaseStatistics, CollapsedSubgraph};
pub use fragment::{Fragment, FragmentBuilder, StrengthReport};
pub use graph::ArgumentGraph;
pub use session::Session;

// =============================================================================
// RE-EXPORTS: Engines
// =============================================================================

pub use acql::{AcqlQuery, ElementRecord, Projection, QueryEngine, QueryResult, parse_query};
pub use argtl::{ExecutionReport, Interpreter, LogEntry, Statement, parse_statement};
pub use dependency::{
    ChangeRecord, DependencyEdge, DependencyRelation, DependencyStatistics, DependencyTracker,
    ImpactEntry,
};
pub use reasoner::{
    EvalContext, EvaluatorFn, EvaluatorRegistry, Reasoner, ReasoningBudget, ReasoningOutcome,
    RiskEstimate, RiskLevel,
};

// =============================================================================
// RE-EXPORTS: Export Formats
// =============================================================================

pub use export::{
    CanonicalHeader, NeutralCase, canonical_checksum, export_canonical, export_case,
    export_fragment, import_canonical, import_case, import_fragment, verify_canonical,
};
