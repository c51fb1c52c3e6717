//! # ArgTL Interpreter
//!
//! The argument transformation language: line-oriented scripts that
//! compose, decompose, refine, abstract, substitute, link, validate, and
//! merge named artifacts in a session.
//!
//! ```text
//! compose fragment_a with fragment_b as combined_case
//! link evidence_001 to goal_g1 in combined_case
//! validate combined_case
//! ```
//!
//! Execution is strictly sequential and fail-fast: the first statement
//! whose precondition fails halts the script, and prior statements are NOT
//! rolled back. Every attempted statement lands in the execution log, the
//! failing one included, so partial progress is always inspectable.

use crate::case::{AssuranceCase, CollapsedSubgraph};
use crate::primitives::MAX_SCRIPT_STATEMENTS;
use crate::session::Session;
use crate::{
    ArgumentNode, AttestError, Confidence, EdgeKind, Issue, NodeId, NodeKind, NodeStatus,
};
use tracing::{debug, warn};

// =============================================================================
// STATEMENTS
// =============================================================================

/// One parsed ArgTL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `compose A with B as C`
    Compose {
        /// Left fragment name.
        left: String,
        /// Right fragment name.
        right: String,
        /// Name for the composed case.
        name: String,
    },
    /// `decompose N into [a, b] [as C] in SRC`
    Decompose {
        /// Goal to decompose.
        node: NodeId,
        /// Sub-goal ids to create.
        subgoals: Vec<NodeId>,
        /// Name for a derived case; in-place when absent.
        name: Option<String>,
        /// Source case name.
        case: String,
    },
    /// `refine N with S in C`
    Refine {
        /// Node to refine.
        node: NodeId,
        /// Strategy id to create.
        strategy: NodeId,
        /// Case name.
        case: String,
    },
    /// `abstract G as P in C`
    Abstract {
        /// Root of the subtree to collapse.
        node: NodeId,
        /// Placeholder id to create.
        placeholder: NodeId,
        /// Case name.
        case: String,
    },
    /// `substitute X with Y in C`
    Substitute {
        /// Node to remove.
        node: NodeId,
        /// Existing node taking over X's edges.
        replacement: NodeId,
        /// Case name.
        case: String,
    },
    /// `link E to N in C`
    Link {
        /// Evidence id.
        evidence: NodeId,
        /// Supported node.
        node: NodeId,
        /// Case name.
        case: String,
    },
    /// `validate C`
    Validate {
        /// Case name.
        case: String,
    },
    /// `merge A and B as C`
    Merge {
        /// Left case name.
        left: String,
        /// Right case name.
        right: String,
        /// Name for the merged case.
        name: String,
    },
}

impl Statement {
    /// The verb keyword of this statement.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Compose { .. } => "compose",
            Self::Decompose { .. } => "decompose",
            Self::Refine { .. } => "refine",
            Self::Abstract { .. } => "abstract",
            Self::Substitute { .. } => "substitute",
            Self::Link { .. } => "link",
            Self::Validate { .. } => "validate",
            Self::Merge { .. } => "merge",
        }
    }

    /// The primary target named in the log for this statement.
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::Compose { name, .. } | Self::Merge { name, .. } => name.clone(),
            Self::Decompose { node, .. }
            | Self::Refine { node, .. }
            | Self::Abstract { node, .. }
            | Self::Substitute { node, .. }
            | Self::Link { node, .. } => node.to_string(),
            Self::Validate { case } => case.clone(),
        }
    }
}

// =============================================================================
// TOKENIZER
// =============================================================================

#[derive(Debug, Clone)]
struct Token {
    text: String,
    column: usize,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start_col = 1;

    for (i, ch) in line.chars().enumerate() {
        let column = i + 1;
        if ch.is_whitespace() || matches!(ch, '[' | ']' | ',') {
            if !current.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    column: start_col,
                });
            }
            if !ch.is_whitespace() {
                tokens.push(Token {
                    text: ch.to_string(),
                    column,
                });
            }
        } else {
            if current.is_empty() {
                start_col = column;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            column: start_col,
        });
    }
    tokens
}

// =============================================================================
// PARSER
// =============================================================================

struct Cursor<'a> {
    line: usize,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: usize, tokens: &'a [Token]) -> Self {
        Self {
            line,
            tokens,
            pos: 0,
        }
    }

    fn end_column(&self) -> usize {
        self.tokens
            .last()
            .map_or(1, |t| t.column + t.text.chars().count())
    }

    fn next(&mut self, expected: &str) -> Result<&'a Token, AttestError> {
        let token = self.tokens.get(self.pos).ok_or_else(|| {
            AttestError::parse(self.line, self.end_column(), format!("expected {expected}"))
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), AttestError> {
        let token = self.next(&format!("keyword '{keyword}'"))?;
        if token.text.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(AttestError::parse(
                self.line,
                token.column,
                format!("expected keyword '{keyword}', found '{}'", token.text),
            ))
        }
    }

    fn identifier(&mut self, what: &str) -> Result<String, AttestError> {
        let token = self.next(what)?;
        if matches!(token.text.as_str(), "[" | "]" | ",") {
            return Err(AttestError::parse(
                self.line,
                token.column,
                format!("expected {what}, found '{}'", token.text),
            ));
        }
        Ok(token.text.clone())
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.text.eq_ignore_ascii_case(keyword))
    }

    fn finish(&self) -> Result<(), AttestError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(extra) => Err(AttestError::parse(
                self.line,
                extra.column,
                format!("unexpected trailing token '{}'", extra.text),
            )),
        }
    }
}

/// Parse one statement line. The caller has already stripped blanks and
/// comments.
pub fn parse_statement(line_no: usize, line: &str) -> Result<Statement, AttestError> {
    let tokens = tokenize(line);
    let mut cursor = Cursor::new(line_no, &tokens);
    let verb = cursor.next("a verb")?;

    let statement = match verb.text.to_ascii_lowercase().as_str() {
        "compose" => {
            let left = cursor.identifier("a fragment name")?;
            cursor.keyword("with")?;
            let right = cursor.identifier("a fragment name")?;
            cursor.keyword("as")?;
            let name = cursor.identifier("a case name")?;
            Statement::Compose { left, right, name }
        }
        "decompose" => {
            let node = NodeId::new(cursor.identifier("a goal id")?);
            cursor.keyword("into")?;
            let open = cursor.next("'['")?;
            if open.text != "[" {
                return Err(AttestError::parse(
                    line_no,
                    open.column,
                    format!("expected '[', found '{}'", open.text),
                ));
            }
            let mut subgoals = Vec::new();
            loop {
                let token = cursor.next("a sub-goal id or ']'")?;
                match token.text.as_str() {
                    "]" => break,
                    "," => continue,
                    _ => subgoals.push(NodeId::new(token.text.clone())),
                }
            }
            if subgoals.is_empty() {
                return Err(AttestError::parse(
                    line_no,
                    open.column,
                    "decompose requires at least one sub-goal",
                ));
            }
            let name = if cursor.peek_is("as") {
                cursor.keyword("as")?;
                Some(cursor.identifier("a case name")?)
            } else {
                None
            };
            cursor.keyword("in")?;
            let case = cursor.identifier("a case name")?;
            Statement::Decompose {
                node,
                subgoals,
                name,
                case,
            }
        }
        "refine" => {
            let node = NodeId::new(cursor.identifier("a node id")?);
            cursor.keyword("with")?;
            let strategy = NodeId::new(cursor.identifier("a strategy id")?);
            cursor.keyword("in")?;
            let case = cursor.identifier("a case name")?;
            Statement::Refine {
                node,
                strategy,
                case,
            }
        }
        "abstract" => {
            let node = NodeId::new(cursor.identifier("a node id")?);
            cursor.keyword("as")?;
            let placeholder = NodeId::new(cursor.identifier("a placeholder id")?);
            cursor.keyword("in")?;
            let case = cursor.identifier("a case name")?;
            Statement::Abstract {
                node,
                placeholder,
                case,
            }
        }
        "substitute" => {
            let node = NodeId::new(cursor.identifier("a node id")?);
            cursor.keyword("with")?;
            let replacement = NodeId::new(cursor.identifier("a node id")?);
            cursor.keyword("in")?;
            let case = cursor.identifier("a case name")?;
            Statement::Substitute {
                node,
                replacement,
                case,
            }
        }
        "link" => {
            let evidence = NodeId::new(cursor.identifier("an evidence id")?);
            cursor.keyword("to")?;
            let node = NodeId::new(cursor.identifier("a node id")?);
            cursor.keyword("in")?;
            let case = cursor.identifier("a case name")?;
            Statement::Link {
                evidence,
                node,
                case,
            }
        }
        "validate" => {
            let case = cursor.identifier("a case name")?;
            Statement::Validate { case }
        }
        "merge" => {
            let left = cursor.identifier("a case name")?;
            cursor.keyword("and")?;
            let right = cursor.identifier("a case name")?;
            cursor.keyword("as")?;
            let name = cursor.identifier("a case name")?;
            Statement::Merge { left, right, name }
        }
        other => {
            return Err(AttestError::parse(
                line_no,
                verb.column,
                format!("unknown verb '{other}'"),
            ));
        }
    };

    cursor.finish()?;
    Ok(statement)
}

// =============================================================================
// EXECUTION
// =============================================================================

/// One record in the execution log. Every attempted statement produces an
/// entry, failures included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// 1-based script line.
    pub line: usize,
    /// Verb keyword, or the offending token when parsing failed.
    pub verb: String,
    /// Primary target of the statement.
    pub target: String,
    /// Whether the statement applied.
    pub success: bool,
    /// Outcome description or error text.
    pub message: String,
}

/// Result of executing a script: the ordered log, validation issue lists,
/// and the halting error if any.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Ordered per-statement log.
    pub log: Vec<LogEntry>,
    /// Issue lists produced by `validate` statements, in order.
    pub validations: Vec<(String, Vec<Issue>)>,
    /// The error that halted execution, if any.
    pub error: Option<AttestError>,
}

impl ExecutionReport {
    /// True iff the whole script applied.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// The ArgTL script interpreter.
pub struct Interpreter;

impl Interpreter {
    /// Execute a script against a session, strictly sequentially.
    #[must_use]
    pub fn execute(session: &mut Session, script: &str) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        let statements: Vec<(usize, &str)> = script
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
            .collect();
        if statements.len() > MAX_SCRIPT_STATEMENTS {
            report.error = Some(AttestError::validation(format!(
                "script has {} statements, limit is {MAX_SCRIPT_STATEMENTS}",
                statements.len()
            )));
            return report;
        }

        for (line_no, line) in statements {
            let statement = match parse_statement(line_no, line) {
                Ok(s) => s,
                Err(error) => {
                    let verb = line.split_whitespace().next().unwrap_or("?").to_string();
                    warn!(line = line_no, %error, "argtl parse failed");
                    report.log.push(LogEntry {
                        line: line_no,
                        verb,
                        target: String::new(),
                        success: false,
                        message: error.to_string(),
                    });
                    report.error = Some(error);
                    return report;
                }
            };

            let verb = statement.verb().to_string();
            let target = statement.target();
            debug!(line = line_no, verb = %verb, target = %target, "argtl statement");

            match Self::apply(session, &statement, &mut report) {
                Ok(message) => {
                    report.log.push(LogEntry {
                        line: line_no,
                        verb,
                        target,
                        success: true,
                        message,
                    });
                }
                Err(error) => {
                    warn!(line = line_no, verb = %verb, %error, "argtl statement failed");
                    report.log.push(LogEntry {
                        line: line_no,
                        verb,
                        target,
                        success: false,
                        message: error.to_string(),
                    });
                    report.error = Some(error);
                    return report;
                }
            }
        }
        report
    }

    fn apply(
        session: &mut Session,
        statement: &Statement,
        report: &mut ExecutionReport,
    ) -> Result<String, AttestError> {
        match statement {
            Statement::Compose { left, right, name } => Self::compose(session, left, right, name),
            Statement::Decompose {
                node,
                subgoals,
                name,
                case,
            } => {
                if let Some(derived) = name {
                    let mut copy = session.require_case(case)?.clone();
                    let message = Self::decompose(&mut copy, node, subgoals)?;
                    session.bind_case(derived.clone(), copy);
                    Ok(format!("{message} (as {derived})"))
                } else {
                    Self::decompose(session.require_case_mut(case)?, node, subgoals)
                }
            }
            Statement::Refine {
                node,
                strategy,
                case,
            } => Self::refine(session.require_case_mut(case)?, node, strategy),
            Statement::Abstract {
                node,
                placeholder,
                case,
            } => Self::abstract_subtree(session.require_case_mut(case)?, node, placeholder),
            Statement::Substitute {
                node,
                replacement,
                case,
            } => Self::substitute(session.require_case_mut(case)?, node, replacement),
            Statement::Link {
                evidence,
                node,
                case,
            } => Self::link(session.require_case_mut(case)?, evidence, node),
            Statement::Validate { case } => {
                let issues = session.require_case(case)?.validate();
                let message = format!("{} issues found", issues.len());
                report.validations.push((case.clone(), issues));
                Ok(message)
            }
            Statement::Merge { left, right, name } => {
                let mut merged = session.require_case(left)?.clone();
                let other = session.require_case(right)?.clone();
                merged.merge_from(&other)?;
                merged.id = name.clone();
                let nodes = merged.graph().node_count();
                session.bind_case(name.clone(), merged);
                Ok(format!("merged {left} and {right} into {name} ({nodes} nodes)"))
            }
        }
    }

    /// Union two fragments into a fresh case and wire shared ports under a
    /// root goal (synthesized when no existing root fits).
    fn compose(
        session: &mut Session,
        left: &str,
        right: &str,
        name: &str,
    ) -> Result<String, AttestError> {
        let left_fragment = session
            .fragment(left)
            .ok_or_else(|| AttestError::Name(left.to_string()))?;
        let right_fragment = session
            .fragment(right)
            .ok_or_else(|| AttestError::Name(right.to_string()))?;

        let left_graph = left_fragment.graph().clone();
        let right_graph = right_fragment.graph().clone();
        let left_ports = left_fragment.ports().to_vec();
        let right_ports = right_fragment.ports().to_vec();

        let mut case = AssuranceCase::new(name, format!("Composition of {left} and {right}"));
        case.absorb_graph(&left_graph)?;
        case.absorb_graph(&right_graph)?;

        // Ports declared by both fragments are the composition seam; when
        // the fragments share none, every declared port is wired.
        let mut wired: Vec<NodeId> = left_ports
            .iter()
            .filter(|p| right_ports.contains(p))
            .cloned()
            .collect();
        if wired.is_empty() {
            wired = left_ports.clone();
            for port in &right_ports {
                if !wired.contains(port) {
                    wired.push(port.clone());
                }
            }
        }

        let root = match case
            .graph()
            .root_goals()
            .into_iter()
            .find(|r| !wired.contains(r))
        {
            Some(existing) => existing,
            None => {
                let root = NodeId::new(format!("{name}_root"));
                case.graph_mut().add_node(
                    ArgumentNode::new(
                        root.clone(),
                        NodeKind::Goal,
                        format!("Composed claims of {left} and {right}"),
                    )
                    .with_status(NodeStatus::Developed),
                )?;
                root
            }
        };

        for port in &wired {
            if port == &root {
                continue;
            }
            let already = case
                .graph()
                .edges()
                .any(|e| e.from == *port && e.to == root && e.kind == EdgeKind::Supports);
            if !already {
                case.graph_mut()
                    .add_edge(port, &root, EdgeKind::Supports, Confidence::FULL)?;
            }
        }

        let nodes = case.graph().node_count();
        session.bind_case(name.to_string(), case);
        Ok(format!("created case {name} ({nodes} nodes)"))
    }

    /// Attach explicit sub-goals under a goal via DECOMPOSES edges.
    fn decompose(
        case: &mut AssuranceCase,
        node: &NodeId,
        subgoals: &[NodeId],
    ) -> Result<String, AttestError> {
        match case.graph().node(node) {
            None => {
                return Err(AttestError::validation(format!("node {node} not found")));
            }
            Some(n) if n.kind != NodeKind::Goal => {
                return Err(AttestError::validation(format!(
                    "decompose target {node} is a {}, not a goal",
                    n.kind.as_str()
                )));
            }
            Some(_) => {}
        }

        for subgoal in subgoals {
            case.graph_mut().add_node(ArgumentNode::new(
                subgoal.clone(),
                NodeKind::Goal,
                format!("Sub-goal of {node}"),
            ))?;
            case.graph_mut()
                .add_edge(node, subgoal, EdgeKind::Decomposes, Confidence::FULL)?;
        }
        if let Some(n) = case.graph_mut().node_mut(node) {
            n.status = NodeStatus::Developed;
        }
        Ok(format!(
            "decomposed {node} into {} sub-goals",
            subgoals.len()
        ))
    }

    /// Attach a new strategy under a node.
    fn refine(
        case: &mut AssuranceCase,
        node: &NodeId,
        strategy: &NodeId,
    ) -> Result<String, AttestError> {
        if !case.graph().contains_node(node) {
            return Err(AttestError::validation(format!("node {node} not found")));
        }
        case.graph_mut().add_node(ArgumentNode::new(
            strategy.clone(),
            NodeKind::Strategy,
            format!("Refinement of {node}"),
        ))?;
        case.graph_mut()
            .add_edge(strategy, node, EdgeKind::Supports, Confidence::FULL)?;
        if let Some(n) = case.graph_mut().node_mut(node) {
            n.status = NodeStatus::Developed;
        }
        Ok(format!("attached strategy {strategy} under {node}"))
    }

    /// Collapse a node and its support subtree into a placeholder,
    /// retaining the removed subgraph in the case's abstraction map.
    fn abstract_subtree(
        case: &mut AssuranceCase,
        node: &NodeId,
        placeholder: &NodeId,
    ) -> Result<String, AttestError> {
        if !case.graph().contains_node(node) {
            return Err(AttestError::validation(format!("node {node} not found")));
        }
        if case.graph().contains_node(placeholder) {
            return Err(AttestError::validation(format!(
                "placeholder id {placeholder} already exists"
            )));
        }

        let closure = case.graph().support_closure(node);
        let collapsed = CollapsedSubgraph {
            nodes: case
                .graph()
                .nodes()
                .filter(|n| closure.contains(&n.id))
                .cloned()
                .collect(),
            edges: case
                .graph()
                .edges()
                .filter(|e| closure.contains(&e.from) && closure.contains(&e.to))
                .cloned()
                .collect(),
        };
        let base = case
            .graph()
            .node(node)
            .map_or(Confidence::FULL, |n| n.confidence);

        case.graph_mut().add_node(
            ArgumentNode::new(
                placeholder.clone(),
                NodeKind::Goal,
                format!("Abstraction of {node}"),
            )
            .with_status(NodeStatus::Assumed)
            .with_confidence(base),
        )?;
        case.graph_mut().rewire(node, placeholder)?;
        let removed = collapsed.nodes.len();
        for id in &closure {
            case.graph_mut().remove_node(id)?;
        }
        case.retain_abstraction(placeholder.clone(), collapsed);
        Ok(format!("collapsed {removed} nodes into {placeholder}"))
    }

    /// Replace a node with an existing node, rewiring incident edges.
    fn substitute(
        case: &mut AssuranceCase,
        node: &NodeId,
        replacement: &NodeId,
    ) -> Result<String, AttestError> {
        if !case.graph().contains_node(node) {
            return Err(AttestError::validation(format!("node {node} not found")));
        }
        if !case.graph().contains_node(replacement) {
            return Err(AttestError::validation(format!(
                "node {replacement} not found"
            )));
        }
        case.graph_mut().rewire(node, replacement)?;
        case.graph_mut().remove_node(node)?;
        Ok(format!("substituted {node} with {replacement}"))
    }

    /// Create an EVIDENCE edge from an evidence id to a node, creating the
    /// evidence node if absent. Evidence existence in the external store is
    /// NOT verified here; that is the evidence collaborator's concern.
    fn link(
        case: &mut AssuranceCase,
        evidence: &NodeId,
        node: &NodeId,
    ) -> Result<String, AttestError> {
        if !case.graph().contains_node(node) {
            return Err(AttestError::validation(format!("node {node} not found")));
        }
        if !case.graph().contains_node(evidence) {
            case.graph_mut().add_node(
                ArgumentNode::new(evidence.clone(), NodeKind::Solution, evidence.as_str())
                    .with_status(NodeStatus::Assumed),
            )?;
        }
        case.graph_mut()
            .add_edge(evidence, node, EdgeKind::Evidence, Confidence::FULL)?;
        Ok(format!("evidence {evidence} linked to {node}"))
    }
}

// =============================================================================
// TESTS
// =============================================================================
