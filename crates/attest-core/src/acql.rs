//! # ACQL Query Engine
//!
//! Read-only analytic queries over a case:
//!
//! ```text
//! SELECT goals FROM combined_case WHERE evidence_count < 2 AND confidence < 0.7
//! ```
//!
//! Candidates are drawn from the FROM scope in node insertion order; the
//! predicate is evaluated per candidate; the result is the ordered matching
//! subset as structured records. Analytic macros read reasoner and
//! dependency-tracker state; the evidence collaborator answers coverage
//! checks.
//!
//! Malformed syntax is a ParseError with line/column; an unknown field or
//! macro is a QueryError naming the offending token; an unknown case name
//! is a NameError.

use crate::case::AssuranceCase;
use crate::dependency::DependencyTracker;
use crate::reasoner::Reasoner;
use crate::session::Session;
use crate::{
    ArgumentNode, AttestError, EdgeKind, EvidenceProvider, NodeId, NodeKind, NodeStatus,
};

// =============================================================================
// QUERY MODEL
// =============================================================================

/// What a query projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Goal nodes.
    Goals,
    /// Strategy nodes.
    Strategies,
    /// Solution nodes.
    Evidence,
    /// Every node.
    Elements,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `=`
    Eq,
    /// `!=`
    Ne,
}

/// Queryable node fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Node id (string).
    Id,
    /// Node kind name (string).
    Kind,
    /// Node status name (string).
    Status,
    /// Node title (string).
    Title,
    /// Propagated or base confidence (number).
    Confidence,
    /// Count of incoming EVIDENCE edges (number).
    EvidenceCount,
    /// Declared evidence requirement (number).
    RequiredEvidence,
}

/// A node argument inside a macro: the current candidate or a fixed id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// The bare keyword `node`: the candidate under evaluation.
    Candidate,
    /// A fixed node id.
    Fixed(NodeId),
}

/// Left side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A node field.
    Field(Field),
    /// `evidence_coverage(node)`.
    EvidenceCoverage(NodeRef),
}

/// Comparison right side.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal.
    Number(f64),
    /// Text literal (quoted or bare).
    Text(String),
}

/// Predicate expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Logical disjunction.
    Or(Box<Predicate>, Box<Predicate>),
    /// Logical conjunction.
    And(Box<Predicate>, Box<Predicate>),
    /// Logical negation.
    Not(Box<Predicate>),
    /// `field OP literal` or `evidence_coverage(x) OP number`.
    Compare {
        /// Left side.
        lhs: Operand,
        /// Operator.
        op: CmpOp,
        /// Right side.
        rhs: Literal,
    },
    /// `is_consistent()`.
    IsConsistent,
    /// `is_complete(x)`.
    IsComplete(NodeRef),
    /// `has_defeater(x)`.
    HasDefeater(NodeRef),
    /// `depends_on(a, b)`.
    DependsOn(NodeRef, NodeRef),
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct AcqlQuery {
    /// Projection scope.
    pub projection: Projection,
    /// Case name from the FROM clause.
    pub case: String,
    /// WHERE predicate, if any.
    pub predicate: Option<Predicate>,
}

/// One matching element, as a structured record.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ElementRecord {
    /// Node id.
    pub id: NodeId,
    /// Kind name.
    pub kind: &'static str,
    /// Node title.
    pub title: String,
    /// Confidence at query time.
    pub confidence: f64,
}

/// Ordered query result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The queried case name.
    pub case: String,
    /// Matching elements in node insertion order.
    pub rows: Vec<ElementRecord>,
}

impl QueryResult {
    /// Matching node ids, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }
}

// =============================================================================
// LEXER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Number(f64),
    Text(String),
    Op(CmpOp),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
}

fn lex(text: &str) -> Result<Vec<Token>, AttestError> {
    let mut tokens = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let column = i + 1;
            let ch = chars[i];
            match ch {
                c if c.is_whitespace() => i += 1,
                '(' => {
                    tokens.push(Token {
                        kind: TokenKind::LParen,
                        line: line_no,
                        column,
                    });
                    i += 1;
                }
                ')' => {
                    tokens.push(Token {
                        kind: TokenKind::RParen,
                        line: line_no,
                        column,
                    });
                    i += 1;
                }
                ',' => {
                    tokens.push(Token {
                        kind: TokenKind::Comma,
                        line: line_no,
                        column,
                    });
                    i += 1;
                }
                '<' | '>' | '!' | '=' => {
                    let two = chars.get(i + 1) == Some(&'=');
                    let op = match (ch, two) {
                        ('<', true) => CmpOp::Le,
                        ('<', false) => CmpOp::Lt,
                        ('>', true) => CmpOp::Ge,
                        ('>', false) => CmpOp::Gt,
                        ('=', _) => CmpOp::Eq,
                        ('!', true) => CmpOp::Ne,
                        ('!', false) => {
                            return Err(AttestError::parse(line_no, column, "expected '!='"));
                        }
                        _ => {
                            return Err(AttestError::parse(line_no, column, "bad operator"));
                        }
                    };
                    tokens.push(Token {
                        kind: TokenKind::Op(op),
                        line: line_no,
                        column,
                    });
                    i += if two || (ch == '=' && chars.get(i + 1) == Some(&'=')) {
                        2
                    } else {
                        1
                    };
                }
                '"' | '\'' => {
                    let quote = ch;
                    let mut value = String::new();
                    let mut j = i + 1;
                    loop {
                        match chars.get(j) {
                            None => {
                                return Err(AttestError::parse(
                                    line_no,
                                    column,
                                    "unterminated string literal",
                                ));
                            }
                            Some(&c) if c == quote => break,
                            Some(&c) => {
                                value.push(c);
                                j += 1;
                            }
                        }
                    }
                    tokens.push(Token {
                        kind: TokenKind::Text(value),
                        line: line_no,
                        column,
                    });
                    i = j + 1;
                }
                c if c.is_ascii_digit() => {
                    let mut j = i;
                    while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                        j += 1;
                    }
                    let number: String = chars[i..j].iter().collect();
                    let value = number.parse::<f64>().map_err(|_| {
                        AttestError::parse(line_no, column, format!("bad number '{number}'"))
                    })?;
                    tokens.push(Token {
                        kind: TokenKind::Number(value),
                        line: line_no,
                        column,
                    });
                    i = j;
                }
                c if c.is_alphanumeric() || c == '_' => {
                    let mut j = i;
                    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                        j += 1;
                    }
                    tokens.push(Token {
                        kind: TokenKind::Ident(chars[i..j].iter().collect()),
                        line: line_no,
                        column,
                    });
                    i = j;
                }
                other => {
                    return Err(AttestError::parse(
                        line_no,
                        column,
                        format!("unexpected character '{other}'"),
                    ));
                }
            }
        }
    }
    Ok(tokens)
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn err_here(&self, message: impl Into<String>) -> AttestError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or((1, 1), |t| (t.line, t.column));
        AttestError::parse(line, column, message)
    }

    fn next(&mut self, expected: &str) -> Result<Token, AttestError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.err_here(format!("expected {expected}")))?;
        self.pos += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Ident(s)) if s.eq_ignore_ascii_case(keyword))
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), AttestError> {
        let token = self.next(&format!("keyword '{keyword}'"))?;
        match &token.kind {
            TokenKind::Ident(s) if s.eq_ignore_ascii_case(keyword) => Ok(()),
            _ => Err(AttestError::parse(
                token.line,
                token.column,
                format!("expected keyword '{keyword}'"),
            )),
        }
    }

    fn identifier(&mut self, expected: &str) -> Result<(String, Token), AttestError> {
        let token = self.next(expected)?;
        match &token.kind {
            TokenKind::Ident(s) => Ok((s.clone(), token.clone())),
            _ => Err(AttestError::parse(
                token.line,
                token.column,
                format!("expected {expected}"),
            )),
        }
    }

    fn expression(&mut self) -> Result<Predicate, AttestError> {
        let mut left = self.conjunction()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            let right = self.conjunction()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<Predicate, AttestError> {
        let mut left = self.unary()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            let right = self.unary()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Predicate, AttestError> {
        if self.peek_keyword("not") {
            self.pos += 1;
            return Ok(Predicate::Not(Box::new(self.unary()?)));
        }
        if matches!(self.peek(), Some(TokenKind::LParen)) {
            self.pos += 1;
            let inner = self.expression()?;
            let close = self.next("')'")?;
            if close.kind != TokenKind::RParen {
                return Err(AttestError::parse(close.line, close.column, "expected ')'"));
            }
            return Ok(inner);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Predicate, AttestError> {
        let (name, token) = self.identifier("a field or macro")?;
        let lower = name.to_ascii_lowercase();

        if matches!(self.peek(), Some(TokenKind::LParen)) {
            self.pos += 1;
            return self.macro_call(&lower, &name);
        }

        let field = match lower.as_str() {
            "id" => Field::Id,
            "kind" => Field::Kind,
            "status" => Field::Status,
            "title" => Field::Title,
            "confidence" => Field::Confidence,
            "evidence_count" => Field::EvidenceCount,
            "required_evidence" => Field::RequiredEvidence,
            _ => return Err(AttestError::Query(name)),
        };
        let op = self.operator()?;
        let rhs = self.literal()?;
        if matches!(
            field,
            Field::Id | Field::Kind | Field::Status | Field::Title
        ) && !matches!(op, CmpOp::Eq | CmpOp::Ne)
        {
            return Err(AttestError::parse(
                token.line,
                token.column,
                format!("field {lower} supports only = and !="),
            ));
        }
        Ok(Predicate::Compare {
            lhs: Operand::Field(field),
            op,
            rhs,
        })
    }

    /// Parse a macro call; the opening paren is already consumed.
    fn macro_call(&mut self, lower: &str, original: &str) -> Result<Predicate, AttestError> {
        match lower {
            "is_consistent" => {
                self.close_paren()?;
                Ok(Predicate::IsConsistent)
            }
            "is_complete" => {
                let node = self.node_ref()?;
                self.close_paren()?;
                Ok(Predicate::IsComplete(node))
            }
            "has_defeater" => {
                let node = self.node_ref()?;
                self.close_paren()?;
                Ok(Predicate::HasDefeater(node))
            }
            "depends_on" => {
                let a = self.node_ref()?;
                let comma = self.next("','")?;
                if comma.kind != TokenKind::Comma {
                    return Err(AttestError::parse(comma.line, comma.column, "expected ','"));
                }
                let b = self.node_ref()?;
                self.close_paren()?;
                Ok(Predicate::DependsOn(a, b))
            }
            "evidence_coverage" => {
                let node = self.node_ref()?;
                self.close_paren()?;
                let op = self.operator()?;
                let rhs = self.literal()?;
                if !matches!(rhs, Literal::Number(_)) {
                    return Err(self.err_here("evidence_coverage compares against a number"));
                }
                Ok(Predicate::Compare {
                    lhs: Operand::EvidenceCoverage(node),
                    op,
                    rhs,
                })
            }
            _ => Err(AttestError::Query(original.to_string())),
        }
    }

    fn node_ref(&mut self) -> Result<NodeRef, AttestError> {
        let token = self.next("a node reference")?;
        match &token.kind {
            TokenKind::Ident(s) if s.eq_ignore_ascii_case("node") => Ok(NodeRef::Candidate),
            TokenKind::Ident(s) => Ok(NodeRef::Fixed(NodeId::new(s.clone()))),
            TokenKind::Text(s) => Ok(NodeRef::Fixed(NodeId::new(s.clone()))),
            _ => Err(AttestError::parse(
                token.line,
                token.column,
                "expected a node reference",
            )),
        }
    }

    fn close_paren(&mut self) -> Result<(), AttestError> {
        let token = self.next("')'")?;
        if token.kind == TokenKind::RParen {
            Ok(())
        } else {
            Err(AttestError::parse(token.line, token.column, "expected ')'"))
        }
    }

    fn operator(&mut self) -> Result<CmpOp, AttestError> {
        let token = self.next("a comparison operator")?;
        match token.kind {
            TokenKind::Op(op) => Ok(op),
            _ => Err(AttestError::parse(
                token.line,
                token.column,
                "expected a comparison operator",
            )),
        }
    }

    fn literal(&mut self) -> Result<Literal, AttestError> {
        let token = self.next("a literal")?;
        match &token.kind {
            TokenKind::Number(n) => Ok(Literal::Number(*n)),
            TokenKind::Text(s) => Ok(Literal::Text(s.clone())),
            TokenKind::Ident(s) => Ok(Literal::Text(s.clone())),
            _ => Err(AttestError::parse(
                token.line,
                token.column,
                "expected a literal",
            )),
        }
    }
}

/// Parse an ACQL query.
pub fn parse_query(text: &str) -> Result<AcqlQuery, AttestError> {
    let tokens = lex(text)?;
    let mut parser = Parser { tokens, pos: 0 };

    parser.keyword("select")?;
    let (projection_name, token) = parser.identifier("a projection")?;
    let projection = match projection_name.to_ascii_lowercase().as_str() {
        "goals" => Projection::Goals,
        "strategies" => Projection::Strategies,
        "evidence" => Projection::Evidence,
        "elements" => Projection::Elements,
        _ => {
            return Err(AttestError::parse(
                token.line,
                token.column,
                format!("unknown projection '{projection_name}'"),
            ));
        }
    };
    parser.keyword("from")?;
    let (case, _) = parser.identifier("a case name")?;

    let predicate = if parser.peek_keyword("where") {
        parser.pos += 1;
        Some(parser.expression()?)
    } else {
        None
    };

    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(AttestError::parse(
            extra.line,
            extra.column,
            "unexpected trailing token",
        ));
    }

    Ok(AcqlQuery {
        projection,
        case,
        predicate,
    })
}

// =============================================================================
// EVALUATION
// =============================================================================

/// The ACQL evaluator.
pub struct QueryEngine;

impl QueryEngine {
    /// Parse and evaluate a query against a session.
    pub fn execute(
        session: &Session,
        provider: &dyn EvidenceProvider,
        text: &str,
    ) -> Result<QueryResult, AttestError> {
        let query = parse_query(text)?;
        let case = session.require_case(&query.case)?;
        Self::evaluate(case, session.tracker(), provider, &query)
    }

    /// Evaluate a parsed query against a case.
    pub fn evaluate(
        case: &AssuranceCase,
        tracker: &DependencyTracker,
        provider: &dyn EvidenceProvider,
        query: &AcqlQuery,
    ) -> Result<QueryResult, AttestError> {
        let mut rows = Vec::new();
        for node in case.graph().nodes() {
            let in_scope = match query.projection {
                Projection::Goals => node.kind == NodeKind::Goal,
                Projection::Strategies => node.kind == NodeKind::Strategy,
                Projection::Evidence => node.kind == NodeKind::Solution,
                Projection::Elements => true,
            };
            if !in_scope {
                continue;
            }
            let matches = match &query.predicate {
                None => true,
                Some(predicate) => Self::eval(predicate, case, tracker, provider, node)?,
            };
            if matches {
                rows.push(ElementRecord {
                    id: node.id.clone(),
                    kind: node.kind.as_str(),
                    title: node.title.clone(),
                    confidence: node.confidence.value(),
                });
            }
        }
        Ok(QueryResult {
            case: query.case.clone(),
            rows,
        })
    }

    fn eval(
        predicate: &Predicate,
        case: &AssuranceCase,
        tracker: &DependencyTracker,
        provider: &dyn EvidenceProvider,
        candidate: &ArgumentNode,
    ) -> Result<bool, AttestError> {
        match predicate {
            Predicate::Or(a, b) => Ok(Self::eval(a, case, tracker, provider, candidate)?
                || Self::eval(b, case, tracker, provider, candidate)?),
            Predicate::And(a, b) => Ok(Self::eval(a, case, tracker, provider, candidate)?
                && Self::eval(b, case, tracker, provider, candidate)?),
            Predicate::Not(inner) => {
                Ok(!Self::eval(inner, case, tracker, provider, candidate)?)
            }
            Predicate::Compare { lhs, op, rhs } => {
                Self::compare(lhs, *op, rhs, case, provider, candidate)
            }
            Predicate::IsConsistent => Ok(Self::is_consistent(case)),
            Predicate::IsComplete(node) => {
                let id = Self::resolve(node, candidate);
                Ok(Self::is_complete(case, &id))
            }
            Predicate::HasDefeater(node) => {
                let id = Self::resolve(node, candidate);
                Ok(Reasoner::find_defeaters(case, &id)
                    .iter()
                    .any(|d| d.is_active()))
            }
            Predicate::DependsOn(a, b) => {
                let a = Self::resolve(a, candidate);
                let b = Self::resolve(b, candidate);
                Ok(tracker.depends_on(&a, &b))
            }
        }
    }

    fn resolve(node: &NodeRef, candidate: &ArgumentNode) -> NodeId {
        match node {
            NodeRef::Candidate => candidate.id.clone(),
            NodeRef::Fixed(id) => id.clone(),
        }
    }

    fn compare(
        lhs: &Operand,
        op: CmpOp,
        rhs: &Literal,
        case: &AssuranceCase,
        provider: &dyn EvidenceProvider,
        candidate: &ArgumentNode,
    ) -> Result<bool, AttestError> {
        match lhs {
            Operand::EvidenceCoverage(node) => {
                let id = Self::resolve(node, candidate);
                let coverage = Self::evidence_coverage(case, provider, &id);
                let Literal::Number(n) = rhs else {
                    return Err(AttestError::Query("evidence_coverage".to_string()));
                };
                Ok(Self::compare_numbers(coverage, op, *n))
            }
            Operand::Field(field) => match field {
                Field::Confidence => {
                    Self::numeric(candidate.confidence.value(), op, rhs, "confidence")
                }
                Field::EvidenceCount => {
                    let count = case
                        .graph()
                        .incoming_edges(&candidate.id)
                        .filter(|e| e.kind == EdgeKind::Evidence)
                        .count();
                    Self::numeric(count as f64, op, rhs, "evidence_count")
                }
                Field::RequiredEvidence => Self::numeric(
                    f64::from(candidate.required_evidence),
                    op,
                    rhs,
                    "required_evidence",
                ),
                Field::Id => Self::textual(candidate.id.as_str(), op, rhs),
                Field::Kind => Self::textual(candidate.kind.as_str(), op, rhs),
                Field::Status => Self::textual(candidate.status.as_str(), op, rhs),
                Field::Title => Self::textual(&candidate.title, op, rhs),
            },
        }
    }

    fn numeric(value: f64, op: CmpOp, rhs: &Literal, field: &str) -> Result<bool, AttestError> {
        let Literal::Number(n) = rhs else {
            return Err(AttestError::Query(field.to_string()));
        };
        Ok(Self::compare_numbers(value, op, *n))
    }

    fn textual(value: &str, op: CmpOp, rhs: &Literal) -> Result<bool, AttestError> {
        let text = match rhs {
            Literal::Text(s) => s.as_str(),
            Literal::Number(_) => return Err(AttestError::Query("string comparison".to_string())),
        };
        Ok(match op {
            CmpOp::Eq => value == text,
            CmpOp::Ne => value != text,
            // The parser rejects ordered comparisons on string fields.
            _ => false,
        })
    }

    fn compare_numbers(a: f64, op: CmpOp, b: f64) -> bool {
        match op {
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
        }
    }

    /// No two active sibling strategies under the same goal assert
    /// contradictory claims.
    fn is_consistent(case: &AssuranceCase) -> bool {
        for goal in case.graph().nodes_by_kind(NodeKind::Goal) {
            let siblings: Vec<&ArgumentNode> = case
                .graph()
                .get_children(&goal.id, EdgeKind::Supports)
                .iter()
                .filter_map(|id| case.graph().node(id))
                .filter(|n| {
                    n.kind == NodeKind::Strategy
                        && case.defeaters_on_node(&n.id).next().is_none()
                })
                .collect();
            for (i, s1) in siblings.iter().enumerate() {
                for s2 in siblings.iter().skip(i + 1) {
                    if s1.contradicts.contains(&s2.id) || s2.contradicts.contains(&s1.id) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Every node in the support closure has the children its argument
    /// pattern requires.
    fn is_complete(case: &AssuranceCase, node: &NodeId) -> bool {
        let closure = case.graph().support_closure(node);
        closure.iter().all(|id| {
            let Some(n) = case.graph().node(id) else {
                return false;
            };
            let child_edges = case.graph().child_edges(id);
            match n.kind {
                NodeKind::Goal => n.status == NodeStatus::Assumed || !child_edges.is_empty(),
                NodeKind::Strategy => !child_edges.is_empty(),
                NodeKind::Solution => {
                    n.required_evidence == 0
                        || child_edges.iter().any(|e| e.kind == EdgeKind::Evidence)
                }
                NodeKind::Context | NodeKind::Assumption | NodeKind::Justification => true,
            }
        })
    }

    /// Ratio of linked, checksum-valid evidence to the declared
    /// requirement. A node requiring nothing has full coverage.
    fn evidence_coverage(
        case: &AssuranceCase,
        provider: &dyn EvidenceProvider,
        node: &NodeId,
    ) -> f64 {
        let Some(n) = case.graph().node(node) else {
            return 0.0;
        };
        if n.required_evidence == 0 {
            return 1.0;
        }
        let valid = case
            .graph()
            .incoming_edges(node)
            .filter(|e| e.kind == EdgeKind::Evidence)
            .filter(|e| {
                provider.evidence_exists(e.from.as_str())
                    && e.recorded_checksum
                        .as_ref()
                        .is_none_or(|c| *c == provider.evidence_checksum(e.from.as_str()))
            })
            .count();
        valid as f64 / f64::from(n.required_evidence)
    }
}

// =============================================================================
// TESTS
// =============================================================================
