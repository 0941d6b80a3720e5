//! Content grammar compilation
//!
//! A content expression such as `section_label? section_title (paragraph | element)* sections*`
//! is parsed once, compiled to an NFA (Thompson construction) and determinized into a
//! [`ContentMatch`]. Validating a child sequence is then a single walk over the DFA.
//!
//! Names in an expression are node kinds or groups; a group stands for every kind that
//! declares membership in it.

use super::kinds::{Group, NodeKind};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// A set of node kinds, one bit per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct KindSet(u128);

impl KindSet {
    pub fn empty() -> Self {
        KindSet(0)
    }

    pub fn single(kind: NodeKind) -> Self {
        KindSet(1u128 << kind.index())
    }

    pub fn of_group(group: Group) -> Self {
        NodeKind::ALL
            .into_iter()
            .filter(|kind| kind.in_group(group))
            .fold(KindSet::empty(), |set, kind| set.with(kind))
    }

    pub fn with(self, kind: NodeKind) -> Self {
        KindSet(self.0 | (1u128 << kind.index()))
    }

    pub fn union(self, other: KindSet) -> Self {
        KindSet(self.0 | other.0)
    }

    pub fn contains(self, kind: NodeKind) -> bool {
        self.0 & (1u128 << kind.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = NodeKind> {
        NodeKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("unknown name `{name}` in content expression `{expr}`")]
    UnknownName { name: String, expr: String },
    #[error("unexpected `{token}` in content expression `{expr}`")]
    UnexpectedToken { token: String, expr: String },
    #[error("unbalanced parentheses in content expression `{expr}`")]
    Unbalanced { expr: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Kinds(KindSet),
    Seq(Vec<Expr>),
    Alt(Vec<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    Opt(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Open,
    Close,
    Pipe,
    Star,
    Plus,
    Question,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, GrammarError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '|' | '*' | '+' | '?' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::Open,
                    ')' => Token::Close,
                    '|' => Token::Pipe,
                    '*' => Token::Star,
                    '+' => Token::Plus,
                    _ => Token::Question,
                });
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            other => {
                return Err(GrammarError::UnexpectedToken {
                    token: other.to_string(),
                    expr: expr.to_string(),
                })
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    expr: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_alt(&mut self) -> Result<Expr, GrammarError> {
        let mut branches = vec![self.parse_seq()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            branches.push(self.parse_seq()?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            Expr::Alt(branches)
        })
    }

    fn parse_seq(&mut self) -> Result<Expr, GrammarError> {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token, Token::Close | Token::Pipe) {
                break;
            }
            items.push(self.parse_postfix()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Seq(items)
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, GrammarError> {
        let mut expr = self.parse_atom()?;
        loop {
            expr = match self.peek() {
                Some(Token::Star) => Expr::Star(Box::new(expr)),
                Some(Token::Plus) => Expr::Plus(Box::new(expr)),
                Some(Token::Question) => Expr::Opt(Box::new(expr)),
                _ => return Ok(expr),
            };
            self.pos += 1;
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, GrammarError> {
        let token = self.peek().cloned();
        self.pos += 1;
        match token {
            Some(Token::Open) => {
                let inner = self.parse_alt()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(GrammarError::Unbalanced {
                        expr: self.expr.to_string(),
                    });
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Name(name)) => resolve_name(&name, self.expr),
            Some(other) => Err(GrammarError::UnexpectedToken {
                token: format!("{other:?}"),
                expr: self.expr.to_string(),
            }),
            None => Err(GrammarError::Unbalanced {
                expr: self.expr.to_string(),
            }),
        }
    }
}

fn resolve_name(name: &str, expr: &str) -> Result<Expr, GrammarError> {
    if let Some(kind) = NodeKind::from_name(name) {
        return Ok(Expr::Kinds(KindSet::single(kind)));
    }
    if let Some(group) = Group::from_name(name) {
        return Ok(Expr::Kinds(KindSet::of_group(group)));
    }
    Err(GrammarError::UnknownName {
        name: name.to_string(),
        expr: expr.to_string(),
    })
}

fn parse(expr: &str) -> Result<Expr, GrammarError> {
    let mut parser = Parser {
        tokens: tokenize(expr)?,
        pos: 0,
        expr,
    };
    let parsed = parser.parse_alt()?;
    if parser.pos != parser.tokens.len() {
        return Err(GrammarError::Unbalanced {
            expr: expr.to_string(),
        });
    }
    Ok(parsed)
}

#[derive(Default)]
struct NfaState {
    epsilon: Vec<usize>,
    edges: Vec<(KindSet, usize)>,
}

#[derive(Default)]
struct Nfa {
    states: Vec<NfaState>,
}

impl Nfa {
    fn add(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }

    /// Builds the fragment for `expr`, returning its entry and exit states.
    fn build(&mut self, expr: &Expr) -> (usize, usize) {
        match expr {
            Expr::Kinds(set) => {
                let start = self.add();
                let end = self.add();
                self.states[start].edges.push((*set, end));
                (start, end)
            }
            Expr::Seq(items) => {
                let start = self.add();
                let mut tail = start;
                for item in items {
                    let (s, e) = self.build(item);
                    self.epsilon(tail, s);
                    tail = e;
                }
                (start, tail)
            }
            Expr::Alt(branches) => {
                let start = self.add();
                let end = self.add();
                for branch in branches {
                    let (s, e) = self.build(branch);
                    self.epsilon(start, s);
                    self.epsilon(e, end);
                }
                (start, end)
            }
            Expr::Star(inner) => {
                let start = self.add();
                let end = self.add();
                let (s, e) = self.build(inner);
                self.epsilon(start, s);
                self.epsilon(start, end);
                self.epsilon(e, s);
                self.epsilon(e, end);
                (start, end)
            }
            Expr::Plus(inner) => {
                let start = self.add();
                let end = self.add();
                let (s, e) = self.build(inner);
                self.epsilon(start, s);
                self.epsilon(e, s);
                self.epsilon(e, end);
                (start, end)
            }
            Expr::Opt(inner) => {
                let start = self.add();
                let end = self.add();
                let (s, e) = self.build(inner);
                self.epsilon(start, s);
                self.epsilon(start, end);
                self.epsilon(e, end);
                (start, end)
            }
        }
    }

    fn closure(&self, seeds: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        let mut stack: Vec<usize> = seeds.into_iter().collect();
        while let Some(state) = stack.pop() {
            if set.insert(state) {
                stack.extend(self.states[state].epsilon.iter().copied());
            }
        }
        set
    }
}

#[derive(Debug, Clone)]
struct DfaState {
    next: Vec<Option<usize>>,
    accepting: bool,
}

/// Where a child sequence stopped matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The child at `index` is not allowed there.
    Unexpected {
        index: usize,
        found: NodeKind,
        expected: Vec<NodeKind>,
    },
    /// The sequence ended before the grammar was satisfied.
    Incomplete { expected: Vec<NodeKind> },
}

/// Deterministic matcher compiled from a content expression.
#[derive(Debug, Clone)]
pub struct ContentMatch {
    expr: String,
    states: Vec<DfaState>,
}

impl ContentMatch {
    pub fn compile(expr: &str) -> Result<Self, GrammarError> {
        let parsed = parse(expr)?;
        let mut nfa = Nfa::default();
        let (start, accept) = nfa.build(&parsed);

        let mut index: BTreeMap<BTreeSet<usize>, usize> = BTreeMap::new();
        let mut sets = vec![nfa.closure([start])];
        let mut states = Vec::new();
        index.insert(sets[0].clone(), 0);

        let mut cursor = 0;
        while cursor < sets.len() {
            let current = sets[cursor].clone();
            let mut next = vec![None; NodeKind::ALL.len()];
            for kind in NodeKind::ALL {
                let targets: Vec<usize> = current
                    .iter()
                    .flat_map(|&s| nfa.states[s].edges.iter())
                    .filter(|(set, _)| set.contains(kind))
                    .map(|(_, to)| *to)
                    .collect();
                if targets.is_empty() {
                    continue;
                }
                let target = nfa.closure(targets);
                let id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        sets.push(target.clone());
                        index.insert(target, sets.len() - 1);
                        sets.len() - 1
                    }
                };
                next[kind.index()] = Some(id);
            }
            states.push(DfaState {
                next,
                accepting: current.contains(&accept),
            });
            cursor += 1;
        }

        Ok(ContentMatch {
            expr: expr.to_string(),
            states,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// True when the grammar only accepts the empty sequence.
    pub fn is_leaf(&self) -> bool {
        self.states[0].next.iter().all(Option::is_none)
    }

    pub fn step(&self, state: usize, kind: NodeKind) -> Option<usize> {
        self.states[state].next[kind.index()]
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.states[state].accepting
    }

    pub fn expected(&self, state: usize) -> Vec<NodeKind> {
        NodeKind::ALL
            .into_iter()
            .filter(|kind| self.states[state].next[kind.index()].is_some())
            .collect()
    }

    /// Whether `kind` may appear anywhere in a sequence accepted by this grammar.
    pub fn allows(&self, kind: NodeKind) -> bool {
        self.states.iter().any(|state| state.next[kind.index()].is_some())
    }

    /// Whether `kind` may start a sequence accepted by this grammar.
    pub fn accepts_first(&self, kind: NodeKind) -> bool {
        self.step(0, kind).is_some()
    }

    pub fn matches<I>(&self, kinds: I) -> Result<(), Mismatch>
    where
        I: IntoIterator<Item = NodeKind>,
    {
        let mut state = 0;
        for (index, kind) in kinds.into_iter().enumerate() {
            state = match self.step(state, kind) {
                Some(next) => next,
                None => {
                    return Err(Mismatch::Unexpected {
                        index,
                        found: kind,
                        expected: self.expected(state),
                    })
                }
            };
        }
        if self.is_accepting(state) {
            Ok(())
        } else {
            Err(Mismatch::Incomplete {
                expected: self.expected(state),
            })
        }
    }
}
