//! Validated tree nodes
//!
//! A [`Node`] can only be obtained through a validating constructor, so holding one means its
//! children satisfy its kind's grammar and its attrs are exactly the declared set. Nodes are
//! never mutated after construction; the `with_*` helpers build a new node.

use super::json::{JsonMark, JsonNode};
use super::kinds::{AttrSpec, MarkKind, NodeKind};
use super::{schema, MAX_DEPTH};
use crate::error::SchemaError;
use serde_json::{Map, Value};

pub type Attrs = Map<String, Value>;

/// Applies declared defaults and drops attrs the kind does not declare.
fn resolve_attrs(spec: AttrSpec, mut given: Attrs) -> Attrs {
    let mut attrs = Attrs::new();
    for (name, default) in spec {
        let value = given
            .remove(*name)
            .unwrap_or_else(|| default.to_value());
        attrs.insert(name.to_string(), value);
    }
    attrs
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    kind: MarkKind,
    attrs: Attrs,
}

impl Mark {
    pub fn new(kind: MarkKind, attrs: Attrs) -> Self {
        Mark {
            kind,
            attrs: resolve_attrs(kind.attrs(), attrs),
        }
    }

    pub fn plain(kind: MarkKind) -> Self {
        Self::new(kind, Attrs::new())
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr_str(&self, name: &str) -> &str {
        self.attrs.get(name).and_then(Value::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    attrs: Attrs,
    content: Vec<Node>,
    text: Option<String>,
    marks: Vec<Mark>,
}

impl Node {
    /// Builds a non-text node, validating `content` against the kind's grammar.
    pub fn new(kind: NodeKind, attrs: Attrs, content: Vec<Node>) -> Result<Self, SchemaError> {
        if kind == NodeKind::Text {
            return Err(SchemaError::MissingText);
        }
        schema().check_content(kind, &content)?;
        Ok(Node {
            kind,
            attrs: resolve_attrs(kind.spec().attrs, attrs),
            content,
            text: None,
            marks: Vec::new(),
        })
    }

    pub fn leaf(kind: NodeKind, attrs: Attrs) -> Result<Self, SchemaError> {
        Self::new(kind, attrs, Vec::new())
    }

    /// Builds a text node. Marks are kept as an ordered set, one per mark kind.
    pub fn new_text(text: impl Into<String>, mut marks: Vec<Mark>) -> Result<Self, SchemaError> {
        let text = text.into();
        if text.is_empty() {
            return Err(SchemaError::EmptyText);
        }
        marks.sort_by_key(Mark::kind);
        marks.dedup_by_key(|mark| mark.kind());
        Ok(Node {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: Some(text),
            marks,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// String attr, or `""` when absent, null or not a string.
    pub fn attr_str(&self, name: &str) -> &str {
        self.attr(name).and_then(Value::as_str).unwrap_or("")
    }

    pub fn id(&self) -> &str {
        self.attr_str("id")
    }

    pub fn content(&self) -> &[Node] {
        &self.content
    }

    pub fn into_content(self) -> Vec<Node> {
        self.content
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn has_mark(&self, kind: MarkKind) -> bool {
        self.marks.iter().any(|mark| mark.kind == kind)
    }

    /// Concatenated text of every text node below (and including) this one.
    pub fn text_content(&self) -> String {
        self.descendants().filter_map(Node::text).collect()
    }

    /// Pre-order traversal starting with this node.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Same node with `patch` merged over its attrs.
    pub fn with_attrs(&self, patch: Attrs) -> Result<Node, SchemaError> {
        let mut attrs = self.attrs.clone();
        attrs.extend(patch);
        match self.kind {
            NodeKind::Text => Ok(self.clone()),
            kind => Node::new(kind, attrs, self.content.clone()),
        }
    }

    /// Same node with different children, validated again.
    pub fn with_content(&self, content: Vec<Node>) -> Result<Node, SchemaError> {
        Node::new(self.kind, self.attrs.clone(), content)
    }

    pub fn to_json(&self) -> JsonNode {
        let mut json = JsonNode::new(self.kind.name());
        json.attrs = self.attrs.clone();
        json.text = self.text.clone();
        if !self.marks.is_empty() {
            json.marks = Some(
                self.marks
                    .iter()
                    .map(|mark| JsonMark {
                        kind: mark.kind.name().to_string(),
                        attrs: mark.attrs.clone(),
                    })
                    .collect(),
            );
        }
        if !self.content.is_empty() {
            json.content = Some(self.content.iter().map(Node::to_json).collect());
        }
        json
    }

    pub fn from_json(json: &JsonNode) -> Result<Node, SchemaError> {
        Self::from_json_with_limit(json, MAX_DEPTH)
    }

    pub fn from_json_with_limit(json: &JsonNode, max_depth: usize) -> Result<Node, SchemaError> {
        from_json_at(json, 0, max_depth)
    }
}

fn from_json_at(json: &JsonNode, depth: usize, max_depth: usize) -> Result<Node, SchemaError> {
    if depth > max_depth {
        return Err(SchemaError::TooDeep(max_depth));
    }
    let kind =
        NodeKind::from_name(&json.kind).ok_or_else(|| SchemaError::UnknownKind(json.kind.clone()))?;

    if kind == NodeKind::Text {
        let text = json.text.clone().ok_or(SchemaError::MissingText)?;
        let marks = json
            .marks
            .iter()
            .flatten()
            .map(|mark| {
                MarkKind::from_name(&mark.kind)
                    .map(|kind| Mark::new(kind, mark.attrs.clone()))
                    .ok_or_else(|| SchemaError::UnknownMark(mark.kind.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Node::new_text(text, marks);
    }

    if json.text.is_some() {
        return Err(SchemaError::UnexpectedText(kind));
    }
    let content = json
        .children()
        .iter()
        .map(|child| from_json_at(child, depth + 1, max_depth))
        .collect::<Result<Vec<_>, _>>()?;
    Node::new(kind, json.attrs.clone(), content)
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.content.iter().rev());
        Some(node)
    }
}
