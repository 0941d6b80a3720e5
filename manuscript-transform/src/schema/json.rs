//! Serialized tree shape
//!
//! [`JsonNode`] is the persisted, unvalidated form of a tree: `{kind, attrs, content?, text?,
//! marks?}`. Migration scripts rewrite this shape; [`crate::schema::Node::from_json`] turns it
//! into a validated tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonNode {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<JsonNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<JsonMark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMark {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl JsonNode {
    pub fn new(kind: impl Into<String>) -> Self {
        JsonNode {
            kind: kind.into(),
            attrs: Map::new(),
            content: None,
            text: None,
            marks: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_content(mut self, content: Vec<JsonNode>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        let mut node = JsonNode::new("text");
        node.text = Some(text.into());
        node
    }

    pub fn children(&self) -> &[JsonNode] {
        self.content.as_deref().unwrap_or(&[])
    }

    /// Rebuilds the node with every child passed through `f`.
    pub fn map_children<F>(mut self, f: F) -> Self
    where
        F: FnMut(JsonNode) -> JsonNode,
    {
        self.content = self
            .content
            .map(|children| children.into_iter().map(f).collect());
        self
    }
}
