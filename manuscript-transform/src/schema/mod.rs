//! Manuscript tree schema
//!
//!     The schema is the registry of node and mark kinds: for every kind it declares the attrs
//!     (with defaults), the content grammar over child kinds and a few classification flags.
//!     See kinds.rs for the declarations and content.rs for the grammar compiler.
//!
//!     Grammars are compiled into DFAs once, the first time the process-wide [`Schema`] is
//!     touched. After that the schema is immutable and shared by every import, export and
//!     migration; validation is a walk over a precompiled matcher.
//!
//!     Trees are built bottom-up through [`Node`]'s constructors, which reject any child
//!     sequence the grammar does not accept. There is no way to obtain an unvalidated `Node`.

pub mod content;
pub mod json;
pub mod kinds;
pub mod node;

pub use content::{ContentMatch, GrammarError, KindSet, Mismatch};
pub use json::{JsonMark, JsonNode};
pub use kinds::{Group, MarkKind, NodeKind};
pub use node::{Attrs, Mark, Node};

use crate::error::{ContentModelViolation, SchemaError};
use once_cell::sync::Lazy;

/// Default nesting limit for tree conversion and XML import.
pub const MAX_DEPTH: usize = 256;

/// Compiled content grammars, one per node kind.
pub struct Schema {
    matchers: Vec<ContentMatch>,
}

impl Schema {
    pub fn build() -> Result<Self, GrammarError> {
        let matchers = NodeKind::ALL
            .into_iter()
            .map(|kind| ContentMatch::compile(kind.spec().content))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema { matchers })
    }

    pub fn content_match(&self, kind: NodeKind) -> &ContentMatch {
        &self.matchers[kind.index()]
    }

    pub fn check_content(
        &self,
        kind: NodeKind,
        children: &[Node],
    ) -> Result<(), ContentModelViolation> {
        let kinds: Vec<NodeKind> = children.iter().map(Node::kind).collect();
        self.content_match(kind)
            .matches(kinds.iter().copied())
            .map_err(|mismatch| ContentModelViolation {
                kind,
                reason: describe(mismatch),
                children: kinds,
            })
    }
}

fn describe(mismatch: Mismatch) -> String {
    let list = |kinds: &[NodeKind]| {
        kinds
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    };
    match mismatch {
        Mismatch::Unexpected {
            index,
            found,
            expected,
        } if expected.is_empty() => {
            format!("`{found}` at position {index} is not allowed, no further content expected")
        }
        Mismatch::Unexpected {
            index,
            found,
            expected,
        } => format!(
            "`{found}` at position {index} is not allowed, expected one of: {}",
            list(&expected)
        ),
        Mismatch::Incomplete { expected } => {
            format!("content ended early, expected one of: {}", list(&expected))
        }
    }
}

static SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::build().expect("built-in content grammars are well-formed"));

/// The process-wide schema.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Validates a serialized tree, returning the typed tree.
pub fn validate(candidate: &JsonNode) -> Result<Node, SchemaError> {
    Node::from_json(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_grammar() {
        assert!(Schema::build().is_ok());
        assert!(schema().content_match(NodeKind::Citation).is_leaf());
        assert!(!schema().content_match(NodeKind::Paragraph).is_leaf());
    }

    #[test]
    fn violation_message_names_expected_kinds() {
        let err = schema()
            .check_content(NodeKind::BibliographySection, &[])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid content for `bibliography_section`: content ended early, expected one of: section_title"
        );
    }
}
