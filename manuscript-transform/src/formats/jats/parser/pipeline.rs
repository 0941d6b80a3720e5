//! Importer transform pipeline
//!
//! Normalization runs as a flat, ordered sequence of [`XmlTransform`] stages. Each stage takes
//! ownership of the article element and returns the rewritten article; no stage sees a
//! half-rewritten tree and no stage iterates a list it is mutating. A stage that finds nothing
//! to do returns its input unchanged.

use super::annotations::PendingAnnotation;
use crate::error::FormatError;
use crate::formats::jats::{ImportOptions, Journal};
use crate::ir::nodes::XmlElement;
use crate::schema::NodeKind;
use std::collections::HashMap;
use uuid::Uuid;

/// One normalization stage over the `<article>` element.
pub trait XmlTransform: Send + Sync {
    /// Human-readable name, used for logging.
    fn name(&self) -> &str;

    fn transform(
        &self,
        article: XmlElement,
        ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError>;
}

/// Ordered stages; transforms run in insertion order.
pub struct TransformPipeline {
    transforms: Vec<Box<dyn XmlTransform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    pub fn push(&mut self, transform: Box<dyn XmlTransform>) {
        self.transforms.push(transform);
    }

    pub fn extend(&mut self, transforms: impl IntoIterator<Item = Box<dyn XmlTransform>>) {
        self.transforms.extend(transforms);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Runs every stage in order, stopping at the first error.
    pub fn execute(
        &self,
        mut article: XmlElement,
        ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        for transform in &self.transforms {
            tracing::debug!(stage = transform.name(), "Running import stage");
            article = transform.transform(article, ctx)?;
        }
        Ok(article)
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic id source: identical input yields identical ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn next(&mut self, prefix: &str) -> String {
        self.counter += 1;
        let seed = format!("{prefix}:{}", self.counter);
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        format!("{prefix}:{}", uuid.to_string().to_uppercase())
    }

    /// Id for a node of `kind`, e.g. `MPFigureElement:…`.
    pub fn for_kind(&mut self, kind: NodeKind) -> String {
        self.next(&id_prefix(kind))
    }
}

/// `figure_element` → `MPFigureElement`
pub fn id_prefix(kind: NodeKind) -> String {
    let mut prefix = String::from("MP");
    for part in kind.name().split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            prefix.extend(first.to_uppercase());
            prefix.push_str(chars.as_str());
        }
    }
    prefix
}

/// State shared by the stages and the conversion pass of one import.
#[derive(Debug, Default)]
pub struct ImportContext {
    pub options: ImportOptions,
    pub ids: IdGenerator,
    /// Annotation tokens inserted by the marking stage, in document order.
    pub annotations: Vec<PendingAnnotation>,
    /// Tokens that ended up outside any text field, with the id of the enclosing element.
    pub orphan_tokens: Vec<(String, String)>,
    /// Source reference id → bibliography item id.
    pub reference_ids: HashMap<String, String>,
    pub journal: Option<Journal>,
}

impl ImportContext {
    pub fn new(options: ImportOptions) -> Self {
        ImportContext {
            options,
            ..Default::default()
        }
    }

    /// The annotation whose token is exactly `token`.
    pub fn annotation(&self, token: &str) -> Option<&PendingAnnotation> {
        self.annotations.iter().find(|a| a.token == token)
    }
}
