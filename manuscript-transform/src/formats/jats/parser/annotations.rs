//! Author-query annotations
//!
//! `<?AuthorQuery id="…" queryText="…"?>` instructions mark a point in the text. They cannot
//! survive conversion as such, so the first import stage swaps each one for an opaque token
//! carried in the text itself. Once the tree is built, [`extract_annotations`] finds the tokens
//! again, cuts them out of their text fields and records a comment whose selector is the
//! token's character offset in the field's remaining text. Where the field's grammar allows
//! it, a `highlight_marker` is left at that position. Tokens that were carried into attr
//! values, such as a reference title, are cut out of them too and give comments on the node
//! without a selector.

use super::pipeline::{ImportContext, XmlTransform};
use crate::error::FormatError;
use crate::ir::nodes::{XmlElement, XmlNode};
use crate::schema::{schema, Attrs, Node, NodeKind};
use serde_json::{json, Value};

pub const AUTHOR_QUERY_TARGET: &str = "AuthorQuery";

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// An author query waiting to be anchored.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnnotation {
    pub token: String,
    pub query_id: String,
    pub query_text: String,
}

/// Replaces author-query instructions with text tokens, in document order.
pub struct MarkAnnotations;

impl XmlTransform for MarkAnnotations {
    fn name(&self) -> &str {
        "mark-annotations"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        mark(&mut article, ctx);
        Ok(article)
    }
}

fn mark(el: &mut XmlElement, ctx: &mut ImportContext) {
    let mut children = Vec::with_capacity(el.children.len());
    for node in std::mem::take(&mut el.children) {
        let node = match node {
            XmlNode::ProcessingInstruction(pi) if pi.target == AUTHOR_QUERY_TARGET => {
                let token = format!(
                    "{TOKEN_OPEN}{}{TOKEN_CLOSE}",
                    ctx.ids.next("MPAuthorQuery")
                );
                ctx.annotations.push(PendingAnnotation {
                    token: token.clone(),
                    query_id: pi.pseudo_attr("id").unwrap_or_default(),
                    query_text: pi.pseudo_attr("queryText").unwrap_or_default(),
                });
                XmlNode::Text(token)
            }
            XmlNode::Element(mut child) => {
                mark(&mut child, ctx);
                XmlNode::Element(child)
            }
            other => other,
        };
        if let (Some(XmlNode::Text(previous)), XmlNode::Text(text)) = (children.last_mut(), &node) {
            previous.push_str(text);
            continue;
        }
        children.push(node);
    }
    el.children = children;
}

/// Removes every annotation token from `text`, returning the tokens in order of appearance.
pub fn take_tokens(text: &str) -> (String, Vec<String>) {
    let mut rest = String::new();
    let mut tokens = Vec::new();
    for piece in split_tokens(text) {
        match piece {
            Piece::Text(s) => rest.push_str(s),
            Piece::Token(t) => tokens.push(t.to_string()),
        }
    }
    (rest, tokens)
}

enum Piece<'a> {
    Text(&'a str),
    Token(&'a str),
}

fn split_tokens(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        let Some(len) = rest[start..].find(TOKEN_CLOSE) else {
            break;
        };
        let end = start + len + TOKEN_CLOSE.len_utf8();
        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        pieces.push(Piece::Token(&rest[start..end]));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn contains_token(node: &Node) -> bool {
    node.descendants().any(|n| {
        n.text().is_some_and(|text| text.contains(TOKEN_OPEN))
            || n.attrs().values().any(value_has_token)
    })
}

fn value_has_token(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(TOKEN_OPEN),
        Value::Array(items) => items.iter().any(value_has_token),
        Value::Object(map) => map.values().any(value_has_token),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Copy of `value` with the tokens cut out of its strings, at any depth.
fn strip_value(value: &Value, tokens: &mut Vec<String>) -> Value {
    match value {
        Value::String(s) => {
            let (rest, found) = take_tokens(s);
            if found.is_empty() {
                return Value::String(rest);
            }
            tokens.extend(found);
            Value::String(rest.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| strip_value(item, tokens)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), strip_value(item, tokens)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn allows_markers(kind: NodeKind) -> bool {
    schema().content_match(kind).allows(NodeKind::HighlightMarker)
}

struct Extractor<'a> {
    ctx: &'a mut ImportContext,
    comments: Vec<Node>,
    used: Vec<String>,
}

impl Extractor<'_> {
    fn rebuild(&mut self, node: &Node, anchor: &str) -> Result<Node, FormatError> {
        if !contains_token(node) {
            return Ok(node.clone());
        }
        let anchor = if node.id().is_empty() {
            anchor.to_string()
        } else {
            node.id().to_string()
        };
        let node = &self.strip_attrs(node, &anchor)?;
        if node.kind().is_textblock() {
            return self.rebuild_field(node, &anchor);
        }
        let content = node
            .content()
            .iter()
            .map(|child| self.rebuild(child, &anchor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(node.with_content(content)?)
    }

    fn strip_attrs(&mut self, node: &Node, anchor: &str) -> Result<Node, FormatError> {
        let mut tokens = Vec::new();
        let patch: Attrs = node
            .attrs()
            .iter()
            .filter(|(_, value)| value_has_token(value))
            .map(|(name, value)| (name.clone(), strip_value(value, &mut tokens)))
            .collect();
        if patch.is_empty() {
            return Ok(node.clone());
        }
        for token in &tokens {
            self.comment(token, anchor, None)?;
        }
        Ok(node.with_attrs(patch)?)
    }

    fn rebuild_field(&mut self, node: &Node, anchor: &str) -> Result<Node, FormatError> {
        let markers = allows_markers(node.kind());
        let mut offset = 0;
        let mut content = Vec::with_capacity(node.content().len());
        for child in node.content() {
            let Some(text) = child.text() else {
                let rebuilt = self.rebuild(child, anchor)?;
                offset += rebuilt.text_content().chars().count();
                content.push(rebuilt);
                continue;
            };
            for piece in split_tokens(text) {
                match piece {
                    Piece::Text(s) => {
                        offset += s.chars().count();
                        content.push(Node::new_text(s, child.marks().to_vec())?);
                    }
                    Piece::Token(token) => {
                        let Some(comment_id) = self.comment(token, anchor, Some(offset))? else {
                            continue;
                        };
                        if markers {
                            content.push(marker(&comment_id, anchor)?);
                        }
                    }
                }
            }
        }
        Ok(node.with_content(content)?)
    }

    /// Records the comment for `token`; `None` when the token is not a known annotation.
    fn comment(
        &mut self,
        token: &str,
        anchor: &str,
        offset: Option<usize>,
    ) -> Result<Option<String>, FormatError> {
        let Some(annotation) = self.ctx.annotation(token).cloned() else {
            return Ok(None);
        };
        let id = self.ctx.ids.for_kind(NodeKind::Comment);
        let selector = offset
            .map(|at| json!({"from": at, "to": at}))
            .unwrap_or(Value::Null);
        let mut attrs = Attrs::new();
        attrs.insert("id".into(), json!(id));
        attrs.insert("target".into(), json!(anchor));
        attrs.insert("contents".into(), json!(annotation.query_text));
        attrs.insert("selector".into(), selector);
        self.comments.push(Node::leaf(NodeKind::Comment, attrs)?);
        self.used.push(annotation.token);
        Ok(Some(id))
    }
}

fn marker(comment_id: &str, target: &str) -> Result<Node, FormatError> {
    let mut attrs = Attrs::new();
    attrs.insert("id".into(), json!(comment_id));
    attrs.insert("tid".into(), json!(target));
    Ok(Node::leaf(NodeKind::HighlightMarker, attrs)?)
}

/// Turns the annotation tokens left in `manuscript` into comments and markers.
///
/// Comments are appended to the manuscript in a `comments` node, in the order their tokens
/// appear in the document. Tokens that ended up between blocks are anchored to the enclosing
/// element without a selector.
pub fn extract_annotations(manuscript: Node, ctx: &mut ImportContext) -> Result<Node, FormatError> {
    if ctx.annotations.is_empty() {
        return Ok(manuscript);
    }
    let root_id = manuscript.id().to_string();
    let orphans = std::mem::take(&mut ctx.orphan_tokens);
    let mut extractor = Extractor {
        ctx,
        comments: Vec::new(),
        used: Vec::new(),
    };
    let manuscript = extractor.rebuild(&manuscript, &root_id)?;
    for (token, anchor) in orphans {
        let anchor = if anchor.is_empty() { &root_id } else { &anchor };
        extractor.comment(&token, anchor, None)?;
    }

    let Extractor { ctx, comments, used } = extractor;
    for annotation in &ctx.annotations {
        if !used.contains(&annotation.token) {
            tracing::warn!(
                query = %annotation.query_id,
                "Author query has no anchor in the converted document, dropping it"
            );
        }
    }
    if comments.is_empty() {
        return Ok(manuscript);
    }

    let mut attrs = Attrs::new();
    attrs.insert("id".into(), json!(ctx.ids.for_kind(NodeKind::Comments)));
    let comments = Node::new(NodeKind::Comments, attrs, comments)?;
    let mut content = manuscript.content().to_vec();
    content.push(comments);
    Ok(manuscript.with_content(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::ProcessingInstruction;

    fn query(id: &str, text: &str) -> XmlNode {
        XmlNode::ProcessingInstruction(ProcessingInstruction::with_pseudo_attrs(
            AUTHOR_QUERY_TARGET,
            &[("id", id), ("queryText", text)],
        ))
    }

    #[test]
    fn marking_replaces_queries_in_document_order() {
        let mut p = XmlElement::new("p").with_text("one ");
        p.push(query("Q1", "first?"));
        p.push(XmlNode::Text(" two".into()));
        p.push(query("Q2", "second?"));
        let article = XmlElement::new("article").with_child(p);

        let mut ctx = ImportContext::default();
        let article = MarkAnnotations.transform(article, &mut ctx).unwrap();
        assert_eq!(ctx.annotations.len(), 2);
        assert_eq!(ctx.annotations[0].query_text, "first?");

        let p = article.child("p").unwrap();
        assert_eq!(p.children.len(), 1, "tokens merge into the surrounding text");
        let (rest, tokens) = take_tokens(&p.text_content());
        assert_eq!(rest, "one  two");
        assert_eq!(tokens, vec![
            ctx.annotations[0].token.clone(),
            ctx.annotations[1].token.clone()
        ]);
    }

    #[test]
    fn other_instructions_are_kept() {
        let mut article = XmlElement::new("article");
        article.push(XmlNode::ProcessingInstruction(ProcessingInstruction::new(
            "page", "5",
        )));
        let mut ctx = ImportContext::default();
        let article = MarkAnnotations.transform(article, &mut ctx).unwrap();
        assert!(ctx.annotations.is_empty());
        assert!(matches!(
            article.children[0],
            XmlNode::ProcessingInstruction(_)
        ));
    }

    fn text(s: &str) -> Node {
        Node::new_text(s, vec![]).unwrap()
    }

    fn manuscript_with(paragraph_text: &str) -> Node {
        let mut pattrs = Attrs::new();
        pattrs.insert("id".into(), json!("p1"));
        let paragraph = Node::new(NodeKind::Paragraph, pattrs, vec![text(paragraph_text)]).unwrap();
        let section = Node::new(
            NodeKind::Section,
            Attrs::new(),
            vec![
                Node::new(NodeKind::SectionTitle, Attrs::new(), vec![]).unwrap(),
                paragraph,
            ],
        )
        .unwrap();
        let mut mattrs = Attrs::new();
        mattrs.insert("id".into(), json!("m1"));
        Node::new(
            NodeKind::Manuscript,
            mattrs,
            vec![
                Node::new(NodeKind::Title, Attrs::new(), vec![text("T")]).unwrap(),
                section,
            ],
        )
        .unwrap()
    }

    #[test]
    fn extraction_leaves_a_marker_at_the_token_offset() {
        let mut ctx = ImportContext::default();
        let token = format!("{TOKEN_OPEN}q{TOKEN_CLOSE}");
        ctx.annotations.push(PendingAnnotation {
            token: token.clone(),
            query_id: "Q1".into(),
            query_text: "Check this".into(),
        });
        let manuscript = manuscript_with(&format!("Hello{token} world"));
        let out = extract_annotations(manuscript, &mut ctx).unwrap();

        let paragraph = out
            .descendants()
            .find(|n| n.kind() == NodeKind::Paragraph)
            .unwrap();
        assert_eq!(paragraph.text_content(), "Hello world");
        let kinds: Vec<_> = paragraph.content().iter().map(Node::kind).collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::HighlightMarker, NodeKind::Text]);

        let comments = out.content().last().unwrap();
        assert_eq!(comments.kind(), NodeKind::Comments);
        let comment = &comments.content()[0];
        assert_eq!(comment.attr_str("target"), "p1");
        assert_eq!(comment.attr_str("contents"), "Check this");
        assert_eq!(comment.attr("selector"), Some(&json!({"from": 5, "to": 5})));
        assert_eq!(paragraph.content()[1].attr_str("id"), comment.id());
    }

    #[test]
    fn orphan_tokens_anchor_without_selector() {
        let mut ctx = ImportContext::default();
        let token = format!("{TOKEN_OPEN}q{TOKEN_CLOSE}");
        ctx.annotations.push(PendingAnnotation {
            token: token.clone(),
            query_id: "Q1".into(),
            query_text: "Between blocks".into(),
        });
        ctx.orphan_tokens.push((token, "sec1".into()));
        let out = extract_annotations(manuscript_with("plain"), &mut ctx).unwrap();
        let comment = &out.content().last().unwrap().content()[0];
        assert_eq!(comment.attr_str("target"), "sec1");
        assert_eq!(comment.attr("selector"), Some(&Value::Null));
    }

    #[test]
    fn tokens_in_attrs_become_unanchored_comments() {
        let mut ctx = ImportContext::default();
        let token = format!("{TOKEN_OPEN}q{TOKEN_CLOSE}");
        ctx.annotations.push(PendingAnnotation {
            token: token.clone(),
            query_id: "Q1".into(),
            query_text: "Check the title".into(),
        });
        let mut attrs = Attrs::new();
        attrs.insert("id".into(), json!("r1"));
        attrs.insert("title".into(), json!(format!("On testing{token}")));
        attrs.insert("author".into(), json!([{"family": format!("Smith {token}")}]));
        let item = Node::leaf(NodeKind::BibliographyItem, attrs).unwrap();
        let mut extractor = Extractor {
            ctx: &mut ctx,
            comments: Vec::new(),
            used: Vec::new(),
        };
        let out = extractor.strip_attrs(&item, "r1").unwrap();
        assert_eq!(out.attr_str("title"), "On testing");
        assert_eq!(out.attr("author"), Some(&json!([{"family": "Smith"}])));

        assert_eq!(extractor.comments.len(), 2);
        for comment in &extractor.comments {
            assert_eq!(comment.attr_str("target"), "r1");
            assert_eq!(comment.attr("selector"), Some(&Value::Null));
        }
    }

    #[test]
    fn no_annotations_no_comments() {
        let mut ctx = ImportContext::default();
        let manuscript = manuscript_with("plain");
        let out = extract_annotations(manuscript.clone(), &mut ctx).unwrap();
        assert_eq!(out, manuscript);
    }
}
