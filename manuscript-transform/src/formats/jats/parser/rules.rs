//! Element → node conversion
//!
//!     Runs once the normalization stages are done. Every JATS element the importer understands
//!     has a rule here; the rule decides the node kind, reads the attrs and converts the
//!     children in one of two contexts:
//!
//!         block   children are elements; whitespace between them is dropped
//!         inline  text is kept with whitespace runs collapsed, formatting elements become
//!                 marks on the text they wrap, and the result is trimmed at both ends
//!
//!     An element without a rule is skipped when it holds nothing but whitespace and rejected
//!     with `InvalidInput` otherwise. A rule whose output breaks its kind's grammar fails with
//!     `FormatError::Conversion`, carrying the path of the offending element.

use super::annotations::take_tokens;
use super::front::{
    AFFILIATIONS_FRAGMENT, AUTHOR_NOTES_FRAGMENT, CONTRIBUTORS_FRAGMENT, COUNTS, HISTORY_DATES,
    SUPPLEMENTS_FRAGMENT, TITLE_FRAGMENT,
};
use super::pipeline::ImportContext;
use super::references::bibliography_item;
use super::stages::group_figure;
use crate::common::section_category::{kind_for_category, resolve_category};
use crate::error::{FormatError, SchemaError};
use crate::ir::nodes::{XmlElement, XmlNode};
use crate::ir::to_xml::write_fragment;
use crate::ir::MATHML_NS;
use crate::schema::{Attrs, Mark, MarkKind, Node, NodeKind};
use serde_json::{json, Value};

/// Elements whose content is kept but which produce no node of their own inline.
const TRANSPARENT_INLINE: &[&str] = &[
    "named-content",
    "abbrev",
    "email",
    "institution",
    "span",
    "p",
];

/// Metadata elements skipped wherever they appear in block context.
const IGNORED: &[&str] = &[
    "object-id",
    "alt-text",
    "long-desc",
    "permissions",
    "title",
    "label",
];

const ORDERED_LIST_TYPES: &[&str] = &[
    "order",
    "alpha-lower",
    "alpha-upper",
    "roman-lower",
    "roman-upper",
];

fn mark_for(name: &str, el: &XmlElement) -> Option<Mark> {
    let kind = match name {
        "bold" => MarkKind::Bold,
        "italic" => MarkKind::Italic,
        "sc" => MarkKind::Smallcaps,
        "sub" => MarkKind::Subscript,
        "sup" => MarkKind::Superscript,
        "underline" => MarkKind::Underline,
        "monospace" => MarkKind::Code,
        "strike" => MarkKind::Strikethrough,
        "styled-content" => {
            let mut attrs = Attrs::new();
            attrs.insert("rid".into(), json!(el.attr("style").unwrap_or_default()));
            return Some(Mark::new(MarkKind::Styled, attrs));
        }
        _ => return None,
    };
    Some(Mark::plain(kind))
}

/// Collapses every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineMode {
    /// Atoms and links are produced.
    Full,
    /// Only (marked) text; other elements contribute their text.
    TextOnly,
}

enum Piece {
    Text(String, Vec<Mark>),
    Node(Node),
}

fn finish_inline(pieces: Vec<Piece>) -> Result<Vec<Node>, SchemaError> {
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        if let (Some(Piece::Text(text, marks)), Piece::Text(next, next_marks)) =
            (merged.last_mut(), &piece)
        {
            if marks == next_marks {
                text.push_str(next);
                *text = collapse_whitespace(text);
                continue;
            }
        }
        merged.push(piece);
    }
    if let Some(Piece::Text(text, _)) = merged.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(Piece::Text(text, _)) = merged.last_mut() {
        *text = text.trim_end().to_string();
    }

    let mut nodes = Vec::with_capacity(merged.len());
    for piece in merged {
        match piece {
            Piece::Text(text, _) if text.is_empty() => {}
            Piece::Text(text, marks) => nodes.push(Node::new_text(text, marks)?),
            Piece::Node(node) => nodes.push(node),
        }
    }
    Ok(nodes)
}

fn words(text: &str) -> String {
    collapse_whitespace(text).trim().to_string()
}

fn text_of(el: &XmlElement, name: &str) -> Option<String> {
    el.child(name)
        .map(|child| words(&take_tokens(&child.text_content()).0))
        .filter(|text| !text.is_empty())
}

fn rids(el: &XmlElement) -> Value {
    json!(el
        .attr("rid")
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>())
}

fn attrs_of<const N: usize>(pairs: [(&str, Value); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

struct Converter<'a> {
    ctx: &'a mut ImportContext,
    path: Vec<String>,
}

/// Converts a normalized `<article>` into a manuscript tree.
pub fn convert_article(article: &XmlElement, ctx: &mut ImportContext) -> Result<Node, FormatError> {
    let mut converter = Converter {
        ctx,
        path: Vec::new(),
    };
    converter.scoped(article, |c| c.manuscript(article))
}

impl Converter<'_> {
    fn scoped<T>(
        &mut self,
        el: &XmlElement,
        f: impl FnOnce(&mut Self) -> Result<T, FormatError>,
    ) -> Result<T, FormatError> {
        let segment = match el.non_empty_attr("id") {
            Some(id) => format!("{}#{id}", el.name),
            None => el.name.clone(),
        };
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }

    fn fail(&self, source: SchemaError) -> FormatError {
        FormatError::Conversion {
            path: self.path(),
            source,
        }
    }

    fn build(&self, kind: NodeKind, attrs: Attrs, content: Vec<Node>) -> Result<Node, FormatError> {
        Node::new(kind, attrs, content).map_err(|e| self.fail(e))
    }

    fn id_for(&mut self, el: &XmlElement, kind: NodeKind) -> String {
        match el.non_empty_attr("id") {
            Some(id) => id.to_string(),
            None => self.ctx.ids.for_kind(kind),
        }
    }

    fn unsupported(&self, el: &XmlElement) -> FormatError {
        FormatError::InvalidInput(format!(
            "no conversion for <{}> at {}",
            el.name,
            self.path()
        ))
    }

    /// Handles text met in block context: tokens become orphans, anything else is an error.
    fn stray_text(&mut self, text: &str, anchor: &str) -> Result<(), FormatError> {
        let (rest, tokens) = take_tokens(text);
        if !rest.trim().is_empty() {
            return Err(FormatError::InvalidInput(format!(
                "unexpected text {:?} at {}",
                words(&rest),
                self.path()
            )));
        }
        for token in tokens {
            self.ctx.orphan_tokens.push((token, anchor.to_string()));
        }
        Ok(())
    }

    // ---- inline context ----

    fn inline(&mut self, nodes: &[XmlNode], mode: InlineMode) -> Result<Vec<Node>, FormatError> {
        let mut pieces = Vec::new();
        self.inline_into(nodes, &[], mode, &mut pieces)?;
        finish_inline(pieces).map_err(|e| self.fail(e))
    }

    fn inline_into(
        &mut self,
        nodes: &[XmlNode],
        marks: &[Mark],
        mode: InlineMode,
        out: &mut Vec<Piece>,
    ) -> Result<(), FormatError> {
        for node in nodes {
            match node {
                XmlNode::Text(text) => out.push(Piece::Text(collapse_whitespace(text), marks.to_vec())),
                XmlNode::Element(el) => self.inline_element(el, marks, mode, out)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        Ok(())
    }

    fn inline_element(
        &mut self,
        el: &XmlElement,
        marks: &[Mark],
        mode: InlineMode,
        out: &mut Vec<Piece>,
    ) -> Result<(), FormatError> {
        if let Some(mark) = mark_for(&el.name, el) {
            let mut inner = marks.to_vec();
            inner.retain(|m| m.kind() != mark.kind());
            inner.push(mark);
            inner.sort_by_key(Mark::kind);
            return self.inline_into(&el.children, &inner, mode, out);
        }
        if TRANSPARENT_INLINE.contains(&el.name.as_str()) {
            return self.inline_into(&el.children, marks, mode, out);
        }
        if mode == InlineMode::TextOnly {
            if el.is("break") {
                out.push(Piece::Text(" ".into(), marks.to_vec()));
                return Ok(());
            }
            return self.inline_into(&el.children, marks, mode, out);
        }

        let node = self.scoped(el, |c| c.inline_atom(el, marks))?;
        match node {
            Some((node, tokens)) => {
                out.push(Piece::Node(node));
                if !tokens.is_empty() {
                    out.push(Piece::Text(tokens.concat(), marks.to_vec()));
                }
            }
            None if el.has_meaningful_content() => return Err(self.unsupported(el)),
            None => {}
        }
        Ok(())
    }

    /// Inline rule for `el`, with any annotation tokens found in atom text.
    fn inline_atom(
        &mut self,
        el: &XmlElement,
        marks: &[Mark],
    ) -> Result<Option<(Node, Vec<String>)>, FormatError> {
        let (text, tokens) = take_tokens(&el.text_content());
        let text = words(&text);
        let node = match el.name.as_str() {
            "xref" => {
                let (kind, text_attr) = match el.attr("ref-type") {
                    Some("bibr") => (NodeKind::Citation, "contents"),
                    Some("fn") | Some("table-fn") => (NodeKind::InlineFootnote, "contents"),
                    _ => (NodeKind::CrossReference, "label"),
                };
                let attrs = attrs_of([
                    ("id", json!(self.id_for(el, kind))),
                    ("rids", rids(el)),
                    (text_attr, json!(text)),
                ]);
                self.build(kind, attrs, vec![])?
            }
            "ext-link" | "uri" => {
                let href = el
                    .non_empty_attr("xlink:href")
                    .map(str::to_string)
                    .unwrap_or_else(|| text.clone());
                let attrs = attrs_of([
                    ("href", json!(href)),
                    ("title", json!(el.attr("xlink:title").unwrap_or_default())),
                ]);
                let mut pieces = Vec::new();
                self.inline_into(&el.children, marks, InlineMode::TextOnly, &mut pieces)?;
                let content = finish_inline(pieces).map_err(|e| self.fail(e))?;
                return Ok(Some((self.build(NodeKind::Link, attrs, content)?, Vec::new())));
            }
            "inline-formula" | "disp-formula" => {
                let (content, format) = match formula(el)? {
                    Some(Formula::Tex(tex)) => (tex, "tex"),
                    Some(Formula::MathMl(mathml)) => (mathml, "mathml"),
                    None => (text, "tex"),
                };
                let attrs = attrs_of([
                    ("id", json!(self.id_for(el, NodeKind::InlineEquation))),
                    ("content", json!(content)),
                    ("format", json!(format)),
                ]);
                self.build(NodeKind::InlineEquation, attrs, vec![])?
            }
            "break" => self.build(NodeKind::HardBreak, Attrs::new(), vec![])?,
            _ => return Ok(None),
        };
        Ok(Some((node, tokens)))
    }

    // ---- manuscript and front matter ----

    fn manuscript(&mut self, article: &XmlElement) -> Result<Node, FormatError> {
        let mut attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Manuscript)))]);
        if let Some(doi) = article.non_empty_attr("doi") {
            attrs.insert("doi".into(), json!(doi));
        }
        if let Some(article_type) = article.non_empty_attr("article-type") {
            attrs.insert("articleType".into(), json!(article_type));
        }
        if let Some(lang) = article.non_empty_attr("xml:lang") {
            attrs.insert("primaryLanguageCode".into(), json!(lang));
        }
        let numeric = COUNTS.iter().chain(HISTORY_DATES).map(|(_, attr)| *attr);
        for attr in numeric {
            if let Some(value) = article.attr(attr).and_then(|v| v.parse::<i64>().ok()) {
                attrs.insert(attr.into(), json!(value));
            }
        }

        let mut content = Vec::new();
        match article.child(TITLE_FRAGMENT) {
            Some(title) => content.push(self.scoped(title, |c| c.title(title))?),
            None => {
                let text = Node::new_text(self.ctx.options.default_title.clone(), vec![])
                    .map_err(|e| self.fail(e))?;
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Title)))]);
                content.push(self.build(NodeKind::Title, attrs, vec![text])?);
            }
        }
        if let Some(el) = article.child(CONTRIBUTORS_FRAGMENT) {
            content.push(self.scoped(el, |c| c.contributors(el))?);
        }
        if let Some(el) = article.child(AFFILIATIONS_FRAGMENT) {
            content.push(self.scoped(el, |c| c.affiliations(el))?);
        }
        if let Some(el) = article.child(AUTHOR_NOTES_FRAGMENT) {
            content.push(self.scoped(el, |c| c.author_notes(el))?);
        }
        if let Some(el) = article.child(SUPPLEMENTS_FRAGMENT) {
            content.push(self.scoped(el, |c| c.supplements(el))?);
        }
        if let Some(body) = article.child("body") {
            for node in &body.children {
                match node {
                    XmlNode::Element(sec) if sec.is("sec") => {
                        content.push(self.scoped(sec, |c| c.section(sec))?)
                    }
                    XmlNode::Element(other) if !other.has_meaningful_content() => {}
                    XmlNode::Element(other) => return Err(self.unsupported(other)),
                    XmlNode::Text(text) => {
                        let anchor = attrs.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
                        self.stray_text(text, &anchor)?
                    }
                    XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
                }
            }
        }
        if let Some(back) = article.child("back") {
            for el in back.elements().filter(|el| el.has_meaningful_content()) {
                tracing::warn!(element = %el.name, "Dropping back matter without a counterpart");
            }
        }
        self.build(NodeKind::Manuscript, attrs, content)
    }

    fn title(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Title)))]);
        let content = self.inline(&el.children, InlineMode::TextOnly)?;
        self.build(NodeKind::Title, attrs, content)
    }

    fn contributors(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let mut content = Vec::new();
        for contrib in el.elements_named("contrib") {
            content.push(self.scoped(contrib, |c| c.contributor(contrib))?);
        }
        let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Contributors)))]);
        self.build(NodeKind::Contributors, attrs, content)
    }

    fn contributor(&mut self, contrib: &XmlElement) -> Result<Node, FormatError> {
        let name = contrib
            .child("name")
            .or_else(|| contrib.child("string-name"));
        let bibliographic_name = match name {
            Some(name) => json!({
                "given": text_of(name, "given-names").unwrap_or_default(),
                "family": text_of(name, "surname").unwrap_or_default(),
            }),
            None => Value::Null,
        };
        let xrefs = |ref_type: &str| {
            contrib
                .elements_named("xref")
                .filter(|xref| xref.attr("ref-type") == Some(ref_type))
                .map(|xref| {
                    (
                        xref.attr("rid").unwrap_or_default().to_string(),
                        words(&xref.text_content()),
                    )
                })
                .collect::<Vec<_>>()
        };
        let affiliations: Vec<String> = xrefs("aff")
            .into_iter()
            .flat_map(|(rid, _)| {
                rid.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let footnotes: Vec<Value> = xrefs("fn")
            .into_iter()
            .map(|(rid, label)| json!({"noteID": rid, "noteLabel": label}))
            .collect();
        let corresp: Vec<Value> = xrefs("corresp")
            .into_iter()
            .map(|(rid, label)| json!({"correspID": rid, "correspLabel": label}))
            .collect();
        let email = text_of(contrib, "email")
            .or_else(|| contrib.child("address").and_then(|a| text_of(a, "email")))
            .unwrap_or_default();
        let orcid = contrib
            .elements_named("contrib-id")
            .find(|id| id.attr("contrib-id-type") == Some("orcid"))
            .map(|id| words(&id.text_content()))
            .unwrap_or_default();
        let priority = contrib
            .attr("priority")
            .and_then(|p| p.parse::<i64>().ok())
            .map_or(Value::Null, |p| json!(p));

        let attrs = attrs_of([
            ("id", json!(self.id_for(contrib, NodeKind::Contributor))),
            ("role", json!(contrib.non_empty_attr("contrib-type").unwrap_or("author"))),
            ("email", json!(email)),
            (
                "isCorresponding",
                json!(contrib.attr("corresp") == Some("yes") || !corresp.is_empty()),
            ),
            ("bibliographicName", bibliographic_name),
            ("priority", priority),
            ("isJointContributor", json!(contrib.attr("equal-contrib") == Some("yes"))),
            ("ORCIDIdentifier", json!(orcid)),
            ("affiliations", json!(affiliations)),
            ("footnote", json!(footnotes)),
            ("corresp", json!(corresp)),
        ]);
        self.build(NodeKind::Contributor, attrs, vec![])
    }

    fn affiliations(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let mut content = Vec::new();
        for aff in el.elements_named("aff") {
            content.push(self.scoped(aff, |c| c.affiliation(aff))?);
        }
        let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Affiliations)))]);
        self.build(NodeKind::Affiliations, attrs, content)
    }

    fn affiliation(&mut self, aff: &XmlElement) -> Result<Node, FormatError> {
        let institutions: Vec<&XmlElement> = aff.elements_named("institution").collect();
        let department = institutions
            .iter()
            .find(|i| i.attr("content-type") == Some("dept"))
            .map(|i| words(&i.text_content()));
        let institution = institutions
            .iter()
            .find(|i| i.attr("content-type") != Some("dept"))
            .map(|i| words(&i.text_content()))
            .or_else(|| {
                aff.child("institution-wrap")
                    .and_then(|wrap| text_of(wrap, "institution"))
            })
            .unwrap_or_else(|| {
                let loose: String = aff
                    .children
                    .iter()
                    .filter_map(|node| match node {
                        XmlNode::Text(text) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                words(&loose).trim_matches(|c: char| c == ',' || c.is_whitespace()).to_string()
            });

        let addr_lines: Vec<&XmlElement> = aff
            .elements_named("addr-line")
            .filter(|line| line.attr("content-type").is_none())
            .collect();
        let city = text_of(aff, "city").or_else(|| {
            aff.elements_named("addr-line")
                .find(|line| line.attr("content-type") == Some("city"))
                .map(|line| words(&line.text_content()))
        });
        let email = text_of(aff, "email")
            .map_or(Value::Null, |email| json!({"href": format!("mailto:{email}"), "text": email}));
        let priority = aff
            .attr("priority")
            .and_then(|p| p.parse::<i64>().ok())
            .map_or(Value::Null, |p| json!(p));

        let mut attrs = attrs_of([
            ("id", json!(self.id_for(aff, NodeKind::Affiliation))),
            ("institution", json!(institution)),
            ("department", json!(department.unwrap_or_default())),
            ("postCode", json!(text_of(aff, "postal-code").unwrap_or_default())),
            ("country", json!(text_of(aff, "country").unwrap_or_default())),
            ("county", json!(text_of(aff, "state").unwrap_or_default())),
            ("city", json!(city.unwrap_or_default())),
            ("email", email),
            ("priority", priority),
        ]);
        for (index, line) in addr_lines.iter().take(3).enumerate() {
            attrs.insert(
                format!("addressLine{}", index + 1),
                json!(words(&line.text_content())),
            );
        }
        self.build(NodeKind::Affiliation, attrs, vec![])
    }

    fn author_notes(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(el, NodeKind::AuthorNotes);
        let mut content = Vec::new();
        for node in &el.children {
            match node {
                XmlNode::Element(child) => match child.name.as_str() {
                    "fn" => content.push(self.scoped(child, |c| c.footnote(child))?),
                    "corresp" => content.push(self.scoped(child, |c| c.corresp(child))?),
                    "p" => content.push(self.scoped(child, |c| c.paragraph(child))?),
                    name if IGNORED.contains(&name) => {}
                    _ if !child.has_meaningful_content() => {}
                    _ => return Err(self.unsupported(child)),
                },
                XmlNode::Text(text) => self.stray_text(text, &id)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        self.build(NodeKind::AuthorNotes, attrs_of([("id", json!(id))]), content)
    }

    fn corresp(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let label = text_of(el, "label").unwrap_or_default();
        let children: Vec<XmlNode> = el
            .children
            .iter()
            .filter(|node| !node.is_element_named("label"))
            .cloned()
            .collect();
        let content = self.inline(&children, InlineMode::TextOnly)?;
        let attrs = attrs_of([
            ("id", json!(self.id_for(el, NodeKind::Corresp))),
            ("label", json!(label)),
        ]);
        self.build(NodeKind::Corresp, attrs, content)
    }

    fn supplements(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let title = Node::new_text("Supplementary Material", vec![]).map_err(|e| self.fail(e))?;
        let mut content = vec![self.build(NodeKind::SectionTitle, Attrs::new(), vec![title])?];
        for supplement in el.elements_named("supplementary-material") {
            let attrs = attrs_of([
                ("id", json!(self.id_for(supplement, NodeKind::Supplement))),
                ("href", json!(supplement.attr("xlink:href").unwrap_or_default())),
                ("mimeType", json!(supplement.attr("mimetype").unwrap_or_default())),
                ("mimeSubType", json!(supplement.attr("mime-subtype").unwrap_or_default())),
                (
                    "title",
                    json!(supplement
                        .child("caption")
                        .and_then(|caption| text_of(caption, "title"))
                        .unwrap_or_default()),
                ),
            ]);
            content.push(self.build(NodeKind::Supplement, attrs, vec![])?);
        }
        let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Supplements)))]);
        self.build(NodeKind::Supplements, attrs, content)
    }

    // ---- sections ----

    fn section(&mut self, sec: &XmlElement) -> Result<Node, FormatError> {
        let title_el = sec.child("title");
        let title_text = title_el.map(|t| words(&take_tokens(&t.text_content()).0));
        let category = resolve_category(sec.attr("sec-type"), title_text.as_deref());
        let kind = match kind_for_category(category) {
            kind if fits_specialized(kind, sec) => kind,
            _ => NodeKind::Section,
        };
        let id = self.id_for(sec, kind);

        let mut content = Vec::new();
        if kind == NodeKind::Section {
            if let Some(label) = sec.child("label") {
                let text = self.inline(&label.children, InlineMode::TextOnly)?;
                content.push(self.build(NodeKind::SectionLabel, Attrs::new(), text)?);
            }
        }
        let title = match title_el {
            Some(title) => self.inline(&title.children, InlineMode::TextOnly)?,
            None => Vec::new(),
        };
        content.push(self.build(NodeKind::SectionTitle, Attrs::new(), title)?);

        if !matches!(kind, NodeKind::Section | NodeKind::GraphicalAbstractSection) {
            for node in &sec.children {
                if let XmlNode::Text(text) = node {
                    self.stray_text(text, &id)?;
                }
            }
        }
        match kind {
            NodeKind::BibliographySection => {
                let mut items = Vec::new();
                let mut element_id = None;
                for list in sec.elements_named("ref-list") {
                    element_id.get_or_insert_with(|| list.attr("id").map(str::to_string));
                    items.extend(self.scoped(list, |c| c.references(list))?);
                }
                let element_id = match element_id.flatten() {
                    Some(id) => id,
                    None => self.ctx.ids.for_kind(NodeKind::BibliographyElement),
                };
                content.push(self.build(
                    NodeKind::BibliographyElement,
                    attrs_of([("id", json!(element_id))]),
                    items,
                )?);
            }
            NodeKind::FootnotesSection => {
                let mut loose = Vec::new();
                for child in sec.elements() {
                    match child.name.as_str() {
                        "fn-group" => content.push(self.scoped(child, |c| c.footnotes(child))?),
                        "fn" => loose.push(self.scoped(child, |c| c.footnote(child))?),
                        "title" | "label" => {}
                        _ if !child.has_meaningful_content() => {}
                        _ => return Err(self.unsupported(child)),
                    }
                }
                if !loose.is_empty() {
                    let attrs =
                        attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::FootnotesElement)))]);
                    content.push(self.build(NodeKind::FootnotesElement, attrs, loose)?);
                }
            }
            NodeKind::KeywordsSection => {
                let mut groups = Vec::new();
                for group in sec.elements_named("kwd-group") {
                    groups.push(self.scoped(group, |c| c.keyword_group(group))?);
                }
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::KeywordsElement)))]);
                content.push(self.build(NodeKind::KeywordsElement, attrs, groups)?);
            }
            NodeKind::TocSection => {
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::TocElement)))]);
                content.push(self.build(NodeKind::TocElement, attrs, vec![])?);
            }
            _ => {
                for node in &sec.children {
                    match node {
                        XmlNode::Element(child) if matches!(child.name.as_str(), "title" | "label") => {}
                        XmlNode::Element(child) => content.extend(self.block(child, &id)?),
                        XmlNode::Text(text) => self.stray_text(text, &id)?,
                        XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
                    }
                }
            }
        }

        let attrs = attrs_of([
            ("id", json!(id)),
            ("category", json!(category.map(|c| c.id()).unwrap_or_default())),
        ]);
        self.build(kind, attrs, content)
    }

    // ---- block context ----

    fn blocks(&mut self, el: &XmlElement, anchor: &str) -> Result<Vec<Node>, FormatError> {
        let mut out = Vec::new();
        for node in &el.children {
            match node {
                XmlNode::Element(child) => out.extend(self.block(child, anchor)?),
                XmlNode::Text(text) => self.stray_text(text, anchor)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        Ok(out)
    }

    fn block(&mut self, el: &XmlElement, anchor: &str) -> Result<Vec<Node>, FormatError> {
        self.scoped(el, |c| {
            let node = match el.name.as_str() {
                "p" => c.paragraph(el)?,
                "sec" => c.section(el)?,
                "fig-group" => c.figure_group(el)?,
                "fig" if el.attr("fig-type") == Some("listing") => c.listing(el)?,
                "fig" => c.figure_group(&group_figure(el.clone()))?,
                "graphic" => {
                    let figure = c.figure(el)?;
                    let attrs =
                        attrs_of([("id", json!(c.ctx.ids.for_kind(NodeKind::FigureElement)))]);
                    c.build(NodeKind::FigureElement, attrs, vec![figure])?
                }
                "table-wrap" => c.table_element(el)?,
                "list" => c.list(el)?,
                "disp-formula" => c.equation_element(el)?,
                "disp-quote" => c.quote(el)?,
                "boxed-text" => c.boxed(el)?,
                "code" | "preformat" => c.listing(el)?,
                "fn-group" => c.footnotes(el)?,
                "fn" => {
                    let footnote = c.footnote(el)?;
                    let attrs =
                        attrs_of([("id", json!(c.ctx.ids.for_kind(NodeKind::FootnotesElement)))]);
                    c.build(NodeKind::FootnotesElement, attrs, vec![footnote])?
                }
                "ref-list" => {
                    let items = c.references(el)?;
                    let attrs =
                        attrs_of([("id", json!(c.id_for(el, NodeKind::BibliographyElement)))]);
                    c.build(NodeKind::BibliographyElement, attrs, items)?
                }
                "kwd-group" => {
                    let group = c.keyword_group(el)?;
                    let attrs =
                        attrs_of([("id", json!(c.ctx.ids.for_kind(NodeKind::KeywordsElement)))]);
                    c.build(NodeKind::KeywordsElement, attrs, vec![group])?
                }
                "alternatives" => {
                    return match el.first_element() {
                        Some(first) => c.block(first, anchor),
                        None => Ok(Vec::new()),
                    };
                }
                name if IGNORED.contains(&name) => return Ok(Vec::new()),
                _ if !el.has_meaningful_content() => return Ok(Vec::new()),
                _ => return Err(c.unsupported(el)),
            };
            Ok(vec![node])
        })
    }

    fn paragraph(&mut self, p: &XmlElement) -> Result<Node, FormatError> {
        let content = self.inline(&p.children, InlineMode::Full)?;
        let attrs = attrs_of([("id", json!(self.id_for(p, NodeKind::Paragraph)))]);
        self.build(NodeKind::Paragraph, attrs, content)
    }

    fn attribution(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let content = self.inline(&el.children, InlineMode::Full)?;
        self.build(NodeKind::Attribution, Attrs::new(), content)
    }

    fn figcaption(&mut self, caption: &XmlElement) -> Result<Node, FormatError> {
        self.scoped(caption, |c| {
            let mut content = Vec::new();
            if let Some(title) = caption.child("title") {
                let inline = c.inline(&title.children, InlineMode::Full)?;
                content.push(c.build(NodeKind::CaptionTitle, Attrs::new(), inline)?);
            }
            let rest: Vec<XmlNode> = caption
                .children
                .iter()
                .filter(|node| !node.is_element_named("title"))
                .cloned()
                .collect();
            let inline = c.inline(&rest, InlineMode::Full)?;
            if !inline.is_empty() {
                content.push(c.build(NodeKind::Caption, Attrs::new(), inline)?);
            }
            c.build(NodeKind::Figcaption, Attrs::new(), content)
        })
    }

    fn figure_group(&mut self, group: &XmlElement) -> Result<Node, FormatError> {
        let multi = group.attr("multiGraphic") == Some("true");
        let kind = if multi {
            NodeKind::MultiGraphicFigureElement
        } else {
            NodeKind::FigureElement
        };
        let id = self.id_for(group, kind);

        let mut figures = Vec::new();
        let mut attributions = Vec::new();
        let mut caption = None;
        for node in &group.children {
            let XmlNode::Element(child) = node else {
                if let XmlNode::Text(text) = node {
                    self.stray_text(text, &id)?;
                }
                continue;
            };
            match child.name.as_str() {
                "fig" => figures.push(self.scoped(child, |c| c.figure(child))?),
                "graphic" => figures.push(self.figure(child)?),
                "p" if !multi => figures.push(self.scoped(child, |c| c.paragraph(child))?),
                "attrib" if !multi => attributions.push(self.attribution(child)?),
                "caption" => caption = Some(self.figcaption(child)?),
                name if IGNORED.contains(&name) => {}
                _ if !child.has_meaningful_content() => {}
                _ => return Err(self.unsupported(child)),
            }
        }
        if figures.is_empty() {
            let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Placeholder)))]);
            figures.push(self.build(NodeKind::Placeholder, attrs, vec![])?);
        }

        let label = text_of(group, "label").unwrap_or_default();
        let mut content = figures;
        content.extend(attributions);
        content.extend(caption);
        let attrs = attrs_of([("id", json!(id)), ("label", json!(label))]);
        self.build(kind, attrs, content)
    }

    /// A `fig` inside a group, or a bare `graphic`.
    fn figure(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let graphic = if el.is("graphic") {
            Some(el)
        } else {
            el.child("graphic").or_else(|| {
                el.child("alternatives")
                    .and_then(|alternatives| alternatives.child("graphic"))
            })
        };
        let src = graphic
            .and_then(|g| g.attr("xlink:href"))
            .unwrap_or_default();
        let content_type = graphic
            .and_then(|g| g.non_empty_attr("mimetype"))
            .map(|mime| match graphic.and_then(|g| g.non_empty_attr("mime-subtype")) {
                Some(sub) => format!("{mime}/{sub}"),
                None => mime.to_string(),
            })
            .unwrap_or_default();

        // a figure without an id of its own takes its graphic's
        let id = match el.non_empty_attr("id").or_else(|| graphic.and_then(|g| g.non_empty_attr("id"))) {
            Some(id) => id.to_string(),
            None => self.ctx.ids.for_kind(NodeKind::Figure),
        };

        let mut content = Vec::new();
        if !el.is("graphic") {
            for node in &el.children {
                let child = match node {
                    XmlNode::Element(child) => child,
                    XmlNode::Text(text) => {
                        self.stray_text(text, &id)?;
                        continue;
                    }
                    XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => continue,
                };
                match child.name.as_str() {
                    "caption" => content.push(self.figcaption(child)?),
                    "attrib" => content.push(self.attribution(child)?),
                    "p" => content.push(self.scoped(child, |c| c.paragraph(child))?),
                    "graphic" | "alternatives" => {}
                    name if IGNORED.contains(&name) => {}
                    _ if !child.has_meaningful_content() => {}
                    _ => return Err(self.unsupported(child)),
                }
            }
        }
        let attrs = attrs_of([
            ("id", json!(id)),
            ("label", json!(text_of(el, "label").unwrap_or_default())),
            ("src", json!(src)),
            ("contentType", json!(content_type)),
        ]);
        self.build(NodeKind::Figure, attrs, content)
    }

    fn table_element(&mut self, wrap: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(wrap, NodeKind::TableElement);
        let table = wrap.child("table").or_else(|| {
            wrap.child("alternatives")
                .and_then(|alternatives| alternatives.child("table"))
        });
        let mut content = vec![match table {
            Some(table) => self.scoped(table, |c| c.table(table))?,
            None => {
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Placeholder)))]);
                self.build(NodeKind::Placeholder, attrs, vec![])?
            }
        }];
        if let Some(foot) = wrap.child("table-wrap-foot") {
            content.push(self.scoped(foot, |c| c.table_footer(foot))?);
        }
        if let Some(caption) = wrap.child("caption") {
            content.push(self.figcaption(caption)?);
        }
        let attrs = attrs_of([
            ("id", json!(id)),
            ("label", json!(text_of(wrap, "label").unwrap_or_default())),
        ]);
        self.build(NodeKind::TableElement, attrs, content)
    }

    fn table(&mut self, table: &XmlElement) -> Result<Node, FormatError> {
        let mut content = Vec::new();
        let mut cols = Vec::new();
        let mut rows = Vec::new();
        for child in table.elements() {
            match child.name.as_str() {
                "colgroup" => cols.extend(child.elements_named("col").map(table_col)),
                "col" => cols.push(table_col(child)),
                "thead" | "tbody" | "tfoot" => {
                    for tr in child.elements_named("tr") {
                        rows.push(self.scoped(tr, |c| c.table_row(tr))?);
                    }
                }
                "tr" => rows.push(self.scoped(child, |c| c.table_row(child))?),
                name if IGNORED.contains(&name) => {}
                _ if !child.has_meaningful_content() => {}
                _ => return Err(self.unsupported(child)),
            }
        }
        if !cols.is_empty() {
            let cols = cols
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| self.fail(e))?;
            content.push(self.build(NodeKind::TableColgroup, Attrs::new(), cols)?);
        }
        content.extend(rows);
        let attrs = attrs_of([("id", json!(self.id_for(table, NodeKind::Table)))]);
        self.build(NodeKind::Table, attrs, content)
    }

    fn table_row(&mut self, tr: &XmlElement) -> Result<Node, FormatError> {
        let mut cells = Vec::new();
        for cell in tr.elements() {
            let kind = match cell.name.as_str() {
                "th" => NodeKind::TableHeader,
                "td" => NodeKind::TableCell,
                _ if !cell.has_meaningful_content() => continue,
                _ => return Err(self.unsupported(cell)),
            };
            let content = self.inline(&cell.children, InlineMode::Full)?;
            let span = |name: &str| {
                cell.attr(name)
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(1)
            };
            let optional = |name: &str| cell.non_empty_attr(name).map_or(Value::Null, |v| json!(v));
            let attrs = attrs_of([
                ("colspan", json!(span("colspan"))),
                ("rowspan", json!(span("rowspan"))),
                ("align", optional("align")),
                ("valign", optional("valign")),
                ("scope", optional("scope")),
                ("style", optional("style")),
            ]);
            cells.push(self.build(kind, attrs, content)?);
        }
        self.build(NodeKind::TableRow, Attrs::new(), cells)
    }

    fn table_footer(&mut self, foot: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(foot, NodeKind::TableElementFooter);
        let mut content = Vec::new();
        let mut loose = Vec::new();
        for child in foot.elements() {
            match child.name.as_str() {
                "p" | "title" => content.push(self.scoped(child, |c| c.paragraph(child))?),
                "fn-group" => content.push(self.scoped(child, |c| c.footnotes(child))?),
                "fn" => loose.push(self.scoped(child, |c| c.footnote(child))?),
                _ if !child.has_meaningful_content() => {}
                _ => return Err(self.unsupported(child)),
            }
        }
        if !loose.is_empty() {
            let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::FootnotesElement)))]);
            content.push(self.build(NodeKind::FootnotesElement, attrs, loose)?);
        }
        self.build(NodeKind::TableElementFooter, attrs_of([("id", json!(id))]), content)
    }

    fn list(&mut self, list: &XmlElement) -> Result<Node, FormatError> {
        let list_type = list.non_empty_attr("list-type");
        let ordered = list_type.is_some_and(|t| ORDERED_LIST_TYPES.contains(&t));
        let kind = if ordered {
            NodeKind::OrderedList
        } else {
            NodeKind::BulletList
        };
        let style = list_type
            .filter(|t| *t != "order" && *t != "bullet")
            .map_or(Value::Null, |t| json!(t));

        let id = self.id_for(list, kind);
        let mut items = Vec::new();
        for item in list.elements_named("list-item") {
            items.push(self.scoped(item, |c| {
                let content = c.blocks(item, &id)?;
                c.build(NodeKind::ListItem, Attrs::new(), content)
            })?);
        }
        let attrs = attrs_of([("id", json!(id)), ("listStyleType", style)]);
        self.build(kind, attrs, items)
    }

    fn equation_element(&mut self, formula_el: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(formula_el, NodeKind::EquationElement);
        let equation = match formula(formula_el)? {
            Some(found) => {
                let (tex, mathml) = match found {
                    Formula::Tex(tex) => (tex, String::new()),
                    Formula::MathMl(mathml) => (String::new(), mathml),
                };
                let attrs = attrs_of([
                    ("id", json!(self.ctx.ids.for_kind(NodeKind::Equation))),
                    ("TeXRepresentation", json!(tex)),
                    ("MathMLStringRepresentation", json!(mathml)),
                ]);
                self.build(NodeKind::Equation, attrs, vec![])?
            }
            None => {
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Placeholder)))]);
                self.build(NodeKind::Placeholder, attrs, vec![])?
            }
        };
        let attrs = attrs_of([
            ("id", json!(id)),
            ("label", json!(text_of(formula_el, "label").unwrap_or_default())),
        ]);
        self.build(NodeKind::EquationElement, attrs, vec![equation])
    }

    fn quote(&mut self, quote: &XmlElement) -> Result<Node, FormatError> {
        let kind = if quote.attr("content-type") == Some("pullquote") {
            NodeKind::PullquoteElement
        } else {
            NodeKind::BlockquoteElement
        };
        let id = self.id_for(quote, kind);
        let mut paragraphs = Vec::new();
        let mut attribution = None;
        for child in quote.elements() {
            match child.name.as_str() {
                "p" => paragraphs.push(self.scoped(child, |c| c.paragraph(child))?),
                "attrib" => attribution = Some(self.attribution(child)?),
                _ if !child.has_meaningful_content() => {}
                _ => return Err(self.unsupported(child)),
            }
        }
        if paragraphs.is_empty() {
            let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Paragraph)))]);
            paragraphs.push(self.build(NodeKind::Paragraph, attrs, vec![])?);
        }
        let mut content = paragraphs;
        content.extend(attribution);
        self.build(kind, attrs_of([("id", json!(id))]), content)
    }

    fn boxed(&mut self, boxed: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(boxed, NodeKind::BoxElement);
        let mut content = Vec::new();
        let mut caption = None;
        for node in &boxed.children {
            match node {
                XmlNode::Element(child) if child.is("caption") => {
                    caption = Some(self.figcaption(child)?)
                }
                XmlNode::Element(child) => content.extend(self.block(child, &id)?),
                XmlNode::Text(text) => self.stray_text(text, &id)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        content.extend(caption);
        let attrs = attrs_of([
            ("id", json!(id)),
            ("label", json!(text_of(boxed, "label").unwrap_or_default())),
        ]);
        self.build(NodeKind::BoxElement, attrs, content)
    }

    /// `code`/`preformat`, or a `fig` of type listing wrapping one.
    fn listing(&mut self, el: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(el, NodeKind::ListingElement);
        let code = if el.is("fig") {
            el.child("code").or_else(|| el.child("preformat"))
        } else {
            Some(el)
        };
        let mut content = vec![match code {
            Some(code) => {
                let attrs = attrs_of([
                    ("id", json!(self.ctx.ids.for_kind(NodeKind::Listing))),
                    ("contents", json!(code.text_content())),
                    ("language", json!(code.attr("language").unwrap_or_default())),
                ]);
                self.build(NodeKind::Listing, attrs, vec![])?
            }
            None => {
                let attrs = attrs_of([("id", json!(self.ctx.ids.for_kind(NodeKind::Placeholder)))]);
                self.build(NodeKind::Placeholder, attrs, vec![])?
            }
        }];
        if el.is("fig") {
            if let Some(caption) = el.child("caption") {
                content.push(self.figcaption(caption)?);
            }
        }
        self.build(NodeKind::ListingElement, attrs_of([("id", json!(id))]), content)
    }

    fn footnotes(&mut self, group: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(group, NodeKind::FootnotesElement);
        let mut footnotes = Vec::new();
        for node in &group.children {
            match node {
                XmlNode::Element(fn_el) if fn_el.is("fn") => {
                    footnotes.push(self.scoped(fn_el, |c| c.footnote(fn_el))?)
                }
                XmlNode::Element(other) if IGNORED.contains(&other.name.as_str()) => {}
                XmlNode::Element(other) if !other.has_meaningful_content() => {}
                XmlNode::Element(other) => return Err(self.unsupported(other)),
                XmlNode::Text(text) => self.stray_text(text, &id)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        let mut attrs = attrs_of([("id", json!(id))]);
        if let Some(kind) = group.non_empty_attr("fn-type") {
            attrs.insert("kind".into(), json!(kind));
        }
        self.build(NodeKind::FootnotesElement, attrs, footnotes)
    }

    fn footnote(&mut self, fn_el: &XmlElement) -> Result<Node, FormatError> {
        let id = self.id_for(fn_el, NodeKind::Footnote);
        let mut paragraphs = Vec::new();
        for node in &fn_el.children {
            match node {
                XmlNode::Element(p) if p.is("p") => {
                    paragraphs.push(self.scoped(p, |c| c.paragraph(p))?)
                }
                XmlNode::Element(other) if IGNORED.contains(&other.name.as_str()) => {}
                XmlNode::Element(other) if !other.has_meaningful_content() => {}
                XmlNode::Element(other) => return Err(self.unsupported(other)),
                XmlNode::Text(text) => self.stray_text(text, &id)?,
                XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
            }
        }
        let attrs = attrs_of([
            ("id", json!(id)),
            ("category", json!(fn_el.attr("fn-type").unwrap_or_default())),
        ]);
        self.build(NodeKind::Footnote, attrs, paragraphs)
    }

    fn references(&mut self, list: &XmlElement) -> Result<Vec<Node>, FormatError> {
        let mut items = Vec::new();
        for child in list.elements() {
            match child.name.as_str() {
                "ref" => {
                    let item = bibliography_item(child, self.ctx).map_err(|e| self.fail(e))?;
                    items.push(item);
                }
                "ref-list" => items.extend(self.scoped(child, |c| c.references(child))?),
                name if IGNORED.contains(&name) => {}
                _ if !child.has_meaningful_content() => {}
                _ => return Err(self.unsupported(child)),
            }
        }
        Ok(items)
    }

    fn keyword_group(&mut self, group: &XmlElement) -> Result<Node, FormatError> {
        let mut keywords = Vec::new();
        for kwd in group
            .elements()
            .filter(|el| matches!(el.name.as_str(), "kwd" | "compound-kwd"))
        {
            let text = self.inline(&kwd.children, InlineMode::TextOnly)?;
            let attrs = attrs_of([("id", json!(self.id_for(kwd, NodeKind::Keyword)))]);
            keywords.push(self.build(NodeKind::Keyword, attrs, text)?);
        }
        let attrs = attrs_of([
            ("id", json!(self.id_for(group, NodeKind::KeywordGroup))),
            ("type", json!(group.attr("kwd-group-type").unwrap_or_default())),
        ]);
        self.build(NodeKind::KeywordGroup, attrs, keywords)
    }
}

/// True when `sec` holds nothing that a section of the specialized `kind` has no room for.
fn fits_specialized(kind: NodeKind, sec: &XmlElement) -> bool {
    let allowed: &[&str] = match kind {
        NodeKind::BibliographySection => &["ref-list"],
        NodeKind::FootnotesSection => &["fn-group", "fn"],
        NodeKind::KeywordsSection => &["kwd-group"],
        NodeKind::TocSection => &[],
        _ => return true,
    };
    sec.children.iter().all(|node| match node {
        XmlNode::Element(el) if el.is("title") => true,
        XmlNode::Element(el) => {
            allowed.contains(&el.name.as_str()) || !el.has_meaningful_content()
        }
        XmlNode::Text(text) => take_tokens(text).0.trim().is_empty(),
        XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => true,
    })
}

fn table_col(col: &XmlElement) -> Result<Node, SchemaError> {
    let attrs = attrs_of([("width", json!(col.attr("width").unwrap_or_default()))]);
    Node::leaf(NodeKind::TableCol, attrs)
}

enum Formula {
    Tex(String),
    MathMl(String),
}

/// The TeX or MathML carried by a formula element, looking inside `alternatives`.
fn formula(el: &XmlElement) -> Result<Option<Formula>, FormatError> {
    let holders = std::iter::once(el).chain(el.elements_named("alternatives"));
    for holder in holders {
        if let Some(tex) = holder.child("tex-math") {
            return Ok(Some(Formula::Tex(tex.text_content().trim().to_string())));
        }
        if let Some(math) = holder.child("mml:math") {
            let mut math = math.clone();
            if math.attr("xmlns:mml").is_none() {
                math.set_attr("xmlns:mml", MATHML_NS);
            }
            return Ok(Some(Formula::MathMl(write_fragment(&math)?)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::from_xml::parse_document;

    fn convert_paragraph(xml: &str) -> Node {
        let p = parse_document(xml, 32).unwrap();
        let mut ctx = ImportContext::default();
        let mut converter = Converter {
            ctx: &mut ctx,
            path: Vec::new(),
        };
        converter.paragraph(&p).unwrap()
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        let p = convert_paragraph("<p>\n   Some   <bold>bold\n text</bold> here  </p>");
        assert_eq!(p.text_content(), "Some bold text here");
        assert!(p.content()[1].has_mark(MarkKind::Bold));
    }

    #[test]
    fn nested_formatting_stacks_marks() {
        let p = convert_paragraph("<p><italic><bold>x</bold></italic></p>");
        let text = &p.content()[0];
        assert!(text.has_mark(MarkKind::Bold));
        assert!(text.has_mark(MarkKind::Italic));
    }

    #[test]
    fn xrefs_by_reference_type() {
        let p = convert_paragraph(
            r#"<p>See <xref ref-type="bibr" rid="b1 b2">1,2</xref> and <xref ref-type="fig" rid="f1">Figure 1</xref><xref ref-type="fn" rid="n1">a</xref></p>"#,
        );
        let kinds: Vec<_> = p.content().iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Text,
                NodeKind::Citation,
                NodeKind::Text,
                NodeKind::CrossReference,
                NodeKind::InlineFootnote
            ]
        );
        assert_eq!(p.content()[1].attr("rids"), Some(&json!(["b1", "b2"])));
        assert_eq!(p.content()[3].attr_str("label"), "Figure 1");
    }

    #[test]
    fn inline_formula_keeps_tex() {
        let p = convert_paragraph(
            r#"<p><inline-formula><tex-math>x^2</tex-math></inline-formula></p>"#,
        );
        let eq = &p.content()[0];
        assert_eq!(eq.kind(), NodeKind::InlineEquation);
        assert_eq!(eq.attr_str("content"), "x^2");
        assert_eq!(eq.attr_str("format"), "tex");
    }

    #[test]
    fn unknown_inline_element_with_content_is_rejected() {
        let p = parse_document("<p>a <blink>b</blink></p>", 32).unwrap();
        let mut ctx = ImportContext::default();
        let mut converter = Converter {
            ctx: &mut ctx,
            path: Vec::new(),
        };
        assert!(matches!(
            converter.paragraph(&p),
            Err(FormatError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_unknown_elements_are_skipped() {
        let p = convert_paragraph(r#"<p>a<inline-graphic xlink:href="x.png" xmlns:xlink="http://www.w3.org/1999/xlink"/></p>"#);
        assert_eq!(p.content().len(), 1);
    }

    #[test]
    fn links_keep_href_and_text() {
        let p = convert_paragraph(
            r#"<p><ext-link xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="https://example.org">site</ext-link></p>"#,
        );
        let link = &p.content()[0];
        assert_eq!(link.kind(), NodeKind::Link);
        assert_eq!(link.attr_str("href"), "https://example.org");
        assert_eq!(link.text_content(), "site");
    }
}
