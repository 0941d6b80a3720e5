//! JATS export
//!
//!     The exporter walks a manuscript top-down and builds the XML IR, which is then written
//!     with the DOCTYPE of the requested JATS version. It undoes the importer's relocations:
//!
//!         abstract sections           ─▶ front/article-meta/abstract
//!         keywords sections           ─▶ front/article-meta/kwd-group
//!         back-matter sections        ─▶ back (ack, app-group/app, ref-list, fn-group, sec)
//!         table of contents elements  ─▶ dropped
//!         everything else             ─▶ body/sec
//!
//!     Lookups the walk needs (citation numbers, the kind behind every id, comments by id)
//!     are collected once up front in [`Builder`].

mod body;
mod front;

use super::ExportOptions;
use crate::common::citations::number_references;
use crate::common::section_category::{category_from_title, CategoryGroup, SectionCategory};
use crate::error::FormatError;
use crate::ir::nodes::{ProcessingInstruction, XmlElement, XmlNode};
use crate::ir::to_xml::write_document;
use crate::ir::{MATHML_NS, XLINK_NS};
use crate::schema::{Group, Node, NodeKind};
use std::collections::{HashMap, HashSet};

use super::parser::annotations::AUTHOR_QUERY_TARGET;

/// Serializes manuscripts to JATS XML.
#[derive(Debug, Default, Clone, Copy)]
pub struct JatsExporter;

impl JatsExporter {
    pub fn new() -> Self {
        JatsExporter
    }

    /// Writes `manuscript` as a complete JATS document.
    ///
    /// `manuscript_id` must name the root when the root carries an id.
    pub fn serialize(
        &self,
        manuscript: &Node,
        manuscript_id: &str,
        options: &ExportOptions,
    ) -> Result<String, FormatError> {
        if manuscript.kind() != NodeKind::Manuscript {
            return Err(FormatError::InvalidInput(format!(
                "expected a manuscript, found `{}`",
                manuscript.kind()
            )));
        }
        if !manuscript.id().is_empty() && manuscript.id() != manuscript_id {
            return Err(FormatError::InvalidInput(format!(
                "manuscript id '{manuscript_id}' does not match the document ('{}')",
                manuscript.id()
            )));
        }

        let mut builder = Builder::new(manuscript, options);
        let article = builder.article(manuscript)?;
        tracing::debug!(version = %options.version, "Exporting JATS article");
        write_document(&article, Some(&options.version.doctype()))
    }
}

/// Where a top-level section ends up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Abstract(SectionCategory),
    Keywords,
    Back(Option<SectionCategory>),
    Body,
    Skip,
}

fn section_title_text(section: &Node) -> String {
    section
        .content()
        .iter()
        .find(|child| child.kind() == NodeKind::SectionTitle)
        .map(Node::text_content)
        .unwrap_or_default()
}

/// Category of a section: the stored one, else implied by its kind, else guessed from its title.
pub(crate) fn section_category(section: &Node) -> Option<SectionCategory> {
    SectionCategory::from_id(section.attr_str("category"))
        .or(match section.kind() {
            NodeKind::BibliographySection => Some(SectionCategory::Bibliography),
            NodeKind::FootnotesSection => Some(SectionCategory::Footnotes),
            NodeKind::KeywordsSection => Some(SectionCategory::Keywords),
            NodeKind::TocSection => Some(SectionCategory::Toc),
            NodeKind::GraphicalAbstractSection => Some(SectionCategory::AbstractGraphical),
            _ => None,
        })
        .or_else(|| category_from_title(section_title_text(section).trim()))
}

fn placement(section: &Node) -> Placement {
    let category = section_category(section);
    match (section.kind(), category) {
        (NodeKind::TocSection, _) => Placement::Skip,
        (NodeKind::KeywordsSection, _) => Placement::Keywords,
        (NodeKind::BibliographySection | NodeKind::FootnotesSection, _) => {
            Placement::Back(category)
        }
        (_, Some(category)) => match category.group() {
            CategoryGroup::Abstracts => Placement::Abstract(category),
            CategoryGroup::BackMatter => Placement::Back(Some(category)),
            CategoryGroup::FrontMatter | CategoryGroup::Body => Placement::Body,
        },
        (_, None) => Placement::Body,
    }
}

/// Export state for one manuscript.
pub(super) struct Builder<'a> {
    pub(super) options: &'a ExportOptions,
    /// Citation number of each bibliography item.
    pub(super) numbering: HashMap<String, usize>,
    /// Kind of every node carrying an id.
    pub(super) kinds: HashMap<String, NodeKind>,
    pub(super) comments: HashMap<String, &'a Node>,
    /// Comments with no highlight marker, by target id.
    pub(super) unanchored: HashMap<String, Vec<&'a Node>>,
}

impl<'a> Builder<'a> {
    fn new(manuscript: &'a Node, options: &'a ExportOptions) -> Self {
        let mut kinds = HashMap::new();
        let mut comments = HashMap::new();
        let mut marked = HashSet::new();
        for node in manuscript.descendants() {
            if !node.id().is_empty() {
                kinds.entry(node.id().to_string()).or_insert(node.kind());
            }
            match node.kind() {
                NodeKind::Comment => {
                    comments.insert(node.id().to_string(), node);
                }
                NodeKind::HighlightMarker => {
                    marked.insert(node.id().to_string());
                }
                _ => {}
            }
        }

        let mut unanchored: HashMap<String, Vec<&Node>> = HashMap::new();
        for comment in manuscript
            .descendants()
            .filter(|node| node.kind() == NodeKind::Comment)
            .filter(|comment| !marked.contains(comment.id()))
        {
            unanchored
                .entry(comment.attr_str("target").to_string())
                .or_default()
                .push(comment);
        }

        let numbering = number_references(
            manuscript
                .descendants()
                .filter(|node| node.kind() == NodeKind::BibliographyItem)
                .map(Node::id),
        );

        Builder {
            options,
            numbering,
            kinds,
            comments,
            unanchored,
        }
    }

    fn article(&mut self, manuscript: &Node) -> Result<XmlElement, FormatError> {
        let mut article = XmlElement::new("article");
        if let Some(article_type) = non_empty(manuscript.attr_str("articleType")) {
            article.set_attr("article-type", article_type);
        }
        article.set_attr("dtd-version", self.options.version.as_str());
        if let Some(lang) = non_empty(manuscript.attr_str("primaryLanguageCode")) {
            article.set_attr("xml:lang", lang);
        }
        article.set_attr("xmlns:mml", MATHML_NS);
        article.set_attr("xmlns:xlink", XLINK_NS);

        let mut abstracts = Vec::new();
        let mut keyword_groups = Vec::new();
        let mut body = XmlElement::new("body");
        let mut back = XmlElement::new("back");
        let mut app_group: Option<usize> = None;

        for section in manuscript
            .content()
            .iter()
            .filter(|child| child.kind().in_group(Group::Sections))
        {
            match placement(section) {
                Placement::Skip => {}
                Placement::Abstract(category) => {
                    abstracts.push(self.abstract_element(section, category)?)
                }
                Placement::Keywords => keyword_groups.extend(self.keyword_groups(section)?),
                Placement::Body => body.push(self.section(section, "sec")?),
                Placement::Back(Some(SectionCategory::Appendices))
                    if section.kind() == NodeKind::Section =>
                {
                    let app = self.section(section, "app")?;
                    let index = match app_group {
                        Some(index) => index,
                        None => {
                            back.push(XmlElement::new("app-group"));
                            let index = back.children.len() - 1;
                            app_group = Some(index);
                            index
                        }
                    };
                    if let Some(XmlNode::Element(group)) = back.children.get_mut(index) {
                        group.push(app);
                    }
                }
                Placement::Back(category) => back.push(self.back_section(section, category)?),
            }
        }

        article.push(self.front(manuscript, abstracts, keyword_groups)?);
        if !self.options.front_matter_only {
            if !body.children.is_empty() {
                article.push(body);
            }
            if !back.children.is_empty() {
                article.push(back);
            }
        }
        Ok(article)
    }

    fn back_section(
        &mut self,
        section: &Node,
        category: Option<SectionCategory>,
    ) -> Result<XmlElement, FormatError> {
        match (section.kind(), category) {
            (NodeKind::BibliographySection, _) => self.reference_list(section),
            (NodeKind::FootnotesSection, _) => self.footnote_group(section),
            (_, Some(SectionCategory::Acknowledgements)) => self.section(section, "ack"),
            _ => self.section(section, "sec"),
        }
    }

    fn abstract_element(
        &mut self,
        section: &Node,
        category: SectionCategory,
    ) -> Result<XmlElement, FormatError> {
        let mut el = XmlElement::new("abstract");
        if let Some(id) = non_empty(section.id()) {
            el.set_attr("id", id);
        }
        match category {
            SectionCategory::AbstractTeaser => el.set_attr("abstract-type", "teaser"),
            SectionCategory::AbstractGraphical => el.set_attr("abstract-type", "graphical"),
            _ => {}
        }
        for child in section.content() {
            match child.kind() {
                NodeKind::SectionLabel => {}
                NodeKind::SectionTitle => {
                    if !child.content().is_empty() {
                        let title = self.inline(child.content())?;
                        el.push(XmlElement::new("title").with_children(title));
                    }
                }
                _ => el.children.extend(self.block(child)?),
            }
        }
        Ok(el)
    }

    /// `<?AuthorQuery?>` for the comment a marker points at.
    pub(super) fn author_query(&self, comment_id: &str) -> Option<XmlNode> {
        let comment = self.comments.get(comment_id)?;
        Some(XmlNode::ProcessingInstruction(
            ProcessingInstruction::with_pseudo_attrs(
                AUTHOR_QUERY_TARGET,
                &[("id", comment.id()), ("queryText", comment.attr_str("contents"))],
            ),
        ))
    }

    /// Prepends queries for comments attached to `id` without a marker.
    pub(super) fn attach_unanchored(&self, id: &str, el: &mut XmlElement) {
        let Some(comments) = self.unanchored.get(id) else {
            return;
        };
        let queries = comments.iter().filter_map(|comment| self.author_query(comment.id()));
        el.children.splice(0..0, queries.collect::<Vec<_>>());
    }
}

pub(super) fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(value)
}
