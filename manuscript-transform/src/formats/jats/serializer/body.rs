//! Sections, blocks, inline content and references

use super::{non_empty, section_category, Builder};
use crate::common::citations::citation_label;
use crate::common::section_category::type_attr_for_category;
use crate::error::FormatError;
use crate::formats::jats::parser::references::PUBLICATION_TYPES;
use crate::ir::nodes::{XmlElement, XmlNode};
use crate::schema::{Group, MarkKind, Node, NodeKind};
use serde_json::Value;

fn element_with_id(name: &str, node: &Node) -> XmlElement {
    let el = XmlElement::new(name);
    match non_empty(node.id()) {
        Some(id) => el.with_attr("id", id),
        None => el,
    }
}

fn children_of_kind(node: &Node, kind: NodeKind) -> impl Iterator<Item = &Node> {
    node.content().iter().filter(move |child| child.kind() == kind)
}

fn label(node: &Node) -> Option<XmlElement> {
    non_empty(node.attr_str("label")).map(|label| XmlElement::new("label").with_text(label))
}

fn graphic(figure: &Node) -> Option<XmlElement> {
    let src = non_empty(figure.attr_str("src"))?;
    let mut graphic = XmlElement::new("graphic").with_attr("xlink:href", src);
    if let Some(content_type) = non_empty(figure.attr_str("contentType")) {
        match content_type.split_once('/') {
            Some((mime, sub)) => {
                graphic.set_attr("mimetype", mime);
                graphic.set_attr("mime-subtype", sub);
            }
            None => graphic.set_attr("mimetype", content_type),
        }
    }
    Some(graphic)
}

fn mark_element(kind: MarkKind) -> &'static str {
    match kind {
        MarkKind::Bold => "bold",
        MarkKind::Code => "monospace",
        MarkKind::Italic => "italic",
        MarkKind::Smallcaps => "sc",
        MarkKind::Strikethrough => "strike",
        MarkKind::Styled => "styled-content",
        MarkKind::Subscript => "sub",
        MarkKind::Superscript => "sup",
        MarkKind::Underline => "underline",
    }
}

/// `xref` `ref-type` for a target of the given kind.
fn ref_type(kind: Option<NodeKind>) -> &'static str {
    match kind {
        Some(
            NodeKind::FigureElement
            | NodeKind::MultiGraphicFigureElement
            | NodeKind::Figure
            | NodeKind::ListingElement,
        ) => "fig",
        Some(NodeKind::TableElement | NodeKind::Table) => "table",
        Some(NodeKind::EquationElement | NodeKind::Equation) => "disp-formula",
        Some(NodeKind::BibliographyItem) => "bibr",
        Some(NodeKind::Footnote) => "fn",
        Some(NodeKind::BoxElement) => "boxed-text",
        Some(NodeKind::Affiliation) => "aff",
        Some(kind) if kind.in_group(Group::Sections) => "sec",
        _ => "other",
    }
}

fn rids(node: &Node) -> Vec<String> {
    match node.attr("rids") {
        Some(Value::Array(rids)) => rids
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

impl Builder<'_> {
    // ---- sections ----

    /// A section as `sec`, `ack` or `app`.
    pub(super) fn section(&mut self, node: &Node, name: &str) -> Result<XmlElement, FormatError> {
        let mut el = element_with_id(name, node);
        if name == "sec" {
            if let Some(sec_type) = section_category(node).and_then(type_attr_for_category) {
                if node.attr_str("category").is_empty() {
                    tracing::trace!(sec_type, "Section type inferred from its title");
                }
                el.set_attr("sec-type", sec_type);
            }
        }
        for child in node.content() {
            match child.kind() {
                NodeKind::SectionLabel => {
                    let text = self.inline(child.content())?;
                    el.push(XmlElement::new("label").with_children(text));
                }
                NodeKind::SectionTitle => {
                    let text = self.inline(child.content())?;
                    el.push(XmlElement::new("title").with_children(text));
                }
                _ => el.children.extend(self.block(child)?),
            }
        }
        self.attach_unanchored(node.id(), &mut el);
        Ok(el)
    }

    /// A bibliography section as `ref-list`.
    pub(super) fn reference_list(&mut self, section: &Node) -> Result<XmlElement, FormatError> {
        let mut list = element_with_id("ref-list", section);
        for child in section.content() {
            match child.kind() {
                NodeKind::SectionTitle => {
                    let text = self.inline(child.content())?;
                    list.push(XmlElement::new("title").with_children(text));
                }
                NodeKind::BibliographyElement => {
                    list.children
                        .extend(child.content().iter().map(|item| XmlNode::from(reference(item))));
                }
                _ => {}
            }
        }
        Ok(list)
    }

    /// A footnotes section as `fn-group`.
    pub(super) fn footnote_group(&mut self, section: &Node) -> Result<XmlElement, FormatError> {
        let mut group = element_with_id("fn-group", section);
        for child in section.content() {
            match child.kind() {
                NodeKind::SectionTitle => {
                    let text = self.inline(child.content())?;
                    group.push(XmlElement::new("title").with_children(text));
                }
                NodeKind::FootnotesElement => {
                    for footnote in child.content() {
                        group.push(self.footnote(footnote)?);
                    }
                }
                _ => {}
            }
        }
        Ok(group)
    }

    // ---- blocks ----

    pub(super) fn block(&mut self, node: &Node) -> Result<Vec<XmlNode>, FormatError> {
        let mut el = match node.kind() {
            NodeKind::Section
            | NodeKind::BibliographySection
            | NodeKind::FootnotesSection
            | NodeKind::KeywordsSection
            | NodeKind::GraphicalAbstractSection => self.section(node, "sec")?,
            NodeKind::Paragraph => {
                let mut p = element_with_id("p", node);
                p.children = self.inline(node.content())?;
                p
            }
            NodeKind::BlockquoteElement | NodeKind::PullquoteElement => self.quote(node)?,
            NodeKind::BulletList | NodeKind::OrderedList => self.list(node)?,
            NodeKind::EquationElement => {
                let mut formula = element_with_id("disp-formula", node);
                formula.children.extend(label(node).map(XmlNode::Element));
                for equation in children_of_kind(node, NodeKind::Equation) {
                    formula.children.extend(equation_content(equation));
                }
                formula
            }
            NodeKind::Equation => {
                let mut formula = element_with_id("disp-formula", node);
                formula.children.extend(equation_content(node));
                formula
            }
            NodeKind::ListingElement => {
                let mut fig = element_with_id("fig", node).with_attr("fig-type", "listing");
                for caption in children_of_kind(node, NodeKind::Figcaption) {
                    fig.push(self.caption(caption)?);
                }
                for listing in children_of_kind(node, NodeKind::Listing) {
                    fig.push(code(listing));
                }
                fig
            }
            NodeKind::Listing => code(node),
            NodeKind::FigureElement => self.figure_element(node)?,
            NodeKind::MultiGraphicFigureElement => {
                let mut fig = element_with_id("fig", node);
                fig.children.extend(label(node).map(XmlNode::Element));
                for caption in children_of_kind(node, NodeKind::Figcaption) {
                    fig.push(self.caption(caption)?);
                }
                let figures: Vec<&Node> = children_of_kind(node, NodeKind::Figure).collect();
                for figure in &figures {
                    for paragraph in children_of_kind(figure, NodeKind::Paragraph) {
                        fig.children.extend(self.block(paragraph)?);
                    }
                    fig.children.extend(graphic(figure).map(XmlNode::Element));
                }
                for attribution in figures
                    .iter()
                    .flat_map(|figure| children_of_kind(*figure, NodeKind::Attribution))
                {
                    fig.push(self.attribution(attribution)?);
                }
                fig
            }
            NodeKind::Figure => self.figure(node, None, &[])?,
            NodeKind::TableElement => self.table_wrap(node)?,
            NodeKind::Table => self.table(node)?,
            NodeKind::BoxElement => {
                let mut boxed = element_with_id("boxed-text", node);
                boxed.children.extend(label(node).map(XmlNode::Element));
                for caption in children_of_kind(node, NodeKind::Figcaption) {
                    boxed.push(self.caption(caption)?);
                }
                for child in node
                    .content()
                    .iter()
                    .filter(|child| child.kind() != NodeKind::Figcaption)
                {
                    boxed.children.extend(self.block(child)?);
                }
                boxed
            }
            NodeKind::FootnotesElement => {
                let mut group = element_with_id("fn-group", node);
                if let Some(kind) = non_empty(node.attr_str("kind")).filter(|kind| *kind != "footnote") {
                    group.set_attr("fn-type", kind);
                }
                for footnote in node.content() {
                    group.push(self.footnote(footnote)?);
                }
                group
            }
            NodeKind::Footnote => self.footnote(node)?,
            NodeKind::BibliographyElement => {
                let mut list = element_with_id("ref-list", node);
                list.children
                    .extend(node.content().iter().map(|item| XmlNode::from(reference(item))));
                list
            }
            NodeKind::KeywordsElement => {
                let groups = self.keywords_element(node)?;
                return Ok(groups.into_iter().map(XmlNode::Element).collect());
            }
            NodeKind::TocSection
            | NodeKind::TocElement
            | NodeKind::Placeholder
            | NodeKind::PlaceholderElement
            | NodeKind::MissingFigure => return Ok(Vec::new()),
            NodeKind::Manuscript
            | NodeKind::Title
            | NodeKind::Contributors
            | NodeKind::Contributor
            | NodeKind::Affiliations
            | NodeKind::Affiliation
            | NodeKind::AuthorNotes
            | NodeKind::Corresp
            | NodeKind::Supplements
            | NodeKind::Supplement
            | NodeKind::Comments
            | NodeKind::Comment
            | NodeKind::SectionLabel
            | NodeKind::SectionTitle
            | NodeKind::BibliographyItem
            | NodeKind::KeywordGroup
            | NodeKind::Keyword
            | NodeKind::Attribution
            | NodeKind::ListItem
            | NodeKind::Figcaption
            | NodeKind::CaptionTitle
            | NodeKind::Caption
            | NodeKind::TableRow
            | NodeKind::TableCell
            | NodeKind::TableHeader
            | NodeKind::TableColgroup
            | NodeKind::TableCol
            | NodeKind::TableElementFooter
            | NodeKind::Text
            | NodeKind::HardBreak
            | NodeKind::Citation
            | NodeKind::CrossReference
            | NodeKind::InlineEquation
            | NodeKind::InlineFootnote
            | NodeKind::Link
            | NodeKind::HighlightMarker => return Err(misplaced(node, "block")),
        };
        // sections and footnotes attach their own queries
        if !node.kind().in_group(Group::Sections) && node.kind() != NodeKind::Footnote {
            self.attach_unanchored(node.id(), &mut el);
        }
        Ok(vec![XmlNode::Element(el)])
    }

    fn caption(&mut self, figcaption: &Node) -> Result<XmlElement, FormatError> {
        let mut caption = XmlElement::new("caption");
        for child in figcaption.content() {
            let text = self.inline(child.content())?;
            match child.kind() {
                NodeKind::CaptionTitle => caption.push(XmlElement::new("title").with_children(text)),
                _ => caption.push(XmlElement::new("p").with_children(text)),
            }
        }
        Ok(caption)
    }

    fn attribution(&mut self, attribution: &Node) -> Result<XmlElement, FormatError> {
        let text = self.inline(attribution.content())?;
        Ok(XmlElement::new("attrib").with_children(text))
    }

    fn quote(&mut self, node: &Node) -> Result<XmlElement, FormatError> {
        let mut quote = element_with_id("disp-quote", node);
        if node.kind() == NodeKind::PullquoteElement {
            quote.set_attr("content-type", "pullquote");
        }
        for child in node.content() {
            match child.kind() {
                NodeKind::Attribution => quote.push(self.attribution(child)?),
                _ => quote.children.extend(self.block(child)?),
            }
        }
        Ok(quote)
    }

    fn list(&mut self, node: &Node) -> Result<XmlElement, FormatError> {
        let default_type = if node.kind() == NodeKind::OrderedList {
            "order"
        } else {
            "bullet"
        };
        let list_type = non_empty(node.attr_str("listStyleType")).unwrap_or(default_type);
        let mut list = element_with_id("list", node).with_attr("list-type", list_type);
        for item in node.content() {
            let mut list_item = XmlElement::new("list-item");
            for child in item.content() {
                list_item.children.extend(self.block(child)?);
            }
            list.push(list_item);
        }
        Ok(list)
    }

    /// A figure element: one figure is written as a bare `fig`, several as a `fig-group`.
    fn figure_element(&mut self, node: &Node) -> Result<XmlElement, FormatError> {
        let figures: Vec<&Node> = children_of_kind(node, NodeKind::Figure).collect();
        let caption = children_of_kind(node, NodeKind::Figcaption).next();
        let extras: Vec<&Node> = node
            .content()
            .iter()
            .filter(|child| matches!(child.kind(), NodeKind::Paragraph | NodeKind::Attribution))
            .collect();

        if let [figure] = figures.as_slice() {
            let mut fig = self.figure(figure, caption, &extras)?;
            if let Some(id) = non_empty(node.id()) {
                fig.set_attr("id", id);
                // The figure's own id moves to its graphic.
                let figure_id = non_empty(figure.id()).filter(|figure_id| *figure_id != id);
                let graphic = fig.children.iter_mut().find_map(|child| match child {
                    XmlNode::Element(el) if el.is("graphic") => Some(el),
                    _ => None,
                });
                if let (Some(figure_id), Some(graphic)) = (figure_id, graphic) {
                    graphic.set_attr("id", figure_id);
                }
            }
            if let Some(label) = non_empty(node.attr_str("label")) {
                fig.children.retain(|child| !child.is_element_named("label"));
                fig.children
                    .insert(0, XmlElement::new("label").with_text(label).into());
            }
            return Ok(fig);
        }

        let mut group = element_with_id("fig-group", node);
        group.children.extend(label(node).map(XmlNode::Element));
        if let Some(caption) = caption {
            group.push(self.caption(caption)?);
        }
        if !extras.is_empty() {
            tracing::debug!(count = extras.len(), "Paragraphs and attributions have no place in a fig-group");
        }
        for figure in figures {
            group.push(self.figure(figure, None, &[])?);
        }
        Ok(group)
    }

    /// `fig` in JATS order: label, caption, paragraphs, graphic, attributions.
    fn figure(
        &mut self,
        figure: &Node,
        outer_caption: Option<&Node>,
        extras: &[&Node],
    ) -> Result<XmlElement, FormatError> {
        let mut fig = element_with_id("fig", figure);
        fig.children.extend(label(figure).map(XmlNode::Element));

        let caption = outer_caption.or_else(|| children_of_kind(figure, NodeKind::Figcaption).next());
        if let Some(caption) = caption {
            fig.push(self.caption(caption)?);
        }
        let own: Vec<&Node> = figure.content().iter().collect();
        let all: Vec<&Node> = extras.iter().copied().chain(own).collect();
        for paragraph in all.iter().filter(|n| n.kind() == NodeKind::Paragraph) {
            fig.children.extend(self.block(paragraph)?);
        }
        fig.children.extend(graphic(figure).map(XmlNode::Element));
        for attribution in all.iter().filter(|n| n.kind() == NodeKind::Attribution) {
            fig.push(self.attribution(attribution)?);
        }
        Ok(fig)
    }

    fn table_wrap(&mut self, node: &Node) -> Result<XmlElement, FormatError> {
        let mut wrap = element_with_id("table-wrap", node);
        wrap.children.extend(label(node).map(XmlNode::Element));
        for caption in children_of_kind(node, NodeKind::Figcaption) {
            wrap.push(self.caption(caption)?);
        }
        for table in children_of_kind(node, NodeKind::Table) {
            wrap.push(self.table(table)?);
        }
        for footer in children_of_kind(node, NodeKind::TableElementFooter) {
            let mut foot = element_with_id("table-wrap-foot", footer);
            for child in footer.content() {
                foot.children.extend(self.block(child)?);
            }
            wrap.push(foot);
        }
        Ok(wrap)
    }

    /// Leading all-header rows go to `thead`, the rest to `tbody`.
    fn table(&mut self, node: &Node) -> Result<XmlElement, FormatError> {
        let mut table = element_with_id("table", node);
        for colgroup in children_of_kind(node, NodeKind::TableColgroup) {
            let mut group = XmlElement::new("colgroup");
            for col in colgroup.content() {
                let mut col_el = XmlElement::new("col");
                if let Some(width) = non_empty(col.attr_str("width")) {
                    col_el.set_attr("width", width);
                }
                group.push(col_el);
            }
            table.push(group);
        }

        let rows: Vec<&Node> = children_of_kind(node, NodeKind::TableRow).collect();
        let header_rows = rows
            .iter()
            .take_while(|row| {
                row.content()
                    .iter()
                    .all(|cell| cell.kind() == NodeKind::TableHeader)
            })
            .count();
        let header_rows = if header_rows == rows.len() { 0 } else { header_rows };

        let mut thead = XmlElement::new("thead");
        let mut tbody = XmlElement::new("tbody");
        for (index, row) in rows.iter().enumerate() {
            let mut tr = XmlElement::new("tr");
            for cell in row.content() {
                tr.push(self.cell(cell)?);
            }
            if index < header_rows {
                thead.push(tr);
            } else {
                tbody.push(tr);
            }
        }
        if !thead.children.is_empty() {
            table.push(thead);
        }
        table.push(tbody);
        Ok(table)
    }

    fn cell(&mut self, cell: &Node) -> Result<XmlElement, FormatError> {
        let name = if cell.kind() == NodeKind::TableHeader {
            "th"
        } else {
            "td"
        };
        let mut el = XmlElement::new(name);
        for span in ["colspan", "rowspan"] {
            if let Some(n) = cell.attr(span).and_then(Value::as_i64).filter(|n| *n != 1) {
                el.set_attr(span, n.to_string());
            }
        }
        for attr in ["align", "valign", "scope", "style"] {
            if let Some(value) = non_empty(cell.attr_str(attr)) {
                el.set_attr(attr, value);
            }
        }
        el.children = self.inline(cell.content())?;
        Ok(el)
    }

    fn footnote(&mut self, footnote: &Node) -> Result<XmlElement, FormatError> {
        let mut el = element_with_id("fn", footnote);
        if let Some(category) = non_empty(footnote.attr_str("category")) {
            el.set_attr("fn-type", category);
        }
        for paragraph in footnote.content() {
            el.children.extend(self.block(paragraph)?);
        }
        self.attach_unanchored(footnote.id(), &mut el);
        Ok(el)
    }

    // ---- inline ----

    pub(super) fn inline(&mut self, nodes: &[Node]) -> Result<Vec<XmlNode>, FormatError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node.kind() {
                NodeKind::Text => {
                    let mut wrapped = XmlNode::Text(node.text().unwrap_or_default().to_string());
                    for mark in node.marks().iter().rev() {
                        let mut el = XmlElement::new(mark_element(mark.kind()));
                        if mark.kind() == MarkKind::Styled {
                            if let Some(style) = non_empty(mark.attr_str("rid")) {
                                el.set_attr("style", style);
                            }
                        }
                        el.push(wrapped);
                        wrapped = XmlNode::Element(el);
                    }
                    out.push(wrapped);
                }
                NodeKind::HardBreak => out.push(XmlElement::new("break").into()),
                NodeKind::Citation => {
                    let rids = rids(node);
                    let text = match citation_label(&rids, &self.numbering) {
                        Some(label) if rids.iter().all(|rid| self.numbering.contains_key(rid)) => {
                            label
                        }
                        _ => node.attr_str("contents").to_string(),
                    };
                    out.push(
                        XmlElement::new("xref")
                            .with_attr("ref-type", "bibr")
                            .with_attr("rid", rids.join(" "))
                            .with_text(text)
                            .into(),
                    );
                }
                NodeKind::CrossReference => {
                    let rids = rids(node);
                    let target = rids.first().and_then(|rid| self.kinds.get(rid)).copied();
                    let text = non_empty(node.attr_str("customLabel"))
                        .unwrap_or_else(|| node.attr_str("label"));
                    out.push(
                        XmlElement::new("xref")
                            .with_attr("ref-type", ref_type(target))
                            .with_attr("rid", rids.join(" "))
                            .with_text(text)
                            .into(),
                    );
                }
                NodeKind::InlineFootnote => {
                    out.push(
                        XmlElement::new("xref")
                            .with_attr("ref-type", "fn")
                            .with_attr("rid", rids(node).join(" "))
                            .with_text(node.attr_str("contents"))
                            .into(),
                    );
                }
                NodeKind::InlineEquation => {
                    let mut formula = element_with_id("inline-formula", node);
                    let content = node.attr_str("content");
                    if node.attr_str("format") == "mathml" {
                        formula.push(XmlNode::Raw(content.to_string()));
                    } else {
                        formula.push(XmlElement::new("tex-math").with_text(content));
                    }
                    out.push(formula.into());
                }
                NodeKind::Link => {
                    let mut link = XmlElement::new("ext-link")
                        .with_attr("ext-link-type", "uri")
                        .with_attr("xlink:href", node.attr_str("href"));
                    if let Some(title) = non_empty(node.attr_str("title")) {
                        link.set_attr("xlink:title", title);
                    }
                    link.children = self.inline(node.content())?;
                    out.push(link.into());
                }
                NodeKind::HighlightMarker => out.extend(self.author_query(node.id())),
                _ => return Err(misplaced(node, "inline")),
            }
        }
        Ok(out)
    }
}

fn misplaced(node: &Node, context: &str) -> FormatError {
    FormatError::InvalidInput(format!(
        "`{}` cannot be exported in {context} content",
        node.kind()
    ))
}

fn equation_content(equation: &Node) -> Option<XmlNode> {
    let mathml = equation.attr_str("MathMLStringRepresentation");
    let tex = equation.attr_str("TeXRepresentation");
    if !mathml.trim().is_empty() {
        Some(XmlNode::Raw(mathml.to_string()))
    } else if !tex.trim().is_empty() {
        Some(XmlElement::new("tex-math").with_text(tex).into())
    } else {
        None
    }
}

fn code(listing: &Node) -> XmlElement {
    let mut code = XmlElement::new("code").with_text(listing.attr_str("contents"));
    if let Some(language) = non_empty(listing.attr_str("language")) {
        code.set_attr("language", language);
    }
    code
}

fn publication_type(item_type: &str) -> &'static str {
    PUBLICATION_TYPES
        .iter()
        .find(|(_, item)| *item == item_type)
        .map_or("journal", |(jats, _)| *jats)
}

fn text_field(item: &Node, attr: &str, element: &str) -> Option<XmlElement> {
    let value = match item.attr(attr)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    non_empty(&value).map(|text| XmlElement::new(element).with_text(text))
}

/// `ref` for a bibliography item.
fn reference(item: &Node) -> XmlElement {
    let reference = element_with_id("ref", item);
    if let Some(literal) = non_empty(item.attr_str("literal")) {
        return reference.with_child(XmlElement::new("mixed-citation").with_text(literal));
    }

    let mut citation = XmlElement::new("element-citation")
        .with_attr("publication-type", publication_type(item.attr_str("type")));
    if let Some(Value::Array(authors)) = item.attr("author") {
        let mut group = XmlElement::new("person-group").with_attr("person-group-type", "author");
        for author in authors {
            let part = |key: &str| author.get(key).and_then(Value::as_str).and_then(non_empty);
            match (part("family"), part("given"), part("literal")) {
                (None, None, Some(literal)) => group.push(XmlElement::new("collab").with_text(literal)),
                (family, given, _) => {
                    let mut name = XmlElement::new("name");
                    if let Some(family) = family {
                        name.push(XmlElement::new("surname").with_text(family));
                    }
                    if let Some(given) = given {
                        name.push(XmlElement::new("given-names").with_text(given));
                    }
                    group.push(name);
                }
            }
        }
        if !group.children.is_empty() {
            citation.push(group);
        }
    }

    let title_element = match item.attr_str("type") {
        "chapter" => "chapter-title",
        "dataset" => "data-title",
        _ => "article-title",
    };
    citation.children.extend(text_field(item, "title", title_element).map(XmlNode::Element));
    citation
        .children
        .extend(text_field(item, "containerTitle", "source").map(XmlNode::Element));

    let date_parts = item
        .attr("issued")
        .and_then(|issued| issued.get("date-parts"))
        .and_then(|parts| parts.get(0))
        .and_then(Value::as_array);
    if let Some(parts) = date_parts {
        for (part, element) in parts.iter().zip(["year", "month", "day"]) {
            if let Some(value) = part.as_i64() {
                citation.push(XmlElement::new(element).with_text(value.to_string()));
            }
        }
    }

    for (attr, element) in [
        ("volume", "volume"),
        ("issue", "issue"),
        ("supplement", "supplement"),
    ] {
        citation.children.extend(text_field(item, attr, element).map(XmlNode::Element));
    }
    if let Some(page) = non_empty(item.attr_str("page")) {
        match page.split_once('-') {
            Some((first, last)) => {
                citation.push(XmlElement::new("fpage").with_text(first.trim()));
                citation.push(XmlElement::new("lpage").with_text(last.trim()));
            }
            None => citation.push(XmlElement::new("fpage").with_text(page)),
        }
    }
    for (attr, element) in [
        ("publisher", "publisher-name"),
        ("publisherPlace", "publisher-loc"),
        ("edition", "edition"),
    ] {
        citation.children.extend(text_field(item, attr, element).map(XmlNode::Element));
    }
    if let Some(doi) = non_empty(item.attr_str("DOI")) {
        citation.push(
            XmlElement::new("pub-id")
                .with_attr("pub-id-type", "doi")
                .with_text(doi),
        );
    }
    if let Some(url) = non_empty(item.attr_str("URL")) {
        citation.push(
            XmlElement::new("ext-link")
                .with_attr("ext-link-type", "uri")
                .with_attr("xlink:href", url),
        );
    }
    reference.with_child(citation)
}
