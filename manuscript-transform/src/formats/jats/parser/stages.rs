//! Body normalization stages
//!
//! Each stage rewrites the raw JATS element tree toward the shape the conversion rules
//! expect: every piece of body content inside a `sec`, captions last, abstracts and back
//! matter turned into sections of the body, figures grouped, block elements lifted out of
//! paragraphs.

use super::pipeline::{ImportContext, XmlTransform};
use crate::common::section_category::{category_from_type_attr, type_attr_for_category};
use crate::error::FormatError;
use crate::ir::nodes::{XmlElement, XmlNode};

/// Elements that can only stand between paragraphs.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "disp-formula",
    "fig",
    "fig-group",
    "table-wrap",
    "list",
    "disp-quote",
    "boxed-text",
    "code",
    "preformat",
];

/// Footnote types treated as plain footnotes rather than section categories.
const GENERIC_FN_TYPES: &[&str] = &["fn", "footnote", "other"];

fn titled_sec(sec_type: &str, title: &str) -> XmlElement {
    XmlElement::new("sec")
        .with_attr("sec-type", sec_type)
        .with_child(XmlElement::new("title").with_text(title))
}

/// Index of the article's body, created after `front` when missing.
pub(super) fn ensure_body(article: &mut XmlElement) -> usize {
    if let Some(index) = article
        .children
        .iter()
        .position(|node| node.is_element_named("body"))
    {
        return index;
    }
    let at = article
        .children
        .iter()
        .position(|node| node.is_element_named("front"))
        .map_or(0, |front| front + 1);
    article
        .children
        .insert(at, XmlNode::Element(XmlElement::new("body")));
    at
}

/// Adds `nodes` to the body, at its start or its end.
fn add_to_body(article: &mut XmlElement, nodes: Vec<XmlNode>, at_start: bool) {
    let index = ensure_body(article);
    if let XmlNode::Element(body) = &mut article.children[index] {
        if at_start {
            body.children.splice(0..0, nodes);
        } else {
            body.children.extend(nodes);
        }
    }
}

pub(super) fn child_mut<'a>(el: &'a mut XmlElement, name: &str) -> Option<&'a mut XmlElement> {
    el.children.iter_mut().find_map(|node| match node {
        XmlNode::Element(child) if child.is(name) => Some(child),
        _ => None,
    })
}

fn for_each_element_mut(el: &mut XmlElement, f: &mut impl FnMut(&mut XmlElement)) {
    f(el);
    for node in &mut el.children {
        if let XmlNode::Element(child) = node {
            for_each_element_mut(child, f);
        }
    }
}

fn is_loose(node: &XmlNode) -> bool {
    match node {
        XmlNode::Element(el) => !el.is("sec"),
        XmlNode::Text(_) => !node.is_blank(),
        XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => false,
    }
}

/// Moves bare body content into the section before it.
///
/// Content ahead of the first section gets a new untitled section of its own. A body that
/// holds nothing but sections is left as it is.
pub struct EnsureSection;

impl XmlTransform for EnsureSection {
    fn name(&self) -> &str {
        "ensure-section"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let Some(body) = child_mut(&mut article, "body") else {
            return Ok(article);
        };
        if !body.children.iter().any(is_loose) {
            return Ok(article);
        }

        let mut children: Vec<XmlNode> = Vec::with_capacity(body.children.len());
        let mut open = None;
        for node in std::mem::take(&mut body.children) {
            if node.is_element_named("sec") {
                children.push(node);
                open = Some(children.len() - 1);
                continue;
            }
            if !is_loose(&node) {
                children.push(node);
                continue;
            }
            let index = match open {
                Some(index) => index,
                None => {
                    let sec = XmlElement::new("sec").with_child(XmlElement::new("title"));
                    children.push(XmlNode::Element(sec));
                    children.len() - 1
                }
            };
            open = Some(index);
            if let Some(XmlNode::Element(sec)) = children.get_mut(index) {
                sec.children.push(node);
            }
        }
        body.children = children;
        Ok(article)
    }
}

/// Puts table footers then captions last in their containers and flattens caption paragraphs.
pub struct MoveCaptions;

impl XmlTransform for MoveCaptions {
    fn name(&self) -> &str {
        "move-captions"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        for_each_element_mut(&mut article, &mut |el| {
            if el.is("table-wrap") {
                let footers = el.take_children_named("table-wrap-foot");
                el.children.extend(footers.into_iter().map(XmlNode::Element));
            }
            if matches!(el.name.as_str(), "fig" | "fig-group" | "table-wrap" | "boxed-text") {
                let captions = el.take_children_named("caption");
                el.children.extend(captions.into_iter().map(XmlNode::Element));
            }
            if el.is("caption") {
                unwrap_paragraphs(el);
            }
        });
        Ok(article)
    }
}

fn unwrap_paragraphs(caption: &mut XmlElement) {
    let mut children = Vec::with_capacity(caption.children.len());
    let mut after_paragraph = false;
    for node in std::mem::take(&mut caption.children) {
        match node {
            XmlNode::Element(p) if p.is("p") => {
                if after_paragraph {
                    children.push(XmlNode::Text(" ".into()));
                }
                children.extend(p.children);
                after_paragraph = true;
            }
            other => children.push(other),
        }
    }
    caption.children = children;
}

/// Turns abstracts into the leading sections of the body.
pub struct MoveAbstracts;

impl XmlTransform for MoveAbstracts {
    fn name(&self) -> &str {
        "move-abstracts"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let abstracts = child_mut(&mut article, "front")
            .and_then(|front| child_mut(front, "article-meta"))
            .map(|meta| meta.take_children_named("abstract"))
            .unwrap_or_default();
        if abstracts.is_empty() {
            return Ok(article);
        }

        let sections: Vec<XmlNode> = abstracts
            .into_iter()
            .map(|el| XmlNode::Element(abstract_section(el)))
            .collect();
        add_to_body(&mut article, sections, true);
        Ok(article)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn abstract_section(mut el: XmlElement) -> XmlElement {
    let kind = el.non_empty_attr("abstract-type").map(str::to_string);
    let (sec_type, default_title) = match &kind {
        Some(kind) => (format!("abstract-{kind}"), format!("{} Abstract", capitalize(kind))),
        None => ("abstract".to_string(), "Abstract".to_string()),
    };
    let mut sec = XmlElement::new("sec").with_attr("sec-type", sec_type);
    if let Some(id) = el.attr("id") {
        sec.set_attr("id", id);
    }
    let title = el
        .take_children_named("title")
        .into_iter()
        .next()
        .filter(XmlElement::has_meaningful_content)
        .unwrap_or_else(|| XmlElement::new("title").with_text(default_title));
    sec.children.push(XmlNode::Element(title));
    sec.children
        .extend(el.children.into_iter().filter(|node| !node.is_blank()));
    sec
}

/// Moves back-matter content into body sections.
pub struct MoveBackMatter;

impl XmlTransform for MoveBackMatter {
    fn name(&self) -> &str {
        "move-back-matter"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let Some(back) = child_mut(&mut article, "back") else {
            return Ok(article);
        };

        let mut moved = Vec::new();
        let mut kept = Vec::new();
        for node in std::mem::take(&mut back.children) {
            let XmlNode::Element(el) = node else {
                kept.push(node);
                continue;
            };
            match el.name.as_str() {
                "sec" => moved.push(el),
                "ack" => moved.push(retitle(el, "acknowledgments", "Acknowledgements")),
                "app" => moved.push(retitle(el, "appendices", "Appendix")),
                "app-group" => {
                    let mut apps = Vec::new();
                    let mut rest = XmlElement::new("app-group");
                    if let Some(id) = el.attr("id") {
                        rest.set_attr("id", id);
                    }
                    for node in el.children {
                        match node {
                            XmlNode::Element(app) if app.is("app") => {
                                apps.push(retitle(app, "appendices", "Appendix"))
                            }
                            other if other.is_blank() => {}
                            other => rest.children.push(other),
                        }
                    }
                    // content of the group itself leads its appendices
                    if has_content_besides_title(&rest) {
                        moved.push(retitle(rest, "appendices", "Appendices"));
                    }
                    moved.extend(apps);
                }
                "ref-list" => moved.push(reference_section(el)),
                _ => kept.push(XmlNode::Element(el)),
            }
        }
        back.children = kept;

        add_to_body(
            &mut article,
            moved.into_iter().map(XmlNode::Element).collect(),
            false,
        );
        Ok(article)
    }
}

fn has_content_besides_title(el: &XmlElement) -> bool {
    el.children.iter().any(|node| match node {
        XmlNode::Element(child) => !child.is("title"),
        XmlNode::Text(_) => !node.is_blank(),
        XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => false,
    })
}

/// Renames `el` to a `sec` of `sec_type`, synthesizing a title when it has none.
fn retitle(el: XmlElement, sec_type: &str, default_title: &str) -> XmlElement {
    let mut sec = XmlElement::new("sec").with_attr("sec-type", sec_type);
    if let Some(id) = el.attr("id") {
        sec.set_attr("id", id);
    }
    let mut children = el.children;
    let has_title = children
        .iter()
        .any(|node| node.as_element().is_some_and(|t| t.is("title") && t.has_meaningful_content()));
    if !has_title {
        children.retain(|node| !node.is_element_named("title"));
        children.insert(
            0,
            XmlNode::Element(XmlElement::new("title").with_text(default_title)),
        );
    }
    sec.children = children;
    sec
}

fn reference_section(mut ref_list: XmlElement) -> XmlElement {
    let title = ref_list
        .take_children_named("title")
        .into_iter()
        .next()
        .filter(XmlElement::has_meaningful_content)
        .unwrap_or_else(|| XmlElement::new("title").with_text("References"));
    let mut sec = XmlElement::new("sec")
        .with_attr("sec-type", "bibliography")
        .with_child(title);
    if let Some(id) = ref_list.remove_attr("id") {
        sec.set_attr("id", id);
    }
    // prose around the references is kept ahead of the list
    let (refs, prose): (Vec<XmlNode>, Vec<XmlNode>) = std::mem::take(&mut ref_list.children)
        .into_iter()
        .filter(|node| !node.is_blank())
        .partition(|node| match node {
            XmlNode::Element(el) => matches!(el.name.as_str(), "ref" | "ref-list"),
            XmlNode::Text(_) => false,
            XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => true,
        });
    ref_list.children = refs;
    sec.children.extend(prose);
    sec.with_child(ref_list)
}

fn specific_fn_type(fn_el: &XmlElement) -> Option<&str> {
    fn_el
        .non_empty_attr("fn-type")
        .filter(|t| !GENERIC_FN_TYPES.contains(t))
}

/// Turns back-matter footnotes into footnote and category sections.
///
/// Untyped footnote groups are gathered, whole, into one notes section. A footnote whose
/// `fn-type` names a section category becomes a section of that category. Footnote groups
/// that carry an `fn-type` themselves are kept intact in a section of their own.
pub struct ConsolidateFootnotes;

impl XmlTransform for ConsolidateFootnotes {
    fn name(&self) -> &str {
        "consolidate-footnotes"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let Some(back) = child_mut(&mut article, "back") else {
            return Ok(article);
        };
        let groups = back.take_children_named("fn-group");
        let loose = back.take_children_named("fn");
        if groups.is_empty() && loose.is_empty() {
            return Ok(article);
        }

        let mut group_title = None;
        let mut notes = Vec::new();
        let mut typed_groups = Vec::new();
        let mut typed = Vec::new();
        for group in groups {
            if group.non_empty_attr("fn-type").is_some() {
                typed_groups.push(group);
                continue;
            }
            let mut kept = XmlElement {
                name: group.name,
                attrs: group.attrs,
                children: Vec::new(),
            };
            for node in group.children {
                match node {
                    XmlNode::Element(fn_el) if fn_el.is("fn") && is_categorized(&fn_el) => {
                        typed.push(fn_el)
                    }
                    XmlNode::Element(title)
                        if title.is("title")
                            && group_title.is_none()
                            && title.has_meaningful_content() =>
                    {
                        group_title = Some(title)
                    }
                    other => kept.children.push(other),
                }
            }
            if kept.has_meaningful_content() {
                notes.push(XmlNode::Element(kept));
            }
        }
        let mut untyped = Vec::new();
        for fn_el in loose {
            if is_categorized(&fn_el) {
                typed.push(fn_el);
            } else {
                untyped.push(XmlNode::Element(fn_el));
            }
        }
        if !untyped.is_empty() {
            notes.push(XmlNode::Element(
                XmlElement::new("fn-group").with_children(untyped),
            ));
        }

        let mut moved = Vec::new();
        if !notes.is_empty() {
            let title =
                group_title.unwrap_or_else(|| XmlElement::new("title").with_text("Footnotes"));
            let mut sec = XmlElement::new("sec")
                .with_attr("sec-type", "notes")
                .with_child(title);
            sec.children.extend(notes);
            moved.push(sec);
        }
        for fn_el in typed {
            let sec_type = specific_fn_type(&fn_el)
                .and_then(category_from_type_attr)
                .and_then(type_attr_for_category);
            if let Some(sec_type) = sec_type {
                moved.push(footnote_section(fn_el, sec_type));
            }
        }
        moved.extend(typed_groups.into_iter().map(typed_group_section));

        add_to_body(
            &mut article,
            moved.into_iter().map(XmlNode::Element).collect(),
            false,
        );
        Ok(article)
    }
}

/// True for a footnote whose `fn-type` maps to a section category.
///
/// Footnotes of other types stay with the plain footnotes, keeping their type.
fn is_categorized(fn_el: &XmlElement) -> bool {
    specific_fn_type(fn_el)
        .and_then(category_from_type_attr)
        .and_then(type_attr_for_category)
        .is_some()
}

/// A typed `fn-group`, whole, inside a section classified by its type.
fn typed_group_section(mut group: XmlElement) -> XmlElement {
    let sec_type = group
        .non_empty_attr("fn-type")
        .and_then(category_from_type_attr)
        .and_then(type_attr_for_category)
        .unwrap_or("notes");
    let title = group
        .take_children_named("title")
        .into_iter()
        .next()
        .filter(XmlElement::has_meaningful_content)
        .unwrap_or_else(|| XmlElement::new("title").with_text("Footnotes"));
    let mut sec = XmlElement::new("sec")
        .with_attr("sec-type", sec_type)
        .with_child(title);
    if let Some(id) = group.remove_attr("id") {
        sec.set_attr("id", id);
    }
    sec.with_child(group)
}

fn footnote_section(mut fn_el: XmlElement, sec_type: &str) -> XmlElement {
    let title = fn_el
        .take_children_named("title")
        .into_iter()
        .next()
        .or_else(|| {
            fn_el
                .take_children_named("label")
                .into_iter()
                .next()
                .map(|label| XmlElement::new("title").with_children(label.children))
        })
        .unwrap_or_else(|| XmlElement::new("title"));
    let mut sec = XmlElement::new("sec")
        .with_attr("sec-type", sec_type)
        .with_child(title);
    if let Some(id) = fn_el.attr("id") {
        sec.set_attr("id", id);
    }
    sec.children
        .extend(fn_el.children.into_iter().filter(|node| !node.is_blank()));
    sec
}

/// Wraps plain figures that sit directly in sections into figure groups.
pub struct WrapFigures;

impl XmlTransform for WrapFigures {
    fn name(&self) -> &str {
        "wrap-figures"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        for_each_element_mut(&mut article, &mut |el| {
            if !el.is("sec") {
                return;
            }
            for node in &mut el.children {
                let XmlNode::Element(fig) = node else {
                    continue;
                };
                if fig.is("fig") && is_plain_figure(fig) {
                    *fig = group_figure(std::mem::take(fig));
                }
            }
        });
        Ok(article)
    }
}

pub fn is_plain_figure(fig: &XmlElement) -> bool {
    matches!(fig.non_empty_attr("fig-type"), None | Some("figure"))
}

/// Wraps a `fig` into a `fig-group` carrying its id, label and caption.
///
/// A figure with several graphics becomes one sub-figure per graphic and the group is flagged
/// with `multiGraphic="true"`.
pub fn group_figure(mut fig: XmlElement) -> XmlElement {
    let mut group = XmlElement::new("fig-group");
    if let Some(id) = fig.remove_attr("id") {
        group.set_attr("id", id);
    }
    group
        .children
        .extend(fig.take_children_named("label").into_iter().map(XmlNode::Element));
    let captions = fig.take_children_named("caption");

    let graphic_count = fig.elements_named("graphic").count();
    if graphic_count > 1 {
        group.set_attr("multiGraphic", "true");
        let mut graphics = fig.take_children_named("graphic");
        // the last graphic stays with the rest of the figure, which becomes the main entry
        if let Some(last) = graphics.pop() {
            fig.push(last);
        }
        for graphic in graphics {
            group.push(XmlElement::new("fig").with_child(graphic));
        }
        group.push(fig);
    } else {
        let attributions = fig.take_children_named("attrib");
        group.push(fig);
        group
            .children
            .extend(attributions.into_iter().map(XmlNode::Element));
    }
    group
        .children
        .extend(captions.into_iter().map(XmlNode::Element));
    group
}

/// Turns `floats-group` into a trailing body section.
pub struct MoveFloatsGroup;

impl XmlTransform for MoveFloatsGroup {
    fn name(&self) -> &str {
        "move-floats-group"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let floats = article.take_children_named("floats-group");
        if floats.is_empty() {
            return Ok(article);
        }
        let mut sec = titled_sec("floating-element", "Floating Group");
        for group in floats {
            sec.children
                .extend(group.children.into_iter().filter(|node| !node.is_blank()));
        }
        add_to_body(&mut article, vec![XmlNode::Element(sec)], false);
        Ok(article)
    }
}

/// Splits paragraphs around the block elements they contain.
pub struct PromoteBlocks;

impl XmlTransform for PromoteBlocks {
    fn name(&self) -> &str {
        "promote-blocks"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        _ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        for_each_element_mut(&mut article, &mut |el| {
            if !matches!(el.name.as_str(), "sec" | "boxed-text" | "list-item") {
                return;
            }
            let needs_split = el
                .elements_named("p")
                .any(|p| p.elements().any(|child| BLOCK_ELEMENTS.contains(&child.name.as_str())));
            if !needs_split {
                return;
            }
            let mut children = Vec::with_capacity(el.children.len());
            for node in std::mem::take(&mut el.children) {
                match node {
                    XmlNode::Element(p) if p.is("p") => children.extend(split_paragraph(p)),
                    other => children.push(other),
                }
            }
            el.children = children;
        });
        Ok(article)
    }
}

fn split_paragraph(p: XmlElement) -> Vec<XmlNode> {
    let mut out = Vec::new();
    let mut current = XmlElement {
        name: p.name.clone(),
        attrs: p.attrs.clone(),
        children: Vec::new(),
    };
    for node in p.children {
        match node {
            XmlNode::Element(block) if BLOCK_ELEMENTS.contains(&block.name.as_str()) => {
                let finished = std::mem::replace(&mut current, XmlElement::new("p"));
                if finished.has_meaningful_content() {
                    out.push(XmlNode::Element(finished));
                }
                out.push(XmlNode::Element(block));
            }
            other => current.children.push(other),
        }
    }
    if current.has_meaningful_content() {
        out.push(XmlNode::Element(current));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stage: &dyn XmlTransform, article: XmlElement) -> XmlElement {
        stage
            .transform(article, &mut ImportContext::default())
            .unwrap()
    }

    fn names(el: &XmlElement) -> Vec<&str> {
        el.elements().map(|child| child.name.as_str()).collect()
    }

    #[test]
    fn bare_body_content_gets_a_section() {
        let article = XmlElement::new("article").with_child(
            XmlElement::new("body")
                .with_child(XmlElement::new("p").with_text("loose"))
                .with_child(XmlElement::new("sec").with_attr("id", "s1")),
        );
        let out = run(&EnsureSection, article);
        let body = out.child("body").unwrap();
        assert_eq!(names(body), vec!["sec", "sec"]);
        assert_eq!(names(body.first_element().unwrap()), vec!["title", "p"]);
    }

    #[test]
    fn trailing_content_joins_the_section_before_it() {
        let article = XmlElement::new("article").with_child(
            XmlElement::new("body")
                .with_child(XmlElement::new("sec").with_attr("id", "s1"))
                .with_child(XmlElement::new("p").with_text("after")),
        );
        let out = run(&EnsureSection, article);
        let body = out.child("body").unwrap();
        assert_eq!(names(body), vec!["sec"]);
        assert_eq!(names(body.child("sec").unwrap()), vec!["p"]);

        let again = run(&EnsureSection, out.clone());
        assert_eq!(again, out);
    }

    #[test]
    fn only_leading_content_gets_a_new_section() {
        let article = XmlElement::new("article").with_child(
            XmlElement::new("body")
                .with_child(XmlElement::new("p").with_text("one"))
                .with_child(XmlElement::new("sec").with_attr("id", "s1"))
                .with_child(XmlElement::new("p").with_text("two")),
        );
        let out = run(&EnsureSection, article);
        let body = out.child("body").unwrap();
        assert_eq!(names(body), vec!["sec", "sec"]);
        let first = body.first_element().unwrap();
        assert_eq!(first.attr("id"), None);
        assert_eq!(first.child("p").unwrap().text_content(), "one");
        let second = body.elements().nth(1).unwrap();
        assert_eq!(second.attr("id"), Some("s1"));
        assert_eq!(second.child("p").unwrap().text_content(), "two");
    }

    #[test]
    fn sectioned_body_is_untouched() {
        let article = XmlElement::new("article")
            .with_child(XmlElement::new("body").with_child(XmlElement::new("sec")));
        let out = run(&EnsureSection, article.clone());
        assert_eq!(out, article);
    }

    #[test]
    fn captions_and_footers_move_last() {
        let wrap = XmlElement::new("table-wrap")
            .with_child(
                XmlElement::new("caption")
                    .with_child(XmlElement::new("p").with_text("one"))
                    .with_child(XmlElement::new("p").with_text("two")),
            )
            .with_child(XmlElement::new("table-wrap-foot"))
            .with_child(XmlElement::new("table"));
        let out = run(&MoveCaptions, XmlElement::new("article").with_child(wrap));
        let wrap = out.child("table-wrap").unwrap();
        assert_eq!(names(wrap), vec!["table", "table-wrap-foot", "caption"]);
        assert_eq!(wrap.child("caption").unwrap().text_content(), "one two");
    }

    #[test]
    fn abstracts_become_leading_sections() {
        let article = XmlElement::new("article")
            .with_child(
                XmlElement::new("front").with_child(
                    XmlElement::new("article-meta")
                        .with_child(XmlElement::new("abstract").with_child(XmlElement::new("p")))
                        .with_child(
                            XmlElement::new("abstract").with_attr("abstract-type", "teaser"),
                        ),
                ),
            )
            .with_child(XmlElement::new("body").with_child(XmlElement::new("sec")));
        let out = run(&MoveAbstracts, article);
        let body = out.child("body").unwrap();
        let types: Vec<_> = body.elements().map(|s| s.attr("sec-type")).collect();
        assert_eq!(types, vec![Some("abstract"), Some("abstract-teaser"), None]);
        let titles: Vec<_> = body
            .elements()
            .take(2)
            .map(|s| s.child("title").unwrap().text_content())
            .collect();
        assert_eq!(titles, vec!["Abstract", "Teaser Abstract"]);
    }

    #[test]
    fn back_matter_moves_into_the_body() {
        let article = XmlElement::new("article")
            .with_child(XmlElement::new("body"))
            .with_child(
                XmlElement::new("back")
                    .with_child(XmlElement::new("ack").with_child(XmlElement::new("p")))
                    .with_child(
                        XmlElement::new("app-group")
                            .with_child(XmlElement::new("app").with_attr("id", "app1")),
                    )
                    .with_child(XmlElement::new("ref-list").with_child(XmlElement::new("ref"))),
            );
        let out = run(&MoveBackMatter, article);
        let body = out.child("body").unwrap();
        let summary: Vec<_> = body
            .elements()
            .map(|s| {
                (
                    s.attr("sec-type").unwrap_or_default().to_string(),
                    s.child("title").unwrap().text_content(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("acknowledgments".to_string(), "Acknowledgements".to_string()),
                ("appendices".to_string(), "Appendix".to_string()),
                ("bibliography".to_string(), "References".to_string()),
            ]
        );
        assert!(out.child("back").unwrap().children.is_empty());
    }

    #[test]
    fn appendix_group_content_leads_its_appendices() {
        let article = XmlElement::new("article").with_child(XmlElement::new("body")).with_child(
            XmlElement::new("back").with_child(
                XmlElement::new("app-group")
                    .with_child(XmlElement::new("title").with_text("Supporting notes"))
                    .with_child(XmlElement::new("p").with_text("Read these first."))
                    .with_child(XmlElement::new("app").with_attr("id", "app1")),
            ),
        );
        let out = run(&MoveBackMatter, article);
        let body = out.child("body").unwrap();
        assert_eq!(names(body), vec!["sec", "sec"]);
        let intro = body.first_element().unwrap();
        assert_eq!(intro.child("title").unwrap().text_content(), "Supporting notes");
        assert_eq!(intro.child("p").unwrap().text_content(), "Read these first.");
        assert_eq!(body.elements().nth(1).unwrap().attr("id"), Some("app1"));
    }

    #[test]
    fn reference_list_prose_stays_with_the_section() {
        let article = XmlElement::new("article").with_child(XmlElement::new("body")).with_child(
            XmlElement::new("back").with_child(
                XmlElement::new("ref-list")
                    .with_child(XmlElement::new("p").with_text("Sorted by year."))
                    .with_child(XmlElement::new("ref").with_attr("id", "r1")),
            ),
        );
        let out = run(&MoveBackMatter, article);
        let sec = out.child("body").unwrap().child("sec").unwrap();
        assert_eq!(names(sec), vec!["title", "p", "ref-list"]);
        assert_eq!(names(sec.child("ref-list").unwrap()), vec!["ref"]);
    }

    #[test]
    fn footnotes_are_consolidated_by_type() {
        let article = XmlElement::new("article").with_child(XmlElement::new("body")).with_child(
            XmlElement::new("back").with_child(
                XmlElement::new("fn-group")
                    .with_child(XmlElement::new("fn").with_attr("id", "fn1"))
                    .with_child(
                        XmlElement::new("fn")
                            .with_attr("id", "fn2")
                            .with_attr("fn-type", "con"),
                    )
                    .with_child(
                        XmlElement::new("fn")
                            .with_attr("id", "fn3")
                            .with_attr("fn-type", "mystery"),
                    ),
            ),
        );
        let out = run(&ConsolidateFootnotes, article);
        let body = out.child("body").unwrap();
        let types: Vec<_> = body.elements().map(|s| s.attr("sec-type")).collect();
        assert_eq!(types, vec![Some("notes"), Some("con")]);
        let notes = body.first_element().unwrap();
        assert_eq!(notes.child("title").unwrap().text_content(), "Footnotes");
        let kept: Vec<_> = notes
            .child("fn-group")
            .unwrap()
            .elements()
            .map(|fn_el| fn_el.attr("id"))
            .collect();
        assert_eq!(kept, vec![Some("fn1"), Some("fn3")]);
        assert_eq!(body.elements().nth(1).unwrap().attr("id"), Some("fn2"));
    }

    #[test]
    fn footnote_groups_keep_their_title_and_type() {
        let article = XmlElement::new("article").with_child(XmlElement::new("body")).with_child(
            XmlElement::new("back")
                .with_child(
                    XmlElement::new("fn-group")
                        .with_attr("id", "g1")
                        .with_child(XmlElement::new("title").with_text("Notes"))
                        .with_child(XmlElement::new("fn").with_attr("id", "fn1")),
                )
                .with_child(
                    XmlElement::new("fn-group")
                        .with_attr("fn-type", "abbr")
                        .with_child(XmlElement::new("title").with_text("Abbreviations used"))
                        .with_child(XmlElement::new("fn").with_attr("id", "fn2")),
                ),
        );
        let out = run(&ConsolidateFootnotes, article);
        let body = out.child("body").unwrap();
        assert_eq!(names(body), vec!["sec", "sec"]);

        let notes = body.first_element().unwrap();
        assert_eq!(notes.child("title").unwrap().text_content(), "Notes");
        assert_eq!(notes.child("fn-group").unwrap().attr("id"), Some("g1"));

        let typed = body.elements().nth(1).unwrap();
        assert_eq!(typed.attr("sec-type"), Some("notes"));
        assert_eq!(typed.child("title").unwrap().text_content(), "Abbreviations used");
        let group = typed.child("fn-group").unwrap();
        assert_eq!(group.attr("fn-type"), Some("abbr"));
        assert_eq!(names(group), vec!["fn"]);
    }

    #[test]
    fn single_graphic_figures_keep_one_figure() {
        let fig = XmlElement::new("fig")
            .with_attr("id", "f1")
            .with_child(XmlElement::new("label").with_text("Figure 1"))
            .with_child(XmlElement::new("caption"))
            .with_child(XmlElement::new("graphic"));
        let group = group_figure(fig);
        assert_eq!(group.attr("id"), Some("f1"));
        assert_eq!(names(&group), vec!["label", "fig", "caption"]);
        assert_eq!(group.child("fig").unwrap().attr("id"), None);
        assert_eq!(group.attr("multiGraphic"), None);
    }

    #[test]
    fn multi_graphic_figures_split() {
        let fig = XmlElement::new("fig")
            .with_child(XmlElement::new("graphic").with_attr("xlink:href", "a.png"))
            .with_child(XmlElement::new("graphic").with_attr("xlink:href", "b.png"))
            .with_child(XmlElement::new("caption"));
        let group = group_figure(fig);
        assert_eq!(group.attr("multiGraphic"), Some("true"));
        assert_eq!(names(&group), vec!["fig", "fig", "caption"]);
    }

    #[test]
    fn multi_graphic_main_entry_keeps_the_rest_of_the_figure() {
        let fig = XmlElement::new("fig")
            .with_attr("position", "float")
            .with_child(XmlElement::new("graphic").with_attr("xlink:href", "a.png"))
            .with_child(XmlElement::new("p").with_text("Panels left to right."))
            .with_child(XmlElement::new("graphic").with_attr("xlink:href", "b.png"));
        let group = group_figure(fig);
        let entries: Vec<_> = group.elements_named("fig").collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attr("position"), None);
        let main = entries[1];
        assert_eq!(main.attr("position"), Some("float"));
        assert_eq!(names(main), vec!["p", "graphic"]);
        assert_eq!(main.child("graphic").unwrap().attr("xlink:href"), Some("b.png"));
    }

    #[test]
    fn typed_figures_are_not_wrapped() {
        let article = XmlElement::new("article").with_child(
            XmlElement::new("sec").with_child(XmlElement::new("fig").with_attr("fig-type", "listing")),
        );
        let out = run(&WrapFigures, article);
        assert!(out.child("sec").unwrap().child("fig").is_some());
    }

    #[test]
    fn floats_group_becomes_a_section() {
        let article = XmlElement::new("article")
            .with_child(XmlElement::new("body"))
            .with_child(XmlElement::new("floats-group").with_child(XmlElement::new("fig")));
        let out = run(&MoveFloatsGroup, article);
        assert!(out.child("floats-group").is_none());
        let sec = out.child("body").unwrap().child("sec").unwrap();
        assert_eq!(sec.attr("sec-type"), Some("floating-element"));
        assert_eq!(names(sec), vec!["title", "fig"]);
    }

    #[test]
    fn paragraphs_split_around_blocks() {
        let p = XmlElement::new("p")
            .with_attr("id", "p1")
            .with_text("before ")
            .with_child(XmlElement::new("disp-formula"))
            .with_text(" after");
        let article = XmlElement::new("article").with_child(XmlElement::new("sec").with_child(p));
        let out = run(&PromoteBlocks, article);
        let sec = out.child("sec").unwrap();
        assert_eq!(names(sec), vec!["p", "disp-formula", "p"]);
        assert_eq!(sec.first_element().unwrap().attr("id"), Some("p1"));
        assert_eq!(sec.elements().nth(2).unwrap().attr("id"), None);
    }
}
