//! `front`: journal metadata and article metadata

use super::{non_empty, Builder};
use crate::error::FormatError;
use crate::formats::jats::parser::front::{COUNTS, HISTORY_DATES};
use crate::formats::jats::{Journal, TypedValue};
use crate::ir::nodes::{XmlElement, XmlNode};
use crate::schema::{Node, NodeKind};
use chrono::{Datelike, TimeZone, Utc};
use serde_json::Value;

fn text_element(name: &str, text: &str) -> XmlElement {
    XmlElement::new(name).with_text(text)
}

fn typed_element(name: &str, type_attr: &str, typed: &TypedValue) -> XmlElement {
    let el = text_element(name, &typed.value);
    match &typed.kind {
        Some(kind) => el.with_attr(type_attr, kind.as_str()),
        None => el,
    }
}

fn journal_meta(journal: &Journal) -> XmlElement {
    let mut meta = XmlElement::new("journal-meta");
    for id in &journal.identifiers {
        meta.push(typed_element("journal-id", "journal-id-type", id));
    }
    if journal.title.is_some() || !journal.abbreviated_titles.is_empty() {
        let mut group = XmlElement::new("journal-title-group");
        if let Some(title) = &journal.title {
            group.push(text_element("journal-title", title));
        }
        for abbreviated in &journal.abbreviated_titles {
            group.push(typed_element("abbrev-journal-title", "abbrev-type", abbreviated));
        }
        meta.push(group);
    }
    for issn in &journal.issns {
        meta.push(typed_element("issn", "pub-type", issn));
    }
    if let Some(publisher) = &journal.publisher_name {
        meta.push(XmlElement::new("publisher").with_child(text_element("publisher-name", publisher)));
    }
    meta
}

/// `<date date-type=…>` for a Unix timestamp.
fn history_date(date_type: &str, seconds: i64) -> Option<XmlElement> {
    let date = Utc.timestamp_opt(seconds, 0).single()?;
    Some(
        XmlElement::new("date")
            .with_attr("date-type", date_type)
            .with_child(text_element("day", &format!("{:02}", date.day())))
            .with_child(text_element("month", &format!("{:02}", date.month())))
            .with_child(text_element("year", &date.year().to_string())),
    )
}

fn attr_i64(node: &Node, name: &str) -> Option<i64> {
    node.attr(name).and_then(Value::as_i64)
}

fn child_of_kind(node: &Node, kind: NodeKind) -> Option<&Node> {
    node.content().iter().find(|child| child.kind() == kind)
}

impl Builder<'_> {
    pub(super) fn front(
        &mut self,
        manuscript: &Node,
        abstracts: Vec<XmlElement>,
        keyword_groups: Vec<XmlElement>,
    ) -> Result<XmlElement, FormatError> {
        let mut front = XmlElement::new("front");
        if let Some(journal) = &self.options.journal {
            front.push(journal_meta(journal));
        }

        let mut meta = XmlElement::new("article-meta");
        if let Some(id) = &self.options.id {
            meta.push(text_element("article-id", id).with_attr("pub-id-type", "publisher-id"));
        }
        let doi = self
            .options
            .doi
            .as_deref()
            .or_else(|| non_empty(manuscript.attr_str("doi")));
        if let Some(doi) = doi {
            meta.push(text_element("article-id", doi).with_attr("pub-id-type", "doi"));
        }

        let mut title = XmlElement::new("article-title");
        if let Some(node) = child_of_kind(manuscript, NodeKind::Title) {
            title.children = self.inline(node.content())?;
        }
        meta.push(XmlElement::new("title-group").with_child(title));

        if let Some(contributors) = child_of_kind(manuscript, NodeKind::Contributors) {
            if !contributors.content().is_empty() {
                meta.push(self.contrib_group(contributors));
            }
        }
        if let Some(affiliations) = child_of_kind(manuscript, NodeKind::Affiliations) {
            for affiliation in sorted_by_priority(affiliations.content()) {
                meta.push(affiliation_element(affiliation));
            }
        }
        if let Some(notes) = child_of_kind(manuscript, NodeKind::AuthorNotes) {
            meta.push(self.author_notes(notes)?);
        }
        if let Some(supplements) = child_of_kind(manuscript, NodeKind::Supplements) {
            for supplement in supplements
                .content()
                .iter()
                .filter(|child| child.kind() == NodeKind::Supplement)
            {
                meta.push(supplement_element(supplement));
            }
        }

        let dates: Vec<XmlElement> = HISTORY_DATES
            .iter()
            .filter_map(|(date_type, attr)| {
                attr_i64(manuscript, attr).and_then(|seconds| history_date(date_type, seconds))
            })
            .collect();
        if !dates.is_empty() {
            meta.push(XmlElement::new("history").with_children(dates.into_iter().map(XmlNode::Element)));
        }

        for (content_type, href) in &self.options.links {
            meta.push(
                XmlElement::new("self-uri")
                    .with_attr("content-type", content_type.as_str())
                    .with_attr("xlink:href", href.as_str()),
            );
        }
        meta.children
            .extend(abstracts.into_iter().map(XmlNode::Element));
        meta.children
            .extend(keyword_groups.into_iter().map(XmlNode::Element));

        let counts: Vec<XmlElement> = COUNTS
            .iter()
            .filter_map(|(element, attr)| {
                attr_i64(manuscript, attr)
                    .map(|count| XmlElement::new(*element).with_attr("count", count.to_string()))
            })
            .collect();
        if !counts.is_empty() {
            meta.push(XmlElement::new("counts").with_children(counts.into_iter().map(XmlNode::Element)));
        }

        front.push(meta);
        Ok(front)
    }

    fn contrib_group(&self, contributors: &Node) -> XmlElement {
        let mut group = XmlElement::new("contrib-group");
        for contributor in sorted_by_priority(contributors.content()) {
            let mut contrib = XmlElement::new("contrib")
                .with_attr("contrib-type", non_empty(contributor.attr_str("role")).unwrap_or("author"));
            if let Some(id) = non_empty(contributor.id()) {
                contrib.set_attr("id", id);
            }
            if contributor.attr("isCorresponding") == Some(&Value::Bool(true)) {
                contrib.set_attr("corresp", "yes");
            }
            if contributor.attr("isJointContributor") == Some(&Value::Bool(true)) {
                contrib.set_attr("equal-contrib", "yes");
            }

            if let Some(orcid) = non_empty(contributor.attr_str("ORCIDIdentifier")) {
                contrib.push(text_element("contrib-id", orcid).with_attr("contrib-id-type", "orcid"));
            }
            if let Some(Value::Object(name)) = contributor.attr("bibliographicName") {
                let part = |key: &str| name.get(key).and_then(Value::as_str).unwrap_or_default();
                let mut name_el = XmlElement::new("name");
                if let Some(family) = non_empty(part("family")) {
                    name_el.push(text_element("surname", family));
                }
                if let Some(given) = non_empty(part("given")) {
                    name_el.push(text_element("given-names", given));
                }
                contrib.push(name_el);
            }
            if let Some(email) = non_empty(contributor.attr_str("email")) {
                contrib.push(text_element("email", email));
            }
            for rid in string_list(contributor.attr("affiliations")) {
                contrib.push(XmlElement::new("xref").with_attr("ref-type", "aff").with_attr("rid", rid));
            }
            for (rid, label) in object_list(contributor.attr("footnote"), "noteID", "noteLabel") {
                contrib.push(xref("fn", &rid, &label));
            }
            for (rid, label) in object_list(contributor.attr("corresp"), "correspID", "correspLabel") {
                contrib.push(xref("corresp", &rid, &label));
            }
            self.attach_unanchored(contributor.id(), &mut contrib);
            group.push(contrib);
        }
        group
    }

    fn author_notes(&mut self, notes: &Node) -> Result<XmlElement, FormatError> {
        let mut el = XmlElement::new("author-notes");
        if let Some(id) = non_empty(notes.id()) {
            el.set_attr("id", id);
        }
        for child in notes.content() {
            match child.kind() {
                NodeKind::Corresp => {
                    let mut corresp = XmlElement::new("corresp");
                    if let Some(id) = non_empty(child.id()) {
                        corresp.set_attr("id", id);
                    }
                    if let Some(label) = non_empty(child.attr_str("label")) {
                        corresp.push(text_element("label", label));
                    }
                    corresp.children.extend(self.inline(child.content())?);
                    el.push(corresp);
                }
                _ => el.children.extend(self.block(child)?),
            }
        }
        Ok(el)
    }

    /// `kwd-group`s of a keywords section.
    pub(super) fn keyword_groups(&mut self, section: &Node) -> Result<Vec<XmlElement>, FormatError> {
        let mut groups = Vec::new();
        for element in section
            .content()
            .iter()
            .filter(|child| child.kind() == NodeKind::KeywordsElement)
        {
            groups.extend(self.keywords_element(element)?);
        }
        Ok(groups)
    }

    /// One `kwd-group` per keyword group of a keywords element.
    pub(super) fn keywords_element(&mut self, element: &Node) -> Result<Vec<XmlElement>, FormatError> {
        let mut groups = Vec::new();
        for group in element.content() {
            let mut kwd_group = XmlElement::new("kwd-group");
            if let Some(group_type) = non_empty(group.attr_str("type")) {
                kwd_group.set_attr("kwd-group-type", group_type);
            }
            for keyword in group.content() {
                let mut kwd = XmlElement::new("kwd");
                kwd.children = self.inline(keyword.content())?;
                kwd_group.push(kwd);
            }
            groups.push(kwd_group);
        }
        Ok(groups)
    }
}

fn xref(ref_type: &str, rid: &str, label: &str) -> XmlElement {
    XmlElement::new("xref")
        .with_attr("ref-type", ref_type)
        .with_attr("rid", rid)
        .with_text(label)
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn object_list(value: Option<&Value>, id_key: &str, label_key: &str) -> Vec<(String, String)> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let id = item.get(id_key)?.as_str()?;
            let label = item.get(label_key).and_then(Value::as_str).unwrap_or_default();
            Some((id.to_string(), label.to_string()))
        })
        .collect()
}

/// Nodes ordered by their `priority` attr; nodes without one keep their place after the rest.
fn sorted_by_priority(nodes: &[Node]) -> Vec<&Node> {
    let mut sorted: Vec<&Node> = nodes.iter().collect();
    sorted.sort_by_key(|node| node.attr("priority").and_then(Value::as_i64).unwrap_or(i64::MAX));
    sorted
}

fn affiliation_element(affiliation: &Node) -> XmlElement {
    let mut aff = XmlElement::new("aff");
    if let Some(id) = non_empty(affiliation.id()) {
        aff.set_attr("id", id);
    }
    if let Some(department) = non_empty(affiliation.attr_str("department")) {
        aff.push(text_element("institution", department).with_attr("content-type", "dept"));
    }
    if let Some(institution) = non_empty(affiliation.attr_str("institution")) {
        aff.push(text_element("institution", institution));
    }
    for line in ["addressLine1", "addressLine2", "addressLine3"] {
        if let Some(text) = non_empty(affiliation.attr_str(line)) {
            aff.push(text_element("addr-line", text));
        }
    }
    if let Some(city) = non_empty(affiliation.attr_str("city")) {
        aff.push(text_element("addr-line", city).with_attr("content-type", "city"));
    }
    for (attr, element) in [("county", "state"), ("postCode", "postal-code"), ("country", "country")] {
        if let Some(text) = non_empty(affiliation.attr_str(attr)) {
            aff.push(text_element(element, text));
        }
    }
    if let Some(email) = affiliation
        .attr("email")
        .and_then(|email| email.get("text"))
        .and_then(Value::as_str)
        .and_then(non_empty)
    {
        aff.push(text_element("email", email));
    }
    aff
}

fn supplement_element(supplement: &Node) -> XmlElement {
    let mut el = XmlElement::new("supplementary-material");
    if let Some(id) = non_empty(supplement.id()) {
        el.set_attr("id", id);
    }
    for (attr, name) in [
        ("href", "xlink:href"),
        ("mimeType", "mimetype"),
        ("mimeSubType", "mime-subtype"),
    ] {
        if let Some(value) = non_empty(supplement.attr_str(attr)) {
            el.set_attr(name, value);
        }
    }
    if let Some(title) = non_empty(supplement.attr_str("title")) {
        el.push(XmlElement::new("caption").with_child(text_element("title", title)));
    }
    el
}
