//! Bibliography references
//!
//! Each `<ref>` becomes a `bibliography_item` atom with a fresh id. The mapping from source
//! reference ids to the new ids is kept in the import context and applied to every citation
//! and cross-reference once the tree is complete.

use super::pipeline::ImportContext;
use crate::error::{FormatError, SchemaError};
use crate::ir::nodes::XmlElement;
use crate::schema::{Attrs, Node, NodeKind};
use serde_json::{json, Value};
use std::collections::HashMap;

/// JATS `publication-type` values and the bibliography item type each maps to.
pub const PUBLICATION_TYPES: &[(&str, &str)] = &[
    ("journal", "article-journal"),
    ("book", "book"),
    ("chapter", "chapter"),
    ("confproc", "paper-conference"),
    ("thesis", "thesis"),
    ("web", "webpage"),
    ("report", "report"),
    ("patent", "patent"),
    ("data", "dataset"),
];

const CITATION_ELEMENTS: &[&str] = &["element-citation", "mixed-citation", "citation"];

fn text_of(el: &XmlElement, name: &str) -> Option<String> {
    el.child(name)
        .map(|child| collapse_whitespace(&child.text_content()))
        .filter(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn item_type(publication_type: Option<&str>) -> &'static str {
    match publication_type {
        Some("conference") => "paper-conference",
        Some("webpage") => "webpage",
        Some("dataset") => "dataset",
        Some(t) => PUBLICATION_TYPES
            .iter()
            .find(|(jats, _)| *jats == t)
            .map_or("article-journal", |(_, item)| *item),
        None => "article-journal",
    }
}

fn authors(citation: &XmlElement) -> Value {
    let groups = citation.elements_named("person-group").filter(|group| {
        matches!(group.attr("person-group-type"), None | Some("author"))
    });
    let mut names = Vec::new();
    let direct = citation
        .elements()
        .filter(|el| matches!(el.name.as_str(), "name" | "string-name" | "collab"));
    for el in groups.flat_map(|group| group.elements()).chain(direct) {
        match el.name.as_str() {
            "name" | "string-name" => {
                let mut name = serde_json::Map::new();
                if let Some(family) = text_of(el, "surname") {
                    name.insert("family".into(), json!(family));
                }
                if let Some(given) = text_of(el, "given-names") {
                    name.insert("given".into(), json!(given));
                }
                if name.is_empty() {
                    name.insert("literal".into(), json!(collapse_whitespace(&el.text_content())));
                }
                names.push(Value::Object(name));
            }
            "collab" => {
                names.push(json!({"literal": collapse_whitespace(&el.text_content())}));
            }
            _ => {}
        }
    }
    if names.is_empty() {
        Value::Null
    } else {
        Value::Array(names)
    }
}

fn issued(citation: &XmlElement) -> Value {
    let Some(year) = text_of(citation, "year").and_then(|y| y.parse::<i64>().ok()) else {
        return Value::Null;
    };
    let mut parts = vec![year];
    if let Some(month) = text_of(citation, "month").and_then(|m| m.parse::<i64>().ok()) {
        parts.push(month);
        if let Some(day) = text_of(citation, "day").and_then(|d| d.parse::<i64>().ok()) {
            parts.push(day);
        }
    }
    json!({"date-parts": [parts]})
}

fn page(citation: &XmlElement) -> Option<String> {
    match (text_of(citation, "fpage"), text_of(citation, "lpage")) {
        (Some(first), Some(last)) => Some(format!("{first}-{last}")),
        (Some(first), None) => Some(first),
        _ => text_of(citation, "elocation-id"),
    }
}

/// Builds the bibliography item for a `<ref>` and records its id mapping.
pub fn bibliography_item(ref_el: &XmlElement, ctx: &mut ImportContext) -> Result<Node, SchemaError> {
    let id = ctx.ids.for_kind(NodeKind::BibliographyItem);
    if let Some(old) = ref_el.non_empty_attr("id") {
        if ctx.reference_ids.contains_key(old) {
            tracing::warn!(id = old, "Duplicate reference id, later references keep their own id");
        } else {
            ctx.reference_ids.insert(old.to_string(), id.clone());
        }
    }

    let empty = XmlElement::new("element-citation");
    let citation = ref_el
        .elements()
        .find(|el| CITATION_ELEMENTS.contains(&el.name.as_str()))
        .unwrap_or(&empty);

    let mut attrs = Attrs::new();
    attrs.insert("id".into(), json!(id));
    attrs.insert(
        "type".into(),
        json!(item_type(citation.non_empty_attr("publication-type"))),
    );
    attrs.insert("author".into(), authors(citation));
    attrs.insert("issued".into(), issued(citation));

    let title = text_of(citation, "article-title")
        .or_else(|| text_of(citation, "chapter-title"))
        .or_else(|| text_of(citation, "data-title"));
    let fields = [
        ("title", title),
        ("containerTitle", text_of(citation, "source")),
        ("volume", text_of(citation, "volume")),
        ("issue", text_of(citation, "issue")),
        ("supplement", text_of(citation, "supplement")),
        ("page", page(citation)),
        (
            "DOI",
            citation
                .elements_named("pub-id")
                .find(|id| id.attr("pub-id-type") == Some("doi"))
                .map(|id| id.text_content().trim().to_string()),
        ),
        (
            "URL",
            citation
                .child("ext-link")
                .and_then(|link| link.non_empty_attr("xlink:href").map(str::to_string))
                .or_else(|| text_of(citation, "uri")),
        ),
        ("publisher", text_of(citation, "publisher-name")),
        ("publisherPlace", text_of(citation, "publisher-loc")),
        ("edition", text_of(citation, "edition")),
    ];
    let structured = fields.iter().any(|(_, value)| value.is_some());
    for (name, value) in fields {
        if let Some(value) = value {
            attrs.insert(name.into(), json!(value));
        }
    }
    if !structured && attrs.get("author").map_or(true, Value::is_null) {
        let literal = collapse_whitespace(&citation.text_content());
        if !literal.is_empty() {
            attrs.insert("literal".into(), json!(literal));
        }
    }
    Node::leaf(NodeKind::BibliographyItem, attrs)
}

fn rewrite_rids(node: &Node, table: &HashMap<String, String>) -> Result<Node, SchemaError> {
    let content = node
        .content()
        .iter()
        .map(|child| rewrite_rids(child, table))
        .collect::<Result<Vec<_>, _>>()?;
    let rebuilt = if content.as_slice() == node.content() {
        node.clone()
    } else {
        node.with_content(content)?
    };

    if !matches!(node.kind(), NodeKind::Citation | NodeKind::CrossReference) {
        return Ok(rebuilt);
    }
    let Some(Value::Array(rids)) = node.attr("rids") else {
        return Ok(rebuilt);
    };
    let mapped: Vec<Value> = rids
        .iter()
        .map(|rid| match rid.as_str().and_then(|rid| table.get(rid)) {
            Some(new) => json!(new),
            None => rid.clone(),
        })
        .collect();
    if &mapped == rids {
        return Ok(rebuilt);
    }
    let mut patch = Attrs::new();
    patch.insert("rids".into(), Value::Array(mapped));
    rebuilt.with_attrs(patch)
}

/// Points citations and cross-references at the ids the bibliography items received.
pub fn reconcile_ids(manuscript: Node, ctx: &ImportContext) -> Result<Node, FormatError> {
    if ctx.reference_ids.is_empty() {
        return Ok(manuscript);
    }
    Ok(rewrite_rids(&manuscript, &ctx.reference_ids)?)
}
