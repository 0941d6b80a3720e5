//! Built-in migration scripts

use super::MigrationScript;
use crate::common::section_category::{category_from_type_attr, SectionCategory};
use crate::schema::JsonNode;
use semver::Version;
use serde_json::Value;

/// A script that rewrites nodes independently of the rest of the tree.
struct NodeRewrite {
    from: Version,
    to: Version,
    rewrite: fn(JsonNode) -> JsonNode,
}

impl MigrationScript for NodeRewrite {
    fn from_version(&self) -> &Version {
        &self.from
    }

    fn to_version(&self) -> &Version {
        &self.to
    }

    fn migrate_node(&self, node: JsonNode, _doc: &JsonNode) -> JsonNode {
        (self.rewrite)(node)
    }
}

pub fn builtin() -> Vec<Box<dyn MigrationScript>> {
    vec![
        Box::new(NodeRewrite {
            from: Version::new(1, 0, 0),
            to: Version::new(1, 1, 0),
            rewrite: citation_rids,
        }),
        Box::new(NodeRewrite {
            from: Version::new(1, 1, 0),
            to: Version::new(1, 2, 0),
            rewrite: bare_section_categories,
        }),
        Box::new(NodeRewrite {
            from: Version::new(1, 2, 0),
            to: Version::new(1, 3, 0),
            rewrite: inline_equation_content,
        }),
    ]
}

/// 1.0 → 1.1: `citation.rid` becomes the `rids` list.
fn citation_rids(mut node: JsonNode) -> JsonNode {
    if node.kind != "citation" {
        return node;
    }
    if let Some(rid) = node.attrs.remove("rid") {
        let rids = match rid {
            Value::String(rid) if rid.is_empty() => Vec::new(),
            Value::String(rid) => vec![Value::String(rid)],
            Value::Array(rids) => rids,
            _ => Vec::new(),
        };
        node.attrs.entry("rids").or_insert(Value::Array(rids));
    }
    node
}

/// Category names used before 1.2 that differ from the current ids.
const LEGACY_CATEGORIES: &[(&str, SectionCategory)] = &[
    ("acknowledgement", SectionCategory::Acknowledgements),
    ("introduction", SectionCategory::Intro),
    ("materials-method", SectionCategory::Methods),
    ("bibliography", SectionCategory::Bibliography),
    ("endnotes", SectionCategory::Footnotes),
    ("keywords", SectionCategory::Keywords),
    ("toc", SectionCategory::Toc),
];

fn bare_category(category: &str) -> String {
    let name = category
        .strip_prefix("MPSectionCategory:")
        .unwrap_or(category);
    LEGACY_CATEGORIES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, category)| *category)
        .or_else(|| SectionCategory::from_id(name))
        .or_else(|| category_from_type_attr(name))
        .map_or_else(|| name.to_string(), |category| category.id().to_string())
}

/// 1.1 → 1.2: `MPSectionCategory:<name>` becomes the bare category id.
fn bare_section_categories(mut node: JsonNode) -> JsonNode {
    if !node.kind.ends_with("section") {
        return node;
    }
    if let Some(Value::String(category)) = node.attrs.get("category") {
        let migrated = bare_category(category);
        node.attrs
            .insert("category".to_string(), Value::String(migrated));
    }
    node
}

/// 1.2 → 1.3: equation representations on `inline_equation` become `content` + `format`.
fn inline_equation_content(mut node: JsonNode) -> JsonNode {
    if node.kind != "inline_equation" {
        return node;
    }
    let take = |node: &mut JsonNode, name: &str| match node.attrs.remove(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    };
    let tex = take(&mut node, "TeXRepresentation");
    let mathml = take(&mut node, "MathMLStringRepresentation");
    node.attrs.remove("SVGStringRepresentation");

    let (content, format) = match (tex, mathml) {
        (Some(tex), _) => (tex, "tex"),
        (None, Some(mathml)) => (mathml, "mathml"),
        (None, None) => return node,
    };
    node.attrs
        .entry("content")
        .or_insert(Value::String(content));
    node.attrs
        .entry("format")
        .or_insert(Value::String(format.to_string()));
    node
}
