//! Shared fixtures

use manuscript_transform::formats::jats::{parse_jats_article, ImportOptions, ImportedArticle};
use manuscript_transform::schema::{Node, NodeKind};
use once_cell::sync::Lazy;
use std::path::PathBuf;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

pub fn import(name: &str) -> ImportedArticle {
    parse_jats_article(&fixture(name), &ImportOptions::default())
        .unwrap_or_else(|e| panic!("Failed to import {name}: {e}"))
}

/// The kitchensink article, imported once.
pub static KITCHENSINK: Lazy<ImportedArticle> = Lazy::new(|| import("kitchensink.xml"));

/// Top-level sections of a manuscript.
pub fn sections(manuscript: &Node) -> Vec<&Node> {
    manuscript
        .content()
        .iter()
        .filter(|child| child.kind().in_group(manuscript_transform::schema::Group::Sections))
        .collect()
}

pub fn first_of(node: &Node, kind: NodeKind) -> &Node {
    node.descendants()
        .find(|n| n.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind} in tree"))
}
