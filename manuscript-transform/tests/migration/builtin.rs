use manuscript_transform::error::MigrationError;
use manuscript_transform::format::Format;
use manuscript_transform::formats::json::JsonFormat;
use manuscript_transform::migration::{parse_version, MigrationRegistry};
use manuscript_transform::schema::{JsonNode, NodeKind};
use manuscript_transform::{FormatError, CURRENT_VERSION};
use serde_json::json;

/// A manuscript as written by schema 1.0.
fn legacy_document() -> serde_json::Value {
    json!({
        "version": "1.0",
        "doc": {
            "kind": "manuscript",
            "attrs": {"id": "MPManuscript:legacy"},
            "content": [
                {"kind": "title", "content": [{"kind": "text", "text": "Legacy"}]},
                {"kind": "section", "attrs": {"id": "s1", "category": "MPSectionCategory:materials-method"}, "content": [
                    {"kind": "section_title", "content": [{"kind": "text", "text": "How"}]},
                    {"kind": "paragraph", "content": [
                        {"kind": "text", "text": "See "},
                        {"kind": "citation", "attrs": {"rid": "MPBibliographyItem:1"}},
                        {"kind": "inline_equation", "attrs": {"TeXRepresentation": "e=mc^2", "SVGStringRepresentation": "<svg/>"}}
                    ]}
                ]},
                {"kind": "bibliography_section", "attrs": {"category": "MPSectionCategory:bibliography"}, "content": [
                    {"kind": "section_title", "content": [{"kind": "text", "text": "References"}]},
                    {"kind": "bibliography_element", "content": [
                        {"kind": "bibliography_item", "attrs": {"id": "MPBibliographyItem:1", "title": "Old"}}
                    ]}
                ]}
            ]
        }
    })
}

#[test]
fn legacy_documents_load_under_the_current_schema() {
    let doc = JsonFormat::default()
        .parse(&legacy_document().to_string())
        .unwrap();

    let section = &doc.content()[1];
    assert_eq!(section.attr_str("category"), "methods");
    assert_eq!(doc.content()[2].attr_str("category"), "bibliography");

    let paragraph = &section.content()[1];
    let citation = &paragraph.content()[1];
    assert_eq!(citation.kind(), NodeKind::Citation);
    assert_eq!(citation.attr("rids"), Some(&json!(["MPBibliographyItem:1"])));
    assert!(citation.attr("rid").is_none());

    let equation = &paragraph.content()[2];
    assert_eq!(equation.attr_str("content"), "e=mc^2");
    assert_eq!(equation.attr_str("format"), "tex");
    assert!(equation.attr("SVGStringRepresentation").is_none());
}

#[test]
fn loading_then_writing_stamps_the_current_version() {
    let format = JsonFormat::default();
    let doc = format.parse(&legacy_document().to_string()).unwrap();
    let written: serde_json::Value = serde_json::from_str(&format.serialize(&doc).unwrap()).unwrap();
    assert_eq!(written["version"], CURRENT_VERSION);
    // Already current: loading again changes nothing.
    assert_eq!(format.parse(&written.to_string()).unwrap(), doc);
}

#[test]
fn pending_scripts_form_the_unapplied_suffix() {
    let registry = MigrationRegistry::builtin().unwrap();
    let targets = |from: &str| -> Vec<String> {
        registry
            .pending(&parse_version(from).unwrap())
            .map(|script| script.to_version().to_string())
            .collect()
    };
    assert_eq!(targets("1.0"), vec!["1.1.0", "1.2.0", "1.3.0"]);
    assert_eq!(targets("1.1.0"), vec!["1.2.0", "1.3.0"]);
    assert_eq!(targets("1.2.0"), vec!["1.3.0"]);
    assert!(targets(CURRENT_VERSION).is_empty());
}

#[test]
fn migrating_twice_from_the_new_version_is_a_no_op() {
    let registry = MigrationRegistry::builtin().unwrap();
    let doc: JsonNode = serde_json::from_value(legacy_document()["doc"].clone()).unwrap();
    let once = registry.upgrade(doc, &parse_version("1.0").unwrap());
    let twice = registry.upgrade(once.clone(), registry.current_version());
    assert_eq!(once, twice);
}

#[test]
fn unusable_documents_keep_their_version() {
    let source = json!({
        "version": "1.1.0",
        "doc": {"kind": "manuscript", "content": [{"kind": "paragraph"}]}
    });
    let err = JsonFormat::default().parse(&source.to_string()).unwrap_err();
    match err {
        FormatError::Migration(MigrationError::ValidationFailure { from_version, .. }) => {
            assert_eq!(from_version.to_string(), "1.1.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_versions_are_reported() {
    let source = json!({"version": "latest", "doc": {"kind": "manuscript"}});
    assert!(matches!(
        JsonFormat::default().parse(&source.to_string()),
        Err(FormatError::Migration(MigrationError::InvalidVersion(_)))
    ));
}
