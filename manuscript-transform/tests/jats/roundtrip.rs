use crate::common::{first_of, sections, KITCHENSINK};
use manuscript_transform::formats::jats::{
    parse_jats_article, ExportOptions, ImportOptions, JatsExporter,
};
use manuscript_transform::schema::NodeKind;
use manuscript_transform::transforms::{jats_to_json, json_to_jats};

fn reimport() -> manuscript_transform::ImportedArticle {
    let manuscript = &KITCHENSINK.manuscript;
    let options = ExportOptions {
        journal: KITCHENSINK.journal.clone(),
        ..ExportOptions::default()
    };
    let xml = JatsExporter::new()
        .serialize(manuscript, manuscript.id(), &options)
        .unwrap();
    parse_jats_article(&xml, &ImportOptions::default()).unwrap()
}

#[test]
fn section_layout_survives_export_and_import() {
    let again = reimport();
    let categories = |manuscript| -> Vec<String> {
        sections(manuscript)
            .into_iter()
            .map(|section| section.attr_str("category").to_string())
            .collect()
    };
    assert_eq!(categories(&again.manuscript), categories(&KITCHENSINK.manuscript));
}

#[test]
fn journal_survives_export_and_import() {
    assert_eq!(reimport().journal, KITCHENSINK.journal);
}

#[test]
fn bibliography_survives_export_and_import() {
    let again = reimport();
    let before = first_of(&KITCHENSINK.manuscript, NodeKind::BibliographyItem);
    let after = first_of(&again.manuscript, NodeKind::BibliographyItem);
    for attr in ["type", "title", "containerTitle", "volume", "page"] {
        assert_eq!(after.attr(attr), before.attr(attr), "{attr}");
    }
    let citation = first_of(&again.manuscript, NodeKind::Citation);
    assert_eq!(citation.attr("rids"), Some(&serde_json::json!([after.id()])));
}

#[test]
fn comments_survive_export_and_import() {
    let again = reimport();
    let comment = first_of(&again.manuscript, NodeKind::Comment);
    assert_eq!(comment.attr_str("contents"), "Please check");
}

#[test]
fn persisted_json_exports_like_the_import() {
    let source = crate::common::fixture("kitchensink.xml");
    let json = jats_to_json(&source, &ImportOptions::default()).unwrap();
    let xml = json_to_jats(&json, &ExportOptions::default()).unwrap();
    assert!(xml.contains("<sec id=\"s1\" sec-type=\"intro\">"), "{xml}");
    assert!(xml.contains("queryText=\"Please check\""));
    assert!(xml.contains("<ref-list"));
}

#[test]
fn figure_ids_survive_export_and_import() {
    let again = reimport();
    for kind in [NodeKind::FigureElement, NodeKind::Figure] {
        assert_eq!(
            first_of(&again.manuscript, kind).id(),
            first_of(&KITCHENSINK.manuscript, kind).id(),
            "{kind}"
        );
    }
}
