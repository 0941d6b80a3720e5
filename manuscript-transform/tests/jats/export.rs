use crate::common::KITCHENSINK;
use manuscript_transform::formats::jats::{ExportOptions, JatsExporter, JatsVersion};
use manuscript_transform::FormatError;
use once_cell::sync::Lazy;
use regex::Regex;

fn export(options: &ExportOptions) -> String {
    let manuscript = &KITCHENSINK.manuscript;
    JatsExporter::new()
        .serialize(manuscript, manuscript.id(), options)
        .unwrap_or_else(|e| panic!("Failed to export: {e}"))
}

static DEFAULT_EXPORT: Lazy<String> = Lazy::new(|| export(&ExportOptions::default()));

fn position(xml: &str, needle: &str) -> usize {
    xml.find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{xml}"))
}

#[test]
fn declares_the_requested_dtd() {
    let xml = &*DEFAULT_EXPORT;
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<!DOCTYPE article PUBLIC"));
    assert!(xml.contains("dtd-version=\"1.2\""));

    let options = ExportOptions {
        version: JatsVersion::V1_1,
        ..ExportOptions::default()
    };
    let older = export(&options);
    assert!(older.contains("dtd-version=\"1.1\""));
    assert!(older.contains("archiving/1.1/JATS-archivearticle1.dtd"));
}

#[test]
fn abstracts_and_keywords_return_to_the_front() {
    let xml = &*DEFAULT_EXPORT;
    let front_end = position(xml, "</front>");
    assert!(position(xml, "<abstract") < front_end);
    assert!(position(xml, "<kwd>testing</kwd>") < front_end);
    assert!(!xml.contains("sec-type=\"abstract\""));
    assert!(!xml.contains("sec-type=\"keywords\""));
}

#[test]
fn back_matter_returns_to_back() {
    let xml = &*DEFAULT_EXPORT;
    let back = position(xml, "<back>");
    assert!(position(xml, "<ack") > back);
    assert!(position(xml, "<ref-list") > back);
    assert!(xml.contains("<article-title>On testing</article-title>"));
    assert!(xml.contains("<fpage>10</fpage>"));
}

#[test]
fn body_sections_keep_ids_and_types() {
    let xml = &*DEFAULT_EXPORT;
    assert!(xml.contains("<sec id=\"s2\" sec-type=\"methods\">"));
    assert!(xml.contains("<bold>bold</bold>"));
}

#[test]
fn figures_and_tables() {
    let xml = &*DEFAULT_EXPORT;
    assert!(xml.contains("<fig id=\"f1\"><label>Figure 1</label>"), "{xml}");
    assert!(xml.contains("xlink:href=\"f1.png\""));
    assert!(xml.contains("<table-wrap id=\"t1\">"));
    assert!(xml.contains("<th>A</th>") || xml.contains("<th "));
}

#[test]
fn citations_are_numbered() {
    let citation = Regex::new(r#"<xref ref-type="bibr" rid="[^"]+">1</xref>"#).unwrap();
    assert!(citation.is_match(&DEFAULT_EXPORT), "{}", *DEFAULT_EXPORT);
    assert!(DEFAULT_EXPORT.contains("<xref ref-type=\"fig\" rid=\"f1\">Figure 1</xref>"));
}

#[test]
fn comments_become_author_queries() {
    assert!(DEFAULT_EXPORT.contains("queryText=\"Please check\""));
}

#[test]
fn front_matter_only_drops_body_and_back() {
    let options = ExportOptions {
        front_matter_only: true,
        ..ExportOptions::default()
    };
    let xml = export(&options);
    assert!(xml.contains("<front>"));
    assert!(xml.contains("<abstract"));
    assert!(!xml.contains("<body>"));
    assert!(!xml.contains("<back>"));
}

#[test]
fn options_override_identifiers() {
    let mut options = ExportOptions {
        id: Some("123".to_string()),
        doi: Some("10.9999/other".to_string()),
        ..ExportOptions::default()
    };
    options.links.insert("pdf".to_string(), "123.pdf".to_string());
    let xml = export(&options);
    assert!(xml.contains("<article-id pub-id-type=\"publisher-id\">123</article-id>"));
    assert!(xml.contains("<article-id pub-id-type=\"doi\">10.9999/other</article-id>"));
    assert!(xml.contains("123.pdf"));
    assert!(!xml.contains("10.1234/test.1"));
}

#[test]
fn manuscript_id_must_match() {
    let err = JatsExporter::new()
        .serialize(&KITCHENSINK.manuscript, "MPManuscript:other", &ExportOptions::default())
        .unwrap_err();
    assert!(matches!(err, FormatError::InvalidInput(_)));
}

#[test]
fn unknown_versions_are_rejected() {
    assert!(matches!(
        "1.0".parse::<JatsVersion>(),
        Err(FormatError::UnsupportedVersion(_))
    ));
}
