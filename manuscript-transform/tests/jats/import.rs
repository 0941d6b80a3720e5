use crate::common::{first_of, import, sections, KITCHENSINK};
use manuscript_transform::formats::jats::{parse_jats_article, ImportOptions};
use manuscript_transform::schema::{MarkKind, NodeKind};
use manuscript_transform::FormatError;
use serde_json::json;

#[test]
fn sections_are_classified_in_document_order() {
    let manuscript = &KITCHENSINK.manuscript;
    let kinds: Vec<(NodeKind, &str)> = sections(manuscript)
        .into_iter()
        .map(|section| (section.kind(), section.attr_str("category")))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (NodeKind::Section, "abstract"),
            (NodeKind::KeywordsSection, "keywords"),
            (NodeKind::Section, "intro"),
            (NodeKind::Section, "methods"),
            (NodeKind::Section, "acknowledgements"),
            (NodeKind::BibliographySection, "bibliography"),
        ]
    );
}

#[test]
fn source_section_ids_are_kept() {
    let ids: Vec<&str> = sections(&KITCHENSINK.manuscript)
        .into_iter()
        .map(|section| section.id())
        .collect();
    assert!(ids.contains(&"s1"));
    assert!(ids.contains(&"s2"));
}

#[test]
fn manuscript_metadata() {
    let manuscript = &KITCHENSINK.manuscript;
    assert_eq!(manuscript.kind(), NodeKind::Manuscript);
    assert!(!manuscript.id().is_empty());
    assert_eq!(manuscript.attr_str("articleType"), "research-article");
    assert_eq!(manuscript.attr_str("primaryLanguageCode"), "en");
    assert_eq!(first_of(manuscript, NodeKind::Title).text_content(), "Kitchen sink");
}

#[test]
fn journal_metadata_is_returned() {
    let journal = KITCHENSINK.journal.as_ref().expect("journal-meta");
    assert_eq!(journal.title.as_deref(), Some("Journal of Tests"));
    assert_eq!(journal.publisher_name.as_deref(), Some("Test Press"));
    assert_eq!(journal.issns.len(), 1);
    assert_eq!(journal.issns[0].kind.as_deref(), Some("epub"));
}

#[test]
fn contributors_and_affiliations() {
    let manuscript = &KITCHENSINK.manuscript;
    let contributors: Vec<_> = manuscript
        .descendants()
        .filter(|node| node.kind() == NodeKind::Contributor)
        .collect();
    assert_eq!(contributors.len(), 2);
    let affiliation = first_of(manuscript, NodeKind::Affiliation);
    assert_eq!(affiliation.id(), "aff1");
}

#[test]
fn citations_point_at_bibliography_items() {
    let manuscript = &KITCHENSINK.manuscript;
    let item = first_of(manuscript, NodeKind::BibliographyItem);
    let citation = first_of(manuscript, NodeKind::Citation);
    assert_eq!(citation.attr("rids"), Some(&json!([item.id()])));
    assert_eq!(item.attr_str("title"), "On testing");
    assert_eq!(item.attr_str("type"), "article-journal");
}

#[test]
fn figure_cross_reference_keeps_its_target() {
    let xref = first_of(&KITCHENSINK.manuscript, NodeKind::CrossReference);
    assert_eq!(xref.attr("rids"), Some(&json!(["f1"])));
}

#[test]
fn figures_are_grouped() {
    let manuscript = &KITCHENSINK.manuscript;
    let element = first_of(manuscript, NodeKind::FigureElement);
    assert_eq!(element.id(), "f1");
    assert_eq!(element.attr_str("label"), "Figure 1");
    let figure = first_of(element, NodeKind::Figure);
    assert_eq!(figure.attr_str("src"), "f1.png");
    let caption = first_of(manuscript, NodeKind::CaptionTitle);
    assert_eq!(caption.text_content(), "A figure");
}

#[test]
fn tables_keep_header_cells() {
    let element = first_of(&KITCHENSINK.manuscript, NodeKind::TableElement);
    assert_eq!(element.id(), "t1");
    let header = first_of(element, NodeKind::TableHeader);
    assert_eq!(header.text_content(), "A");
}

#[test]
fn formatting_becomes_marks() {
    let bold = KITCHENSINK
        .manuscript
        .descendants()
        .find(|node| node.has_mark(MarkKind::Bold))
        .expect("bold text");
    assert_eq!(bold.text(), Some("bold"));
}

#[test]
fn keywords_are_grouped() {
    let section = first_of(&KITCHENSINK.manuscript, NodeKind::KeywordsSection);
    let keywords: Vec<String> = section
        .descendants()
        .filter(|node| node.kind() == NodeKind::Keyword)
        .map(|node| node.text_content())
        .collect();
    assert_eq!(keywords, vec!["testing", "jats"]);
}

#[test]
fn author_queries_become_comments() {
    let imported = import("queries.xml");
    let manuscript = &imported.manuscript;
    let comments: Vec<_> = manuscript
        .descendants()
        .filter(|node| node.kind() == NodeKind::Comment)
        .collect();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].attr_str("contents"), "First?");
    assert_eq!(comments[0].attr_str("target"), "p1");
    assert_eq!(comments[0].attr("selector"), Some(&json!({"from": 5, "to": 5})));
    assert_eq!(comments[1].attr("selector"), Some(&json!({"from": 10, "to": 10})));

    let paragraph = manuscript
        .descendants()
        .find(|node| node.id() == "p1")
        .expect("paragraph p1");
    assert_eq!(paragraph.text_content(), "Alpha beta gamma.");
    let markers: Vec<_> = paragraph
        .content()
        .iter()
        .filter(|node| node.kind() == NodeKind::HighlightMarker)
        .collect();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].id(), comments[0].id());
}

#[test]
fn unsupported_elements_fail_with_their_path() {
    let err = parse_jats_article(&crate::common::fixture("unsupported.xml"), &ImportOptions::default())
        .unwrap_err();
    match err {
        FormatError::InvalidInput(message) => assert!(message.contains("mystery"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_title_uses_the_default() {
    let source = "<article><front><article-meta/></front><body><sec><title>Results</title><p>x</p></sec></body></article>";
    let imported = parse_jats_article(source, &ImportOptions::default()).unwrap();
    let title = first_of(&imported.manuscript, NodeKind::Title);
    assert_eq!(title.text_content(), "Untitled Manuscript");
}

#[test]
fn deep_documents_are_rejected() {
    let depth = 40;
    let source = format!(
        "<article><front/><body>{}{}</body></article>",
        "<sec>".repeat(depth),
        "</sec>".repeat(depth)
    );
    let options = ImportOptions {
        max_depth: 16,
        ..ImportOptions::default()
    };
    assert!(parse_jats_article(&source, &options).is_err());
}

fn import_source(source: &str) -> manuscript_transform::ImportedArticle {
    parse_jats_article(source, &ImportOptions::default())
        .unwrap_or_else(|e| panic!("Failed to import: {e}"))
}

fn paragraph_texts(manuscript: &manuscript_transform::schema::Node) -> Vec<String> {
    manuscript
        .descendants()
        .filter(|node| node.kind() == NodeKind::Paragraph)
        .map(|node| node.text_content())
        .collect()
}

#[test]
fn loose_body_content_keeps_its_place() {
    let source = r#"<article><front><article-meta/></front><body>
        <sec id="s1"><title>One</title><p>first</p></sec>
        <p>second</p>
        <sec id="s2"><title>Two</title><p>third</p></sec>
    </body></article>"#;
    let imported = import_source(source);
    assert_eq!(paragraph_texts(&imported.manuscript), vec!["first", "second", "third"]);
    let ids: Vec<&str> = sections(&imported.manuscript)
        .into_iter()
        .map(|section| section.id())
        .collect();
    assert_eq!(ids, vec!["s1", "s2"]);
}

#[test]
fn titles_alone_do_not_make_specialized_sections() {
    let source = r#"<article><front><article-meta/></front><body>
        <sec><title>References</title><p>Sources are listed at the end.</p></sec>
        <sec><title>Notes</title><p>A note on methods.</p></sec>
    </body></article>"#;
    let imported = import_source(source);
    let kinds: Vec<NodeKind> = sections(&imported.manuscript)
        .into_iter()
        .map(|section| section.kind())
        .collect();
    assert_eq!(kinds, vec![NodeKind::Section, NodeKind::Section]);
    assert_eq!(
        paragraph_texts(&imported.manuscript),
        vec!["Sources are listed at the end.", "A note on methods."]
    );
}

#[test]
fn typed_sections_with_prose_stay_plain_sections() {
    let source = r#"<article><front><article-meta/></front><body>
        <sec sec-type="bibliography"><title>References</title>
            <p>Sorted by year.</p>
            <ref-list><ref id="r1"><element-citation><article-title>On testing</article-title></element-citation></ref></ref-list>
        </sec>
    </body></article>"#;
    let imported = import_source(source);
    let section = sections(&imported.manuscript)[0];
    assert_eq!(section.kind(), NodeKind::Section);
    assert_eq!(section.attr_str("category"), "bibliography");
    let kinds: Vec<NodeKind> = section.content().iter().map(|node| node.kind()).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::SectionTitle, NodeKind::Paragraph, NodeKind::BibliographyElement]
    );
}

#[test]
fn queries_inside_reference_fields_become_comments() {
    let source = r#"<article><front><article-meta/></front><body><sec><title>Results</title><p>x</p></sec></body>
        <back><ref-list><ref id="r1"><element-citation publication-type="journal">
            <article-title>On testing<?AuthorQuery id="Q1" queryText="Is this the full title?"?></article-title>
        </element-citation></ref></ref-list></back></article>"#;
    let imported = import_source(source);
    let manuscript = &imported.manuscript;
    let item = first_of(manuscript, NodeKind::BibliographyItem);
    assert_eq!(item.attr_str("title"), "On testing");

    let comment = first_of(manuscript, NodeKind::Comment);
    assert_eq!(comment.attr_str("contents"), "Is this the full title?");
    assert_eq!(comment.attr_str("target"), item.id());
    assert_eq!(comment.attr("selector"), Some(&serde_json::Value::Null));
}

#[test]
fn unknown_content_of_figures_tables_and_lists_is_rejected() {
    let bodies = [
        "<fig><graphic/><mystery>lost</mystery></fig>",
        "<table-wrap><table><mystery>lost</mystery></table></table-wrap>",
        "<table-wrap><table><tr><mystery>lost</mystery></tr></table></table-wrap>",
        "<fn-group><p>lost</p></fn-group>",
        "<ref-list><mystery>lost</mystery></ref-list>",
    ];
    for body in bodies {
        let source = format!(
            "<article><front><article-meta/></front><body><sec><title>Results</title>{body}</sec></body></article>"
        );
        match parse_jats_article(&source, &ImportOptions::default()) {
            Err(FormatError::InvalidInput(message)) => assert!(
                message.contains("mystery") || message.contains("<p>"),
                "{body}: {message}"
            ),
            other => panic!("{body}: expected InvalidInput, got {other:?}"),
        }
    }
}
