use manuscript_transform::error::SchemaError;
use manuscript_transform::schema::{schema, validate, Attrs, JsonNode, Node, NodeKind};
use serde_json::json;

fn text(s: &str) -> Node {
    Node::new_text(s, vec![]).unwrap()
}

fn titled(kind: NodeKind, title: &str) -> Node {
    let title = Node::new(NodeKind::SectionTitle, Attrs::new(), vec![text(title)]).unwrap();
    Node::new(kind, Attrs::new(), vec![title]).unwrap()
}

#[test]
fn manuscript_requires_a_leading_title() {
    let section = titled(NodeKind::Section, "Results");
    let err = Node::new(NodeKind::Manuscript, Attrs::new(), vec![section.clone()]).unwrap_err();
    match err {
        SchemaError::ContentModel(violation) => {
            assert_eq!(violation.kind, NodeKind::Manuscript);
            assert_eq!(violation.children, vec![NodeKind::Section]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let title = Node::new(NodeKind::Title, Attrs::new(), vec![text("T")]).unwrap();
    assert!(Node::new(NodeKind::Manuscript, Attrs::new(), vec![title, section]).is_ok());
}

#[test]
fn sections_nest_after_their_blocks() {
    let title = Node::new(NodeKind::SectionTitle, Attrs::new(), vec![text("A")]).unwrap();
    let paragraph = Node::new(NodeKind::Paragraph, Attrs::new(), vec![text("p")]).unwrap();
    let inner = titled(NodeKind::Section, "B");

    assert!(Node::new(
        NodeKind::Section,
        Attrs::new(),
        vec![title.clone(), paragraph.clone(), inner.clone()]
    )
    .is_ok());
    assert!(Node::new(NodeKind::Section, Attrs::new(), vec![title, inner, paragraph]).is_err());
}

#[test]
fn bibliography_sections_hold_exactly_one_element() {
    let title = Node::new(NodeKind::SectionTitle, Attrs::new(), vec![]).unwrap();
    let element = Node::leaf(NodeKind::BibliographyElement, Attrs::new()).unwrap();
    assert!(Node::new(
        NodeKind::BibliographySection,
        Attrs::new(),
        vec![title.clone(), element.clone()]
    )
    .is_ok());
    assert!(Node::new(NodeKind::BibliographySection, Attrs::new(), vec![title.clone()]).is_err());
    assert!(Node::new(
        NodeKind::BibliographySection,
        Attrs::new(),
        vec![title, element.clone(), element]
    )
    .is_err());
}

#[test]
fn attr_defaults_are_filled_in() {
    let cell = Node::leaf(NodeKind::TableCell, Attrs::new()).unwrap();
    assert_eq!(cell.attr("colspan"), Some(&json!(1)));
    assert_eq!(cell.attr("rowspan"), Some(&json!(1)));

    let item = Node::leaf(NodeKind::BibliographyItem, Attrs::new()).unwrap();
    assert_eq!(item.attr_str("type"), "article-journal");
}

#[test]
fn text_nodes_must_not_be_empty() {
    assert_eq!(Node::new_text("", vec![]), Err(SchemaError::EmptyText));
}

#[test]
fn serialized_trees_are_validated() {
    let unknown = JsonNode::new("chapter");
    assert_eq!(
        validate(&unknown),
        Err(SchemaError::UnknownKind("chapter".to_string()))
    );

    let paragraph = JsonNode::new("paragraph").with_content(vec![
        JsonNode::text_node("plain"),
        JsonNode::new("section_title"),
    ]);
    assert!(matches!(validate(&paragraph), Err(SchemaError::ContentModel(_))));

    let paragraph = JsonNode::new("paragraph").with_content(vec![JsonNode::text_node("plain")]);
    let node = validate(&paragraph).unwrap();
    assert_eq!(node.to_json().kind, "paragraph");
    assert_eq!(node.text_content(), "plain");
}

#[test]
fn depth_is_bounded() {
    let mut json = JsonNode::new("section");
    for _ in 0..10 {
        json = JsonNode::new("section").with_content(vec![json]);
    }
    assert_eq!(
        Node::from_json_with_limit(&json, 4),
        Err(SchemaError::TooDeep(4))
    );
}

#[test]
fn every_kind_has_a_grammar() {
    for kind in NodeKind::ALL {
        let matcher = schema().content_match(kind);
        assert_eq!(matcher.expr(), kind.spec().content, "{kind}");
    }
    assert!(schema().content_match(NodeKind::Text).is_leaf());
}
