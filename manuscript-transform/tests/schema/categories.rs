use manuscript_transform::common::section_category::{
    category_from_title, category_from_type_attr, kind_for_category, resolve_category, CategoryGroup,
    SectionCategory,
};
use manuscript_transform::schema::NodeKind;

#[test]
fn titles_resolve_case_insensitively() {
    assert_eq!(category_from_title("Introduction"), Some(SectionCategory::Intro));
    assert_eq!(category_from_title("  MATERIALS AND METHODS "), Some(SectionCategory::Methods));
    assert_eq!(category_from_title("Conclusions"), Some(SectionCategory::Conclusions));
    assert_eq!(category_from_title("Methods we used"), None);
    assert_eq!(category_from_title(""), None);
}

#[test]
fn specialized_categories_need_a_type_attr() {
    for title in ["References", "Bibliography", "Notes", "Footnotes", "Keywords", "Table of Contents"] {
        assert_eq!(category_from_title(title), None, "{title}");
    }
    assert_eq!(
        resolve_category(Some("bibliography"), Some("References")),
        Some(SectionCategory::Bibliography)
    );
}

#[test]
fn type_attr_wins_over_title() {
    assert_eq!(
        resolve_category(Some("methods"), Some("Introduction")),
        Some(SectionCategory::Methods)
    );
    assert_eq!(
        resolve_category(Some(" "), Some("Introduction")),
        Some(SectionCategory::Intro)
    );
    assert_eq!(resolve_category(None, None), None);
}

#[test]
fn jats_type_spellings() {
    assert_eq!(
        category_from_type_attr("acknowledgments"),
        Some(SectionCategory::Acknowledgements)
    );
    assert_eq!(category_from_type_attr("materials|methods"), Some(SectionCategory::Methods));
    assert_eq!(category_from_type_attr("abstract-summary"), Some(SectionCategory::Abstract));
    assert_eq!(category_from_type_attr("unheard-of"), None);
}

#[test]
fn ids_round_trip() {
    for category in SectionCategory::ALL {
        assert_eq!(SectionCategory::from_id(category.id()), Some(category));
    }
}

#[test]
fn special_categories_get_special_kinds() {
    assert_eq!(
        kind_for_category(Some(SectionCategory::Bibliography)),
        NodeKind::BibliographySection
    );
    assert_eq!(kind_for_category(Some(SectionCategory::Keywords)), NodeKind::KeywordsSection);
    assert_eq!(kind_for_category(Some(SectionCategory::Results)), NodeKind::Section);
    assert_eq!(kind_for_category(None), NodeKind::Section);
}

#[test]
fn groups() {
    assert_eq!(SectionCategory::AbstractTeaser.group(), CategoryGroup::Abstracts);
    assert_eq!(SectionCategory::Acknowledgements.group(), CategoryGroup::BackMatter);
    assert!(SectionCategory::Bibliography.is_unique());
    assert!(!SectionCategory::Results.is_unique());
}
