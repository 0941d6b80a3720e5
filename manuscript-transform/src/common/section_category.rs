//! Section categories
//!
//! A closed taxonomy of semantic section kinds shared by the importer and the exporter.
//! Each category knows its containment group (where the exporter places it), whether a
//! document may hold more than one section of it, and the titles that identify it when the
//! source carries no explicit `sec-type`. Categories with a specialized section kind are only
//! ever taken from the type attr, never from a title.
//!
//! This module only classifies. Relocation and uniqueness policies live with the importer and
//! exporter.

use crate::schema::NodeKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionCategory {
    Abstract,
    AbstractTeaser,
    AbstractGraphical,
    Abbreviations,
    Acknowledgements,
    Appendices,
    AuthorContributions,
    Availability,
    Bibliography,
    CoiStatement,
    Con,
    Conclusions,
    Deceased,
    Discussion,
    Equal,
    EthicsStatement,
    FinancialDisclosure,
    FloatingElement,
    Footnotes,
    Intro,
    Keywords,
    Methods,
    PresentAddress,
    PresentedAt,
    PreviouslyAt,
    Results,
    Review,
    SupplementaryMaterial,
    SupportedBy,
    Toc,
}

/// Where sections of a category live in a JATS document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    FrontMatter,
    Body,
    BackMatter,
    Abstracts,
}

struct Definition {
    id: &'static str,
    group: CategoryGroup,
    unique: bool,
    synonyms: &'static [&'static str],
}

const fn def(
    id: &'static str,
    group: CategoryGroup,
    unique: bool,
    synonyms: &'static [&'static str],
) -> Definition {
    Definition {
        id,
        group,
        unique,
        synonyms,
    }
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 30] = [
        SectionCategory::Abstract,
        SectionCategory::AbstractTeaser,
        SectionCategory::AbstractGraphical,
        SectionCategory::Abbreviations,
        SectionCategory::Acknowledgements,
        SectionCategory::Appendices,
        SectionCategory::AuthorContributions,
        SectionCategory::Availability,
        SectionCategory::Bibliography,
        SectionCategory::CoiStatement,
        SectionCategory::Con,
        SectionCategory::Conclusions,
        SectionCategory::Deceased,
        SectionCategory::Discussion,
        SectionCategory::Equal,
        SectionCategory::EthicsStatement,
        SectionCategory::FinancialDisclosure,
        SectionCategory::FloatingElement,
        SectionCategory::Footnotes,
        SectionCategory::Intro,
        SectionCategory::Keywords,
        SectionCategory::Methods,
        SectionCategory::PresentAddress,
        SectionCategory::PresentedAt,
        SectionCategory::PreviouslyAt,
        SectionCategory::Results,
        SectionCategory::Review,
        SectionCategory::SupplementaryMaterial,
        SectionCategory::SupportedBy,
        SectionCategory::Toc,
    ];

    fn definition(self) -> Definition {
        use CategoryGroup::*;
        match self {
            SectionCategory::Abstract => def("abstract", Abstracts, false, &["abstract"]),
            SectionCategory::AbstractTeaser => def("abstract-teaser", Abstracts, false, &[]),
            SectionCategory::AbstractGraphical => {
                def("abstract-graphical", Abstracts, false, &["graphical abstract"])
            }
            SectionCategory::Abbreviations => def("abbreviations", Body, false, &["abbreviations"]),
            SectionCategory::Acknowledgements => def(
                "acknowledgements",
                BackMatter,
                true,
                &["acknowledgements", "acknowledgments"],
            ),
            SectionCategory::Appendices => {
                def("appendices", BackMatter, false, &["appendix", "appendices"])
            }
            SectionCategory::AuthorContributions => {
                def("author-contributions", Body, false, &["author contributions"])
            }
            SectionCategory::Availability => def(
                "availability",
                Body,
                false,
                &["availability", "data-availability", "data availability"],
            ),
            SectionCategory::Bibliography => def("bibliography", BackMatter, true, &[]),
            SectionCategory::CoiStatement => def(
                "coi-statement",
                Body,
                false,
                &[
                    "coi-statement",
                    "competing-interests",
                    "conflict",
                    "conflict of interest",
                    "competing interests",
                ],
            ),
            SectionCategory::Con => def("con", BackMatter, true, &[]),
            SectionCategory::Conclusions => {
                def("conclusions", Body, false, &["conclusion", "conclusions"])
            }
            SectionCategory::Deceased => def("deceased", Body, false, &[]),
            SectionCategory::Discussion => def("discussion", Body, false, &["discussion"]),
            SectionCategory::Equal => def("equal", Body, false, &[]),
            SectionCategory::EthicsStatement => {
                def("ethics-statement", BackMatter, false, &["ethics statement"])
            }
            SectionCategory::FinancialDisclosure => def(
                "financial-disclosure",
                BackMatter,
                true,
                &["funding information", "funding"],
            ),
            SectionCategory::FloatingElement => def("floating-element", Body, false, &[]),
            SectionCategory::Footnotes => def("footnotes", BackMatter, false, &[]),
            SectionCategory::Intro => def("intro", Body, false, &["intro", "introduction"]),
            SectionCategory::Keywords => def("keywords", FrontMatter, true, &[]),
            SectionCategory::Methods => def(
                "methods",
                Body,
                false,
                &[
                    "materials",
                    "methods",
                    "materials and methods",
                    "materials & methods",
                ],
            ),
            SectionCategory::PresentAddress => def("present-address", Body, false, &[]),
            SectionCategory::PresentedAt => def("presented-at", Body, false, &[]),
            SectionCategory::PreviouslyAt => def("previously-at", Body, false, &[]),
            SectionCategory::Results => def("results", Body, false, &["results"]),
            SectionCategory::Review => def("review", Body, false, &[]),
            SectionCategory::SupplementaryMaterial => def(
                "supplementary-material",
                BackMatter,
                true,
                &["supplementary material"],
            ),
            SectionCategory::SupportedBy => def("supported-by", BackMatter, true, &[]),
            SectionCategory::Toc => def("toc", FrontMatter, true, &[]),
        }
    }

    /// Identifier stored in a section's `category` attr.
    pub fn id(self) -> &'static str {
        self.definition().id
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.id() == id)
    }

    pub fn group(self) -> CategoryGroup {
        self.definition().group
    }

    /// At most one section of this category per document.
    pub fn is_unique(self) -> bool {
        self.definition().unique
    }

    pub fn synonyms(self) -> &'static [&'static str] {
        self.definition().synonyms
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Classifies a JATS `sec-type` (or `fn-type`) value.
pub fn category_from_type_attr(tag: &str) -> Option<SectionCategory> {
    let tag = tag.trim();
    match tag {
        "acknowledgments" | "acknowledgements" => Some(SectionCategory::Acknowledgements),
        "materials" | "materials|methods" => Some(SectionCategory::Methods),
        "introduction" => Some(SectionCategory::Intro),
        "data-availability" => Some(SectionCategory::Availability),
        "conflict" | "competing-interests" => Some(SectionCategory::CoiStatement),
        "notes" | "endnotes" => Some(SectionCategory::Footnotes),
        "floats-group" => Some(SectionCategory::FloatingElement),
        "supplementary" => Some(SectionCategory::SupplementaryMaterial),
        _ => SectionCategory::from_id(tag).or_else(|| {
            tag.strip_prefix("abstract-")
                .map(|_| SectionCategory::Abstract)
        }),
    }
}

/// Case-insensitive exact lookup of a section title in the synonym table.
pub fn category_from_title(title: &str) -> Option<SectionCategory> {
    let normalized = title.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    SectionCategory::ALL
        .into_iter()
        .find(|category| category.synonyms().contains(&normalized.as_str()))
}

/// Import-time resolution: explicit type first, then the title.
pub fn resolve_category(type_attr: Option<&str>, title: Option<&str>) -> Option<SectionCategory> {
    type_attr
        .filter(|tag| !tag.trim().is_empty())
        .and_then(category_from_type_attr)
        .or_else(|| title.and_then(category_from_title))
}

/// Node kind used for a section of the given category.
pub fn kind_for_category(category: Option<SectionCategory>) -> NodeKind {
    match category {
        Some(SectionCategory::Bibliography) => NodeKind::BibliographySection,
        Some(SectionCategory::Footnotes) => NodeKind::FootnotesSection,
        Some(SectionCategory::Keywords) => NodeKind::KeywordsSection,
        Some(SectionCategory::Toc) => NodeKind::TocSection,
        Some(SectionCategory::AbstractGraphical) => NodeKind::GraphicalAbstractSection,
        Some(_) | None => NodeKind::Section,
    }
}

/// The `sec-type` value written for a category, if it has one.
pub fn type_attr_for_category(category: SectionCategory) -> Option<&'static str> {
    match category {
        SectionCategory::Acknowledgements => Some("acknowledgments"),
        SectionCategory::Footnotes => Some("notes"),
        SectionCategory::Keywords | SectionCategory::Toc => None,
        other => Some(other.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_synonym_resolves_to_its_category() {
        for category in SectionCategory::ALL {
            for synonym in category.synonyms() {
                assert_eq!(category_from_title(synonym), Some(category), "{synonym}");
                assert_eq!(
                    category_from_title(&synonym.to_uppercase()),
                    Some(category),
                    "{synonym} uppercased"
                );
            }
        }
    }

    #[test]
    fn titles_are_trimmed_and_lowercased() {
        assert_eq!(
            category_from_title("  Materials and Methods \n"),
            Some(SectionCategory::Methods)
        );
        assert_eq!(
            category_from_title("Acknowledgements"),
            Some(SectionCategory::Acknowledgements)
        );
        assert_eq!(category_from_title("Methods we used"), None);
        assert_eq!(category_from_title("References"), None);
        assert_eq!(category_from_title("Notes"), None);
        assert_eq!(category_from_title(""), None);
    }

    #[test]
    fn type_attrs_accept_jats_aliases() {
        assert_eq!(
            category_from_type_attr("acknowledgments"),
            Some(SectionCategory::Acknowledgements)
        );
        assert_eq!(
            category_from_type_attr("abstract-teaser"),
            Some(SectionCategory::AbstractTeaser)
        );
        assert_eq!(
            category_from_type_attr("abstract-summary"),
            Some(SectionCategory::Abstract)
        );
        assert_eq!(category_from_type_attr("cases"), None);
    }

    #[test]
    fn type_attr_round_trips() {
        for category in SectionCategory::ALL {
            if let Some(tag) = type_attr_for_category(category) {
                assert_eq!(category_from_type_attr(tag), Some(category), "{tag}");
            }
        }
    }

    #[test]
    fn explicit_type_wins_over_title() {
        assert_eq!(
            resolve_category(Some("methods"), Some("Results")),
            Some(SectionCategory::Methods)
        );
        assert_eq!(
            resolve_category(Some(""), Some("Results")),
            Some(SectionCategory::Results)
        );
        assert_eq!(resolve_category(None, Some("Something else")), None);
    }

    #[test]
    fn specialized_kinds() {
        assert_eq!(
            kind_for_category(Some(SectionCategory::Bibliography)),
            NodeKind::BibliographySection
        );
        assert_eq!(
            kind_for_category(Some(SectionCategory::Keywords)),
            NodeKind::KeywordsSection
        );
        assert_eq!(kind_for_category(Some(SectionCategory::Intro)), NodeKind::Section);
        assert_eq!(kind_for_category(None), NodeKind::Section);
    }
}
