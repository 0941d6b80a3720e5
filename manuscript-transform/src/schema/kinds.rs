//! Node and mark kinds
//!
//! The set of kinds is closed: every kind is a variant of [`NodeKind`] and carries its
//! declaration (content grammar, groups, attrs with defaults, flags) in [`NodeKind::spec`].
//! Adding a kind means adding a variant here; every `match` over kinds in the crate is
//! exhaustive, so the compiler points at each consumer that has to learn about it.

use serde_json::Value;
use std::fmt;

/// Every node kind known to the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    // document root and front matter
    Manuscript,
    Title,
    Contributors,
    Contributor,
    Affiliations,
    Affiliation,
    AuthorNotes,
    Corresp,
    Supplements,
    Supplement,
    Comments,
    Comment,
    // sections
    Section,
    SectionLabel,
    SectionTitle,
    BibliographySection,
    BibliographyElement,
    BibliographyItem,
    FootnotesSection,
    FootnotesElement,
    Footnote,
    KeywordsSection,
    KeywordsElement,
    KeywordGroup,
    Keyword,
    TocSection,
    TocElement,
    GraphicalAbstractSection,
    // blocks
    Paragraph,
    BlockquoteElement,
    PullquoteElement,
    Attribution,
    BulletList,
    OrderedList,
    ListItem,
    EquationElement,
    Equation,
    ListingElement,
    Listing,
    FigureElement,
    MultiGraphicFigureElement,
    Figure,
    MissingFigure,
    Figcaption,
    CaptionTitle,
    Caption,
    TableElement,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    TableColgroup,
    TableCol,
    TableElementFooter,
    Placeholder,
    PlaceholderElement,
    BoxElement,
    // inline
    Text,
    HardBreak,
    Citation,
    CrossReference,
    InlineEquation,
    InlineFootnote,
    Link,
    HighlightMarker,
}

/// Named sets of kinds usable in content expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Block,
    Inline,
    Element,
    Sections,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Block, Group::Inline, Group::Element, Group::Sections];

    pub fn name(self) -> &'static str {
        match self {
            Group::Block => "block",
            Group::Inline => "inline",
            Group::Element => "element",
            Group::Sections => "sections",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.name() == name)
    }
}

/// Declared default of an attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrDefault {
    Null,
    Str(&'static str),
    Bool(bool),
    Int(i64),
    EmptyList,
}

impl AttrDefault {
    pub fn to_value(self) -> Value {
        match self {
            AttrDefault::Null => Value::Null,
            AttrDefault::Str(s) => Value::String(s.to_string()),
            AttrDefault::Bool(b) => Value::Bool(b),
            AttrDefault::Int(i) => Value::from(i),
            AttrDefault::EmptyList => Value::Array(Vec::new()),
        }
    }
}

pub type AttrSpec = &'static [(&'static str, AttrDefault)];

/// Static declaration of a node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub content: &'static str,
    pub groups: &'static [Group],
    pub attrs: AttrSpec,
    pub atom: bool,
    pub selectable: bool,
}

use AttrDefault::{Bool, EmptyList, Int, Null, Str};

const NONE: AttrSpec = &[];
const ID: AttrSpec = &[("id", Str(""))];

const MANUSCRIPT: AttrSpec = &[
    ("id", Str("")),
    ("doi", Null),
    ("articleType", Null),
    ("primaryLanguageCode", Null),
    ("wordCount", Null),
    ("figureCount", Null),
    ("tableCount", Null),
    ("equationCount", Null),
    ("referenceCount", Null),
    ("receiveDate", Null),
    ("acceptanceDate", Null),
    ("revisionRequestDate", Null),
    ("revisionReceiveDate", Null),
    ("correctionDate", Null),
];

const CONTRIBUTOR: AttrSpec = &[
    ("id", Str("")),
    ("role", Str("author")),
    ("email", Str("")),
    ("isCorresponding", Bool(false)),
    ("bibliographicName", Null),
    ("userID", Str("")),
    ("priority", Null),
    ("isJointContributor", Bool(false)),
    ("ORCIDIdentifier", Str("")),
    ("affiliations", EmptyList),
    ("footnote", EmptyList),
    ("corresp", EmptyList),
];

const AFFILIATION: AttrSpec = &[
    ("id", Str("")),
    ("institution", Str("")),
    ("department", Str("")),
    ("addressLine1", Str("")),
    ("addressLine2", Str("")),
    ("addressLine3", Str("")),
    ("postCode", Str("")),
    ("country", Str("")),
    ("county", Str("")),
    ("city", Str("")),
    ("email", Null),
    ("priority", Null),
];

const CORRESP: AttrSpec = &[("id", Str("")), ("label", Str(""))];

const SUPPLEMENT: AttrSpec = &[
    ("id", Str("")),
    ("href", Str("")),
    ("mimeType", Str("")),
    ("mimeSubType", Str("")),
    ("title", Str("")),
];

const COMMENT: AttrSpec = &[
    ("id", Str("")),
    ("target", Str("")),
    ("resolved", Bool(false)),
    ("contents", Str("")),
    ("contributions", EmptyList),
    ("originalText", Str("")),
    ("selector", Null),
];

const SECTION: AttrSpec = &[
    ("id", Str("")),
    ("category", Str("")),
    ("titleSuppressed", Bool(false)),
    ("generatedLabel", Null),
    ("pageBreakStyle", Null),
];

const CONTENTS: AttrSpec = &[("id", Str("")), ("contents", Str(""))];

const BIBLIOGRAPHY_ITEM: AttrSpec = &[
    ("id", Str("")),
    ("type", Str("article-journal")),
    ("author", Null),
    ("issued", Null),
    ("title", Null),
    ("containerTitle", Null),
    ("volume", Null),
    ("issue", Null),
    ("supplement", Null),
    ("page", Null),
    ("DOI", Null),
    ("URL", Null),
    ("publisher", Null),
    ("publisherPlace", Null),
    ("edition", Null),
    ("literal", Null),
];

const FOOTNOTES_ELEMENT: AttrSpec = &[
    ("id", Str("")),
    ("kind", Str("footnote")),
    ("collateByKind", Str("footnote")),
];

const FOOTNOTE: AttrSpec = &[
    ("id", Str("")),
    ("kind", Str("footnote")),
    ("category", Str("")),
];

const KEYWORD_GROUP: AttrSpec = &[("id", Str("")), ("type", Str(""))];

const PARAGRAPH: AttrSpec = &[
    ("id", Str("")),
    ("paragraphStyle", Null),
    ("placeholder", Str("")),
];

const QUOTE: AttrSpec = &[("id", Str("")), ("placeholder", Str(""))];

const BULLET_LIST: AttrSpec = &[("id", Str("")), ("listStyleType", Null)];

const ORDERED_LIST: AttrSpec = &[("id", Str("")), ("listStyleType", Null), ("order", Int(1))];

const LIST_ITEM: AttrSpec = &[("placeholder", Str(""))];

const LABELLED: AttrSpec = &[("id", Str("")), ("label", Str(""))];

const EQUATION: AttrSpec = &[
    ("id", Str("")),
    ("MathMLStringRepresentation", Str("")),
    ("SVGStringRepresentation", Str("")),
    ("TeXRepresentation", Str("")),
];

const LISTING: AttrSpec = &[
    ("id", Str("")),
    ("contents", Str("")),
    ("language", Str("")),
    ("languageKey", Str("null")),
];

const FIGURE_ELEMENT: AttrSpec = &[
    ("id", Str("")),
    ("label", Str("")),
    ("position", Null),
    ("attribution", Null),
];

const MULTI_GRAPHIC: AttrSpec = &[
    ("id", Str("")),
    ("label", Str("")),
    ("figureLayout", Str("")),
    ("figureStyle", Str("")),
    ("sizeFraction", Int(0)),
    ("alignment", Null),
    ("suppressCaption", Bool(false)),
];

const FIGURE: AttrSpec = &[
    ("id", Str("")),
    ("label", Str("")),
    ("src", Str("")),
    ("contentType", Str("")),
    ("embedURL", Null),
    ("originalURL", Null),
    ("position", Null),
];

const MISSING_FIGURE: AttrSpec = &[("id", Str("")), ("position", Null)];

const TABLE_ELEMENT: AttrSpec = &[
    ("id", Str("")),
    ("label", Str("")),
    ("suppressCaption", Bool(false)),
    ("suppressFooter", Bool(false)),
    ("tableStyle", Null),
    ("paragraphStyle", Null),
];

const TABLE_CELL: AttrSpec = &[
    ("colspan", Int(1)),
    ("rowspan", Int(1)),
    ("valign", Null),
    ("align", Null),
    ("scope", Null),
    ("style", Null),
];

const TABLE_COL: AttrSpec = &[("width", Str(""))];

const CITATION: AttrSpec = &[
    ("id", Str("")),
    ("rids", EmptyList),
    ("contents", Str("")),
    ("selectedText", Str("")),
];

const CROSS_REFERENCE: AttrSpec = &[
    ("id", Str("")),
    ("rids", EmptyList),
    ("label", Str("")),
    ("customLabel", Str("")),
];

const INLINE_EQUATION: AttrSpec = &[("id", Str("")), ("content", Str("")), ("format", Str(""))];

const INLINE_FOOTNOTE: AttrSpec = &[("id", Str("")), ("rids", EmptyList), ("contents", Str(""))];

const LINK: AttrSpec = &[("href", Str("")), ("title", Str(""))];

const HIGHLIGHT_MARKER: AttrSpec = &[
    ("id", Str("")),
    ("tid", Str("")),
    ("position", Str("point")),
];

const BLOCK: &[Group] = &[Group::Block];
const BLOCK_ELEMENT: &[Group] = &[Group::Block, Group::Element];
const BLOCK_SECTIONS: &[Group] = &[Group::Block, Group::Sections];
const INLINE: &[Group] = &[Group::Inline];
const NO_GROUP: &[Group] = &[];

const fn spec(content: &'static str, groups: &'static [Group], attrs: AttrSpec) -> KindSpec {
    KindSpec {
        content,
        groups,
        attrs,
        atom: false,
        selectable: true,
    }
}

const fn atom(groups: &'static [Group], attrs: AttrSpec) -> KindSpec {
    KindSpec {
        content: "",
        groups,
        attrs,
        atom: true,
        selectable: true,
    }
}

const fn fixed(content: &'static str, groups: &'static [Group], attrs: AttrSpec) -> KindSpec {
    KindSpec {
        content,
        groups,
        attrs,
        atom: false,
        selectable: false,
    }
}

impl NodeKind {
    pub const ALL: [NodeKind; 65] = [
        NodeKind::Manuscript,
        NodeKind::Title,
        NodeKind::Contributors,
        NodeKind::Contributor,
        NodeKind::Affiliations,
        NodeKind::Affiliation,
        NodeKind::AuthorNotes,
        NodeKind::Corresp,
        NodeKind::Supplements,
        NodeKind::Supplement,
        NodeKind::Comments,
        NodeKind::Comment,
        NodeKind::Section,
        NodeKind::SectionLabel,
        NodeKind::SectionTitle,
        NodeKind::BibliographySection,
        NodeKind::BibliographyElement,
        NodeKind::BibliographyItem,
        NodeKind::FootnotesSection,
        NodeKind::FootnotesElement,
        NodeKind::Footnote,
        NodeKind::KeywordsSection,
        NodeKind::KeywordsElement,
        NodeKind::KeywordGroup,
        NodeKind::Keyword,
        NodeKind::TocSection,
        NodeKind::TocElement,
        NodeKind::GraphicalAbstractSection,
        NodeKind::Paragraph,
        NodeKind::BlockquoteElement,
        NodeKind::PullquoteElement,
        NodeKind::Attribution,
        NodeKind::BulletList,
        NodeKind::OrderedList,
        NodeKind::ListItem,
        NodeKind::EquationElement,
        NodeKind::Equation,
        NodeKind::ListingElement,
        NodeKind::Listing,
        NodeKind::FigureElement,
        NodeKind::MultiGraphicFigureElement,
        NodeKind::Figure,
        NodeKind::MissingFigure,
        NodeKind::Figcaption,
        NodeKind::CaptionTitle,
        NodeKind::Caption,
        NodeKind::TableElement,
        NodeKind::Table,
        NodeKind::TableRow,
        NodeKind::TableCell,
        NodeKind::TableHeader,
        NodeKind::TableColgroup,
        NodeKind::TableCol,
        NodeKind::TableElementFooter,
        NodeKind::Placeholder,
        NodeKind::PlaceholderElement,
        NodeKind::BoxElement,
        NodeKind::Text,
        NodeKind::HardBreak,
        NodeKind::Citation,
        NodeKind::CrossReference,
        NodeKind::InlineEquation,
        NodeKind::InlineFootnote,
        NodeKind::Link,
        NodeKind::HighlightMarker,
    ];

    /// Position of the kind in [`NodeKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The persisted name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Manuscript => "manuscript",
            NodeKind::Title => "title",
            NodeKind::Contributors => "contributors",
            NodeKind::Contributor => "contributor",
            NodeKind::Affiliations => "affiliations",
            NodeKind::Affiliation => "affiliation",
            NodeKind::AuthorNotes => "author_notes",
            NodeKind::Corresp => "corresp",
            NodeKind::Supplements => "supplements",
            NodeKind::Supplement => "supplement",
            NodeKind::Comments => "comments",
            NodeKind::Comment => "comment",
            NodeKind::Section => "section",
            NodeKind::SectionLabel => "section_label",
            NodeKind::SectionTitle => "section_title",
            NodeKind::BibliographySection => "bibliography_section",
            NodeKind::BibliographyElement => "bibliography_element",
            NodeKind::BibliographyItem => "bibliography_item",
            NodeKind::FootnotesSection => "footnotes_section",
            NodeKind::FootnotesElement => "footnotes_element",
            NodeKind::Footnote => "footnote",
            NodeKind::KeywordsSection => "keywords_section",
            NodeKind::KeywordsElement => "keywords_element",
            NodeKind::KeywordGroup => "keyword_group",
            NodeKind::Keyword => "keyword",
            NodeKind::TocSection => "toc_section",
            NodeKind::TocElement => "toc_element",
            NodeKind::GraphicalAbstractSection => "graphical_abstract_section",
            NodeKind::Paragraph => "paragraph",
            NodeKind::BlockquoteElement => "blockquote_element",
            NodeKind::PullquoteElement => "pullquote_element",
            NodeKind::Attribution => "attribution",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::EquationElement => "equation_element",
            NodeKind::Equation => "equation",
            NodeKind::ListingElement => "listing_element",
            NodeKind::Listing => "listing",
            NodeKind::FigureElement => "figure_element",
            NodeKind::MultiGraphicFigureElement => "multi_graphic_figure_element",
            NodeKind::Figure => "figure",
            NodeKind::MissingFigure => "missing_figure",
            NodeKind::Figcaption => "figcaption",
            NodeKind::CaptionTitle => "caption_title",
            NodeKind::Caption => "caption",
            NodeKind::TableElement => "table_element",
            NodeKind::Table => "table",
            NodeKind::TableRow => "table_row",
            NodeKind::TableCell => "table_cell",
            NodeKind::TableHeader => "table_header",
            NodeKind::TableColgroup => "table_colgroup",
            NodeKind::TableCol => "table_col",
            NodeKind::TableElementFooter => "table_element_footer",
            NodeKind::Placeholder => "placeholder",
            NodeKind::PlaceholderElement => "placeholder_element",
            NodeKind::BoxElement => "box_element",
            NodeKind::Text => "text",
            NodeKind::HardBreak => "hard_break",
            NodeKind::Citation => "citation",
            NodeKind::CrossReference => "cross_reference",
            NodeKind::InlineEquation => "inline_equation",
            NodeKind::InlineFootnote => "inline_footnote",
            NodeKind::Link => "link",
            NodeKind::HighlightMarker => "highlight_marker",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Declaration of the kind: grammar, groups, attrs and flags.
    pub fn spec(self) -> KindSpec {
        match self {
            NodeKind::Manuscript => fixed(
                "title contributors? affiliations? author_notes? supplements? sections* comments?",
                NO_GROUP,
                MANUSCRIPT,
            ),
            NodeKind::Title => spec("(text | highlight_marker)*", BLOCK, ID),
            NodeKind::Contributors => fixed("contributor*", BLOCK, ID),
            NodeKind::Contributor => atom(NO_GROUP, CONTRIBUTOR),
            NodeKind::Affiliations => fixed("affiliation*", BLOCK, ID),
            NodeKind::Affiliation => atom(NO_GROUP, AFFILIATION),
            NodeKind::AuthorNotes => fixed("(corresp | footnote | paragraph)*", BLOCK, ID),
            NodeKind::Corresp => spec("text*", NO_GROUP, CORRESP),
            NodeKind::Supplements => fixed("section_title supplement*", BLOCK, ID),
            NodeKind::Supplement => atom(NO_GROUP, SUPPLEMENT),
            NodeKind::Comments => fixed("comment*", BLOCK, ID),
            NodeKind::Comment => atom(NO_GROUP, COMMENT),
            NodeKind::Section => fixed(
                "section_label? section_title (paragraph | element)* sections*",
                BLOCK_SECTIONS,
                SECTION,
            ),
            NodeKind::SectionLabel => spec("text*", NO_GROUP, NONE),
            NodeKind::SectionTitle => spec("(text | highlight_marker)*", NO_GROUP, NONE),
            NodeKind::BibliographySection => fixed(
                "section_title bibliography_element",
                BLOCK_SECTIONS,
                SECTION,
            ),
            NodeKind::BibliographyElement => fixed("bibliography_item*", BLOCK_ELEMENT, CONTENTS),
            NodeKind::BibliographyItem => atom(NO_GROUP, BIBLIOGRAPHY_ITEM),
            NodeKind::FootnotesSection => fixed(
                "section_title footnotes_element*",
                BLOCK_SECTIONS,
                SECTION,
            ),
            NodeKind::FootnotesElement => fixed("footnote*", BLOCK_ELEMENT, FOOTNOTES_ELEMENT),
            NodeKind::Footnote => spec("paragraph*", NO_GROUP, FOOTNOTE),
            NodeKind::KeywordsSection => fixed(
                "section_title keywords_element",
                BLOCK_SECTIONS,
                SECTION,
            ),
            NodeKind::KeywordsElement => fixed("keyword_group*", BLOCK_ELEMENT, CONTENTS),
            NodeKind::KeywordGroup => spec("keyword*", NO_GROUP, KEYWORD_GROUP),
            NodeKind::Keyword => spec("text*", NO_GROUP, ID),
            NodeKind::TocSection => fixed("section_title toc_element", BLOCK_SECTIONS, SECTION),
            NodeKind::TocElement => atom(BLOCK_ELEMENT, CONTENTS),
            NodeKind::GraphicalAbstractSection => fixed(
                "section_title (figure_element | paragraph | placeholder)*",
                BLOCK_SECTIONS,
                SECTION,
            ),
            NodeKind::Paragraph => spec("inline*", BLOCK, PARAGRAPH),
            NodeKind::BlockquoteElement => spec("paragraph+ attribution?", BLOCK_ELEMENT, QUOTE),
            NodeKind::PullquoteElement => spec("paragraph+ attribution?", BLOCK_ELEMENT, QUOTE),
            NodeKind::Attribution => spec("inline*", NO_GROUP, NONE),
            NodeKind::BulletList => spec("list_item+", BLOCK_ELEMENT, BULLET_LIST),
            NodeKind::OrderedList => spec("list_item+", BLOCK_ELEMENT, ORDERED_LIST),
            NodeKind::ListItem => spec(
                "(paragraph | bullet_list | ordered_list)*",
                NO_GROUP,
                LIST_ITEM,
            ),
            NodeKind::EquationElement => fixed("(equation | placeholder)", BLOCK_ELEMENT, LABELLED),
            NodeKind::Equation => atom(BLOCK, EQUATION),
            NodeKind::ListingElement => fixed(
                "(listing | placeholder) figcaption?",
                BLOCK_ELEMENT,
                ID,
            ),
            NodeKind::Listing => atom(BLOCK, LISTING),
            NodeKind::FigureElement => fixed(
                "(figure | missing_figure | placeholder | paragraph)+ attribution* figcaption?",
                BLOCK_ELEMENT,
                FIGURE_ELEMENT,
            ),
            NodeKind::MultiGraphicFigureElement => fixed(
                "(figure | placeholder)+ figcaption?",
                BLOCK_ELEMENT,
                MULTI_GRAPHIC,
            ),
            NodeKind::Figure => fixed("(figcaption | paragraph | attribution)*", BLOCK, FIGURE),
            NodeKind::MissingFigure => atom(BLOCK, MISSING_FIGURE),
            NodeKind::Figcaption => spec("caption_title? caption?", NO_GROUP, NONE),
            NodeKind::CaptionTitle => spec("inline*", NO_GROUP, NONE),
            NodeKind::Caption => spec("inline*", NO_GROUP, NONE),
            NodeKind::TableElement => fixed(
                "(table | placeholder) table_element_footer? figcaption?",
                BLOCK_ELEMENT,
                TABLE_ELEMENT,
            ),
            NodeKind::Table => spec("table_colgroup? table_row+", BLOCK, ID),
            NodeKind::TableRow => spec("(table_cell | table_header)+", NO_GROUP, LIST_ITEM),
            NodeKind::TableCell => spec("inline*", NO_GROUP, TABLE_CELL),
            NodeKind::TableHeader => spec("inline*", NO_GROUP, TABLE_CELL),
            NodeKind::TableColgroup => spec("table_col+", NO_GROUP, NONE),
            NodeKind::TableCol => atom(NO_GROUP, TABLE_COL),
            NodeKind::TableElementFooter => spec(
                "(paragraph | footnotes_element)*",
                NO_GROUP,
                ID,
            ),
            NodeKind::Placeholder => atom(BLOCK, LABELLED),
            NodeKind::PlaceholderElement => atom(BLOCK_ELEMENT, ID),
            NodeKind::BoxElement => fixed(
                "(paragraph | element)* figcaption?",
                BLOCK_ELEMENT,
                LABELLED,
            ),
            NodeKind::Text => spec("", INLINE, NONE),
            NodeKind::HardBreak => atom(INLINE, NONE),
            NodeKind::Citation => atom(INLINE, CITATION),
            NodeKind::CrossReference => atom(INLINE, CROSS_REFERENCE),
            NodeKind::InlineEquation => atom(INLINE, INLINE_EQUATION),
            NodeKind::InlineFootnote => atom(INLINE, INLINE_FOOTNOTE),
            NodeKind::Link => spec("text*", INLINE, LINK),
            NodeKind::HighlightMarker => atom(INLINE, HIGHLIGHT_MARKER),
        }
    }

    pub fn in_group(self, group: Group) -> bool {
        self.spec().groups.contains(&group)
    }

    pub fn is_inline(self) -> bool {
        self.in_group(Group::Inline)
    }

    pub fn is_atom(self) -> bool {
        self.spec().atom
    }

    pub fn is_selectable(self) -> bool {
        self.spec().selectable
    }

    /// Kinds whose direct children are inline content.
    pub fn is_textblock(self) -> bool {
        super::schema().content_match(self).allows(NodeKind::Text)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline decorations applied to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkKind {
    Bold,
    Code,
    Italic,
    Smallcaps,
    Strikethrough,
    Styled,
    Subscript,
    Superscript,
    Underline,
}

impl MarkKind {
    pub const ALL: [MarkKind; 9] = [
        MarkKind::Bold,
        MarkKind::Code,
        MarkKind::Italic,
        MarkKind::Smallcaps,
        MarkKind::Strikethrough,
        MarkKind::Styled,
        MarkKind::Subscript,
        MarkKind::Superscript,
        MarkKind::Underline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Code => "code",
            MarkKind::Italic => "italic",
            MarkKind::Smallcaps => "smallcaps",
            MarkKind::Strikethrough => "strikethrough",
            MarkKind::Styled => "styled",
            MarkKind::Subscript => "subscript",
            MarkKind::Superscript => "superscript",
            MarkKind::Underline => "underline",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn attrs(self) -> AttrSpec {
        match self {
            MarkKind::Styled => &[("rid", Str(""))],
            MarkKind::Bold
            | MarkKind::Code
            | MarkKind::Italic
            | MarkKind::Smallcaps
            | MarkKind::Strikethrough
            | MarkKind::Subscript
            | MarkKind::Superscript
            | MarkKind::Underline => NONE,
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
