//! JATS import
//!
//!     The importer parses the document into the XML intermediate representation, runs a
//!     fixed sequence of normalization stages over it and then converts the normalized tree
//!     into a manuscript node in one pass:
//!
//!         parse ─▶ mark-annotations ─▶ ensure-section ─▶ move-captions ─▶ move-abstracts
//!               ─▶ move-back-matter ─▶ consolidate-footnotes ─▶ wrap-figures
//!               ─▶ move-floats-group ─▶ promote-blocks ─▶ extract-front
//!               ─▶ convert ─▶ extract-annotations ─▶ reconcile-ids
//!
//!     Stages only move and rename XML; everything that needs the schema happens after the
//!     conversion. See [`stages`] for what each stage does.

pub mod annotations;
pub mod front;
pub mod pipeline;
pub mod references;
pub mod rules;
pub mod stages;

use self::annotations::{extract_annotations, MarkAnnotations};
use self::front::ExtractFront;
use self::pipeline::{ImportContext, TransformPipeline, XmlTransform};
use self::references::reconcile_ids;
use self::rules::convert_article;
use self::stages::{
    ConsolidateFootnotes, EnsureSection, MoveAbstracts, MoveBackMatter, MoveCaptions,
    MoveFloatsGroup, PromoteBlocks, WrapFigures,
};
use super::{ImportOptions, Journal};
use crate::error::FormatError;
use crate::ir::from_xml::parse_document;
use crate::ir::nodes::XmlElement;
use crate::schema::Node;

/// Result of importing one article.
#[derive(Debug, Clone)]
pub struct ImportedArticle {
    pub manuscript: Node,
    /// Journal metadata from `front/journal-meta`, when present.
    pub journal: Option<Journal>,
}

/// The normalization stages in the order the importer runs them.
pub fn standard_pipeline() -> TransformPipeline {
    let stages: Vec<Box<dyn XmlTransform>> = vec![
        Box::new(MarkAnnotations),
        Box::new(EnsureSection),
        Box::new(MoveCaptions),
        Box::new(MoveAbstracts),
        Box::new(MoveBackMatter),
        Box::new(ConsolidateFootnotes),
        Box::new(WrapFigures),
        Box::new(MoveFloatsGroup),
        Box::new(PromoteBlocks),
        Box::new(ExtractFront),
    ];
    let mut pipeline = TransformPipeline::new();
    pipeline.extend(stages);
    pipeline
}

fn precheck(root: &XmlElement) -> Result<(), FormatError> {
    if !root.is("article") {
        return Err(FormatError::InvalidInput(format!(
            "expected an <article> root element, found <{}>",
            root.name
        )));
    }
    if root.child("front").is_none() {
        return Err(FormatError::InvalidInput(
            "article has no <front> element".to_string(),
        ));
    }
    Ok(())
}

/// Imports a JATS article.
pub fn parse_jats_article(
    source: &str,
    options: &ImportOptions,
) -> Result<ImportedArticle, FormatError> {
    let root = parse_document(source, options.max_depth)?;
    precheck(&root)?;

    let mut ctx = ImportContext::new(options.clone());
    let article = standard_pipeline().execute(root, &mut ctx)?;
    let manuscript = convert_article(&article, &mut ctx)?;
    let manuscript = extract_annotations(manuscript, &mut ctx)?;
    let manuscript = reconcile_ids(manuscript, &ctx)?;
    tracing::debug!(
        nodes = manuscript.descendants().count(),
        "Imported JATS article"
    );

    Ok(ImportedArticle {
        manuscript,
        journal: ctx.journal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeKind;

    #[test]
    fn stages_run_in_order() {
        assert_eq!(
            standard_pipeline().names(),
            vec![
                "mark-annotations",
                "ensure-section",
                "move-captions",
                "move-abstracts",
                "move-back-matter",
                "consolidate-footnotes",
                "wrap-figures",
                "move-floats-group",
                "promote-blocks",
                "extract-front",
            ]
        );
    }

    #[test]
    fn rejects_documents_without_front() {
        let err = parse_jats_article("<article><body/></article>", &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, FormatError::InvalidInput(_)));
    }

    #[test]
    fn rejects_other_roots() {
        let err = parse_jats_article("<book><front/></book>", &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, FormatError::InvalidInput(_)));
    }

    #[test]
    fn minimal_article_gets_default_title_and_section() {
        let imported = parse_jats_article(
            "<article><front><article-meta/></front><body><p>Hello</p></body></article>",
            &ImportOptions::default(),
        )
        .unwrap();
        let root = &imported.manuscript;
        assert_eq!(root.kind(), NodeKind::Manuscript);
        assert_eq!(root.content()[0].text_content(), "Untitled Manuscript");
        let section = &root.content()[1];
        assert_eq!(section.kind(), NodeKind::Section);
        assert_eq!(section.content()[1].text_content(), "Hello");
        assert!(imported.journal.is_none());
    }
}
