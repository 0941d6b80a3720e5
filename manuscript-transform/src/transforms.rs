//! Conversions between the persisted JSON form and JATS
//!
//! Thin functional wrappers over the formats for callers that move whole documents from one
//! representation to another without going through the registry.

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::jats::{parse_jats_article, ExportOptions, ImportOptions, JatsExporter};
use crate::formats::json::JsonFormat;

/// Import a JATS article and write it as versioned JSON.
///
/// # Example
///
/// ```ignore
/// let json = jats_to_json(&xml, &ImportOptions::default())?;
/// assert!(json.contains("\"version\": \"1.3.0\""));
/// ```
pub fn jats_to_json(source: &str, options: &ImportOptions) -> Result<String, FormatError> {
    let imported = parse_jats_article(source, options)?;
    JsonFormat::default().serialize(&imported.manuscript)
}

/// Load a persisted document, migrating it if needed, and export it as JATS.
pub fn json_to_jats(source: &str, options: &ExportOptions) -> Result<String, FormatError> {
    let manuscript = JsonFormat::default().parse(source)?;
    JatsExporter::new().serialize(&manuscript, manuscript.id(), options)
}

/// Import a JATS article and export it again.
///
/// The journal metadata read from the source is carried over unless `options` sets its own.
pub fn normalize_jats(
    source: &str,
    import: &ImportOptions,
    export: &ExportOptions,
) -> Result<String, FormatError> {
    let imported = parse_jats_article(source, import)?;
    let mut export = export.clone();
    if export.journal.is_none() {
        export.journal = imported.journal;
    }
    JatsExporter::new().serialize(&imported.manuscript, imported.manuscript.id(), &export)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<article article-type="research-article">
        <front>
            <journal-meta><journal-title-group><journal-title>Tests</journal-title></journal-title-group></journal-meta>
            <article-meta><title-group><article-title>Round trip</article-title></title-group></article-meta>
        </front>
        <body><sec><title>Introduction</title><p>Hello</p></sec></body>
    </article>"#;

    #[test]
    fn jats_survives_json() {
        let json = jats_to_json(ARTICLE, &ImportOptions::default()).unwrap();
        let xml = json_to_jats(&json, &ExportOptions::default()).unwrap();
        assert!(xml.contains("<article-title>Round trip</article-title>"));
        assert!(xml.contains(">Hello</p>"));
    }

    #[test]
    fn normalizing_keeps_journal_metadata() {
        let xml = normalize_jats(ARTICLE, &ImportOptions::default(), &ExportOptions::default())
            .unwrap();
        assert!(xml.contains("<journal-title>Tests</journal-title>"));
    }
}
