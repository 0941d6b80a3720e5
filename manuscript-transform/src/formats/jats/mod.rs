//! JATS XML format
//!
//! Import ([`parser`]) and export ([`serializer`]) of JATS Archiving and Interchange articles,
//! plus the option types both directions share.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::schema::{Node, MAX_DEPTH};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub use parser::{parse_jats_article, ImportedArticle};
pub use serializer::JatsExporter;

/// JATS Archiving and Interchange DTD versions the exporter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JatsVersion {
    V1_1,
    V1_2d1,
    #[default]
    V1_2,
}

impl JatsVersion {
    pub const ALL: [JatsVersion; 3] = [JatsVersion::V1_1, JatsVersion::V1_2d1, JatsVersion::V1_2];

    /// Value of the `dtd-version` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            JatsVersion::V1_1 => "1.1",
            JatsVersion::V1_2d1 => "1.2d1",
            JatsVersion::V1_2 => "1.2",
        }
    }

    pub fn public_id(self) -> &'static str {
        match self {
            JatsVersion::V1_1 => {
                "-//NLM//DTD JATS (Z39.96) Journal Archiving and Interchange DTD v1.1 20151215//EN"
            }
            JatsVersion::V1_2d1 => {
                "-//NLM//DTD JATS (Z39.96) Journal Archiving and Interchange DTD v1.2d1 20170631//EN"
            }
            JatsVersion::V1_2 => {
                "-//NLM//DTD JATS (Z39.96) Journal Archiving and Interchange DTD v1.2 20190208//EN"
            }
        }
    }

    pub fn system_id(self) -> &'static str {
        match self {
            JatsVersion::V1_1 => "http://jats.nlm.nih.gov/archiving/1.1/JATS-archivearticle1.dtd",
            JatsVersion::V1_2d1 => {
                "http://jats.nlm.nih.gov/archiving/1.2d1/JATS-archivearticle1.dtd"
            }
            JatsVersion::V1_2 => "http://jats.nlm.nih.gov/archiving/1.2/JATS-archivearticle1.dtd",
        }
    }

    /// Body of the `<!DOCTYPE ...>` declaration.
    pub fn doctype(self) -> String {
        format!(
            "article PUBLIC \"{}\" \"{}\"",
            self.public_id(),
            self.system_id()
        )
    }
}

impl fmt::Display for JatsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JatsVersion {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|version| version.as_str() == s.trim())
            .ok_or_else(|| FormatError::UnsupportedVersion(s.to_string()))
    }
}

/// Options for [`parse_jats_article`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Deepest element nesting accepted from the source document.
    pub max_depth: usize,
    /// Title used when the article has none.
    pub default_title: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            max_depth: MAX_DEPTH,
            default_title: "Untitled Manuscript".to_string(),
        }
    }
}

/// A value qualified by a JATS type attribute (`journal-id-type`, `pub-type`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypedValue {
    pub kind: Option<String>,
    pub value: String,
}

/// Journal metadata read from, or written to, `front/journal-meta`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Journal {
    pub identifiers: Vec<TypedValue>,
    pub title: Option<String>,
    pub abbreviated_titles: Vec<TypedValue>,
    pub issns: Vec<TypedValue>,
    pub publisher_name: Option<String>,
}

/// Options for [`JatsExporter::serialize`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub version: JatsVersion,
    /// Emit only `front`.
    pub front_matter_only: bool,
    /// External identifier, written as `article-id pub-id-type="publisher-id"`.
    pub id: Option<String>,
    /// Overrides the manuscript's own DOI.
    pub doi: Option<String>,
    /// Self links by content type (`pdf` → `123.pdf`), written as `self-uri`.
    pub links: BTreeMap<String, String>,
    pub journal: Option<Journal>,
}

/// Option keys understood by [`JatsFormat::serialize_with_options`].
const EXPORT_PARAMETERS: &[&str] = &[
    "version",
    "front-matter-only",
    "manuscript-id",
    "id",
    "doi",
    "pdf-link",
];

impl ExportOptions {
    /// Reads string parameters; also returns the `manuscript-id` parameter when given.
    pub fn from_parameters(
        parameters: &HashMap<String, String>,
    ) -> Result<(Self, Option<String>), FormatError> {
        if let Some(unknown) = parameters
            .keys()
            .find(|key| !EXPORT_PARAMETERS.contains(&key.as_str()))
        {
            return Err(FormatError::NotSupported(format!(
                "unknown JATS export option '{unknown}'"
            )));
        }

        let mut options = ExportOptions::default();
        if let Some(version) = parameters.get("version") {
            options.version = version.parse()?;
        }
        if let Some(flag) = parameters.get("front-matter-only") {
            options.front_matter_only = match flag.as_str() {
                "true" | "yes" | "1" => true,
                "false" | "no" | "0" => false,
                other => {
                    return Err(FormatError::InvalidInput(format!(
                        "front-matter-only expects a boolean, got '{other}'"
                    )))
                }
            };
        }
        options.id = parameters.get("id").cloned();
        options.doi = parameters.get("doi").cloned();
        if let Some(pdf) = parameters.get("pdf-link") {
            options.links.insert("pdf".to_string(), pdf.clone());
        }
        Ok((options, parameters.get("manuscript-id").cloned()))
    }
}

/// JATS as a registry format.
#[derive(Debug, Default)]
pub struct JatsFormat {
    import: ImportOptions,
}

impl JatsFormat {
    pub fn new(import: ImportOptions) -> Self {
        JatsFormat { import }
    }
}

impl Format for JatsFormat {
    fn name(&self) -> &str {
        "jats"
    }

    fn description(&self) -> &str {
        "JATS Archiving and Interchange XML"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xml", "jats"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        parse_jats_article(source, &self.import).map(|imported| imported.manuscript)
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        JatsExporter::new().serialize(doc, doc.id(), &ExportOptions::default())
    }

    fn serialize_with_options(
        &self,
        doc: &Node,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let (export, manuscript_id) = ExportOptions::from_parameters(options)?;
        let manuscript_id = manuscript_id.unwrap_or_else(|| doc.id().to_string());
        JatsExporter::new().serialize(doc, &manuscript_id, &export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_parse() {
        assert_eq!("1.1".parse::<JatsVersion>().unwrap(), JatsVersion::V1_1);
        assert_eq!("1.2d1".parse::<JatsVersion>().unwrap(), JatsVersion::V1_2d1);
        assert_eq!(JatsVersion::default().as_str(), "1.2");
        assert!(matches!(
            "1.0".parse::<JatsVersion>(),
            Err(FormatError::UnsupportedVersion(v)) if v == "1.0"
        ));
    }

    #[test]
    fn doctype_names_the_dtd() {
        let doctype = JatsVersion::V1_1.doctype();
        assert!(doctype.starts_with("article PUBLIC \"-//NLM//DTD JATS (Z39.96)"));
        assert!(doctype.contains("archiving/1.1/"));
    }

    #[test]
    fn export_parameters() {
        let parameters: HashMap<String, String> = [
            ("version", "1.1"),
            ("front-matter-only", "true"),
            ("pdf-link", "123.pdf"),
            ("manuscript-id", "MPManuscript:1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let (options, manuscript_id) = ExportOptions::from_parameters(&parameters).unwrap();
        assert_eq!(options.version, JatsVersion::V1_1);
        assert!(options.front_matter_only);
        assert_eq!(options.links.get("pdf").map(String::as_str), Some("123.pdf"));
        assert_eq!(manuscript_id.as_deref(), Some("MPManuscript:1"));
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let parameters: HashMap<String, String> =
            [("colour".to_string(), "blue".to_string())].into_iter().collect();
        assert!(matches!(
            ExportOptions::from_parameters(&parameters),
            Err(FormatError::NotSupported(_))
        ));
    }
}
