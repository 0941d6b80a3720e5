//! Persisted JSON format
//!
//! A manuscript is stored as `{"version": "<semver>", "doc": <tree>}`. Reading runs the
//! migration chain from the stored version and validates the result; writing stamps the
//! current schema version.
//!
//! Decoding goes through serde_json, whose recursion limit (128 levels) is reached before the
//! tree's own `MAX_DEPTH`: every tree level costs two JSON levels (the node object and its
//! `content` array), so trees nested deeper than about 60 levels are rejected as
//! `InvalidInput`.

use crate::error::FormatError;
use crate::format::Format;
use crate::migration::{builtin_registry, current_version, parse_version};
use crate::schema::{JsonNode, Node};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub doc: JsonNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Accept documents stamped with a newer schema version than this crate's.
    pub allow_newer: bool,
}

#[derive(Debug, Default)]
pub struct JsonFormat {
    options: JsonOptions,
}

impl JsonFormat {
    pub fn new(options: JsonOptions) -> Self {
        JsonFormat { options }
    }

    /// Migrates and validates an already-decoded envelope.
    pub fn load(&self, envelope: Envelope) -> Result<Node, FormatError> {
        let version = parse_version(&envelope.version)?;
        let current = current_version();
        if version > current && !self.options.allow_newer {
            return Err(FormatError::NotSupported(format!(
                "document schema version {version} is newer than {current}"
            )));
        }
        Ok(builtin_registry()?.migrate_for(envelope.doc, &version)?)
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Versioned manuscript JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        let envelope: Envelope = serde_json::from_str(source)
            .map_err(|e| FormatError::InvalidInput(format!("not a manuscript document: {e}")))?;
        self.load(envelope)
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        let envelope = Envelope {
            version: current_version().to_string(),
            doc: doc.to_json(),
        };
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}
