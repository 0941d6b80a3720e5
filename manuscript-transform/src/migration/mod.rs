//! Schema migration
//!
//!     Persisted trees carry the schema version they were written under. When the schema
//!     changes, a [`MigrationScript`] rewrites the serialized shape from one version to the
//!     next; [`MigrationRegistry::migrate_for`] runs every script a document still needs and then
//!     validates the result against the current schema.
//!
//!     The registry is built once from an explicit script list. Construction sorts the scripts by
//!     target version and rejects layouts under which a document could skip a script or see one
//!     twice: duplicate ranges, scripts that do not advance, gaps between consecutive scripts and
//!     chains that stop short of the current version. With a contiguous chain, "every script
//!     whose source version is at or above the document's version" is exactly the suffix of
//!     the chain the document has not been through yet.
//!
//!     Scripts operate on [`JsonNode`], not on [`Node`]: the input of a script is by definition a
//!     tree the current schema may reject.

pub mod scripts;

use crate::error::MigrationError;
use crate::schema::{JsonNode, Node};
use once_cell::sync::Lazy;
use semver::Version;
use std::fmt;

/// Version of the schema compiled into this crate.
pub const CURRENT_VERSION: &str = "1.3.0";

pub fn current_version() -> Version {
    Version::new(1, 3, 0)
}

static BUILTIN: Lazy<Result<MigrationRegistry, MigrationError>> =
    Lazy::new(MigrationRegistry::builtin);

/// The built-in registry, built on first use and shared afterwards.
pub fn builtin_registry() -> Result<&'static MigrationRegistry, MigrationError> {
    BUILTIN.as_ref().map_err(Clone::clone)
}

/// Parses a stored version string. `"1.2"` is read as `1.2.0`.
pub fn parse_version(version: &str) -> Result<Version, MigrationError> {
    let trimmed = version.trim();
    Version::parse(trimmed)
        .or_else(|_| Version::parse(&format!("{trimmed}.0")))
        .map_err(|_| MigrationError::InvalidVersion(version.to_string()))
}

/// A rewrite of the serialized tree from one schema version to the next.
pub trait MigrationScript: Send + Sync {
    fn from_version(&self) -> &Version;

    fn to_version(&self) -> &Version;

    /// Rewrites a single node. Children are visited afterwards, already migrated parents
    /// first; `doc` is the whole tree as it was before this script ran.
    fn migrate_node(&self, node: JsonNode, doc: &JsonNode) -> JsonNode;
}

impl fmt::Debug for dyn MigrationScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MigrationScript({} -> {})", self.from_version(), self.to_version())
    }
}

/// Applies `script` to every node of `doc` in pre-order.
pub fn migrate(doc: JsonNode, script: &dyn MigrationScript) -> JsonNode {
    fn visit(node: JsonNode, script: &dyn MigrationScript, doc: &JsonNode) -> JsonNode {
        script
            .migrate_node(node, doc)
            .map_children(|child| visit(child, script, doc))
    }

    let original = doc.clone();
    visit(doc, script, &original)
}

/// An ordered, gap-free chain of migration scripts ending at the current schema version.
#[derive(Debug)]
pub struct MigrationRegistry {
    scripts: Vec<Box<dyn MigrationScript>>,
    current: Version,
}

impl MigrationRegistry {
    pub fn new(
        mut scripts: Vec<Box<dyn MigrationScript>>,
        current: Version,
    ) -> Result<Self, MigrationError> {
        for script in &scripts {
            if script.to_version() <= script.from_version() {
                return Err(MigrationError::NonAdvancing {
                    from: script.from_version().clone(),
                    to: script.to_version().clone(),
                });
            }
        }
        scripts.sort_by(|a, b| a.to_version().cmp(b.to_version()));

        for pair in scripts.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.from_version() == next.from_version()
                || previous.to_version() == next.to_version()
            {
                return Err(MigrationError::DuplicateRange {
                    from: next.from_version().clone(),
                    to: next.to_version().clone(),
                });
            }
            if previous.to_version() != next.from_version() {
                return Err(MigrationError::CoverageGap {
                    expected: previous.to_version().clone(),
                    found: next.from_version().clone(),
                });
            }
        }
        if let Some(last) = scripts.last() {
            if *last.to_version() != current {
                return Err(MigrationError::IncompleteChain {
                    end: last.to_version().clone(),
                    current,
                });
            }
        }

        Ok(MigrationRegistry { scripts, current })
    }

    /// The built-in scripts, ending at [`CURRENT_VERSION`].
    pub fn builtin() -> Result<Self, MigrationError> {
        Self::new(scripts::builtin(), current_version())
    }

    pub fn current_version(&self) -> &Version {
        &self.current
    }

    /// Scripts in application order.
    pub fn scripts(&self) -> impl Iterator<Item = &dyn MigrationScript> {
        self.scripts.iter().map(|script| script.as_ref())
    }

    /// Scripts a document written under `from_version` still needs, in application order.
    pub fn pending(&self, from_version: &Version) -> impl Iterator<Item = &dyn MigrationScript> {
        let from_version = from_version.clone();
        self.scripts()
            .filter(move |script| *script.from_version() >= from_version)
    }

    /// Runs the pending scripts over `doc` without validating.
    pub fn upgrade(&self, doc: JsonNode, from_version: &Version) -> JsonNode {
        self.pending(from_version).fold(doc, |doc, script| {
            tracing::debug!(
                from = %script.from_version(),
                to = %script.to_version(),
                "Applying migration"
            );
            migrate(doc, script)
        })
    }

    /// Migrates a document written under `from_version` and validates the result.
    ///
    /// Validation failures come back as [`MigrationError::ValidationFailure`], carrying the
    /// schema error and `from_version`.
    pub fn migrate_for(&self, doc: JsonNode, from_version: &Version) -> Result<Node, MigrationError> {
        let migrated = self.upgrade(doc, from_version);
        Node::from_json(&migrated).map_err(|source| {
            tracing::warn!(
                from_version = %from_version,
                error = %source,
                "Migrated document failed validation"
            );
            MigrationError::ValidationFailure {
                from_version: from_version.clone(),
                source,
            }
        })
    }
}
