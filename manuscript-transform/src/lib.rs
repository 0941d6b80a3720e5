//! Scholarly manuscript interchange
//!
//!     This crate keeps a schema-validated tree representation of a journal article and converts
//!     it to and from JATS XML, while keeping previously persisted trees loadable as the schema
//!     evolves.
//!
//!     It is a pure lib: no filesystem, network or environment access, no printing. Hosts read
//!     and write the bytes; configuration and logging setup live in manuscript-config.
//!
//! Architecture
//!
//!     Everything is built around the manuscript tree (./schema). A node's kind is a closed enum,
//!     every kind declares its attrs and a content grammar, and grammars are compiled into DFAs
//!     once. A tree can only be built through validating constructors, so any `Node` in hand is
//!     valid.
//!
//!     JATS goes through an owned XML intermediate representation (./ir) in both directions:
//!
//!         JATS ─▶ ir ─▶ normalization stages ─▶ rule table ─▶ Node         (formats/jats/parser)
//!         Node ─▶ builders ─▶ ir ─▶ JATS                                    (formats/jats/serializer)
//!
//!     The importer moves content into the shape the schema wants (abstracts into leading
//!     sections, back matter into classified sections, figures into figure groups, ...) and the
//!     exporter undoes those relocations. Section classification is shared by both and lives in
//!     ./common/section_category.rs, together with citation numbering (./common/citations.rs).
//!
//!     Persisted trees are versioned JSON (./formats/json). Loading an older document runs the
//!     migration chain (./migration) and validates the result.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── transforms.rs           # Whole-document conversions
//!     ├── schema                  # Node kinds, grammars, Node / JsonNode
//!     ├── common                  # Section categories, citation numbering
//!     ├── ir                      # XML intermediate representation
//!     ├── migration               # Migration engine and built-in scripts
//!     ├── formats
//!     │   ├── jats
//!     │   │   ├── parser          # Normalization stages, rule table, annotations
//!     │   │   ├── serializer      # Builders
//!     │   │   └── mod.rs
//!     │   └── json
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── <area>
//!     │   └── <testname>.rs
//!     └── fixtures
//!         └── <docname>.xml
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs includes them.
//!
//! Formats
//!
//!     Both formats implement the Format trait (./format.rs) and are registered by
//!     FormatRegistry::with_defaults:
//!     - jats: import and export, with export options passed as string parameters
//!     - json: the persisted form, migrated on read

pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod migration;
pub mod registry;
pub mod schema;
pub mod transforms;

pub use error::{ContentModelViolation, FormatError, MigrationError, SchemaError};
pub use format::Format;
pub use formats::jats::{
    parse_jats_article, ExportOptions, ImportOptions, ImportedArticle, JatsExporter, JatsVersion,
    Journal,
};
pub use migration::{MigrationRegistry, MigrationScript, CURRENT_VERSION};
pub use registry::FormatRegistry;
pub use schema::{JsonNode, Mark, MarkKind, Node, NodeKind};
