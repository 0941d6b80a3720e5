//! Intermediate Representation (IR) for XML documents.
//!
//! An owned element tree that the JATS importer normalizes stage by stage and that the
//! exporter builds before writing. Reading goes through roxmltree (from_xml.rs), writing
//! through quick-xml (to_xml.rs).
//!
//! Names are kept qualified with the conventional JATS prefixes (`xlink:href`, `mml:math`,
//! `xml:lang`) whatever prefix the source document declared.

pub mod from_xml;
pub mod nodes;
pub mod to_xml;

pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
