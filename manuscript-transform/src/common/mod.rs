//! Contains mapping logic shared by the JATS importer and exporter.

pub mod citations;
pub mod section_category;
