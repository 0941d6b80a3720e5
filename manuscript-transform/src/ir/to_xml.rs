//! IR → XML text, via quick-xml.
//!
//! Output is not indented: JATS paragraphs are mixed content and whitespace between inline
//! elements is significant.

use super::nodes::{XmlElement, XmlNode};
use crate::error::FormatError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

fn write_error(e: impl std::fmt::Display) -> FormatError {
    FormatError::SerializationError(e.to_string())
}

/// Writes a complete document: XML declaration, optional DOCTYPE body, root element.
pub fn write_document(root: &XmlElement, doctype: Option<&str>) -> Result<String, FormatError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    writer.get_mut().push(b'\n');
    if let Some(doctype) = doctype {
        writer
            .write_event(Event::DocType(BytesText::from_escaped(doctype)))
            .map_err(write_error)?;
        writer.get_mut().push(b'\n');
    }
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner()).map_err(write_error)
}

/// Writes a single element without declaration.
pub fn write_fragment(el: &XmlElement) -> Result<String, FormatError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, el)?;
    String::from_utf8(writer.into_inner()).map_err(write_error)
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &XmlElement) -> Result<(), FormatError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in &el.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &el.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
            XmlNode::ProcessingInstruction(pi) => {
                let raw = if pi.data.is_empty() {
                    format!("<?{}?>", pi.target)
                } else {
                    format!("<?{} {}?>", pi.target, pi.data)
                };
                writer.get_mut().extend_from_slice(raw.as_bytes());
            }
            XmlNode::Raw(markup) => writer.get_mut().extend_from_slice(markup.as_bytes()),
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(write_error)
}
