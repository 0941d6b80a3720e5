//! XML text → IR, via roxmltree.

use super::nodes::{ProcessingInstruction, XmlElement, XmlNode};
use super::{MATHML_NS, XLINK_NS, XML_NS};
use crate::error::FormatError;
use roxmltree::{Node, NodeType, ParsingOptions};

/// Parses `source` and returns its root element.
///
/// DTD declarations are accepted (JATS documents routinely carry one). Elements nested deeper
/// than `max_depth` are rejected rather than recursed into.
pub fn parse_document(source: &str, max_depth: usize) -> Result<XmlElement, FormatError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(source, options)
        .map_err(|e| FormatError::InvalidInput(format!("XML parsing error: {e}")))?;
    convert_element(doc.root_element(), 0, max_depth)
}

fn qualify(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(XLINK_NS) => format!("xlink:{local}"),
        Some(MATHML_NS) => format!("mml:{local}"),
        Some(XML_NS) => format!("xml:{local}"),
        _ => local.to_string(),
    }
}

fn convert_element(node: Node, depth: usize, max_depth: usize) -> Result<XmlElement, FormatError> {
    if depth > max_depth {
        return Err(FormatError::InvalidInput(format!(
            "element nesting exceeds {max_depth} levels at <{}>",
            node.tag_name().name()
        )));
    }

    let mut el = XmlElement::new(qualify(node.tag_name().namespace(), node.tag_name().name()));
    for attr in node.attributes() {
        el.attrs
            .push((qualify(attr.namespace(), attr.name()), attr.value().to_string()));
    }

    for child in node.children() {
        match child.node_type() {
            NodeType::Element => {
                el.children
                    .push(XmlNode::Element(convert_element(child, depth + 1, max_depth)?));
            }
            NodeType::Text => {
                if let Some(text) = child.text() {
                    match el.children.last_mut() {
                        Some(XmlNode::Text(previous)) => previous.push_str(text),
                        _ => el.children.push(XmlNode::Text(text.to_string())),
                    }
                }
            }
            NodeType::PI => {
                if let Some(pi) = child.pi() {
                    el.children.push(XmlNode::ProcessingInstruction(ProcessingInstruction::new(
                        pi.target,
                        pi.value.unwrap_or_default(),
                    )));
                }
            }
            NodeType::Comment | NodeType::Root => {}
        }
    }
    Ok(el)
}
