//! Core data structures for the XML Intermediate Representation (IR).

/// A node in an XML element's child list.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    ProcessingInstruction(ProcessingInstruction),
    /// Pre-serialized markup written verbatim (MathML carried as a string).
    Raw(String),
}

/// `<?target data?>`
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

impl ProcessingInstruction {
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        }
    }

    /// Builds the data from `name="value"` pairs, escaping the values.
    pub fn with_pseudo_attrs(target: impl Into<String>, attrs: &[(&str, &str)]) -> Self {
        let data = attrs
            .iter()
            .map(|(name, value)| format!("{name}=\"{}\"", quick_xml::escape::escape(*value)))
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(target, data)
    }

    /// The `name="value"` pseudo-attributes of the data, in order.
    pub fn pseudo_attrs(&self) -> Vec<(String, String)> {
        let mut attrs = Vec::new();
        let mut rest = self.data.trim_start();
        while let Some(eq) = rest.find('=') {
            let name = rest[..eq].trim().to_string();
            let after = rest[eq + 1..].trim_start();
            let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                break;
            };
            let body = &after[1..];
            let Some(end) = body.find(quote) else {
                break;
            };
            let raw = &body[..end];
            let value = quick_xml::escape::unescape(raw)
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            attrs.push((name, value));
            rest = body[end + 1..].trim_start();
        }
        attrs
    }

    pub fn pseudo_attr(&self, name: &str) -> Option<String> {
        self.pseudo_attrs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// An XML element with qualified names and ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = XmlNode>,
    {
        self.children.extend(children);
        self
    }

    /// Appends a text child; empty strings are skipped.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
        self
    }

    pub fn push(&mut self, node: impl Into<XmlNode>) {
        self.children.push(node.into());
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value with surrounding whitespace removed, `None` when blank.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|value| !value.is_empty())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.is(name))
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(name))
    }

    /// Follows a path of child element names.
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |current, name| current.child(name))
    }

    /// Removes and returns every element child named `name`, keeping the rest in order.
    pub fn take_children_named(&mut self, name: &str) -> Vec<XmlElement> {
        let (taken, kept): (Vec<XmlNode>, Vec<XmlNode>) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|node| node.is_element_named(name));
        self.children = kept;
        taken.into_iter().filter_map(XmlNode::into_element).collect()
    }

    pub fn first_element(&self) -> Option<&XmlElement> {
        self.elements().next()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// True when the element holds an element child or non-whitespace text.
    pub fn has_meaningful_content(&self) -> bool {
        self.children.iter().any(|node| match node {
            XmlNode::Element(_) | XmlNode::Raw(_) => true,
            XmlNode::Text(text) => !text.trim().is_empty(),
            XmlNode::ProcessingInstruction(_) => false,
        })
    }

    /// Pre-order traversal of this element and every descendant element.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            let children: Vec<&XmlElement> = el.elements().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

fn collect_text(el: &XmlElement, out: &mut String) {
    for node in &el.children {
        match node {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(child) => collect_text(child, out),
            XmlNode::ProcessingInstruction(_) | XmlNode::Raw(_) => {}
        }
    }
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.is(name))
    }

    /// Whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, XmlNode::Text(text) if text.trim().is_empty())
    }
}

impl From<XmlElement> for XmlNode {
    fn from(el: XmlElement) -> Self {
        XmlNode::Element(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_attributes() {
        let pi = ProcessingInstruction::new(
            "AuthorQuery",
            r#"id="Q1" queryText="Is &quot;this&quot; right?""#,
        );
        assert_eq!(pi.pseudo_attr("id").as_deref(), Some("Q1"));
        assert_eq!(
            pi.pseudo_attr("queryText").as_deref(),
            Some(r#"Is "this" right?"#)
        );
        assert_eq!(pi.pseudo_attr("missing"), None);
    }

    #[test]
    fn pseudo_attributes_round_trip() {
        let pi = ProcessingInstruction::with_pseudo_attrs(
            "AuthorQuery",
            &[("id", "Q2"), ("queryText", "A < B & \"C\"")],
        );
        assert_eq!(
            pi.pseudo_attrs(),
            vec![
                ("id".to_string(), "Q2".to_string()),
                ("queryText".to_string(), "A < B & \"C\"".to_string()),
            ]
        );
    }

    #[test]
    fn child_outlives_the_name_it_was_looked_up_by() {
        let fig = XmlElement::new("fig").with_child(XmlElement::new("caption"));
        let caption = {
            let name = String::from("caption");
            fig.child(&name)
        };
        assert!(caption.is_some_and(|el| el.is("caption")));
        assert_eq!(fig.find(&["caption"]), caption);
    }

    #[test]
    fn take_children_keeps_order_of_the_rest() {
        let mut el = XmlElement::new("fig")
            .with_child(XmlElement::new("caption"))
            .with_child(XmlElement::new("graphic"))
            .with_text("tail");
        let captions = el.take_children_named("caption");
        assert_eq!(captions.len(), 1);
        assert_eq!(el.children.len(), 2);
        assert!(el.children[0].is_element_named("graphic"));
    }

    #[test]
    fn find_and_text_content() {
        let el = XmlElement::new("front").with_child(
            XmlElement::new("article-meta").with_child(
                XmlElement::new("title-group")
                    .with_child(XmlElement::new("article-title").with_text("A title")),
            ),
        );
        let title = el.find(&["article-meta", "title-group", "article-title"]);
        assert_eq!(title.map(XmlElement::text_content).as_deref(), Some("A title"));
        assert!(el.find(&["article-meta", "abstract"]).is_none());
    }
}
