//! Document tree produced by the parser and rewritten by tree transforms.
//!
//! The tree is a closed set of node kinds: elements with a tag, attributes and
//! ordered children; text leaves; and raw-markup leaves whose content is
//! emitted verbatim by the serializer.

use std::collections::BTreeMap;

/// Element attributes. Sorted so that serialization is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Element with tag, attributes and children.
    Element(Element),
    /// Text content, escaped on output.
    Text(String),
    /// Pre-rendered markup, emitted verbatim on output.
    Raw(String),
}

impl Node {
    /// Create a text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create a raw-markup leaf.
    pub fn raw(markup: impl Into<String>) -> Self {
        Self::Raw(markup.into())
    }

    /// Borrow the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Raw(_) => None,
        }
    }

    /// Check whether this node is an element with the given tag.
    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|element| element.tag == tag)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Element node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The text of the only child, if the element has exactly one text child.
    #[must_use]
    pub fn sole_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text leaves.
    ///
    /// Raw leaves are skipped.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Raw(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_text() {
        let pre = Element::new("pre").with_child(Node::text("code"));
        assert_eq!(pre.sole_text(), Some("code"));

        let two = Element::new("pre")
            .with_child(Node::text("a"))
            .with_child(Node::text("b"));
        assert_eq!(two.sole_text(), None);

        let nested = Element::new("pre").with_child(Element::new("code"));
        assert_eq!(nested.sole_text(), None);
    }

    #[test]
    fn test_text_content_skips_raw() {
        let p = Element::new("p")
            .with_child(Node::text("Hello, "))
            .with_child(Element::new("em").with_child(Node::text("world")))
            .with_child(Node::raw("<br/>"));
        assert_eq!(p.text_content(), "Hello, world");
    }

    #[test]
    fn test_is_element() {
        let node = Node::from(Element::new("img").with_attr("src", "a.png"));
        assert!(node.is_element("img"));
        assert!(!node.is_element("a"));
        assert!(!Node::text("img").is_element("img"));
        assert_eq!(node.as_element().and_then(|e| e.attr("src")), Some("a.png"));
    }
}
