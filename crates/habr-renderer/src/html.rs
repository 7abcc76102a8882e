//! HTML serialization of the document tree.

use std::fmt::Write;

use crate::tree::{Element, Node};

/// Elements written as `<tag/>` without children.
const VOID_TAGS: &[&str] = &["br", "habracut", "hh", "hr", "img"];

/// Elements followed by a newline, mirroring the block structure of the source.
const BLOCK_TAGS: &[&str] = &[
    "blockquote",
    "div",
    "dl",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "ol",
    "p",
    "pre",
    "source",
    "table",
    "ul",
];

/// Serialize nodes to HTML.
///
/// Text leaves and attribute values are escaped, raw leaves are written
/// verbatim. Trailing newlines of the last block are trimmed.
#[must_use]
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::with_capacity(4096);
    write_nodes(nodes, &mut out);
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => write_element(element, out),
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Raw(markup) => out.push_str(markup),
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        write!(out, r#" {name}="{}""#, escape_html(value)).unwrap();
    }

    let tag = element.tag.as_str();
    if VOID_TAGS.contains(&tag) && element.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        write_nodes(&element.children, out);
        write!(out, "</{tag}>").unwrap();
    }

    if BLOCK_TAGS.contains(&tag) {
        out.push('\n');
    }
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
