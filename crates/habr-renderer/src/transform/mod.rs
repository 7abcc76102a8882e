//! Tree transforms run between parsing and serialization.
//!
//! Each transform takes the document's top-level nodes and returns the
//! rewritten nodes. Transforms build replacement subtrees rather than
//! mutating nodes behind a cursor; [`rewrite`] is the shared walker.
//!
//! The pipeline runs, in order:
//!
//! 1. [`HeadingShifter`] demotes headings by a fixed table.
//! 2. [`ImageRelocator`] swaps local images for linked thumbnails.
//! 3. [`CodeBlockUnwrapper`] flattens `<pre><code>` into `<pre>`.
//! 4. [`CodeHighlighter`] highlights code blocks with a language marker.

mod headings;
mod highlight;
mod images;
mod unwrap;

pub use headings::{HeadingShift, HeadingShifter};
pub use highlight::{CodeHighlighter, Container, HighlightMode, UnknownLanguage};
pub use images::{AddressBook, ImageAddress, ImageRelocator, SideFileAddressBook};
pub use unwrap::CodeBlockUnwrapper;

use crate::error::ConvertError;
use crate::tree::{Element, Node};

/// A document tree transform.
///
/// # Example
///
/// ```
/// use habr_renderer::{ConvertError, Element, Node, TreeTransform, Visit, rewrite};
///
/// struct Emphasize;
///
/// impl TreeTransform for Emphasize {
///     fn name(&self) -> &'static str {
///         "emphasize"
///     }
///
///     fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError> {
///         rewrite(nodes, &mut |mut element: Element| {
///             if element.tag == "em" {
///                 element.tag = "i".to_owned();
///             }
///             Ok(Visit::Descend(element))
///         })
///     }
/// }
/// ```
pub trait TreeTransform {
    /// Transform name, used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite the document's top-level nodes.
    ///
    /// An error aborts the whole conversion.
    fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError>;
}

/// What [`rewrite`] does with a visited element.
#[derive(Debug)]
pub enum Visit {
    /// Put this node in place of the element. The replacement is not visited.
    Replace(Node),
    /// Keep the (possibly modified) element and visit its children.
    Descend(Element),
}

/// Walk `nodes` depth-first, letting `visit` replace or descend into each element.
///
/// Text and raw leaves are kept as they are.
pub fn rewrite<F>(nodes: Vec<Node>, visit: &mut F) -> Result<Vec<Node>, ConvertError>
where
    F: FnMut(Element) -> Result<Visit, ConvertError>,
{
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = match node {
            Node::Element(element) => match visit(element)? {
                Visit::Replace(replacement) => replacement,
                Visit::Descend(mut element) => {
                    element.children = rewrite(std::mem::take(&mut element.children), visit)?;
                    element.into()
                }
            },
            leaf @ (Node::Text(_) | Node::Raw(_)) => leaf,
        };
        out.push(node);
    }
    Ok(out)
}
