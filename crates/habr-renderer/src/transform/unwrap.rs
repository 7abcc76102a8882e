//! Code-block unwrapping: `<pre><code>…</code></pre>` becomes `<pre>…</pre>`.

use crate::error::ConvertError;
use crate::transform::{TreeTransform, Visit, rewrite};
use crate::tree::{Element, Node};

/// Flattens a `pre` whose only child is a `code` element.
///
/// The `code` element's attributes are dropped. Other shapes are left alone
/// and visited further down.
#[derive(Debug, Default)]
pub struct CodeBlockUnwrapper;

impl TreeTransform for CodeBlockUnwrapper {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError> {
        rewrite(nodes, &mut |mut element: Element| {
            if element.tag == "pre"
                && element.children.len() == 1
                && element.children[0].is_element("code")
                && let Some(Node::Element(code)) = element.children.pop()
            {
                element.children = code.children;
            }
            Ok(Visit::Descend(element))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unwrap(nodes: Vec<Node>) -> Vec<Node> {
        CodeBlockUnwrapper.transform(nodes).unwrap()
    }

    #[test]
    fn test_unwraps_code() {
        let nodes = vec![Node::from(
            Element::new("pre").with_child(
                Element::new("code")
                    .with_attr("class", "language-rust")
                    .with_child(Node::text("fn main() {}\n")),
            ),
        )];
        assert_eq!(
            unwrap(nodes),
            vec![Node::from(
                Element::new("pre").with_child(Node::text("fn main() {}\n"))
            )]
        );
    }

    #[test]
    fn test_other_shapes_untouched() {
        let nodes = vec![
            Node::from(Element::new("pre").with_child(Node::text("plain"))),
            Node::from(
                Element::new("pre")
                    .with_child(Element::new("code"))
                    .with_child(Node::text("tail")),
            ),
            Node::from(Element::new("p").with_child(Element::new("code"))),
        ];
        assert_eq!(unwrap(nodes.clone()), nodes);
    }

    #[test]
    fn test_unwraps_nested() {
        let block = |inner: Node| -> Node {
            Element::new("blockquote")
                .with_child(Element::new("pre").with_child(inner))
                .into()
        };
        let code: Node = Element::new("code").with_child(Node::text("x")).into();

        assert_eq!(unwrap(vec![block(code)]), vec![block(Node::text("x"))]);
    }
}
