//! Document tree construction from pulldown-cmark events.
//!
//! The parser produces a flat event stream; [`build_tree`] folds it into the
//! element tree the tree transforms work on. Habrahabr inline patterns are
//! applied here, when an element's inline content is complete.

use std::ops::Range;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::inline::{Inline, TextRun, apply_patterns, into_plain};
use crate::tree::{Element, Node};
use crate::util::heading_level_to_num;

/// How the content of an open element is finalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    /// Inline content; inline patterns apply.
    Inline,
    /// Code; text is kept as is.
    Verbatim,
    /// Image; collected text becomes the `alt` attribute.
    Image,
    /// No element of its own; children are spliced into the parent.
    Transparent,
    /// Content is dropped.
    Discard,
}

/// Element under construction.
struct Frame {
    element: Element,
    kind: FrameKind,
    items: Vec<Inline>,
    text: TextRun,
}

impl Frame {
    fn new(element: Element, kind: FrameKind) -> Self {
        Self {
            element,
            kind,
            items: Vec::new(),
            text: TextRun::default(),
        }
    }

    fn push_node(&mut self, node: Node) {
        self.flush_text();
        self.items.push(Inline::Node(node));
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.items.push(Inline::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> (Element, FrameKind) {
        self.flush_text();
        self.element.children = match self.kind {
            FrameKind::Inline | FrameKind::Transparent => apply_patterns(self.items),
            FrameKind::Verbatim | FrameKind::Image => into_plain(self.items),
            FrameKind::Discard => Vec::new(),
        };
        if self.kind == FrameKind::Image {
            let alt = self.element.text_content();
            self.element.children.clear();
            self.element.attrs.insert("alt".to_owned(), alt);
        }
        (self.element, self.kind)
    }
}

/// Parse markdown and build the document tree.
///
/// Returns the top-level nodes of the document.
///
/// # Example
///
/// ```
/// use habr_renderer::{Node, build_tree};
/// use pulldown_cmark::Options;
///
/// let nodes = build_tree("Hi @alice", Options::empty());
/// let p = nodes[0].as_element().unwrap();
///
/// assert_eq!(p.tag, "p");
/// assert_eq!(p.children[0], Node::text("Hi "));
/// assert!(p.children[1].is_element("hh"));
/// ```
#[must_use]
pub fn build_tree(markdown: &str, options: Options) -> Vec<Node> {
    let mut builder = TreeBuilder::new(markdown);
    for (event, range) in Parser::new_ext(markdown, options).into_offset_iter() {
        builder.process_event(event, range);
    }
    builder.finish()
}

struct TreeBuilder<'a> {
    source: &'a str,
    root: Frame,
    /// Open elements, innermost last.
    stack: Vec<Frame>,
    in_table_head: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            root: Frame::new(Element::default(), FrameKind::Inline),
            stack: Vec::new(),
            in_table_head: false,
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root.finish().0.children
    }

    fn top(&mut self) -> &mut Frame {
        match self.stack.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                let escaped = self.is_escape(&range, &text);
                self.top().text.push(&text, escaped);
            }
            Event::Code(code) => self.push_node(code_span(&code)),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_node(Node::raw(html.as_ref()));
            }
            Event::SoftBreak => self.top().text.push("\n", false),
            Event::HardBreak => self.push_node(Element::new("br").into()),
            Event::Rule => self.push_node(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                self.top().text.push(if checked { "[x] " } else { "[ ] " }, false);
            }
            Event::FootnoteReference(label) => {
                self.top().text.push(&format!("[{label}]"), false);
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_node(code_span(&math));
            }
        }
    }

    /// Whether a text event starts with a character escaped by a backslash.
    ///
    /// The parser splits text at escapes and drops the backslash, so the
    /// escaped character begins a text event right after a `\` in the source.
    fn is_escape(&self, range: &Range<usize>, text: &str) -> bool {
        range.start > 0
            && self.source.as_bytes().get(range.start - 1) == Some(&b'\\')
            && text.starts_with(|c: char| c.is_ascii_punctuation())
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let (element, kind) = match tag {
            Tag::Paragraph => (Element::new("p"), FrameKind::Inline),
            Tag::Heading { level, .. } => (
                Element::new(format!("h{}", heading_level_to_num(level))),
                FrameKind::Inline,
            ),
            Tag::BlockQuote(_) => (Element::new("blockquote"), FrameKind::Inline),
            Tag::CodeBlock(_) => (Element::new("code"), FrameKind::Verbatim),
            Tag::HtmlBlock => (Element::default(), FrameKind::Transparent),
            Tag::List(Some(1)) => (Element::new("ol"), FrameKind::Inline),
            Tag::List(Some(start)) => (
                Element::new("ol").with_attr("start", start.to_string()),
                FrameKind::Inline,
            ),
            Tag::List(None) => (Element::new("ul"), FrameKind::Inline),
            Tag::Item => (Element::new("li"), FrameKind::Inline),
            Tag::FootnoteDefinition(_) => (Element::default(), FrameKind::Transparent),
            Tag::MetadataBlock(_) => (Element::default(), FrameKind::Discard),
            Tag::DefinitionList => (Element::new("dl"), FrameKind::Inline),
            Tag::DefinitionListTitle => (Element::new("dt"), FrameKind::Inline),
            Tag::DefinitionListDefinition => (Element::new("dd"), FrameKind::Inline),
            Tag::Table(_) => (Element::new("table"), FrameKind::Inline),
            Tag::TableHead => {
                self.in_table_head = true;
                (Element::new("thead"), FrameKind::Inline)
            }
            Tag::TableRow => (Element::new("tr"), FrameKind::Inline),
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                (Element::new(tag), FrameKind::Inline)
            }
            Tag::Emphasis => (Element::new("em"), FrameKind::Inline),
            Tag::Strong => (Element::new("strong"), FrameKind::Inline),
            Tag::Strikethrough => (Element::new("s"), FrameKind::Inline),
            Tag::Superscript => (Element::new("sup"), FrameKind::Inline),
            Tag::Subscript => (Element::new("sub"), FrameKind::Inline),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                // Autolink text is the address itself
                let kind = match link_type {
                    LinkType::Autolink | LinkType::Email => FrameKind::Verbatim,
                    _ => FrameKind::Inline,
                };
                let element = with_title(Element::new("a").with_attr("href", href), &title);
                (element, kind)
            }
            Tag::Image {
                dest_url, title, ..
            } => (
                with_title(Element::new("img").with_attr("src", dest_url.as_ref()), &title),
                FrameKind::Image,
            ),
        };
        self.stack.push(Frame::new(element, kind));
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::TableHead => {
                self.in_table_head = false;
                // Header cells come without a row of their own
                let Some(frame) = self.stack.last_mut() else {
                    return;
                };
                frame.flush_text();
                let cells = into_plain(std::mem::take(&mut frame.items));
                frame
                    .items
                    .push(Inline::Node(Element::new("tr").with_children(cells).into()));
                self.close();
            }
            TagEnd::CodeBlock => {
                if let Some((code, _)) = self.pop() {
                    self.push_node(Element::new("pre").with_child(code).into());
                }
            }
            _ => self.close(),
        }
    }

    /// Pop the innermost frame and attach it to its parent.
    fn close(&mut self) {
        let Some((element, kind)) = self.pop() else {
            return;
        };
        match kind {
            FrameKind::Transparent => {
                for child in element.children {
                    self.push_node(child);
                }
            }
            FrameKind::Discard => {}
            FrameKind::Inline | FrameKind::Verbatim | FrameKind::Image => {
                self.push_node(element.into());
            }
        }
    }

    fn pop(&mut self) -> Option<(Element, FrameKind)> {
        self.stack.pop().map(Frame::finish)
    }

    fn push_node(&mut self, node: Node) {
        self.top().push_node(node);
    }
}

fn code_span(code: &str) -> Node {
    Element::new("code").with_child(Node::text(code)).into()
}

fn with_title(element: Element, title: &str) -> Element {
    if title.is_empty() {
        element
    } else {
        element.with_attr("title", title)
    }
}
