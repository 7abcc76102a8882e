//! Habrahabr inline patterns.
//!
//! Two patterns are recognized on inline text while the tree is built:
//!
//! - `@name` becomes `<hh user="name"/>`, the platform's user link.
//! - `~~content~~` becomes `<s>content</s>`. The opening `~~` must not follow
//!   a backslash. The content may span other inline elements as long as its
//!   text contains no `~`.
//!
//! The parser drops the backslash of a Markdown escape such as `\~` or `\@`,
//! so [`TextRun`] remembers which characters were escaped in the source.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Element, Node};

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").unwrap());

/// Text collected from consecutive parser text events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextRun {
    text: String,
    /// Byte offsets of characters that were backslash-escaped in the source.
    escaped: Vec<usize>,
}

impl TextRun {
    /// Append text. `escaped_first` marks the first character as escaped.
    pub(crate) fn push(&mut self, text: &str, escaped_first: bool) {
        if escaped_first && !text.is_empty() {
            self.escaped.push(self.text.len());
        }
        self.text.push_str(text);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn is_escaped(&self, offset: usize) -> bool {
        self.escaped.contains(&offset)
    }

    /// Sub-run for the byte range `start..end`.
    fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            text: self.text[start..end].to_owned(),
            escaped: self
                .escaped
                .iter()
                .filter(|&&offset| (start..end).contains(&offset))
                .map(|offset| offset - start)
                .collect(),
        }
    }

    fn slice_from(&self, start: usize) -> Self {
        self.slice(start, self.text.len())
    }
}

/// Inline content of an element under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Inline {
    Text(TextRun),
    Node(Node),
}

/// Apply the inline patterns and produce the final child nodes.
pub(crate) fn apply_patterns(items: Vec<Inline>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(items.len());
    for piece in wrap_strikes(items) {
        match piece {
            Piece::Inline(Inline::Text(run)) => split_mentions(run, &mut nodes),
            Piece::Inline(Inline::Node(node)) => nodes.push(node),
            Piece::Strike(inner) => {
                let mut children = Vec::with_capacity(inner.len());
                for item in inner {
                    match item {
                        Inline::Text(run) => split_mentions(run, &mut children),
                        Inline::Node(node) => children.push(node),
                    }
                }
                nodes.push(Element::new("s").with_children(children).into());
            }
        }
    }
    nodes
}

/// Convert text runs to plain text nodes without applying any pattern.
pub(crate) fn into_plain(items: Vec<Inline>) -> Vec<Node> {
    items
        .into_iter()
        .map(|item| match item {
            Inline::Text(run) => Node::Text(run.text),
            Inline::Node(node) => node,
        })
        .collect()
}

enum Piece {
    Inline(Inline),
    Strike(Vec<Inline>),
}

/// Where a strikethrough closes.
enum Close {
    /// Closing `~~` at this byte offset of the opening run.
    Same(usize),
    /// Closing `~~` in a later queued item.
    Later { index: usize, offset: usize },
}

fn wrap_strikes(items: Vec<Inline>) -> Vec<Piece> {
    let mut queue: VecDeque<Inline> = items.into();
    let mut pieces = Vec::new();

    while let Some(item) = queue.pop_front() {
        let run = match item {
            Inline::Text(run) => run,
            Inline::Node(node) => {
                pieces.push(Piece::Inline(Inline::Node(node)));
                continue;
            }
        };

        let Some((open, close)) = find_strike(&run, &queue) else {
            pieces.push(Piece::Inline(Inline::Text(run)));
            continue;
        };

        let before = run.slice(0, open);
        if !before.is_empty() {
            pieces.push(Piece::Inline(Inline::Text(before)));
        }

        let mut inner = Vec::new();
        let after = match close {
            Close::Same(offset) => {
                inner.push(Inline::Text(run.slice(open + 2, offset)));
                run.slice_from(offset + 2)
            }
            Close::Later { index, offset } => {
                let first = run.slice_from(open + 2);
                if !first.is_empty() {
                    inner.push(Inline::Text(first));
                }
                inner.extend(queue.drain(..index));
                let Some(Inline::Text(last)) = queue.pop_front() else {
                    unreachable!("closing item is a text run");
                };
                let head = last.slice(0, offset);
                if !head.is_empty() {
                    inner.push(Inline::Text(head));
                }
                last.slice_from(offset + 2)
            }
        };

        pieces.push(Piece::Strike(inner));
        if !after.is_empty() {
            queue.push_front(Inline::Text(after));
        }
    }

    pieces
}

/// Find the first strikethrough opening in `run`, closing in `run` or in the
/// items that follow it.
fn find_strike(run: &TextRun, following: &VecDeque<Inline>) -> Option<(usize, Close)> {
    let bytes = run.text.as_bytes();
    (0..bytes.len().saturating_sub(1))
        .filter(|&open| bytes[open..].starts_with(b"~~") && opens_strike(run, open))
        .find_map(|open| find_close(run, open + 2, following).map(|close| (open, close)))
}

fn opens_strike(run: &TextRun, open: usize) -> bool {
    let bytes = run.text.as_bytes();
    let after_backslash = open > 0 && bytes[open - 1] == b'\\' && !run.is_escaped(open - 1);
    !run.is_escaped(open) && !after_backslash
}

fn find_close(run: &TextRun, start: usize, following: &VecDeque<Inline>) -> Option<Close> {
    let rest = &run.text[start..];
    if let Some(tilde) = rest.find('~') {
        let closes = tilde > 0 && rest[tilde..].starts_with("~~");
        return closes.then_some(Close::Same(start + tilde));
    }

    let mut has_content = !rest.is_empty();
    for (index, item) in following.iter().enumerate() {
        match item {
            Inline::Node(_) => has_content = true,
            Inline::Text(next) => match next.text.find('~') {
                None => has_content |= !next.text.is_empty(),
                Some(offset) => {
                    let closes =
                        next.text[offset..].starts_with("~~") && (has_content || offset > 0);
                    return closes.then_some(Close::Later { index, offset });
                }
            },
        }
    }
    None
}

fn split_mentions(run: TextRun, out: &mut Vec<Node>) {
    let mut last = 0;
    for caps in MENTION_RE.captures_iter(&run.text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if run.is_escaped(whole.start()) {
            continue;
        }
        if whole.start() > last {
            out.push(Node::text(&run.text[last..whole.start()]));
        }
        out.push(Element::new("hh").with_attr("user", name.as_str()).into());
        last = whole.end();
    }
    if last < run.text.len() {
        out.push(Node::text(&run.text[last..]));
    }
}
