//! Code block highlighting.
//!
//! A code block opts in with a language marker on its first line:
//!
//! ```text
//! @python@
//! print("hi")
//! ```
//!
//! A leading backslash (`\@python@`) escapes the marker: only the backslash is
//! removed and the block stays plain.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConvertError;
use crate::highlight::{InlineFormatter, Lexer, StyleTable};
use crate::transform::{TreeTransform, Visit, rewrite};
use crate::tree::{Element, Node};
use crate::util::split_first_line;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\\)?@\s*(\S+)\s*@").unwrap());

/// How marked code blocks are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HighlightMode {
    /// Highlight here and emit `<font>`/`<b>`/`<i>`/`<u>` markup.
    #[default]
    Inline,
    /// Emit `<source lang="…">` and let the platform highlight.
    Native,
}

/// Element wrapping inline-highlighted code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Container {
    #[default]
    Blockquote,
    Pre,
}

impl Container {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Blockquote => "blockquote",
            Self::Pre => "pre",
        }
    }
}

/// What to do with a marker naming an unknown language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum UnknownLanguage {
    /// Abort the conversion.
    #[default]
    Error,
    /// Leave the block unhighlighted, with the marker line stripped.
    Plain,
}

enum Renderer {
    Inline {
        lexer: Lexer,
        formatter: InlineFormatter,
        container: Container,
        unknown_language: UnknownLanguage,
    },
    Native,
}

/// A `pre` block holding only text, split by its marker line.
enum Marked<'a> {
    /// No marker on the first line.
    Unmarked,
    /// Escaped marker; the text with the backslash removed.
    Escaped(&'a str),
    /// Language and the code after the marker line.
    Lang { lang: &'a str, code: &'a str },
}

impl<'a> Marked<'a> {
    fn parse(text: &'a str) -> Self {
        let (first, code) = split_first_line(text);
        match MARKER_RE.captures(first) {
            None => Self::Unmarked,
            Some(caps) if caps.get(1).is_some() => {
                Self::Escaped(text.strip_prefix('\\').unwrap_or(text))
            }
            Some(caps) => match caps.get(2) {
                Some(lang) => Self::Lang {
                    lang: lang.as_str(),
                    code,
                },
                None => Self::Unmarked,
            },
        }
    }
}

/// Highlights `pre` blocks that carry a language marker.
///
/// Only blocks whose sole child is a text leaf are considered, so this runs
/// after [`CodeBlockUnwrapper`](crate::transform::CodeBlockUnwrapper).
pub struct CodeHighlighter {
    renderer: Renderer,
}

impl CodeHighlighter {
    /// Highlight in place with the named bundled theme.
    pub fn inline(
        theme: &str,
        container: Container,
        unknown_language: UnknownLanguage,
    ) -> Result<Self, ConvertError> {
        Ok(Self {
            renderer: Renderer::Inline {
                lexer: Lexer::new(),
                formatter: InlineFormatter::new(StyleTable::load(theme)?),
                container,
                unknown_language,
            },
        })
    }

    /// Rewrite code blocks to `<source lang="…">` for the platform to highlight.
    #[must_use]
    pub fn native() -> Self {
        Self {
            renderer: Renderer::Native,
        }
    }

    fn visit(&self, element: Element) -> Result<Visit, ConvertError> {
        if element.tag != "pre" {
            return Ok(Visit::Descend(element));
        }
        let Some(text) = element.sole_text() else {
            return Ok(Visit::Descend(element));
        };

        let replacement = match (&self.renderer, Marked::parse(text)) {
            (Renderer::Native, Marked::Unmarked) => source("plain", text),
            (Renderer::Native, Marked::Escaped(text)) => source("plain", text),
            (Renderer::Native, Marked::Lang { lang, code }) => {
                tracing::debug!(lang = %lang, "Marked code block for native highlighting");
                source(lang, code)
            }
            (Renderer::Inline { .. }, Marked::Unmarked) => return Ok(Visit::Descend(element)),
            (Renderer::Inline { .. }, Marked::Escaped(text)) => {
                let text = text.to_owned();
                let mut element = element;
                element.children = vec![Node::text(text)];
                return Ok(Visit::Replace(element.into()));
            }
            (
                Renderer::Inline {
                    lexer,
                    formatter,
                    container,
                    unknown_language,
                },
                Marked::Lang { lang, code },
            ) => {
                if *unknown_language == UnknownLanguage::Plain && !lexer.knows(lang) {
                    tracing::warn!(lang = %lang, "Unknown language, leaving code block plain");
                    Element::new("pre").with_child(Node::text(code))
                } else {
                    let tokens = lexer.tokenize(lang, code.trim_end_matches(['\n', '\r']))?;
                    tracing::debug!(lang = %lang, tokens = tokens.len(), "Highlighted code block");
                    Element::new(container.tag()).with_child(Node::raw(formatter.format(&tokens)))
                }
            }
        };

        Ok(Visit::Replace(replacement.into()))
    }
}

fn source(lang: &str, code: &str) -> Element {
    Element::new("source")
        .with_attr("lang", lang)
        .with_child(Node::text(code))
}

impl TreeTransform for CodeHighlighter {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError> {
        rewrite(nodes, &mut |element: Element| self.visit(element))
    }
}
