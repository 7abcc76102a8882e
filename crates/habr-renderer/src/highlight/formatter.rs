//! Token stream to platform markup.
//!
//! The platform only allows `<font color>`, `<b>`, `<i>` and `<u>` inside a
//! post, so each style change closes the previous style and opens the next.
//! Plain text keeps its layout through `<br/>` and `&nbsp;`.

use crate::highlight::{StyleTable, Token, TokenClass};

/// Formats tokens as inline markup using a precomputed [`StyleTable`].
#[derive(Clone, Debug)]
pub struct InlineFormatter {
    table: StyleTable,
}

impl InlineFormatter {
    #[must_use]
    pub fn new(table: StyleTable) -> Self {
        Self { table }
    }

    /// Format `tokens`. The output is balanced: every opened tag is closed.
    #[must_use]
    pub fn format(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        let mut current: Option<&str> = None;
        let mut close = "";

        for token in tokens {
            let (_, tags) = self.table.resolve(token.class);
            // Classes styled alike share one run
            if current != Some(tags.open.as_str()) {
                out.push_str(close);
                out.push_str(&tags.open);
                close = tags.close.as_str();
                current = Some(tags.open.as_str());
            }
            push_escaped(&mut out, &token.text, token.class == TokenClass::Text);
        }

        out.push_str(close);
        out
    }
}

fn push_escaped(out: &mut String, text: &str, layout: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' if layout => out.push_str("<br/>"),
            ' ' if layout => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
