//! Source tokenizer backed by syntect grammars.

use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::ConvertError;
use crate::highlight::TokenClass;

/// A classified run of source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
}

impl Token {
    pub fn new(class: TokenClass, text: impl Into<String>) -> Self {
        Self {
            class,
            text: text.into(),
        }
    }
}

/// Splits source code into classified tokens.
///
/// Line breaks are always emitted as separate [`TokenClass::Text`] tokens.
pub struct Lexer {
    syntaxes: SyntaxSet,
}

impl Lexer {
    /// Create a lexer with syntect's bundled grammars.
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Check whether `lang` names a known grammar.
    #[must_use]
    pub fn knows(&self, lang: &str) -> bool {
        self.syntaxes.find_syntax_by_token(lang).is_some()
    }

    /// Tokenize `code` with the grammar for `lang`.
    ///
    /// `lang` is matched against grammar names and file extensions,
    /// case-insensitively.
    pub fn tokenize(&self, lang: &str, code: &str) -> Result<Vec<Token>, ConvertError> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(lang)
            .ok_or_else(|| ConvertError::UnknownLanguage(lang.to_owned()))?;

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = state.parse_line(line, &self.syntaxes)?;
            for (range, op) in ScopeRangeIterator::new(&ops, line) {
                stack.apply(op)?;
                if range.is_empty() {
                    continue;
                }
                push_split(&mut tokens, TokenClass::classify(stack.as_slice()), &line[range]);
            }
        }

        Ok(tokens)
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Push `text`, splitting line breaks into their own `Text` tokens.
fn push_split(tokens: &mut Vec<Token>, class: TokenClass, text: &str) {
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::new(TokenClass::Text, "\n"));
        }
        if !part.is_empty() {
            tokens.push(Token::new(class, part));
        }
    }
}
