//! Style table: token classes to precomputed open/close markup.

use std::collections::HashMap;
use std::fmt::Write;

use syntect::highlighting::{FontStyle, Highlighter, StyleModifier, Theme, ThemeSet};
use syntect::parsing::Scope;

use crate::error::ConvertError;
use crate::highlight::TokenClass;

/// Opening and closing markup for one class.
///
/// Opens are emitted color, bold, italic, underline; closes in exact reverse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleTags {
    pub open: String,
    pub close: String,
}

impl StyleTags {
    /// Tags for a theme style, or `None` if the style sets nothing.
    #[must_use]
    pub fn from_modifier(style: StyleModifier) -> Option<Self> {
        let font_style = style.font_style.unwrap_or_else(FontStyle::empty);
        if style.foreground.is_none() && font_style.is_empty() {
            return None;
        }

        let mut tags = Self::default();
        if let Some(color) = style.foreground {
            write!(
                tags.open,
                "<font color=\"#{:02x}{:02x}{:02x}\">",
                color.r, color.g, color.b
            )
            .unwrap();
            tags.close.insert_str(0, "</font>");
        }
        for (flag, tag) in [
            (FontStyle::BOLD, "b"),
            (FontStyle::ITALIC, "i"),
            (FontStyle::UNDERLINE, "u"),
        ] {
            if font_style.contains(flag) {
                write!(tags.open, "<{tag}>").unwrap();
                tags.close.insert_str(0, &format!("</{tag}>"));
            }
        }
        Some(tags)
    }
}

/// Markup per token class, sampled once from a theme.
///
/// The root class is always present with empty tags, so every class
/// resolves to some entry.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    root: StyleTags,
    styled: HashMap<TokenClass, StyleTags>,
}

impl StyleTable {
    /// Load one of syntect's bundled themes by name.
    pub fn load(theme_name: &str) -> Result<Self, ConvertError> {
        let themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .get(theme_name)
            .ok_or_else(|| ConvertError::UnknownTheme(theme_name.to_owned()))?;
        Self::from_theme(theme)
    }

    /// Sample `theme` for every class that has a sample scope.
    pub fn from_theme(theme: &Theme) -> Result<Self, ConvertError> {
        let highlighter = Highlighter::new(theme);
        let mut styled = HashMap::new();

        for class in TokenClass::ALL {
            let Some(scope) = class.sample_scope() else {
                continue;
            };
            let style = highlighter.style_mod_for_stack(&[Scope::new(scope)?]);
            if let Some(tags) = StyleTags::from_modifier(style) {
                styled.insert(class, tags);
            }
        }

        tracing::debug!(
            theme = theme.name.as_deref().unwrap_or("unnamed"),
            classes = styled.len(),
            "Built style table"
        );
        Ok(Self {
            root: StyleTags::default(),
            styled,
        })
    }

    /// Nearest class with an entry, walking up from `class`, and its tags.
    #[must_use]
    pub fn resolve(&self, class: TokenClass) -> (TokenClass, &StyleTags) {
        let mut current = class;
        loop {
            if let Some(tags) = self.styled.get(&current) {
                return (current, tags);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return (TokenClass::Token, &self.root),
            }
        }
    }

    /// Set the tags for a class.
    pub fn insert(&mut self, class: TokenClass, tags: StyleTags) {
        if class == TokenClass::Token {
            self.root = tags;
        } else {
            self.styled.insert(class, tags);
        }
    }
}
