//! Syntax highlighting to platform-safe inline markup.
//!
//! [`Lexer`] splits code into [`Token`]s classified by [`TokenClass`];
//! [`InlineFormatter`] renders them with the tags in a [`StyleTable`].

mod formatter;
mod lexer;
mod style;
mod token;

pub use formatter::InlineFormatter;
pub use lexer::{Lexer, Token};
pub use style::{StyleTable, StyleTags};
pub use token::TokenClass;
