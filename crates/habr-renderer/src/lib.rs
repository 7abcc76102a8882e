//! Markdown to Habrahabr HTML conversion.
//!
//! Habrahabr accepts a restricted HTML dialect with a few tags of its own:
//! `<habracut/>` splits the teaser from the rest of a post, `<hh user="…"/>`
//! links a user profile, and code is either pre-highlighted with `<font>`
//! markup or wrapped in `<source lang="…">`.
//!
//! # Architecture
//!
//! A [`Pipeline`] runs the conversion in stages:
//!
//! 1. [`CutPreprocessor`] rewrites cut-marker lines in the raw text.
//! 2. [`build_tree`] parses the text with pulldown-cmark into a [`Node`] tree,
//!    recognizing `@user` mentions and `~~strikethrough~~` on the way.
//! 3. [`TreeTransform`]s rewrite the tree: [`HeadingShifter`],
//!    [`ImageRelocator`], [`CodeBlockUnwrapper`], [`CodeHighlighter`].
//! 4. [`to_html`] serializes the tree.
//!
//! # Example
//!
//! ```
//! use habr_renderer::{Pipeline, PipelineOptions};
//!
//! let mut pipeline = Pipeline::new(&PipelineOptions::default()).unwrap();
//! let html = pipeline
//!     .convert("Teaser\n\n-x-\n\n## Details\n\n~~old~~ new\n")
//!     .unwrap();
//!
//! assert_eq!(
//!     html,
//!     "<p>Teaser</p>\n<habracut/>\n<h3>Details</h3>\n<p><s>old</s> new</p>"
//! );
//! ```

mod builder;
mod cut;
mod error;
mod fence;
pub mod highlight;
mod html;
mod inline;
mod pipeline;
pub mod transform;
mod tree;
mod util;

pub use builder::build_tree;
pub use cut::{CutPreprocessor, rewrite_cut};
pub use error::ConvertError;
pub use html::{escape_html, to_html};
pub use pipeline::{Pipeline, PipelineOptions};
pub use transform::{
    AddressBook, CodeBlockUnwrapper, CodeHighlighter, Container, HeadingShift, HeadingShifter,
    HighlightMode, ImageAddress, ImageRelocator, SideFileAddressBook, TreeTransform,
    UnknownLanguage, Visit, rewrite,
};
pub use tree::{Attributes, Element, Node};
