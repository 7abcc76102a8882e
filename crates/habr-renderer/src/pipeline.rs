//! The conversion pipeline: cut preprocessing, parsing, tree transforms and
//! serialization.

use std::path::PathBuf;

use pulldown_cmark::Options;

use crate::builder::build_tree;
use crate::cut::CutPreprocessor;
use crate::error::ConvertError;
use crate::html::to_html;
use crate::transform::{
    CodeBlockUnwrapper, CodeHighlighter, Container, HeadingShift, HeadingShifter, HighlightMode,
    ImageRelocator, SideFileAddressBook, TreeTransform, UnknownLanguage,
};

/// Pipeline settings.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Enable GFM tables.
    pub tables: bool,
    pub heading_shift: HeadingShift,
    /// Directory side-files are resolved against.
    pub image_base_dir: PathBuf,
    /// Image sources starting with any of these are left untouched.
    pub external_prefixes: Vec<String>,
    pub highlight_mode: HighlightMode,
    /// Bundled syntect theme name, used in inline mode.
    pub theme: String,
    pub container: Container,
    pub unknown_language: UnknownLanguage,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tables: true,
            heading_shift: HeadingShift::default(),
            image_base_dir: PathBuf::from("."),
            external_prefixes: vec!["http://".to_owned()],
            highlight_mode: HighlightMode::default(),
            theme: "InspiredGitHub".to_owned(),
            container: Container::default(),
            unknown_language: UnknownLanguage::default(),
        }
    }
}

impl PipelineOptions {
    fn markdown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        options
    }
}

/// Markdown to Habrahabr HTML converter.
///
/// Transforms are built once and run in a fixed order, each exactly once
/// per document.
///
/// # Example
///
/// ```
/// use habr_renderer::{Pipeline, PipelineOptions};
///
/// let mut pipeline = Pipeline::new(&PipelineOptions::default()).unwrap();
/// let html = pipeline.convert("# Title\n\nHi @alice\n").unwrap();
///
/// assert_eq!(html, "<h2>Title</h2>\n<p>Hi <hh user=\"alice\"/></p>");
/// ```
pub struct Pipeline {
    markdown: Options,
    transforms: Vec<Box<dyn TreeTransform>>,
}

impl Pipeline {
    /// Build the pipeline, loading the highlighting theme if needed.
    pub fn new(options: &PipelineOptions) -> Result<Self, ConvertError> {
        let highlighter = match options.highlight_mode {
            HighlightMode::Inline => CodeHighlighter::inline(
                &options.theme,
                options.container,
                options.unknown_language,
            )?,
            HighlightMode::Native => CodeHighlighter::native(),
        };
        let book = SideFileAddressBook::new(&options.image_base_dir);

        Ok(Self {
            markdown: options.markdown_options(),
            transforms: vec![
                Box::new(HeadingShifter::new(options.heading_shift)),
                Box::new(ImageRelocator::new(
                    Box::new(book),
                    options.external_prefixes.clone(),
                )),
                Box::new(CodeBlockUnwrapper),
                Box::new(highlighter),
            ],
        })
    }

    /// Append a transform that runs after the built-in ones.
    #[must_use]
    pub fn with_transform(mut self, transform: impl TreeTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Convert a markdown document to HTML.
    pub fn convert(&mut self, markdown: &str) -> Result<String, ConvertError> {
        let mut cut = CutPreprocessor::new();
        let markdown = cut.process(markdown);

        let mut nodes = build_tree(&markdown, self.markdown);
        tracing::debug!(nodes = nodes.len(), cuts = cut.markers(), "Parsed document");

        for transform in &mut self.transforms {
            nodes = transform.transform(nodes)?;
            tracing::debug!(transform = transform.name(), "Applied transform");
        }

        let html = to_html(&nodes);
        tracing::info!(bytes = html.len(), "Converted document");
        Ok(html)
    }

    /// Convert UTF-8 encoded markdown to HTML.
    pub fn convert_bytes(&mut self, input: &[u8]) -> Result<String, ConvertError> {
        self.convert(std::str::from_utf8(input)?)
    }
}
