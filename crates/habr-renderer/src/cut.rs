//! Cut-marker preprocessor.
//!
//! Habrahabr splits a post into the teaser and the rest with a `<habracut/>`
//! tag. Authors write it as a line of the form `-x-` or `-X----- Read more`,
//! which this pass rewrites into the tag before the text reaches the parser.
//!
//! ```
//! use habr_renderer::CutPreprocessor;
//!
//! let mut cut = CutPreprocessor::new();
//! let output = cut.process("Teaser\n\n-x- Read <more>\n\nBody\n");
//!
//! assert_eq!(
//!     output,
//!     "Teaser\n\n<habracut text=\"Read &lt;more&gt;\"/>\n\nBody\n"
//! );
//! assert_eq!(cut.markers(), 1);
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::FenceTracker;
use crate::html::escape_html;

static CUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-[xX]-+(?:\s+(.+))?").unwrap());

/// Rewrites cut-marker lines into `<habracut>` tags.
///
/// Output has exactly as many lines as the input. Lines inside fenced code
/// blocks are never rewritten.
#[derive(Debug, Default)]
pub struct CutPreprocessor {
    fence: FenceTracker,
    markers: usize,
}

impl CutPreprocessor {
    /// Create a new preprocessor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fence: FenceTracker::new(),
            markers: 0,
        }
    }

    /// Process markdown text and return the rewritten text.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let lines: Vec<&str> = input.lines().collect();
        let line_count = lines.len();

        for (idx, line) in lines.into_iter().enumerate() {
            output.push_str(&self.process_line(line));
            // Preserve line endings
            if idx < line_count - 1 || input.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }

    /// Number of cut markers rewritten so far.
    #[must_use]
    pub fn markers(&self) -> usize {
        self.markers
    }

    fn process_line(&mut self, line: &str) -> String {
        if self.fence.update(line) || self.fence.in_fence() {
            return line.to_owned();
        }

        match rewrite_cut(line) {
            Some(tag) => {
                self.markers += 1;
                tracing::debug!(line = %line, "Rewrote cut marker");
                tag
            }
            None => line.to_owned(),
        }
    }
}

/// Rewrite a single line if it is a cut marker.
///
/// Returns `None` for lines that are not cut markers.
#[must_use]
pub fn rewrite_cut(line: &str) -> Option<String> {
    let caps = CUT_RE.captures(line)?;
    let text = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|text| !text.trim().is_empty());

    Some(match text {
        Some(text) => format!(r#"<habracut text="{}"/>"#, escape_html(text)),
        None => "<habracut/>".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Inverse of `escape_html`, for round-trip checks.
    fn unescape_html(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_bare_markers() {
        for line in ["-x-", "-X-", "-x----", "-x-   "] {
            assert_eq!(rewrite_cut(line).as_deref(), Some("<habracut/>"), "{line}");
        }
    }

    #[test]
    fn test_marker_with_text() {
        assert_eq!(
            rewrite_cut("-x- Read more").as_deref(),
            Some(r#"<habracut text="Read more"/>"#)
        );
        assert_eq!(
            rewrite_cut("-X---\tUnder the cut").as_deref(),
            Some(r#"<habracut text="Under the cut"/>"#)
        );
    }

    #[test]
    fn test_text_attribute_round_trips() {
        for text in [
            "Read more",
            r#"Say "hi" & <wave>"#,
            "it's 'quoted'",
            "Кат под катом",
            "a&amp;b",
        ] {
            let line = format!("-x- {text}");
            let tag = rewrite_cut(&line).unwrap();
            let value = tag
                .strip_prefix(r#"<habracut text=""#)
                .and_then(|rest| rest.strip_suffix(r#""/>"#))
                .unwrap();
            assert!(!value.contains('"'));
            assert_eq!(unescape_html(value), text);
        }
    }

    #[test]
    fn test_non_markers_unchanged() {
        for line in ["", "text -x-", "x-", "-x", "-y-", " -x-", "--- x"] {
            assert_eq!(rewrite_cut(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_process_preserves_line_count() {
        let input = "one\n-x-\nthree\n-X- more\nfive";
        let output = CutPreprocessor::new().process(input);

        assert_eq!(output.lines().count(), input.lines().count());
        assert_eq!(
            output,
            "one\n<habracut/>\nthree\n<habracut text=\"more\"/>\nfive"
        );
    }

    #[test]
    fn test_process_preserves_trailing_newline() {
        let output = CutPreprocessor::new().process("-x-\n");
        assert_eq!(output, "<habracut/>\n");
    }

    #[test]
    fn test_markers_in_fence_untouched() {
        let input = "```\n-x-\n```\n-x-\n";
        let mut cut = CutPreprocessor::new();
        let output = cut.process(input);

        assert_eq!(output, "```\n-x-\n```\n<habracut/>\n");
        assert_eq!(cut.markers(), 1);
    }
}
