//! Code fence tracking for line-based preprocessing.
//!
//! The cut-marker rewriter works on raw lines before parsing. Lines inside a
//! fenced code block are code, so the rewriter asks [`FenceTracker`] before
//! touching them.

/// Maximum indentation of a fence line, per `CommonMark`.
const MAX_FENCE_INDENT: usize = 3;

/// Tracks code fence state during line-by-line processing.
///
/// Fences use backticks or tildes (three or more). The closing fence must use
/// the same character and be at least as long as the opening one.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Opening fence character and length while inside a fence.
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_fence_indent(line) else {
            return false;
        };

        match self.open {
            Some((ch, len)) => {
                if closes_fence(trimmed, ch, len) {
                    self.open = None;
                    return true;
                }
                false
            }
            None => {
                self.open = detect_fence(trimmed);
                self.open.is_some()
            }
        }
    }
}

/// Strip up to three leading spaces; deeper indentation is never a fence.
fn strip_fence_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= MAX_FENCE_INDENT).then(|| &line[indent..])
}

/// Detect an opening fence and return its character and length.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next().filter(|&c| c == '`' || c == '~')?;
    let count = trimmed.chars().take_while(|&c| c == first).count();
    // Backtick fences cannot carry backticks in their info string
    if first == '`' && trimmed[count..].contains('`') {
        return None;
    }
    (count >= 3).then_some((first, count))
}

/// Check if a line closes a fence opened with `expected` repeated `min_len` times.
fn closes_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
