//! Heading demotion.
//!
//! Habrahabr reserves the top heading levels for the post title, so headings
//! in the post body are pushed down by a fixed table.

use crate::error::ConvertError;
use crate::transform::{TreeTransform, Visit, rewrite};
use crate::tree::{Element, Node};
use crate::util::heading_tag_level;

/// Heading shift table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HeadingShift {
    /// `h1→h2`, `h2→h3`, `h3→h4`, `h4→h5`, `h5→h6`.
    #[default]
    OneLevel,
    /// `h1→h4`, `h2→h5`, `h3→h6`; lower levels untouched.
    TopThree,
}

impl HeadingShift {
    /// Target level for a heading level, or `None` if the level is not shifted.
    #[must_use]
    pub fn target(self, level: u8) -> Option<u8> {
        match (self, level) {
            (Self::OneLevel, 1..=5) | (Self::TopThree, 1..=3) => Some(level + self.offset()),
            _ => None,
        }
    }

    fn offset(self) -> u8 {
        match self {
            Self::OneLevel => 1,
            Self::TopThree => 3,
        }
    }
}

/// Renames heading tags at any depth. Attributes and children are untouched.
///
/// Shifting is not idempotent: the pipeline runs it exactly once.
#[derive(Debug, Default)]
pub struct HeadingShifter {
    shift: HeadingShift,
}

impl HeadingShifter {
    #[must_use]
    pub fn new(shift: HeadingShift) -> Self {
        Self { shift }
    }
}

impl TreeTransform for HeadingShifter {
    fn name(&self) -> &'static str {
        "headings"
    }

    fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError> {
        let shift = self.shift;
        rewrite(nodes, &mut |mut element: Element| {
            if let Some(target) = heading_tag_level(&element.tag).and_then(|l| shift.target(l)) {
                element.tag = format!("h{target}");
            }
            Ok(Visit::Descend(element))
        })
    }
}
