//! Image relocation.
//!
//! Local images are uploaded out of band; for each one a side-file
//! `<src>.address` holds the thumbnail URL and the full-size page URL. The
//! relocator swaps every local image for a thumbnail linking to its page.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::transform::{TreeTransform, Visit, rewrite};
use crate::tree::{Element, Node};

/// Where an uploaded image lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAddress {
    pub thumb_url: String,
    pub page_url: String,
}

/// Resolves an image source to its uploaded address.
pub trait AddressBook {
    /// Look up the address for `src`.
    ///
    /// A missing or malformed entry is an error that aborts the conversion.
    fn lookup(&self, src: &str) -> Result<ImageAddress, ConvertError>;
}

/// Address book backed by `<src>.address` files.
///
/// Each file holds exactly two lines: the thumbnail URL, then the page URL.
/// Trailing whitespace is stripped from both.
#[derive(Clone, Debug)]
pub struct SideFileAddressBook {
    base_dir: PathBuf,
}

impl SideFileAddressBook {
    /// Create an address book resolving side-files against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Side-file path for an image source.
    #[must_use]
    pub fn side_file(&self, src: &str) -> PathBuf {
        self.base_dir.join(format!("{src}.address"))
    }
}

impl AddressBook for SideFileAddressBook {
    fn lookup(&self, src: &str) -> Result<ImageAddress, ConvertError> {
        let path = self.side_file(src);
        let content =
            std::fs::read_to_string(&path).map_err(|e| malformed(&path, e.to_string()))?;

        let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
        let [thumb_url, page_url] = lines.as_slice() else {
            return Err(malformed(
                &path,
                format!("expected 2 lines, found {}", lines.len()),
            ));
        };

        Ok(ImageAddress {
            thumb_url: (*thumb_url).to_owned(),
            page_url: (*page_url).to_owned(),
        })
    }
}

fn malformed(path: &Path, reason: String) -> ConvertError {
    ConvertError::MalformedSideFile {
        path: path.to_path_buf(),
        reason,
    }
}

/// Replaces local images with `<a href="page"><img src="thumb"/></a>`.
///
/// Images whose `src` starts with one of the external prefixes are left
/// untouched. All other attributes of a relocated image are dropped.
pub struct ImageRelocator {
    book: Box<dyn AddressBook>,
    external_prefixes: Vec<String>,
}

impl ImageRelocator {
    pub fn new(book: Box<dyn AddressBook>, external_prefixes: Vec<String>) -> Self {
        Self {
            book,
            external_prefixes,
        }
    }

    fn is_external(&self, src: &str) -> bool {
        self.external_prefixes
            .iter()
            .any(|prefix| src.starts_with(prefix.as_str()))
    }

    fn relocate(&self, image: Element) -> Result<Visit, ConvertError> {
        let src = image.attr("src").unwrap_or_default();
        if self.is_external(src) {
            return Ok(Visit::Descend(image));
        }

        let address = self.book.lookup(src)?;
        tracing::debug!(src = %src, thumb = %address.thumb_url, "Relocated image");

        let link = Element::new("a")
            .with_attr("href", address.page_url)
            .with_child(Element::new("img").with_attr("src", address.thumb_url));
        Ok(Visit::Replace(link.into()))
    }
}

impl TreeTransform for ImageRelocator {
    fn name(&self) -> &'static str {
        "images"
    }

    fn transform(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, ConvertError> {
        rewrite(nodes, &mut |element: Element| {
            if element.tag == "img" {
                self.relocate(element)
            } else {
                Ok(Visit::Descend(element))
            }
        })
    }
}
