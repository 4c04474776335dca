//! Content identifiers and their classification
//!
//! A legacy content identifier's first character decides what it names:
//! `m…` is a Module, `c…` is a Collection. Everything else is rejected.

mod metadata;

pub use metadata::{ContentUnit, Metadata};

use crate::PopulateError;
use std::fmt;
use std::str::FromStr;

/// MIME type recorded for every primary document
pub const PRIMARY_MIME_TYPE: &str = "text/xml";

/// The two kinds of legacy content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Leaf content unit with a primary document and resource files
    Module,
    /// Content unit whose primary document lists child identifiers
    Collection,
}

impl ContentType {
    /// Canonical filename of the primary document for this type
    pub fn primary_filename(&self) -> &'static str {
        match self {
            Self::Module => "index.cnxml",
            Self::Collection => "collection.xml",
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Module => "Module",
            Self::Collection => "Collection",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "Module" => Some(Self::Module),
            "Collection" => Some(Self::Collection),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// A legacy host identifier such as `m42119` or `col10001`
///
/// Construction validates the prefix, so every `ContentId` has a known type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Parses and classifies an identifier
    pub fn parse(id: &str) -> Result<Self, PopulateError> {
        classify(id)?;
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type implied by the identifier's prefix
    pub fn content_type(&self) -> ContentType {
        // Validated in `parse`, so anything that is not a module is a collection.
        if self.0.starts_with('m') {
            ContentType::Module
        } else {
            ContentType::Collection
        }
    }
}

impl FromStr for ContentId {
    type Err = PopulateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ContentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Maps an identifier's lexical form to its content type
///
/// # Examples
///
/// ```
/// use legacy_populate::content::{classify, ContentType};
///
/// assert_eq!(classify("m100").unwrap(), ContentType::Module);
/// assert_eq!(classify("col10001").unwrap(), ContentType::Collection);
/// assert!(classify("x1").is_err());
/// ```
pub fn classify(id: &str) -> Result<ContentType, PopulateError> {
    match id.chars().next() {
        Some('m') => Ok(ContentType::Module),
        Some('c') => Ok(ContentType::Collection),
        _ => Err(PopulateError::InvalidIdentifier(id.to_string())),
    }
}

/// Canonical primary filename for a content type
pub fn primary_filename(content_type: ContentType) -> &'static str {
    content_type.primary_filename()
}
