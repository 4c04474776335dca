//! Metadata extraction from legacy source documents
//!
//! This module turns raw source text into structured data:
//! - Module (`index.cnxml`) and collection (`collection.xml`) metadata
//! - The ordered member identifiers of a collection
//! - The version labels listed on a content history page
//!
//! Extraction is pure. Callers decide what to do with a failure; the
//! resolver uses it to invalidate the cached copy of the source.

mod document;
mod history;

pub use document::{extract_collection_members, extract_metadata};
pub use history::extract_versions;

use thiserror::Error;

/// Errors raised while reading a source document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(std::str::Utf8Error),

    #[error("Document has no root element")]
    Empty,

    #[error("Document ends before all elements are closed")]
    Truncated,

    #[error("Missing required metadata field: {0}")]
    MissingField(&'static str),

    #[error("Missing license metadata")]
    MissingLicense,

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Page has no version history section")]
    MissingHistory,

    #[error("Version history lists no versions")]
    NoVersions,
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;
