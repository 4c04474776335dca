use crate::content::ContentType;
use std::collections::BTreeSet;

/// Core metadata row extracted from a primary document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The legacy content identifier as written in the document
    pub moduleid: String,
    pub version: String,
    pub name: String,
    pub created: String,
    pub revised: String,
    pub language: String,
    /// Ordered person identifiers per role
    pub authors: Vec<String>,
    pub maintainers: Vec<String>,
    pub licensors: Vec<String>,
    pub portal_type: ContentType,
}

/// Everything the extractor pulls out of one document
///
/// Keywords and subjects are sets: the order they appear in the source has
/// no meaning and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    pub abstract_text: String,
    pub license_url: String,
    pub metadata: Metadata,
    pub keywords: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
}
