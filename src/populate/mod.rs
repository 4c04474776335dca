//! Population engine
//!
//! Walks content identifiers depth-first, persisting every version exactly
//! once and reporting each visited record as a [`Populated`] event:
//! - Collections recurse into their members, read back from the stored document
//! - Modules get any missing resource files attached
//!
//! A record reachable through several collections is reported once per path.

mod engine;

pub use engine::Populator;

use crate::content::{ContentId, ContentType};
use crate::storage::Ident;
use std::fmt;

/// Whether a visited version was written by this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Exists,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted => f.write_str("INSERTED"),
            Self::Exists => f.write_str("EXISTS"),
        }
    }
}

/// One visited (identifier, version) and the record that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populated {
    pub ident: Ident,
    pub content_id: ContentId,
    pub version: String,
    pub content_type: ContentType,
    pub outcome: Outcome,
}

impl Populated {
    pub fn is_inserted(&self) -> bool {
        self.outcome == Outcome::Inserted
    }
}

impl fmt::Display for Populated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-- {} -- ident={} id={} version={} type={}",
            self.outcome, self.ident, self.content_id, self.version, self.content_type
        )
    }
}
