use crate::cache::DocumentCache;
use crate::content::{ContentId, ContentType, ContentUnit};
use crate::extract::extract_metadata;
use crate::resolver::Resolver;
use crate::Result;
use std::collections::VecDeque;

/// One resolved version of a content identifier
#[derive(Debug, Clone)]
pub struct Revision {
    /// The version label this revision was resolved for
    pub version: String,
    pub unit: ContentUnit,
    /// Raw primary document text
    pub document: String,
}

/// Lazy, fail-fast sequence of the revisions of one identifier
///
/// Each call to [`Revisions::next`] fetches (through the cache) and extracts
/// one version, oldest first. After the first error the sequence is over;
/// call [`Resolver::resolve`] again to start from a fresh version list.
pub struct Revisions<C> {
    resolver: Resolver<C>,
    id: ContentId,
    latest: String,
    pending: VecDeque<String>,
}

impl<C: DocumentCache> Revisions<C> {
    pub(crate) fn new(
        resolver: Resolver<C>,
        id: ContentId,
        latest: String,
        versions: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            id,
            latest,
            pending: versions.into(),
        }
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    /// Versions not yet yielded
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Resolves the next version, or `None` when the sequence is exhausted
    pub async fn next(&mut self) -> Option<Result<Revision>> {
        let version = self.pending.pop_front()?;
        let result = self.fetch(version).await;
        if result.is_err() {
            self.pending.clear();
        }
        Some(result)
    }

    /// Fetches and extracts one version
    ///
    /// A collection's source is read from `/{latest-label}/source`, where
    /// `latest-label` is the version `getVersion` reported when the sequence
    /// was resolved. The host serves the same document there as under the
    /// literal `/latest/source`; using the label keeps the cache key tied to
    /// a fixed version instead of a moving pointer.
    async fn fetch(&self, version: String) -> Result<Revision> {
        let content_type = self.id.content_type();

        // The host only serves a collection's source at its latest version;
        // the historical label is stamped onto the extracted metadata below.
        let source_version = match content_type {
            ContentType::Module => version.as_str(),
            ContentType::Collection => self.latest.as_str(),
        };
        let url = self.resolver.host().source_url(&self.id, source_version);
        let document = self.resolver.cached_text(&url).await?;

        let mut unit = match extract_metadata(&document, content_type) {
            Ok(unit) => unit,
            Err(source) => return Err(self.resolver.discard(url, source)?),
        };

        if content_type == ContentType::Collection {
            unit.metadata.version = version.clone();
        }

        Ok(Revision {
            version,
            unit,
            document,
        })
    }
}
