//! Version and content resolution
//!
//! The resolver discovers every version of a content identifier and hands
//! out a [`Revisions`] sequence that yields the extracted metadata and raw
//! source of each version, oldest first. Version history pages and source
//! documents go through the [`DocumentCache`]; a document that fails
//! extraction is invalidated before the failure is returned, so the next
//! run refetches it instead of failing on the same stale copy.

mod revisions;

pub use revisions::{Revision, Revisions};

use crate::cache::DocumentCache;
use crate::content::ContentId;
use crate::extract::{extract_versions, ExtractError};
use crate::remote::RemoteHost;
use crate::{PopulateError, Result};
use std::sync::Arc;

/// Resolves identifiers to versions and versions to documents
pub struct Resolver<C> {
    host: RemoteHost,
    cache: Arc<C>,
}

impl<C> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: DocumentCache> Resolver<C> {
    pub fn new(host: RemoteHost, cache: Arc<C>) -> Self {
        Self { host, cache }
    }

    pub fn host(&self) -> &RemoteHost {
        &self.host
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The host's current latest version label, never cached
    pub async fn latest_version(&self, id: &ContentId) -> Result<String> {
        self.host.latest_version(id).await
    }

    /// All known versions of `id`, oldest first
    ///
    /// The history page is looked up for the current latest version, so a
    /// newly published version changes the page URL and forces a fresh page.
    pub async fn versions(&self, id: &ContentId) -> Result<Vec<String>> {
        let latest = self.latest_version(id).await?;
        self.versions_at(id, &latest).await
    }

    async fn versions_at(&self, id: &ContentId, latest: &str) -> Result<Vec<String>> {
        let url = self.host.history_url(id, latest);
        let page = self.cached_text(&url).await?;

        match extract_versions(&page) {
            Ok(mut versions) => {
                // The host lists newest first.
                versions.reverse();
                tracing::debug!("{} has {} version(s)", id, versions.len());
                Ok(versions)
            }
            Err(source) => Err(self.discard(url, source)?),
        }
    }

    /// Starts the per-version sequence for `id`
    ///
    /// The version list is resolved up front; documents are fetched lazily
    /// as the sequence is advanced.
    pub async fn resolve(&self, id: &ContentId) -> Result<Revisions<C>> {
        let latest = self.latest_version(id).await?;
        let versions = self.versions_at(id, &latest).await?;
        Ok(Revisions::new(self.clone(), id.clone(), latest, versions))
    }

    /// Returns the cached text for `url`, fetching and storing it on a miss
    ///
    /// Fetched bytes are cached unchanged; a body that is not UTF-8 is an
    /// extraction failure and is never cached.
    pub(crate) async fn cached_text(&self, url: &str) -> Result<String> {
        if let Some(document) = self.cache.get(url)? {
            tracing::debug!("Cache hit: {}", url);
            return Ok(document);
        }

        tracing::debug!("Cache miss: {}", url);
        let body = self.host.fetch_bytes(url).await?;
        let document = match String::from_utf8(body) {
            Ok(document) => document,
            Err(e) => {
                let source = ExtractError::Encoding(e.utf8_error());
                return Err(self.discard(url.to_string(), source)?);
            }
        };
        self.cache.put(url, &document)?;
        Ok(document)
    }

    /// Drops an unusable cached document and builds the error to propagate
    pub(crate) fn discard(&self, url: String, source: ExtractError) -> Result<PopulateError> {
        tracing::warn!("Invalidating cached {}: {}", url, source);
        self.cache.invalidate(&url)?;
        Ok(PopulateError::Extraction { url, source })
    }
}
