//! Version and content resolution against a mock host

use crate::fixtures::{history_page, html, module_document, text, xml, LegacyHost};
use legacy_populate::extract::ExtractError;
use legacy_populate::{ContentId, DocumentCache, MemoryCache, PopulateError, SqliteCache};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::ResponseTemplate;

fn id(s: &str) -> ContentId {
    ContentId::parse(s).expect("valid identifier")
}

#[tokio::test]
async fn test_versions_ascending_and_cached() {
    let host = LegacyHost::start().await;
    // The latest pointer is always asked for; the history page only once.
    host.serve_exactly("/content/m100/getVersion", text("1.3"), 2)
        .await;
    host.serve_exactly(
        "/content/m100/1.3/content_info",
        html(history_page(&["1.3", "1.2", "1.1"])),
        1,
    )
    .await;

    let resolver = host.resolver(Arc::new(MemoryCache::new()));
    let first = resolver.versions(&id("m100")).await.unwrap();
    let second = resolver.versions(&id("m100")).await.unwrap();

    assert_eq!(first, vec!["1.1", "1.2", "1.3"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_revisions_yield_every_version_in_order() {
    let host = LegacyHost::start().await;
    host.module("m100", &["1.1", "1.2"]).await;

    let resolver = host.resolver(Arc::new(MemoryCache::new()));
    let mut revisions = resolver.resolve(&id("m100")).await.unwrap();
    assert_eq!(revisions.remaining(), 2);

    let first = revisions.next().await.unwrap().unwrap();
    let second = revisions.next().await.unwrap().unwrap();

    assert_eq!(first.version, "1.1");
    assert_eq!(first.unit.metadata.version, "1.1");
    assert_eq!(first.unit.abstract_text, "Intro");
    assert_eq!(second.unit.metadata.version, "1.2");
    assert!(second.document.contains("Body of m100 at 1.2"));
    assert!(revisions.next().await.is_none());
}

#[tokio::test]
async fn test_stale_cached_document_is_refetched_once() {
    let host = LegacyHost::start().await;
    host.versions("m100", &["1.1"]).await;
    host.serve_exactly("/content/m100/1.1/source", xml(module_document("m100", "1.1")), 1)
        .await;

    let cache = Arc::new(MemoryCache::new());
    let resolver = host.resolver(Arc::clone(&cache));
    let source_url = resolver.host().source_url(&id("m100"), "1.1");
    cache.put(&source_url, "<document><metadata>").unwrap();

    let mut revisions = resolver.resolve(&id("m100")).await.unwrap();
    let failure = revisions.next().await.unwrap();
    assert!(matches!(
        failure,
        Err(PopulateError::Extraction { ref url, .. }) if url == &source_url
    ));
    assert!(cache.get(&source_url).unwrap().is_none());

    // One refetch repairs the entry; later runs are served from the cache.
    for _ in 0..2 {
        let mut revisions = resolver.resolve(&id("m100")).await.unwrap();
        let revision = revisions.next().await.unwrap().unwrap();
        assert_eq!(revision.unit.metadata.moduleid, "m100");
    }
}

#[tokio::test]
async fn test_revisions_stop_after_first_failure() {
    let host = LegacyHost::start().await;
    host.versions("m100", &["1.1", "1.2"]).await;
    host.serve("/content/m100/1.1/source", xml("<document/>")).await;
    host.serve_exactly("/content/m100/1.2/source", xml(module_document("m100", "1.2")), 0)
        .await;

    let resolver = host.resolver(Arc::new(MemoryCache::new()));
    let mut revisions = resolver.resolve(&id("m100")).await.unwrap();

    assert!(matches!(
        revisions.next().await,
        Some(Err(PopulateError::Extraction { .. }))
    ));
    assert_eq!(revisions.remaining(), 0);
    assert!(revisions.next().await.is_none());
}

#[tokio::test]
async fn test_collection_versions_read_latest_source() {
    let host = LegacyHost::start().await;
    host.collection("c1", &["1.4", "1.5"], &["m100"]).await;
    host.serve_exactly("/content/c1/1.4/source", ResponseTemplate::new(404), 0)
        .await;

    let resolver = host.resolver(Arc::new(MemoryCache::new()));
    let mut revisions = resolver.resolve(&id("c1")).await.unwrap();

    let older = revisions.next().await.unwrap().unwrap();
    let latest = revisions.next().await.unwrap().unwrap();

    assert_eq!(older.version, "1.4");
    assert_eq!(older.unit.metadata.version, "1.4");
    assert_eq!(latest.unit.metadata.version, "1.5");
    assert_eq!(older.document, latest.document);
}

#[tokio::test]
async fn test_missing_history_is_extraction_failure() {
    let host = LegacyHost::start().await;
    host.serve("/content/m100/getVersion", text("1.1")).await;
    host.serve_exactly(
        "/content/m100/1.1/content_info",
        html("<html><body>Maintenance</body></html>"),
        2,
    )
    .await;

    let cache = Arc::new(MemoryCache::new());
    let resolver = host.resolver(Arc::clone(&cache));

    for _ in 0..2 {
        let result = resolver.versions(&id("m100")).await;
        assert!(matches!(
            result,
            Err(PopulateError::Extraction {
                source: ExtractError::MissingHistory,
                ..
            })
        ));
    }
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_host_errors_surface() {
    let host = LegacyHost::start().await;
    host.serve("/content/m404/getVersion", ResponseTemplate::new(404))
        .await;

    let resolver = host.resolver(Arc::new(MemoryCache::new()));
    let result = resolver.resolve(&id("m404")).await;

    assert!(matches!(result, Err(PopulateError::Http { .. })));
}

#[tokio::test]
async fn test_sqlite_cache_survives_restart() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("cache.db");

    let host = LegacyHost::start().await;
    host.serve("/content/m100/getVersion", text("1.1")).await;
    host.serve_exactly(
        "/content/m100/1.1/content_info",
        html(history_page(&["1.1"])),
        1,
    )
    .await;
    host.serve_exactly("/content/m100/1.1/source", xml(module_document("m100", "1.1")), 1)
        .await;

    for _ in 0..2 {
        let cache = Arc::new(SqliteCache::open(&cache_path).unwrap());
        let resolver = host.resolver(cache);
        let mut revisions = resolver.resolve(&id("m100")).await.unwrap();
        let revision = revisions.next().await.unwrap().unwrap();
        assert_eq!(revision.version, "1.1");
    }

    let cache = SqliteCache::open(&cache_path).unwrap();
    assert_eq!(cache.len().unwrap(), 2);
}
