//! Mock legacy host and document builders shared by the integration tests

use legacy_populate::config::{HttpConfig, UserAgentConfig};
use legacy_populate::remote::build_http_client;
use legacy_populate::{DocumentCache, RemoteHost, Resolver, SqliteBackend};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// License URL present in the seeded licenses table
pub const LICENSE: &str = "http://creativecommons.org/licenses/by/3.0/";

/// A module source document with abstract "Intro", keywords a and b, subject Science
pub fn module_document(id: &str, version: &str) -> String {
    module_document_with_license(id, version, LICENSE)
}

pub fn module_document_with_license(id: &str, version: &str, license: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<document xmlns="http://cnx.rice.edu/cnxml" xmlns:md="http://cnx.rice.edu/mdml" id="{id}" module-id="{id}" cnxml-version="0.7">
  <title>Module {id}</title>
  <metadata mdml-version="0.5">
    <md:content-id>{id}</md:content-id>
    <md:title>Module {id}</md:title>
    <md:version>{version}</md:version>
    <md:created>2008/01/01 10:00:00 -0600</md:created>
    <md:revised>2009/02/02 11:00:00 -0600</md:revised>
    <md:roles>
      <md:role type="author">alice bob</md:role>
      <md:role type="maintainer">alice</md:role>
      <md:role type="licensor">alice</md:role>
    </md:roles>
    <md:license url="{license}"/>
    <md:keywordlist>
      <md:keyword>a</md:keyword>
      <md:keyword>b</md:keyword>
    </md:keywordlist>
    <md:subjectlist>
      <md:subject>Science</md:subject>
    </md:subjectlist>
    <md:abstract>Intro</md:abstract>
    <md:language>en</md:language>
  </metadata>
  <content>
    <para id="p1">Body of {id} at {version}</para>
  </content>
</document>"#
    )
}

/// A collection source document listing `members` in order
pub fn collection_document(id: &str, version: &str, members: &[&str]) -> String {
    let modules: String = members
        .iter()
        .map(|member| format!("    <col:module document=\"{member}\"/>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0"?>
<col:collection xmlns="http://cnx.rice.edu/collxml" xmlns:col="http://cnx.rice.edu/collxml" xmlns:md="http://cnx.rice.edu/mdml">
  <col:metadata mdml-version="0.5">
    <md:content-id>{id}</md:content-id>
    <md:title>Collection {id}</md:title>
    <md:version>{version}</md:version>
    <md:created>2010/01/01</md:created>
    <md:revised>2011/01/01</md:revised>
    <md:license url="{LICENSE}"/>
    <md:abstract>A collection</md:abstract>
    <md:language>en</md:language>
  </col:metadata>
  <col:content>
{modules}  </col:content>
</col:collection>"#
    )
}

/// A `content_info` page; the host lists versions newest first
pub fn history_page(newest_first: &[&str]) -> String {
    let rows: String = newest_first
        .iter()
        .map(|v| format!("<tr><td><a class=\"cnxn\" href=\"/content/x/{v}/\">{v}</a></td></tr>\n"))
        .collect();

    format!(
        r#"<html><head><title>Content info</title></head><body>
<div id="cnx_history_section"><table>
{rows}</table></div>
</body></html>"#
    )
}

pub fn xml(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/xml")
}

pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html")
}

pub fn text(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body.into())
}

/// An in-memory backend with the subject used by [`module_document`] seeded
pub fn backend() -> SqliteBackend {
    let mut backend = SqliteBackend::open_in_memory().expect("Failed to open backend");
    backend.seed_tag("Science").expect("Failed to seed tag");
    backend
}

/// A mock legacy host
pub struct LegacyHost {
    pub server: MockServer,
}

impl LegacyHost {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Mounts a GET handler for an exact path
    pub async fn serve(&self, url_path: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Mounts a GET handler that must be hit exactly `times` times
    pub async fn serve_exactly(&self, url_path: &str, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(response)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mounts `getVersion` and the history page for versions given oldest first
    pub async fn versions(&self, id: &str, ascending: &[&str]) {
        let latest = ascending.last().expect("at least one version");
        let newest_first: Vec<&str> = ascending.iter().rev().copied().collect();

        self.serve(&format!("/content/{id}/getVersion"), text(format!("{latest}\n")))
            .await;
        self.serve(
            &format!("/content/{id}/{latest}/content_info"),
            html(history_page(&newest_first)),
        )
        .await;
    }

    /// Mounts a module with no resource files
    pub async fn module(&self, id: &str, ascending: &[&str]) {
        self.versions(id, ascending).await;
        for version in ascending {
            self.serve(
                &format!("/content/{id}/{version}/source"),
                xml(module_document(id, version)),
            )
            .await;
            self.serve(
                &format!("/content/{id}/{version}/objectIds"),
                text("['index.cnxml']"),
            )
            .await;
        }
    }

    /// Mounts a collection whose source is only served at its latest version
    pub async fn collection(&self, id: &str, ascending: &[&str], members: &[&str]) {
        self.versions(id, ascending).await;
        let latest = ascending.last().expect("at least one version");
        self.serve(
            &format!("/content/{id}/{latest}/source"),
            xml(collection_document(id, latest, members)),
        )
        .await;
    }

    pub fn remote(&self) -> RemoteHost {
        let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default())
            .expect("Failed to build client");
        RemoteHost::new(client, &self.server.uri()).expect("Failed to parse mock uri")
    }

    pub fn resolver<C: DocumentCache>(&self, cache: Arc<C>) -> Resolver<C> {
        Resolver::new(self.remote(), cache)
    }
}
