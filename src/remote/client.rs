use crate::config::{Config, HttpConfig, UserAgentConfig};
use crate::content::ContentId;
use crate::extract::ExtractError;
use crate::{PopulateError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// MIME type assumed when the host does not send one
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A resource file downloaded from the host
#[derive(Debug, Clone)]
pub struct Resource {
    pub filename: String,
    /// Content-Type of the response, without parameters
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use legacy_populate::config::{HttpConfig, UserAgentConfig};
/// use legacy_populate::remote::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> std::result::Result<Client, reqwest::Error> {
    // Format: ClientName/Version (+ContactEmail)
    let user_agent = if user_agent.contact_email.is_empty() {
        format!("{}/{}", user_agent.client_name, user_agent.client_version)
    } else {
        format!(
            "{}/{} (+{})",
            user_agent.client_name, user_agent.client_version, user_agent.contact_email
        )
    };

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Turns a configured host into a base URL without a trailing slash
///
/// A bare host name gets `http://`, as the legacy host was always reached.
///
/// ```
/// use legacy_populate::remote::normalize_host;
///
/// assert_eq!(normalize_host("cnx.org").unwrap(), "http://cnx.org");
/// assert_eq!(normalize_host("https://legacy.cnx.org/").unwrap(), "https://legacy.cnx.org");
/// ```
pub fn normalize_host(host: &str) -> std::result::Result<String, url::ParseError> {
    let host = host.trim();
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    let url = Url::parse(&candidate)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parses the body of an `objectIds` response into filenames
///
/// The host answers with a Python-style list literal; plain newline or
/// comma separated names are accepted too.
///
/// ```
/// use legacy_populate::remote::parse_object_ids;
///
/// assert_eq!(
///     parse_object_ids("['index.cnxml', 'figure 1.png']"),
///     vec!["index.cnxml", "figure 1.png"]
/// );
/// ```
pub fn parse_object_ids(body: &str) -> Vec<String> {
    let body = body.trim();
    let body = body
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(body);

    body.split([',', '\n'])
        .map(|name| name.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Client for the legacy host's `/content/...` endpoints
#[derive(Debug, Clone)]
pub struct RemoteHost {
    client: Client,
    base: Url,
}

impl RemoteHost {
    /// Creates a host client from a prepared HTTP client and a host name or URL
    pub fn new(client: Client, host: &str) -> Result<Self> {
        let base = Url::parse(&normalize_host(host)?)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self { client, base })
    }

    /// Creates a host client from the run configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent, &config.http)?;
        Self::new(client, &config.source.host)
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Appends path segments to the base URL, percent-encoding each one
    ///
    /// A segment can never add path levels of its own: `/`, `?`, `#` and `%`
    /// inside it are escaped.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        // `new` rejects bases without a hierarchical path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    /// `/content/{id}/{version}`
    pub fn content_url(&self, id: &ContentId, version: &str) -> String {
        self.endpoint(&["content", id.as_str(), version])
    }

    /// Version history page for the content at `version`
    pub fn history_url(&self, id: &ContentId, version: &str) -> String {
        self.endpoint(&["content", id.as_str(), version, "content_info"])
    }

    pub fn latest_version_url(&self, id: &ContentId) -> String {
        self.endpoint(&["content", id.as_str(), "getVersion"])
    }

    /// Raw primary document
    pub fn source_url(&self, id: &ContentId, version: &str) -> String {
        self.endpoint(&["content", id.as_str(), version, "source"])
    }

    pub fn object_ids_url(&self, id: &ContentId, version: &str) -> String {
        self.endpoint(&["content", id.as_str(), version, "objectIds"])
    }

    pub fn resource_url(&self, id: &ContentId, version: &str, filename: &str) -> String {
        self.endpoint(&["content", id.as_str(), version, filename])
    }

    /// Sends a GET and rejects non-success statuses
    async fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|source| PopulateError::Http {
                url: url.to_string(),
                source,
            })
    }

    /// Fetches a URL's body exactly as served
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| PopulateError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(body.to_vec())
    }

    /// Fetches a URL's body as UTF-8 text
    ///
    /// The body is never transcoded or repaired: anything that is not valid
    /// UTF-8 fails with [`ExtractError::Encoding`].
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch_bytes(url).await?;
        String::from_utf8(body).map_err(|e| PopulateError::Extraction {
            url: url.to_string(),
            source: ExtractError::Encoding(e.utf8_error()),
        })
    }

    /// Asks the host for the current latest version label
    ///
    /// Always live: the latest pointer moves as content is republished.
    pub async fn latest_version(&self, id: &ContentId) -> Result<String> {
        let url = self.latest_version_url(id);
        let version = self.fetch_text(&url).await?;
        Ok(version.trim().to_string())
    }

    /// Lists the filenames stored with a module version
    pub async fn resource_names(&self, id: &ContentId, version: &str) -> Result<Vec<String>> {
        let url = self.object_ids_url(id, version);
        let body = self.fetch_text(&url).await?;
        Ok(parse_object_ids(&body))
    }

    /// Downloads one resource file and its MIME type
    pub async fn fetch_resource(
        &self,
        id: &ContentId,
        version: &str,
        filename: &str,
    ) -> Result<Resource> {
        let url = self.resource_url(id, version, filename);
        let response = self.get(&url).await?;

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|source| PopulateError::Http {
                url: url.clone(),
                source,
            })?;

        Ok(Resource {
            filename: filename.to_string(),
            mime_type,
            bytes: bytes.to_vec(),
        })
    }
}
