use serde::Deserialize;

/// Main configuration structure for Legacy-Populate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

/// Legacy content host
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Host name (`cnx.org`, http implied) or full base URL
    pub host: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "cnx.org".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "client-name")]
    pub client_name: String,

    #[serde(rename = "client-version")]
    pub client_version: String,

    /// Email address for migration-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            client_name: "legacy-populate".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_email: String::new(),
        }
    }
}

/// HTTP client timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// Where the database and the document cache live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database receiving migrated content
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the SQLite document cache
    #[serde(rename = "cache-path")]
    pub cache_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./legacy.db".to_string(),
            cache_path: "./legacy-cache.db".to_string(),
        }
    }
}
