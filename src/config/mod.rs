//! Configuration module for Legacy-Populate
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a run without a config file targets
//! `cnx.org` and writes to SQLite files in the working directory.
//!
//! # Example
//!
//! ```no_run
//! use legacy_populate::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("populate.toml")).unwrap();
//! println!("Populating from: {}", config.source.host);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, SourceConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
