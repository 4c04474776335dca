//! Legacy content host access
//!
//! This module handles every HTTP request made to the legacy host:
//! - Building the HTTP client with a descriptive user agent
//! - Constructing the host's content URLs
//! - Fetching latest-version labels, pages, source documents and resources

mod client;

pub use client::{build_http_client, normalize_host, parse_object_ids, RemoteHost, Resource};
