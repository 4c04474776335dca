//! Integration tests for legacy-populate
//!
//! These tests use wiremock to stand in for the legacy host and exercise
//! resolution and population end-to-end against real SQLite stores.

mod fixtures;
mod resolver_tests;
