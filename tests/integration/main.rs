//! Integration tests for Strata
//!
//! These tests run the walker, indexer and query service against wiremock
//! servers standing in for the forwarding service and the live mirror.

mod common;
mod crawl_tests;
mod walk_tests;
