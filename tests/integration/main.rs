//! Integration tests for Prop-Sieve
//!
//! `pipeline_tests` drive the full pipeline against an in-memory site;
//! `http_tests` run it over HTTP against wiremock servers.

mod http_tests;
mod pipeline_tests;
mod support;
