//! Core library for the `mapload` CLI.
//!
//! A load test replays one request template, parsed from a curl command,
//! `num_requests` times at bounded concurrency. Every iteration samples a
//! document from a [`source::DocumentSource`], resolves the field mapping
//! against it, and sends the materialized request through an
//! [`http::HttpTransport`]. The binary wires these pieces to a JSON document
//! store and `reqwest`; library users can supply their own collaborators to
//! [`runner::execute_load_test`].
pub mod args;
pub mod config;
pub mod curl;
pub mod error;
pub mod executor;
pub mod http;
pub mod logger;
pub mod mapping;
pub mod runner;
pub mod source;
