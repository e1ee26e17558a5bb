//! # ampere-http
//!
//! REST transport backed by reqwest. Implements the `Transport` port
//! from ampere-core against the platform's HTTP API and file server.

mod client;
mod error;

pub use client::RestClient;
