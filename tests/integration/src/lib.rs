//! Integration test utilities for the runtime
//!
//! This crate provides a loopback gateway node, a canned transport, and
//! wire fixtures for driving the cache and gateway end to end.

pub mod helpers;
pub mod fixtures;

pub use helpers::*;
pub use fixtures::*;
