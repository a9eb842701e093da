//! Integration test utilities for the segment service
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API backed by a real PostgreSQL instance.

pub mod helpers;
pub mod fixtures;

pub use helpers::*;
pub use fixtures::*;
