//! ECONPULSE: economic indicator and news aggregation engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod registry;
pub mod data;
pub mod engine;
pub mod display;
