//! mangaterm library
//!
//! Exposes the application modules so the binary and the integration tests
//! share one build of them.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod reader;
pub mod ui;
