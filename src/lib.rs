//! EDAPI: companion-service profile sync
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod profile;
pub mod prompt;
pub mod session;
pub mod tables;
pub mod pipeline;
pub mod storage;
pub mod publish;
pub mod export;
pub mod report;
