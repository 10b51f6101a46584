//! Integration tests for rtmp-setup

mod bridge_tests;
mod process_tests;
mod resolver_tests;
mod selector_tests;
mod server_tests;

// Re-export common utilities
#[path = "../common/mod.rs"]
mod common;
