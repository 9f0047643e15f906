// ABOUTME: Library root for cfpush - exposes the push engine for the CLI and tests.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod push;
pub mod resources;
pub mod types;
pub mod warnings;
