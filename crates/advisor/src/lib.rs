//! `vbank-advisor` library crate.
//!
//! Re-exports the configuration and request modules for testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod request;
