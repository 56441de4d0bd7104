#![doc = "docfeed: CLI crate for the docfeed connector."]

//! CLI glue over [`docfeed_core`]: argument parsing, YAML config loading with
//! environment-secret injection, and wiring of the concrete HTTP
//! implementations into the sync pipeline.

pub mod cli;
pub mod load_config;
