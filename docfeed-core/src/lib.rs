#![doc = "docfeed-core: core logic library for docfeed."]

//! This crate contains all connector logic, data models and pipelines for docfeed:
//! credential acquisition, source fetching, document normalisation, batched upload
//! and sync-job orchestration. CLI glue and config-file parsing live in the
//! `docfeed` binary crate.
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, client, config, and sync code.

pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod contract;
pub mod document;
pub mod ratelimit;
pub mod source;
pub mod sync;
