//! Data models shared across the extraction pipeline.

pub mod config;
pub mod record;
