//! Integration test modules

pub mod edits;
pub mod ingest;
pub mod persistence;
pub mod project;
