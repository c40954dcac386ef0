//! Glue between the command line and the survey crates.
//!
//! Resolves configuration and cache locations, and builds the sheet source the
//! user asked for.

pub(crate) mod cache_manager;
pub(crate) mod settings;
