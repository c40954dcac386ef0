//! Fetching raw sheet payloads.
//!
//! A [`SheetSource`] turns a [`SheetKind`](crate::schema::SheetKind) into CSV text.
//! The provider layers caching and parsing on top.

pub mod client;
pub mod source;

pub use client::{GoogleSheetsClient, csv_export_url};
pub use source::{CsvDirSource, GoogleSheetsSource, MemorySource, SheetSource};
