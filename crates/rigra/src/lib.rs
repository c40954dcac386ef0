#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/seanaller/rigra-survey/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;

// Re-export main types from sub-crates
pub use rigra_data as data;
pub use rigra_metrics as metrics;
pub use rigra_output as output;

pub use dashboard::SurveyDashboard;
pub use error::{Error, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
