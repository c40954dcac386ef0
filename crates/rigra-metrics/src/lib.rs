#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/seanaller/rigra-survey/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod explorer;
pub mod feedback;
pub mod registry;
pub mod sentiment;
pub mod summary;
pub mod topics;
pub mod util;

pub use error::{MetricsError, Result};
pub use explorer::{ExplorerFilter, ExplorerRow, ExplorerView, ValueRange, explore};
pub use feedback::{BuildingAverages, CategoryAverage, FeedbackOverview, NpsBand, QuestionMapping};
pub use registry::{
    MetricInfo, MetricKind, MetricPage, MetricUnit, MetricValue, available_metrics, evaluate,
    get_metric_info, metrics_by_page,
};
pub use sentiment::{CategoryCount, PolarityCount, SentimentBreakdown};
pub use summary::{BreakdownRow, ResidentOverview};
pub use topics::{Topic, TopicGroup};
