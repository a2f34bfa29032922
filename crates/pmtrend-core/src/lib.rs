pub mod aggregate;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frames;
pub mod merge;
pub mod overlap;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod stats;

pub use dataset::{DatasetView, MergedDataset, MergedRow, Period, SeriesPoint};
pub use error::{PipelineError, Result};
