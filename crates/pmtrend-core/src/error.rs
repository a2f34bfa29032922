use pmtrend_parser::ParserError;
use thiserror::Error;

use crate::dataset::Period;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("schema mismatch for period {period}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        period: Period,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("period {0} was supplied more than once")]
    DuplicatePeriod(Period),

    #[error("period {0} is not present in the merged dataset")]
    UnknownPeriod(Period),

    #[error("no period file could be loaded")]
    NoData,

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
