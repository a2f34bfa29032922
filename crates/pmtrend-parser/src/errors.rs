use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error near line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Recoverable: only the offending line is lost.
    #[error("line {line} is not valid UTF-8 (field {field})")]
    Undecodable { line: u64, field: usize },

    #[error("delimiter and comment prefix must be single ASCII characters, got '{0}'")]
    InvalidOption(char),

    #[error("file did not contain a header line")]
    MissingHeader,

    #[error("{role} column '{column}' is not present in the header")]
    MissingColumn { role: &'static str, column: String },
}
