pub mod binder;
pub mod errors;
pub mod model;
pub mod reader;
pub mod schema;

pub use binder::{bind_file, bind_reader, bind_str, Binder, FieldMap};
pub use errors::ParserError;
pub use model::{
    ArityIssue, BoundDataset, CoercionCounts, Column, IngestReport, Observation, RawRecord,
    SiteKey, UndecodableLine,
};
pub use reader::{DelimitedReader, HeaderSource, RawRecords, ReaderOptions};
pub use schema::{sanitize_name, Schema};
