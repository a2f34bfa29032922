use pmtrend_parser::{bind_file, BoundDataset, FieldMap, ParserError, ReaderOptions};
use tracing::{info, warn};

use crate::config::{PeriodSource, PipelineConfig};
use crate::dataset::{MergedDataset, Period};
use crate::error::{PipelineError, Result};
use crate::merge::merge;

#[derive(Debug)]
pub struct PeriodFailure {
    pub period: Period,
    pub error: PipelineError,
}

#[derive(Debug)]
pub struct PipelineRun {
    pub dataset: MergedDataset,
    pub failures: Vec<PeriodFailure>,
}

pub fn load_period(
    source: &PeriodSource,
    reader: &ReaderOptions,
    fields: &FieldMap,
) -> Result<BoundDataset> {
    Ok(bind_file(&source.path, reader, fields)?)
}

/// Loads every configured period and merges what could be read. A period whose file
/// cannot be opened or read is recorded in `failures`; any other error aborts the run.
pub fn run(config: &PipelineConfig) -> Result<PipelineRun> {
    let mut loaded = Vec::with_capacity(config.periods.len());
    let mut failures = Vec::new();

    for source in &config.periods {
        let period = Period::new(&source.label);
        match load_period(source, &config.reader, &config.fields) {
            Ok(bound) => loaded.push((period, bound)),
            Err(
                error @ PipelineError::Parser(
                    ParserError::FileAccess { .. } | ParserError::Csv { .. },
                ),
            ) => {
                warn!(period = %period, error = %error, "skipping unreadable period file");
                failures.push(PeriodFailure { period, error });
            }
            Err(error) => return Err(error),
        }
    }

    if loaded.is_empty() {
        return Err(PipelineError::NoData);
    }

    let dataset = merge(loaded)?;
    info!(
        periods = dataset.periods().len(),
        rows = dataset.len(),
        failed = failures.len(),
        "pipeline loaded"
    );

    Ok(PipelineRun { dataset, failures })
}
