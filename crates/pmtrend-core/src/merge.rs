use std::collections::HashSet;

use pmtrend_parser::{BoundDataset, Schema};
use tracing::info;

use crate::dataset::{MergedDataset, MergedRow, Period};
use crate::error::{PipelineError, Result};

/// Concatenates bound datasets in the order supplied, tagging every row with its period.
/// All schemas must match the first one exactly; no rows are deduplicated or joined.
pub fn merge<I>(sources: I) -> Result<MergedDataset>
where
    I: IntoIterator<Item = (Period, BoundDataset)>,
{
    let mut schema: Option<Schema> = None;
    let mut seen: HashSet<Period> = HashSet::new();
    let mut periods = Vec::new();
    let mut rows = Vec::new();
    let mut reports = Vec::new();

    for (period, bound) in sources {
        if !seen.insert(period.clone()) {
            return Err(PipelineError::DuplicatePeriod(period));
        }

        match &schema {
            None => schema = Some(bound.schema.clone()),
            Some(expected) if *expected != bound.schema => {
                return Err(PipelineError::SchemaMismatch {
                    period,
                    expected: expected.names().to_vec(),
                    found: bound.schema.names().to_vec(),
                });
            }
            Some(_) => {}
        }

        info!(
            period = %period,
            rows = bound.observations.len(),
            "merging period"
        );

        rows.reserve(bound.observations.len());
        rows.extend(bound.observations.into_iter().map(|observation| MergedRow {
            period: period.clone(),
            observation,
        }));
        reports.push((period.clone(), bound.report));
        periods.push(period);
    }

    Ok(MergedDataset::new(
        schema.unwrap_or_default(),
        periods,
        rows,
        reports,
    ))
}
