use std::fs::File;
use std::path::Path;

use chrono::Datelike;
use polars::prelude::*;

use crate::aggregate::GroupSummary;
use crate::compare::{Direction, PairedComparison};
use crate::dataset::DatasetView;
use crate::error::Result;

// 1970-01-01 counted from 0001-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One row per observation with the period tag, for charting and export.
pub fn dataset_frame(view: &DatasetView<'_>) -> PolarsResult<DataFrame> {
    let len = view.len();
    let mut period: Vec<&str> = Vec::with_capacity(len);
    let mut state_code: Vec<Option<u32>> = Vec::with_capacity(len);
    let mut county_code: Vec<Option<u32>> = Vec::with_capacity(len);
    let mut site_id: Vec<Option<u32>> = Vec::with_capacity(len);
    let mut date: Vec<Option<i32>> = Vec::with_capacity(len);
    let mut value: Vec<Option<f64>> = Vec::with_capacity(len);

    for row in view.iter() {
        let observation = &row.observation;
        period.push(row.period.as_str());
        state_code.push(observation.state_code);
        county_code.push(observation.county_code);
        site_id.push(observation.site_id);
        date.push(
            observation
                .date
                .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        );
        value.push(observation.value);
    }

    let date = Series::new("date".into(), date).cast(&DataType::Date)?;

    DataFrame::new(vec![
        Series::new("period".into(), period).into(),
        Series::new("state_code".into(), state_code).into(),
        Series::new("county_code".into(), county_code).into(),
        Series::new("site_id".into(), site_id).into(),
        date.into(),
        Series::new("value".into(), value).into(),
    ])
}

pub fn summary_frame(summaries: &[GroupSummary]) -> PolarsResult<DataFrame> {
    let period: Vec<Option<&str>> = summaries
        .iter()
        .map(|s| s.key.period.as_ref().map(|p| p.as_str()))
        .collect();
    let state: Vec<Option<u32>> = summaries.iter().map(|s| s.key.state).collect();
    let site: Vec<Option<String>> = summaries
        .iter()
        .map(|s| s.key.site.map(|site| site.to_string()))
        .collect();
    let month: Vec<Option<u32>> = summaries.iter().map(|s| s.key.month).collect();
    let five = |pick: fn(&crate::stats::FiveNumber) -> f64| -> Vec<Option<f64>> {
        summaries
            .iter()
            .map(|s| s.five_number.as_ref().map(pick))
            .collect()
    };

    DataFrame::new(vec![
        Series::new("period".into(), period).into(),
        Series::new("state_code".into(), state).into(),
        Series::new("site".into(), site).into(),
        Series::new("month".into(), month).into(),
        Series::new(
            "observations".into(),
            summaries.iter().map(|s| s.observations as u64).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "present".into(),
            summaries.iter().map(|s| s.present as u64).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "missing_rate".into(),
            summaries.iter().map(|s| s.missing_rate).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "mean".into(),
            summaries.iter().map(|s| s.mean).collect::<Vec<_>>(),
        )
        .into(),
        Series::new("min".into(), five(|f| f.min)).into(),
        Series::new("q1".into(), five(|f| f.q1)).into(),
        Series::new("median".into(), five(|f| f.median)).into(),
        Series::new("q3".into(), five(|f| f.q3)).into(),
        Series::new("max".into(), five(|f| f.max)).into(),
        Series::new(
            "negative_rate".into(),
            summaries.iter().map(|s| s.negative_rate).collect::<Vec<_>>(),
        )
        .into(),
    ])
}

pub fn comparison_frame(comparisons: &[PairedComparison]) -> PolarsResult<DataFrame> {
    let key: Vec<String> = comparisons.iter().map(|c| c.key.to_string()).collect();
    let direction: Vec<&str> = comparisons
        .iter()
        .map(|c| match c.direction {
            Direction::Decreased => "decreased",
            Direction::Increased => "increased",
            Direction::Unchanged => "unchanged",
        })
        .collect();

    DataFrame::new(vec![
        Series::new("key".into(), key).into(),
        Series::new(
            "first".into(),
            comparisons.iter().map(|c| c.first).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "second".into(),
            comparisons.iter().map(|c| c.second).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "change".into(),
            comparisons.iter().map(|c| c.change).collect::<Vec<_>>(),
        )
        .into(),
        Series::new("direction".into(), direction).into(),
    ])
}

pub fn write_parquet(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut df = df.clone();
    ParquetWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
