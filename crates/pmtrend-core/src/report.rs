use std::collections::BTreeMap;

use pmtrend_parser::{Column, SiteKey};
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::{summarize, GroupBy};
use crate::compare::{compare_periods, ComparisonTally, Statistic};
use crate::dataset::{MergedDataset, Period};
use crate::error::{PipelineError, Result};
use crate::overlap::{resolve_overlap, RankBy};
use crate::quality::missing_rate;

/// Computed values addressable by dotted key, for narrative interpolation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportValues {
    values: BTreeMap<String, Value>,
}

impl ReportValues {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Stores `None` as JSON null so the key still resolves.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.values
            .insert(key.into(), value.map_or(Value::Null, Value::from));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub first: Option<Period>,
    pub second: Option<Period>,
    pub state: Option<u32>,
    pub site: Option<SiteKey>,
    pub rank: RankBy,
}

/// Resolves the comparison periods, defaulting to the first and last supplied. The two
/// must differ.
pub fn comparison_periods(
    dataset: &MergedDataset,
    first: Option<Period>,
    second: Option<Period>,
) -> Result<(Period, Period)> {
    let periods = dataset.periods();
    let first = match first {
        Some(period) => period,
        None => periods.first().cloned().ok_or(PipelineError::NoData)?,
    };
    let second = match second {
        Some(period) => period,
        None => periods.last().cloned().ok_or(PipelineError::NoData)?,
    };
    for period in [&first, &second] {
        if !dataset.has_period(period) {
            return Err(PipelineError::UnknownPeriod(period.clone()));
        }
    }
    if first == second {
        return Err(PipelineError::Validation(format!(
            "period {first} cannot be compared with itself"
        )));
    }
    Ok((first, second))
}

pub fn standard_report(dataset: &MergedDataset, options: &ReportOptions) -> Result<ReportValues> {
    let mut report = ReportValues::default();
    let all = dataset.view();

    for summary in summarize(&all, &[GroupBy::Period]) {
        let Some(period) = summary.key.period.as_ref() else {
            continue;
        };
        let prefix = format!("period.{period}");
        report.insert(format!("{prefix}.rows"), summary.observations);
        report.insert(format!("{prefix}.present"), summary.present);
        report.insert(format!("{prefix}.missing_rate"), summary.missing_rate);
        report.insert_opt(format!("{prefix}.mean"), summary.mean);
        report.insert_opt(format!("{prefix}.median"), summary.median());
        report.insert_opt(format!("{prefix}.negative_rate"), summary.negative_rate);
        report.insert_opt(
            format!("{prefix}.date_missing_rate"),
            missing_rate(&all.filter_period(period), Column::Date),
        );
    }

    if dataset.periods().len() < 2 {
        return Ok(report);
    }
    let (first, second) =
        comparison_periods(dataset, options.first.clone(), options.second.clone())?;
    report.insert("compare.first", first.as_str());
    report.insert("compare.second", second.as_str());

    let by_state = compare_periods(&all, GroupBy::State, &first, &second, Statistic::Mean)?;
    let tally = ComparisonTally::from_comparisons(&by_state);
    report.insert("compare.state.count", by_state.len());
    report.insert("compare.state.decreased", tally.decreased);
    report.insert("compare.state.increased", tally.increased);
    report.insert("compare.state.unchanged", tally.unchanged);

    if let Some(state) = options.state {
        let candidates =
            resolve_overlap(&all.filter_state(state), &first, &second, options.rank);
        let prefix = format!("overlap.{state:02}");
        report.insert(format!("{prefix}.count"), candidates.len());
        report.insert(
            format!("{prefix}.sites"),
            candidates
                .iter()
                .map(|candidate| candidate.site.to_string())
                .collect::<Vec<_>>(),
        );
        if let Some(top) = candidates.first() {
            report.insert(format!("{prefix}.top_site"), top.site.to_string());
        }
    }

    if let Some(site) = options.site {
        let site_view = all.filter_site(site);
        for summary in summarize(&site_view, &[GroupBy::Period]) {
            let Some(period) = summary.key.period.as_ref() else {
                continue;
            };
            let prefix = format!("site.{site}.{period}");
            report.insert(format!("{prefix}.observations"), summary.observations);
            report.insert_opt(format!("{prefix}.mean"), summary.mean);
            report.insert_opt(format!("{prefix}.median"), summary.median());
        }
    }

    Ok(report)
}
