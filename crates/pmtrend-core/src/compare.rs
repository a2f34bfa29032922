use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::{summarize, GroupBy, GroupKey, GroupSummary};
use crate::dataset::{DatasetView, Period};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    #[default]
    Mean,
    Median,
}

impl Statistic {
    pub fn of(&self, summary: &GroupSummary) -> Option<f64> {
        match self {
            Statistic::Mean => summary.mean,
            Statistic::Median => summary.median(),
        }
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            other => Err(format!("unknown statistic '{other}' (expected mean or median)")),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Mean => f.write_str("mean"),
            Statistic::Median => f.write_str("median"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Decreased,
    Increased,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedComparison {
    pub key: GroupKey,
    pub first: f64,
    pub second: f64,
    pub change: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonTally {
    pub decreased: usize,
    pub increased: usize,
    pub unchanged: usize,
}

impl ComparisonTally {
    pub fn from_comparisons(comparisons: &[PairedComparison]) -> Self {
        let mut tally = ComparisonTally::default();
        for comparison in comparisons {
            match comparison.direction {
                Direction::Decreased => tally.decreased += 1,
                Direction::Increased => tally.increased += 1,
                Direction::Unchanged => tally.unchanged += 1,
            }
        }
        tally
    }
}

/// Pairs `stat` per `dimension` group between two periods. Only groups with a defined
/// statistic in both periods are kept.
pub fn compare_periods(
    view: &DatasetView<'_>,
    dimension: GroupBy,
    first: &Period,
    second: &Period,
    stat: Statistic,
) -> Result<Vec<PairedComparison>> {
    if dimension == GroupBy::Period {
        return Err(PipelineError::Validation(
            "periods cannot be compared along the period dimension".to_string(),
        ));
    }

    let mut firsts: BTreeMap<GroupKey, f64> = BTreeMap::new();
    let mut seconds: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for summary in summarize(view, &[GroupBy::Period, dimension]) {
        let Some(value) = stat.of(&summary) else {
            continue;
        };
        match summary.key.period.as_ref() {
            Some(period) if period == first => {
                firsts.insert(summary.key.without_period(), value);
            }
            Some(period) if period == second => {
                seconds.insert(summary.key.without_period(), value);
            }
            _ => {}
        }
    }

    Ok(firsts
        .into_iter()
        .filter_map(|(key, before)| {
            let after = *seconds.get(&key)?;
            let change = after - before;
            let direction = if change < 0.0 {
                Direction::Decreased
            } else if change > 0.0 {
                Direction::Increased
            } else {
                Direction::Unchanged
            };
            Some(PairedComparison {
                key,
                first: before,
                second: after,
                change,
                direction,
            })
        })
        .collect())
}
