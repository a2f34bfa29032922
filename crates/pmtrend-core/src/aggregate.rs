use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pmtrend_parser::{Observation, SiteKey};
use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetView, MergedRow, Period};
use crate::stats::{describe, FiveNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Period,
    State,
    Site,
    Month,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Period => "period",
            GroupBy::State => "state",
            GroupBy::Site => "site",
            GroupBy::Month => "month",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "period" | "year" => Ok(GroupBy::Period),
            "state" => Ok(GroupBy::State),
            "site" | "monitor" => Ok(GroupBy::Site),
            "month" => Ok(GroupBy::Month),
            other => Err(format!(
                "unknown grouping '{other}' (expected period, state, site or month)"
            )),
        }
    }
}

/// Only the selected dimensions are populated; a selected dimension whose value is
/// missing on the row is also `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub period: Option<Period>,
    pub state: Option<u32>,
    pub site: Option<SiteKey>,
    pub month: Option<u32>,
}

impl GroupKey {
    pub fn for_row(row: &MergedRow, dimensions: &[GroupBy]) -> Self {
        let mut key = GroupKey::default();
        for dimension in dimensions {
            match dimension {
                GroupBy::Period => key.period = Some(row.period.clone()),
                GroupBy::State => key.state = row.observation.state_code,
                GroupBy::Site => key.site = row.observation.site_key(),
                GroupBy::Month => key.month = row.observation.month(),
            }
        }
        key
    }

    /// The same key with the period dimension cleared.
    pub fn without_period(&self) -> Self {
        GroupKey {
            period: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(period) = &self.period {
            parts.push(format!("period={period}"));
        }
        if let Some(state) = self.state {
            parts.push(format!("state={state:02}"));
        }
        if let Some(site) = self.site {
            parts.push(format!("site={site}"));
        }
        if let Some(month) = self.month {
            parts.push(format!("month={month:02}"));
        }
        if parts.is_empty() {
            f.write_str("all")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub observations: usize,
    pub present: usize,
    pub missing: usize,
    pub missing_rate: f64,
    pub mean: Option<f64>,
    pub five_number: Option<FiveNumber>,
    pub negative: usize,
    pub negative_rate: Option<f64>,
}

impl GroupSummary {
    fn from_values(key: GroupKey, values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let observations = values.len();
        let missing = observations - present.len();
        let description = describe(&present);

        GroupSummary {
            key,
            observations,
            present: present.len(),
            missing,
            missing_rate: if observations == 0 {
                0.0
            } else {
                missing as f64 / observations as f64
            },
            mean: description.map(|d| d.mean),
            five_number: description.map(|d| d.five_number),
            negative: description.map_or(0, |d| d.negative),
            negative_rate: description.map(|d| d.negative_rate()),
        }
    }

    pub fn median(&self) -> Option<f64> {
        self.five_number.map(|five| five.median)
    }

    /// True when no present value fell in the group.
    pub fn is_empty(&self) -> bool {
        self.present == 0
    }

    /// `(key, field, value)` rows for charting collaborators.
    pub fn triples(&self) -> Vec<(&GroupKey, &'static str, Option<f64>)> {
        let five = self.five_number;
        [
            ("observations", Some(self.observations as f64)),
            ("present", Some(self.present as f64)),
            ("missing", Some(self.missing as f64)),
            ("missing_rate", Some(self.missing_rate)),
            ("mean", self.mean),
            ("min", five.map(|f| f.min)),
            ("q1", five.map(|f| f.q1)),
            ("median", five.map(|f| f.median)),
            ("q3", five.map(|f| f.q3)),
            ("max", five.map(|f| f.max)),
            ("negative_rate", self.negative_rate),
        ]
        .into_iter()
        .map(|(field, value)| (&self.key, field, value))
        .collect()
    }
}

pub fn summarize(view: &DatasetView<'_>, dimensions: &[GroupBy]) -> Vec<GroupSummary> {
    summarize_field(view, dimensions, |observation| observation.value)
}

/// Groups rows by exact key equality and summarizes `field` per group, in ascending key
/// order. Missing values count toward `missing` only; negatives stay in every statistic.
pub fn summarize_field<F>(
    view: &DatasetView<'_>,
    dimensions: &[GroupBy],
    field: F,
) -> Vec<GroupSummary>
where
    F: Fn(&Observation) -> Option<f64>,
{
    let mut groups: BTreeMap<GroupKey, Vec<Option<f64>>> = BTreeMap::new();
    for row in view.iter() {
        groups
            .entry(GroupKey::for_row(row, dimensions))
            .or_default()
            .push(field(&row.observation));
    }

    groups
        .into_iter()
        .map(|(key, values)| GroupSummary::from_values(key, &values))
        .collect()
}
