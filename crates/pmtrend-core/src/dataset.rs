use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use pmtrend_parser::{IngestReport, Observation, Schema, SiteKey};
use serde::{Deserialize, Serialize};

/// Tag naming the extract a row came from, e.g. `"1999"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(Arc<str>);

impl Period {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Period {
    fn from(value: &str) -> Self {
        Period::new(value)
    }
}

impl From<String> for Period {
    fn from(value: String) -> Self {
        Period::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRow {
    pub period: Period,
    pub observation: Observation,
}

/// Union of every period's bound rows, in supply order then source row order.
/// Never mutated after [`crate::merge::merge`] builds it.
#[derive(Debug, Clone)]
pub struct MergedDataset {
    schema: Schema,
    periods: Vec<Period>,
    rows: Vec<MergedRow>,
    reports: Vec<(Period, IngestReport)>,
}

impl MergedDataset {
    pub(crate) fn new(
        schema: Schema,
        periods: Vec<Period>,
        rows: Vec<MergedRow>,
        reports: Vec<(Period, IngestReport)>,
    ) -> Self {
        Self {
            schema,
            periods,
            rows,
            reports,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn has_period(&self, period: &Period) -> bool {
        self.periods.contains(period)
    }

    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ingest_reports(&self) -> &[(Period, IngestReport)] {
        &self.reports
    }

    pub fn ingest_report(&self, period: &Period) -> Option<&IngestReport> {
        self.reports
            .iter()
            .find(|(candidate, _)| candidate == period)
            .map(|(_, report)| report)
    }

    pub fn view(&self) -> DatasetView<'_> {
        DatasetView {
            rows: self.rows.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint<'a> {
    pub period: &'a Period,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Borrowed, read-only subset of a [`MergedDataset`].
#[derive(Debug, Clone, Default)]
pub struct DatasetView<'a> {
    rows: Vec<&'a MergedRow>,
}

impl<'a> DatasetView<'a> {
    pub fn from_rows(rows: Vec<&'a MergedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a MergedRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MergedRow> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn filter<F>(&self, mut predicate: F) -> DatasetView<'a>
    where
        F: FnMut(&MergedRow) -> bool,
    {
        DatasetView {
            rows: self.iter().filter(|row| predicate(row)).collect(),
        }
    }

    pub fn filter_period(&self, period: &Period) -> DatasetView<'a> {
        self.filter(|row| &row.period == period)
    }

    pub fn filter_state(&self, state_code: u32) -> DatasetView<'a> {
        self.filter(|row| row.observation.state_code == Some(state_code))
    }

    pub fn filter_site(&self, site: SiteKey) -> DatasetView<'a> {
        self.filter(|row| row.observation.site_key() == Some(site))
    }

    pub fn filter_month(&self, month: u32) -> DatasetView<'a> {
        self.filter(|row| row.observation.month() == Some(month))
    }

    /// Distinct periods in order of first appearance.
    pub fn periods(&self) -> Vec<&'a Period> {
        let mut seen: Vec<&'a Period> = Vec::new();
        for row in self.iter() {
            if !seen.contains(&&row.period) {
                seen.push(&row.period);
            }
        }
        seen
    }

    /// Dated points for one monitor, sorted by period then date. Rows without a date
    /// cannot be placed on a time axis and are left out.
    pub fn site_series(&self, site: SiteKey) -> Vec<SeriesPoint<'a>> {
        let mut points: Vec<SeriesPoint<'a>> = self
            .iter()
            .filter(|row| row.observation.site_key() == Some(site))
            .filter_map(|row| {
                Some(SeriesPoint {
                    period: &row.period,
                    date: row.observation.date?,
                    value: row.observation.value,
                })
            })
            .collect();
        points.sort_by(|a, b| a.period.cmp(b.period).then(a.date.cmp(&b.date)));
        points
    }
}
