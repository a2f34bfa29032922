use std::collections::BTreeMap;

use pmtrend_parser::{Column, IngestReport};
use serde::{Deserialize, Serialize};

use crate::aggregate::{summarize, GroupBy};
use crate::dataset::{DatasetView, MergedDataset, Period};

/// Share of rows whose `column` is explicitly missing; `None` for an empty view.
pub fn missing_rate(view: &DatasetView<'_>, column: Column) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    let missing = view
        .iter()
        .filter(|row| row.observation.is_missing(column))
        .count();
    Some(missing as f64 / view.len() as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodQuality {
    pub period: Period,
    pub rows: usize,
    pub missing_rates: BTreeMap<Column, f64>,
    pub negative: usize,
    pub negative_rate: Option<f64>,
    pub negatives_by_month: BTreeMap<u32, usize>,
    pub ingest: Option<IngestReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub periods: Vec<PeriodQuality>,
}

pub fn audit(dataset: &MergedDataset) -> QualityReport {
    let all = dataset.view();
    let periods = dataset
        .periods()
        .iter()
        .map(|period| {
            let view = all.filter_period(period);
            let missing_rates = Column::ALL
                .iter()
                .filter_map(|column| missing_rate(&view, *column).map(|rate| (*column, rate)))
                .collect();

            let overall = summarize(&view, &[]);
            let (negative, negative_rate) = overall
                .first()
                .map_or((0, None), |summary| (summary.negative, summary.negative_rate));

            let negatives_by_month = summarize(&view, &[GroupBy::Month])
                .into_iter()
                .filter(|summary| summary.negative > 0)
                .filter_map(|summary| Some((summary.key.month?, summary.negative)))
                .collect();

            PeriodQuality {
                period: period.clone(),
                rows: view.len(),
                missing_rates,
                negative,
                negative_rate,
                negatives_by_month,
                ingest: dataset.ingest_report(period).cloned(),
            }
        })
        .collect();

    QualityReport { periods }
}

/// Caller-supplied acceptance limits. An unset limit makes no judgment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    pub max_missing_rate: Option<f64>,
    pub max_negative_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyBreach {
    pub period: Period,
    pub metric: String,
    pub observed: f64,
    pub limit: f64,
}

impl QualityPolicy {
    pub fn evaluate(&self, report: &QualityReport) -> Vec<PolicyBreach> {
        let mut breaches = Vec::new();
        for period in &report.periods {
            if let Some(limit) = self.max_missing_rate {
                for (column, observed) in &period.missing_rates {
                    if *observed > limit {
                        breaches.push(PolicyBreach {
                            period: period.period.clone(),
                            metric: format!("missing_rate.{column}"),
                            observed: *observed,
                            limit,
                        });
                    }
                }
            }
            if let (Some(limit), Some(observed)) = (self.max_negative_rate, period.negative_rate) {
                if observed > limit {
                    breaches.push(PolicyBreach {
                        period: period.period.clone(),
                        metric: "negative_rate".to_string(),
                        observed,
                        limit,
                    });
                }
            }
        }
        breaches
    }
}
