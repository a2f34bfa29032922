use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use pmtrend_parser::SiteKey;
use serde::{Deserialize, Serialize};

use crate::aggregate::{summarize, GroupBy};
use crate::dataset::{DatasetView, Period};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// Smaller of the two per-period counts, so sites rich in both periods lead.
    #[default]
    Weakest,
    Total,
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weakest" | "min" => Ok(RankBy::Weakest),
            "total" | "sum" => Ok(RankBy::Total),
            other => Err(format!("unknown ranking '{other}' (expected weakest or total)")),
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBy::Weakest => f.write_str("weakest"),
            RankBy::Total => f.write_str("total"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlapCandidate {
    pub site: SiteKey,
    pub first_count: usize,
    pub second_count: usize,
}

impl OverlapCandidate {
    pub fn total(&self) -> usize {
        self.first_count + self.second_count
    }

    pub fn weakest(&self) -> usize {
        self.first_count.min(self.second_count)
    }

    fn score(&self, rank: RankBy) -> usize {
        match rank {
            RankBy::Weakest => self.weakest(),
            RankBy::Total => self.total(),
        }
    }
}

fn sites_in(view: &DatasetView<'_>, period: &Period) -> BTreeSet<SiteKey> {
    view.iter()
        .filter(|row| &row.period == period)
        .filter_map(|row| row.observation.site_key())
        .collect()
}

/// Site keys observed in both periods. Rows without a complete key are ignored.
pub fn overlap_sites(view: &DatasetView<'_>, first: &Period, second: &Period) -> BTreeSet<SiteKey> {
    let first_sites = sites_in(view, first);
    let second_sites = sites_in(view, second);
    first_sites.intersection(&second_sites).copied().collect()
}

/// Overlapping sites with their per-period observation counts, best first. Which one to
/// use is left to the caller.
pub fn resolve_overlap(
    view: &DatasetView<'_>,
    first: &Period,
    second: &Period,
    rank: RankBy,
) -> Vec<OverlapCandidate> {
    let shared = overlap_sites(view, first, second);
    if shared.is_empty() {
        return Vec::new();
    }

    let paired = view.filter(|row| {
        (&row.period == first || &row.period == second)
            && row
                .observation
                .site_key()
                .is_some_and(|site| shared.contains(&site))
    });

    let mut counts: BTreeMap<SiteKey, (usize, usize)> = BTreeMap::new();
    for summary in summarize(&paired, &[GroupBy::Period, GroupBy::Site]) {
        let (Some(period), Some(site)) = (summary.key.period.as_ref(), summary.key.site) else {
            continue;
        };
        let entry = counts.entry(site).or_default();
        if period == first {
            entry.0 += summary.observations;
        } else if period == second {
            entry.1 += summary.observations;
        }
    }

    let mut candidates: Vec<OverlapCandidate> = counts
        .into_iter()
        .map(|(site, (first_count, second_count))| OverlapCandidate {
            site,
            first_count,
            second_count,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score(rank)
            .cmp(&a.score(rank))
            .then_with(|| b.total().cmp(&a.total()))
            .then_with(|| a.site.cmp(&b.site))
    });
    candidates
}
