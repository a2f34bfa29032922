use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// One delimited line. `None` fields carry the explicit-missing marker.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    pub fields: Vec<Option<String>>,
}

impl RawRecord {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|field| field.as_deref())
    }
}

/// Physical monitor identity. Codes are compared, never used arithmetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteKey {
    pub state_code: u32,
    pub county_code: u32,
    pub site_id: u32,
}

impl SiteKey {
    pub fn new(state_code: u32, county_code: u32, site_id: u32) -> Self {
        Self {
            state_code,
            county_code,
            site_id,
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:03}-{:04}",
            self.state_code, self.county_code, self.site_id
        )
    }
}

impl FromStr for SiteKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value
            .trim()
            .split(|c| c == '-' || c == '.' || c == ':')
            .collect();
        let [state, county, site] = parts.as_slice() else {
            return Err(format!(
                "site key must look like STATE-COUNTY-SITE, got '{value}'"
            ));
        };
        let parse = |part: &str, name: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|err| format!("invalid {name} in site key '{value}': {err}"))
        };
        Ok(SiteKey::new(
            parse(state, "state code")?,
            parse(county, "county code")?,
            parse(site, "site id")?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    StateCode,
    CountyCode,
    SiteId,
    Date,
    Value,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::StateCode,
        Column::CountyCode,
        Column::SiteId,
        Column::Date,
        Column::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::StateCode => "state_code",
            Column::CountyCode => "county_code",
            Column::SiteId => "site_id",
            Column::Date => "date",
            Column::Value => "value",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound, typed monitoring record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub state_code: Option<u32>,
    pub county_code: Option<u32>,
    pub site_id: Option<u32>,
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
}

impl Observation {
    pub fn site_key(&self) -> Option<SiteKey> {
        match (self.state_code, self.county_code, self.site_id) {
            (Some(state), Some(county), Some(site)) => Some(SiteKey::new(state, county, site)),
            _ => None,
        }
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|date| date.month())
    }

    pub fn is_missing(&self, column: Column) -> bool {
        match column {
            Column::StateCode => self.state_code.is_none(),
            Column::CountyCode => self.county_code.is_none(),
            Column::SiteId => self.site_id.is_none(),
            Column::Date => self.date.is_none(),
            Column::Value => self.value.is_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityIssue {
    pub line: u64,
    pub expected: usize,
    pub found: usize,
}

/// A data line rejected because a field was not valid UTF-8. `field` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndecodableLine {
    pub line: u64,
    pub field: usize,
}

/// Fields that were present in the source but failed type coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionCounts {
    pub state_code: usize,
    pub county_code: usize,
    pub site_id: usize,
    pub date: usize,
    pub value: usize,
}

impl CoercionCounts {
    pub fn record(&mut self, column: Column) {
        match column {
            Column::StateCode => self.state_code += 1,
            Column::CountyCode => self.county_code += 1,
            Column::SiteId => self.site_id += 1,
            Column::Date => self.date += 1,
            Column::Value => self.value += 1,
        }
    }

    pub fn get(&self, column: Column) -> usize {
        match column {
            Column::StateCode => self.state_code,
            Column::CountyCode => self.county_code,
            Column::SiteId => self.site_id,
            Column::Date => self.date,
            Column::Value => self.value,
        }
    }

    pub fn total(&self) -> usize {
        Column::ALL.iter().map(|column| self.get(*column)).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub source: Option<String>,
    pub file_hash: Option<String>,
    pub comment_lines: usize,
    pub data_lines: usize,
    pub retained: usize,
    pub arity_issues: Vec<ArityIssue>,
    #[serde(default)]
    pub undecodable: Vec<UndecodableLine>,
    pub coercion_failures: CoercionCounts,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.arity_issues.len() + self.undecodable.len()
    }
}

#[derive(Debug, Clone)]
pub struct BoundDataset {
    pub schema: Schema,
    pub observations: Vec<Observation>,
    pub report: IngestReport,
}

impl BoundDataset {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
