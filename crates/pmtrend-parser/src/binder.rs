use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ParserError;
use crate::model::{
    ArityIssue, BoundDataset, CoercionCounts, Column, IngestReport, Observation, RawRecord,
    UndecodableLine,
};
use crate::reader::{DelimitedReader, ReaderOptions};
use crate::schema::Schema;

/// Which sanitized header columns carry the typed observation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub state_code: String,
    pub county_code: String,
    pub site_id: String,
    pub date: String,
    pub value: String,
    pub date_formats: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            state_code: "state_code".to_string(),
            county_code: "county_code".to_string(),
            site_id: "site_id".to_string(),
            date: "date".to_string(),
            value: "sample_value".to_string(),
            date_formats: vec![
                "%Y%m%d".to_string(),
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binder {
    arity: usize,
    state_code: usize,
    county_code: usize,
    site_id: usize,
    date: usize,
    value: usize,
    date_formats: Vec<String>,
}

impl Binder {
    pub fn new(schema: &Schema, fields: &FieldMap) -> Result<Self, ParserError> {
        let resolve = |role: &'static str, column: &str| {
            schema
                .index_of(column)
                .ok_or_else(|| ParserError::MissingColumn {
                    role,
                    column: column.to_string(),
                })
        };

        Ok(Self {
            arity: schema.len(),
            state_code: resolve("state code", &fields.state_code)?,
            county_code: resolve("county code", &fields.county_code)?,
            site_id: resolve("site id", &fields.site_id)?,
            date: resolve("date", &fields.date)?,
            value: resolve("value", &fields.value)?,
            date_formats: fields.date_formats.clone(),
        })
    }

    /// Binds one record. A field that fails to parse becomes missing and is tallied in
    /// `failures`; only a field-count mismatch rejects the record.
    pub fn bind(
        &self,
        record: &RawRecord,
        failures: &mut CoercionCounts,
    ) -> Result<Observation, ArityIssue> {
        if record.len() != self.arity {
            return Err(ArityIssue {
                line: record.line,
                expected: self.arity,
                found: record.len(),
            });
        }

        let state_code = coerce(
            failures,
            Column::StateCode,
            record.get(self.state_code),
            parse_code,
        );
        let county_code = coerce(
            failures,
            Column::CountyCode,
            record.get(self.county_code),
            parse_code,
        );
        let site_id = coerce(failures, Column::SiteId, record.get(self.site_id), parse_code);
        let date = coerce(failures, Column::Date, record.get(self.date), |raw| {
            parse_date(raw, &self.date_formats)
        });
        let value = coerce(failures, Column::Value, record.get(self.value), parse_value);

        Ok(Observation {
            state_code,
            county_code,
            site_id,
            date,
            value,
        })
    }
}

fn coerce<T>(
    failures: &mut CoercionCounts,
    column: Column,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<Option<T>, ()>,
) -> Option<T> {
    match parse(raw?) {
        Ok(value) => value,
        Err(()) => {
            failures.record(column);
            None
        }
    }
}

fn parse_code(raw: &str) -> Result<Option<u32>, ()> {
    raw.trim().parse::<u32>().map(Some).map_err(|_| ())
}

fn parse_date(raw: &str, formats: &[String]) -> Result<Option<NaiveDate>, ()> {
    let trimmed = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(Some)
        .ok_or(())
}

/// Textual NaN is a missing reading rather than a bad cell.
fn parse_value(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        _ => Err(()),
    }
}

pub fn bind_reader<R: Read>(
    reader: DelimitedReader<R>,
    fields: &FieldMap,
) -> Result<BoundDataset, ParserError> {
    let (schema, mut records) = reader.split_header()?;
    let binder = Binder::new(&schema, fields)?;

    let mut observations = Vec::new();
    let mut report = IngestReport::default();

    for record in records.by_ref() {
        let record = match record {
            Ok(record) => record,
            Err(ParserError::Undecodable { line, field }) => {
                warn!(line, field, "skipping line that is not valid UTF-8");
                report.data_lines += 1;
                report.undecodable.push(UndecodableLine { line, field });
                continue;
            }
            Err(err) => return Err(err),
        };
        report.data_lines += 1;
        match binder.bind(&record, &mut report.coercion_failures) {
            Ok(observation) => observations.push(observation),
            Err(issue) => {
                debug!(
                    line = issue.line,
                    expected = issue.expected,
                    found = issue.found,
                    "skipping record with unexpected field count"
                );
                report.arity_issues.push(issue);
            }
        }
    }

    report.comment_lines = records.comment_lines();
    report.retained = observations.len();

    Ok(BoundDataset {
        schema,
        observations,
        report,
    })
}

pub fn bind_str(
    content: &str,
    options: &ReaderOptions,
    fields: &FieldMap,
) -> Result<BoundDataset, ParserError> {
    bind_reader(DelimitedReader::from_text(content, options)?, fields)
}

pub fn bind_file(
    path: &Path,
    options: &ReaderOptions,
    fields: &FieldMap,
) -> Result<BoundDataset, ParserError> {
    let bytes = fs::read(path).map_err(|source| ParserError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let file_hash = blake3::hash(&bytes).to_hex().to_string();

    let mut bound = bind_reader(DelimitedReader::new(bytes.as_slice(), options)?, fields)?;
    bound.report.source = Some(path.display().to_string());
    bound.report.file_hash = Some(file_hash);

    info!(
        path = %path.display(),
        data_lines = bound.report.data_lines,
        retained = bound.report.retained,
        skipped = bound.report.skipped(),
        coerced_to_missing = bound.report.coercion_failures.total(),
        "bound delimited file"
    );

    Ok(bound)
}
