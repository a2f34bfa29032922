#![allow(dead_code)]

use std::path::PathBuf;

use pmtrend_core::merge::merge;
use pmtrend_core::{MergedDataset, Period};
use pmtrend_parser::{bind_str, BoundDataset, FieldMap, ReaderOptions};

pub const HEADER: &str = "State Code|County Code|Site ID|Date|Sample Value";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

pub fn bound(rows: &[&str]) -> BoundDataset {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    bind_str(&content, &ReaderOptions::default(), &FieldMap::default()).expect("bind failed")
}

pub fn merged(periods: Vec<(&str, Vec<&str>)>) -> MergedDataset {
    merge(
        periods
            .into_iter()
            .map(|(label, rows)| (Period::new(label), bound(&rows))),
    )
    .expect("merge failed")
}

pub fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|value| (value - expected).abs() < 1e-9)
}
