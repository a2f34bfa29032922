mod common;

use pmtrend_core::merge::merge;
use pmtrend_core::{Period, PipelineError};
use pmtrend_parser::{bind_str, BoundDataset, FieldMap, ReaderOptions};

use common::{bound, merged};

#[test]
fn merge_concatenates_in_supply_order() {
    let dataset = merged(vec![
        (
            "2012",
            vec![
                "36|063|2008|20120110|2",
                "36|063|2008|20120215|4",
                "36|063|2008|20120420|",
            ],
        ),
        ("1999", vec!["06|037|1103|19990101|30", "06|037|1103|19990104|31"]),
    ]);

    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.periods(), [Period::new("2012"), Period::new("1999")]);

    let tags: Vec<&str> = dataset.rows().iter().map(|row| row.period.as_str()).collect();
    assert_eq!(tags, ["2012", "2012", "2012", "1999", "1999"]);

    let values: Vec<Option<f64>> = dataset
        .rows()
        .iter()
        .map(|row| row.observation.value)
        .collect();
    assert_eq!(
        values,
        [Some(2.0), Some(4.0), None, Some(30.0), Some(31.0)]
    );
}

#[test]
fn merge_keeps_ingest_reports_per_period() {
    let dataset = merged(vec![
        ("1999", vec!["36|063|2008|19990715|5", "36|063|2008|19990716"]),
        ("2012", vec!["36|063|2008|20120110|x"]),
    ]);

    let first = dataset.ingest_report(&Period::new("1999")).expect("1999 report");
    assert_eq!(first.data_lines, 2);
    assert_eq!(first.retained, 1);
    assert_eq!(first.skipped(), 1);

    let second = dataset.ingest_report(&Period::new("2012")).expect("2012 report");
    assert_eq!(second.coercion_failures.value, 1);
    assert!(dataset.ingest_report(&Period::new("2020")).is_none());
}

#[test]
fn merge_rejects_mismatched_schemas() {
    let extra_column = bind_str(
        "State Code|County Code|Site ID|Date|Sample Value|POC\n36|063|2008|20120110|2|1\n",
        &ReaderOptions::default(),
        &FieldMap::default(),
    )
    .expect("bind failed");

    let err = merge(vec![
        (Period::new("1999"), bound(&["36|063|2008|19990715|5"])),
        (Period::new("2012"), extra_column),
    ])
    .expect_err("expected schema mismatch");

    match err {
        PipelineError::SchemaMismatch {
            period,
            expected,
            found,
        } => {
            assert_eq!(period, Period::new("2012"));
            assert_eq!(expected.len(), 5);
            assert_eq!(found.last().map(String::as_str), Some("poc"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn merge_rejects_duplicate_periods() {
    let err = merge(vec![
        (Period::new("1999"), bound(&["36|063|2008|19990715|5"])),
        (Period::new("1999"), bound(&["36|063|2008|19990716|6"])),
    ])
    .expect_err("expected duplicate period");
    assert!(matches!(err, PipelineError::DuplicatePeriod(p) if p.as_str() == "1999"));
}

#[test]
fn merging_nothing_yields_an_empty_dataset() {
    let dataset = merge(Vec::<(Period, BoundDataset)>::new()).expect("empty merge");
    assert!(dataset.is_empty());
    assert!(dataset.periods().is_empty());
    assert!(dataset.schema().is_empty());
}
