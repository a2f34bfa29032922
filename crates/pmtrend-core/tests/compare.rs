mod common;

use pmtrend_core::aggregate::GroupBy;
use pmtrend_core::compare::{compare_periods, ComparisonTally, Direction, Statistic};
use pmtrend_core::{Period, PipelineError};

use common::{approx, merged};

fn dataset() -> pmtrend_core::MergedDataset {
    merged(vec![
        (
            "1999",
            vec![
                "01|027|0001|19990101|20",
                "01|027|0001|19990104|10",
                "06|037|1103|19990101|8",
                "36|063|2008|19990101|12",
                "36|063|2008|19990104|2",
                "36|063|2008|19990107|1",
            ],
        ),
        (
            "2012",
            vec![
                "01|027|0001|20120101|9",
                "06|037|1103|20120101|11",
                "56|021|0001|20120101|3",
                "36|063|2008|20120101|5",
            ],
        ),
    ])
}

#[test]
fn state_means_are_paired_across_periods() {
    let dataset = dataset();
    let comparisons = compare_periods(
        &dataset.view(),
        GroupBy::State,
        &Period::new("1999"),
        &Period::new("2012"),
        Statistic::Mean,
    )
    .expect("comparison");

    let states: Vec<Option<u32>> = comparisons.iter().map(|c| c.key.state).collect();
    assert_eq!(states, [Some(1), Some(6), Some(36)]);
    assert!(comparisons.iter().all(|c| c.key.period.is_none()));

    assert_eq!(comparisons[0].first, 15.0);
    assert_eq!(comparisons[0].second, 9.0);
    assert_eq!(comparisons[0].direction, Direction::Decreased);
    assert_eq!(comparisons[1].direction, Direction::Increased);
    assert!(approx(Some(comparisons[2].change), 0.0));
    assert_eq!(comparisons[2].direction, Direction::Unchanged);

    let tally = ComparisonTally::from_comparisons(&comparisons);
    assert_eq!(
        (tally.decreased, tally.increased, tally.unchanged),
        (1, 1, 1)
    );
}

#[test]
fn median_statistic_changes_the_verdict() {
    let dataset = dataset();
    let comparisons = compare_periods(
        &dataset.view(),
        GroupBy::State,
        &Period::new("1999"),
        &Period::new("2012"),
        Statistic::Median,
    )
    .expect("comparison");

    let new_york = comparisons
        .iter()
        .find(|c| c.key.state == Some(36))
        .expect("state 36");
    assert_eq!(new_york.first, 2.0);
    assert_eq!(new_york.direction, Direction::Increased);
}

#[test]
fn comparing_along_period_is_rejected() {
    let dataset = dataset();
    let err = compare_periods(
        &dataset.view(),
        GroupBy::Period,
        &Period::new("1999"),
        &Period::new("2012"),
        Statistic::Mean,
    )
    .expect_err("expected validation error");
    assert!(matches!(err, PipelineError::Validation(_)));
}
