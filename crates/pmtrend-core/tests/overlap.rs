mod common;

use std::collections::BTreeSet;

use pmtrend_core::overlap::{overlap_sites, resolve_overlap, RankBy};
use pmtrend_core::Period;
use pmtrend_parser::SiteKey;

use common::merged;

const A: &str = "36|001|0005";
const B: &str = "36|063|2008";
const C: &str = "36|101|0003";
const D: &str = "36|055|1007";

fn row(site: &str, date: &str, value: &str) -> String {
    format!("{site}|{date}|{value}")
}

#[test]
fn overlap_is_the_intersection_of_site_sets() {
    let first = [row(A, "19990101", "9"), row(B, "19990101", "8"), row(C, "19990101", "7")];
    let second = [row(B, "20120101", "3"), row(C, "20120101", "2"), row(D, "20120101", "1")];
    let dataset = merged(vec![
        ("1999", first.iter().map(String::as_str).collect()),
        ("2012", second.iter().map(String::as_str).collect()),
    ]);

    let shared = overlap_sites(&dataset.view(), &Period::new("1999"), &Period::new("2012"));
    let expected: BTreeSet<SiteKey> = [SiteKey::new(36, 63, 2008), SiteKey::new(36, 101, 3)]
        .into_iter()
        .collect();
    assert_eq!(shared, expected);
}

#[test]
fn overlap_ignores_row_order_within_periods() {
    let first = vec![
        row(A, "19990101", "9"),
        row(B, "19990101", "8"),
        row(B, "19990104", "8"),
        row(C, "19990101", "7"),
    ];
    let second = vec![row(C, "20120101", "2"), row(B, "20120101", "3"), row(D, "20120101", "1")];

    let forward = merged(vec![
        ("1999", first.iter().map(String::as_str).collect()),
        ("2012", second.iter().map(String::as_str).collect()),
    ]);
    let reversed = merged(vec![
        ("1999", first.iter().rev().map(String::as_str).collect()),
        ("2012", second.iter().rev().map(String::as_str).collect()),
    ]);

    let p1 = Period::new("1999");
    let p2 = Period::new("2012");
    assert_eq!(
        resolve_overlap(&forward.view(), &p1, &p2, RankBy::Weakest),
        resolve_overlap(&reversed.view(), &p1, &p2, RankBy::Weakest)
    );
}

#[test]
fn candidates_are_ranked_by_caller_policy() {
    // B: 4 rows then 1 row; C: 2 rows then 2 rows.
    let first = vec![
        row(B, "19990101", "8"),
        row(B, "19990104", "9"),
        row(B, "19990107", ""),
        row(B, "19990110", "11"),
        row(C, "19990101", "7"),
        row(C, "19990104", "6"),
        row(A, "19990101", "5"),
    ];
    let second = vec![
        row(B, "20120101", "3"),
        row(C, "20120101", "2"),
        row(C, "20120104", "2"),
    ];
    let dataset = merged(vec![
        ("1999", first.iter().map(String::as_str).collect()),
        ("2012", second.iter().map(String::as_str).collect()),
    ]);
    let p1 = Period::new("1999");
    let p2 = Period::new("2012");

    let weakest = resolve_overlap(&dataset.view(), &p1, &p2, RankBy::Weakest);
    assert_eq!(weakest.len(), 2);
    assert_eq!(weakest[0].site, SiteKey::new(36, 101, 3));
    assert_eq!((weakest[0].first_count, weakest[0].second_count), (2, 2));
    assert_eq!(weakest[1].site, SiteKey::new(36, 63, 2008));
    assert_eq!((weakest[1].first_count, weakest[1].second_count), (4, 1));

    let total = resolve_overlap(&dataset.view(), &p1, &p2, RankBy::Total);
    assert_eq!(total[0].site, SiteKey::new(36, 63, 2008));
    assert_eq!(total[0].total(), 5);
}

#[test]
fn jurisdiction_filter_and_incomplete_keys() {
    let dataset = merged(vec![
        (
            "1999",
            vec!["36|063|2008|19990101|8", "06|037|1103|19990101|20", "36||2008|19990102|4"],
        ),
        (
            "2012",
            vec!["36|063|2008|20120101|3", "06|037|1103|20120101|9"],
        ),
    ]);
    let p1 = Period::new("1999");
    let p2 = Period::new("2012");

    let new_york = dataset.view().filter_state(36);
    let candidates = resolve_overlap(&new_york, &p1, &p2, RankBy::default());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].site, SiteKey::new(36, 63, 2008));
    assert_eq!(candidates[0].first_count, 1);

    let nowhere = dataset.view().filter_state(99);
    assert!(resolve_overlap(&nowhere, &p1, &p2, RankBy::Weakest).is_empty());
}
