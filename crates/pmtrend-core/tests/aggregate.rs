mod common;

use pmtrend_core::aggregate::{summarize, summarize_field, GroupBy};
use pmtrend_core::Period;
use pmtrend_parser::SiteKey;

use common::{approx, merged};

#[test]
fn five_number_summary_is_ordered() {
    let dataset = merged(vec![(
        "1999",
        vec![
            "36|063|2008|19990101|12.5",
            "36|063|2008|19990104|-0.3",
            "36|063|2008|19990107|44.0",
            "36|063|2008|19990110|7.1",
            "36|063|2008|19990113|",
            "36|063|2008|19990116|19.9",
            "36|063|2008|19990119|3.3",
        ],
    )]);

    let summaries = summarize(&dataset.view(), &[GroupBy::Period]);
    assert_eq!(summaries.len(), 1);

    let summary = &summaries[0];
    let five = summary.five_number.expect("five number summary");
    assert!(five.min <= five.q1);
    assert!(five.q1 <= five.median);
    assert!(five.median <= five.q3);
    assert!(five.q3 <= five.max);
    assert_eq!(five.min, -0.3);
    assert_eq!(five.max, 44.0);
    assert!(approx(Some(five.median), 9.8));
    assert_eq!(summary.observations, 7);
    assert_eq!(summary.present, 6);
}

#[test]
fn all_missing_group_has_no_statistics() {
    let dataset = merged(vec![(
        "2012",
        vec!["36|063|2008|20120101|", "36|063|2008|20120102|"],
    )]);

    let summary = &summarize(&dataset.view(), &[GroupBy::Period])[0];
    assert!(summary.is_empty());
    assert_eq!(summary.mean, None);
    assert_eq!(summary.median(), None);
    assert_eq!(summary.five_number, None);
    assert_eq!(summary.negative_rate, None);
    assert_eq!(summary.missing, 2);
    assert_eq!(summary.missing_rate, 1.0);
}

#[test]
fn negative_proportion_excludes_missing_values() {
    let dataset = merged(vec![(
        "2012",
        vec![
            "36|063|2008|20120101|-1.0",
            "36|063|2008|20120102|2.0",
            "36|063|2008|20120103|3.0",
            "36|063|2008|20120104|",
        ],
    )]);

    let summary = &summarize(&dataset.view(), &[GroupBy::Period])[0];
    assert!(approx(summary.negative_rate, 1.0 / 3.0));
    assert_eq!(summary.negative, 1);
    assert!(approx(summary.mean, 4.0 / 3.0));
    assert_eq!(summary.missing_rate, 0.25);
}

#[test]
fn groups_come_out_in_key_order() {
    let dataset = merged(vec![
        (
            "2012",
            vec![
                "36|063|2008|20120101|4",
                "06|037|1103|20120101|9",
                "36|001|0005|20120301|6",
            ],
        ),
        (
            "1999",
            vec!["36|063|2008|19990101|8", "06|037|1103|19990101|20"],
        ),
    ]);

    let summaries = summarize(&dataset.view(), &[GroupBy::Period, GroupBy::State]);
    let keys: Vec<(String, Option<u32>)> = summaries
        .iter()
        .map(|s| (s.key.period.as_ref().unwrap().to_string(), s.key.state))
        .collect();
    assert_eq!(
        keys,
        [
            ("1999".to_string(), Some(6)),
            ("1999".to_string(), Some(36)),
            ("2012".to_string(), Some(6)),
            ("2012".to_string(), Some(36)),
        ]
    );

    let ny_2012 = &summaries[3];
    assert_eq!(ny_2012.observations, 2);
    assert!(approx(ny_2012.mean, 5.0));

    let by_site = summarize(&dataset.view(), &[GroupBy::Site]);
    assert_eq!(by_site.len(), 3);
    assert_eq!(by_site[0].key.site, Some(SiteKey::new(6, 37, 1103)));
    assert_eq!(by_site[0].key.period, None);
}

#[test]
fn month_grouping_keeps_undated_rows() {
    let dataset = merged(vec![(
        "2012",
        vec![
            "36|063|2008|20120105|1",
            "36|063|2008|20120305|-2",
            "36|063|2008|not-a-date|3",
            "36|063|2008|20120320|5",
        ],
    )]);

    let summaries = summarize(&dataset.view(), &[GroupBy::Month]);
    let months: Vec<Option<u32>> = summaries.iter().map(|s| s.key.month).collect();
    assert_eq!(months, [None, Some(1), Some(3)]);
    assert_eq!(summaries[2].observations, 2);
    assert_eq!(summaries[2].negative, 1);
}

#[test]
fn custom_field_and_triples() {
    let dataset = merged(vec![(
        "1999",
        vec!["36|063|2008|19990101|-4", "36|063|2008|19990102|2"],
    )]);

    let absolute = summarize_field(&dataset.view(), &[GroupBy::Period], |o| {
        o.value.map(f64::abs)
    });
    assert!(approx(absolute[0].mean, 3.0));
    assert_eq!(absolute[0].negative, 0);

    let triples = absolute[0].triples();
    assert_eq!(triples.len(), 11);
    let median = triples
        .iter()
        .find(|(_, field, _)| *field == "median")
        .expect("median triple");
    assert_eq!(median.0.period, Some(Period::new("1999")));
    assert!(approx(median.2, 3.0));
}
