use std::fs::{self, File};
use std::io::BufWriter;

use anyhow::{Context, Result};
use pmtrend_core::aggregate::{summarize, GroupBy};
use pmtrend_core::compare::{compare_periods, ComparisonTally, Direction, Statistic};
use pmtrend_core::config::PipelineConfig;
use pmtrend_core::frames::{comparison_frame, dataset_frame, summary_frame, write_parquet};
use pmtrend_core::overlap::resolve_overlap;
use pmtrend_core::quality::audit;
use pmtrend_core::report::{comparison_periods, standard_report, ReportOptions};
use pmtrend_core::{MergedDataset, Period};
use pmtrend_parser::Column;
use serde_json::json;
use tracing::{info, warn};

use crate::render::{align_numeric, number, percent, print_json, table};
use crate::{CompareArgs, ExportArgs, ReportArgs, SiteArgs, SitesArgs, SummaryArgs};

fn period(label: &Option<String>) -> Option<Period> {
    label.as_deref().map(Period::new)
}

pub fn summary(dataset: &MergedDataset, args: &SummaryArgs, json: bool) -> Result<()> {
    let summaries = summarize(&dataset.view(), &args.by);
    if json {
        return print_json(&summaries);
    }

    let mut out = table([
        "group", "rows", "missing", "mean", "min", "q1", "median", "q3", "max", "negative",
    ]);
    for summary in &summaries {
        let five = summary.five_number;
        out.add_row(vec![
            summary.key.to_string(),
            summary.observations.to_string(),
            percent(Some(summary.missing_rate)),
            number(summary.mean),
            number(five.map(|f| f.min)),
            number(five.map(|f| f.q1)),
            number(five.map(|f| f.median)),
            number(five.map(|f| f.q3)),
            number(five.map(|f| f.max)),
            percent(summary.negative_rate),
        ]);
    }
    align_numeric(&mut out, 1);
    println!("{out}");
    Ok(())
}

pub fn quality(dataset: &MergedDataset, config: &PipelineConfig, json: bool) -> Result<()> {
    let report = audit(dataset);
    let breaches = config.policy.evaluate(&report);
    for breach in &breaches {
        warn!(
            period = %breach.period,
            metric = %breach.metric,
            observed = breach.observed,
            limit = breach.limit,
            "quality limit exceeded"
        );
    }

    if json {
        return print_json(&json!({ "periods": report.periods, "breaches": breaches }));
    }

    let mut out = table([
        "period",
        "rows",
        "value missing",
        "date missing",
        "negative",
        "negative rate",
        "skipped lines",
        "coercion failures",
    ]);
    for period in &report.periods {
        let rate = |column: Column| period.missing_rates.get(&column).copied();
        let (skipped, coerced) = period.ingest.as_ref().map_or((0, 0), |ingest| {
            (ingest.skipped(), ingest.coercion_failures.total())
        });
        out.add_row(vec![
            period.period.to_string(),
            period.rows.to_string(),
            percent(rate(Column::Value)),
            percent(rate(Column::Date)),
            period.negative.to_string(),
            percent(period.negative_rate),
            skipped.to_string(),
            coerced.to_string(),
        ]);
    }
    align_numeric(&mut out, 1);
    println!("{out}");

    for period in &report.periods {
        if !period.negatives_by_month.is_empty() {
            let months: Vec<String> = period
                .negatives_by_month
                .iter()
                .map(|(month, count)| format!("{month:02}:{count}"))
                .collect();
            println!("{} negatives by month: {}", period.period, months.join(" "));
        }
    }
    Ok(())
}

pub fn sites(dataset: &MergedDataset, args: &SitesArgs, json: bool) -> Result<()> {
    let (first, second) =
        comparison_periods(dataset, period(&args.first), period(&args.second))?;
    let mut candidates =
        resolve_overlap(&dataset.view().filter_state(args.state), &first, &second, args.rank);
    if let Some(limit) = args.limit {
        candidates.truncate(limit);
    }
    if json {
        return print_json(&candidates);
    }
    if candidates.is_empty() {
        println!(
            "No site in state {:02} was observed in both {first} and {second}.",
            args.state
        );
        return Ok(());
    }

    let mut out = table(["site", first.as_str(), second.as_str(), "total"]);
    for candidate in &candidates {
        out.add_row(vec![
            candidate.site.to_string(),
            candidate.first_count.to_string(),
            candidate.second_count.to_string(),
            candidate.total().to_string(),
        ]);
    }
    align_numeric(&mut out, 1);
    println!("{out}");
    println!("Ranked by {}. Pass --site to pick one.", args.rank);
    Ok(())
}

pub fn site(dataset: &MergedDataset, args: &SiteArgs, json: bool) -> Result<()> {
    let view = dataset.view().filter_site(args.site);
    if args.series {
        let series = view.site_series(args.site);
        if json {
            return print_json(&series);
        }
        let mut out = table(["period", "date", "value"]);
        for point in &series {
            out.add_row(vec![
                point.period.to_string(),
                point.date.to_string(),
                number(point.value),
            ]);
        }
        align_numeric(&mut out, 2);
        println!("{out}");
        return Ok(());
    }

    let summaries = summarize(&view, &[GroupBy::Period]);
    if json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        println!("Site {} has no rows in the loaded periods.", args.site);
        return Ok(());
    }
    let mut out = table(["period", "rows", "present", "mean", "median", "max"]);
    for summary in &summaries {
        out.add_row(vec![
            summary.key.period.as_ref().map_or_else(String::new, Period::to_string),
            summary.observations.to_string(),
            summary.present.to_string(),
            number(summary.mean),
            number(summary.median()),
            number(summary.five_number.map(|f| f.max)),
        ]);
    }
    align_numeric(&mut out, 1);
    println!("{out}");
    Ok(())
}

pub fn compare(dataset: &MergedDataset, args: &CompareArgs, json: bool) -> Result<()> {
    let (first, second) =
        comparison_periods(dataset, period(&args.first), period(&args.second))?;
    let comparisons = compare_periods(&dataset.view(), args.by, &first, &second, args.stat)?;
    let tally = ComparisonTally::from_comparisons(&comparisons);
    if json {
        return print_json(&json!({ "comparisons": comparisons, "tally": tally }));
    }

    let label = |period: &Period| format!("{} {period}", args.stat);
    let mut out = table([
        args.by.to_string(),
        label(&first),
        label(&second),
        "change".to_string(),
        "direction".to_string(),
    ]);
    for comparison in &comparisons {
        out.add_row(vec![
            comparison.key.to_string(),
            number(Some(comparison.first)),
            number(Some(comparison.second)),
            number(Some(comparison.change)),
            direction(comparison.direction).to_string(),
        ]);
    }
    align_numeric(&mut out, 1);
    println!("{out}");
    println!(
        "{} decreased, {} increased, {} unchanged",
        tally.decreased, tally.increased, tally.unchanged
    );
    Ok(())
}

fn direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Decreased => "decreased",
        Direction::Increased => "increased",
        Direction::Unchanged => "unchanged",
    }
}

fn report_options(args: &ReportArgs) -> ReportOptions {
    ReportOptions {
        first: period(&args.first),
        second: period(&args.second),
        state: args.state,
        site: args.site,
        rank: args.rank,
    }
}

pub fn report(dataset: &MergedDataset, args: &ReportArgs, json: bool) -> Result<()> {
    let values = standard_report(dataset, &report_options(args))?;
    if json {
        return print_json(&values);
    }
    let mut out = table(["key", "value"]);
    for key in values.keys() {
        let value = values.get(key).map(ToString::to_string).unwrap_or_default();
        out.add_row(vec![key.to_string(), value]);
    }
    println!("{out}");
    Ok(())
}

pub fn export(dataset: &MergedDataset, args: &ExportArgs) -> Result<()> {
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let view = dataset.view();

    let rows = dataset_frame(&view)?;
    write_parquet(&rows, &args.out.join("observations.parquet"))?;

    let summaries = summary_frame(&summarize(&view, &args.by))?;
    write_parquet(&summaries, &args.out.join("summary.parquet"))?;

    if dataset.periods().len() >= 2 {
        let (first, second) = comparison_periods(dataset, None, None)?;
        let comparisons =
            compare_periods(&view, GroupBy::State, &first, &second, Statistic::Mean)?;
        write_parquet(&comparison_frame(&comparisons)?, &args.out.join("compare_state.parquet"))?;
    }

    let values = standard_report(dataset, &ReportOptions::default())?;
    let path = args.out.join("report.json");
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &values)?;

    info!(out = %args.out.display(), rows = rows.height(), "export written");
    println!("Wrote {} rows to {}", rows.height(), args.out.display());
    Ok(())
}
