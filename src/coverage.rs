//! Year coverage analysis.
//!
//! Checks that a fetched dataset has records for every year in an expected
//! range, e.g. that the Goose setlists run unbroken from 2014 to today.

use crate::Record;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

/// Candidate year fields, in priority order.
pub const YEAR_FIELDS: [&str; 3] = ["show_year", "showyear", "year"];

/// Years at or after this are listed separately in the summary.
pub const RECENT_YEAR_THRESHOLD: i64 = 2020;

/// Per-year counts for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCoverage {
    /// The field the years were read from
    pub field: String,
    /// Record count per year
    pub counts: BTreeMap<i64, usize>,
    /// Records whose year value was present but not a number
    pub unparseable: usize,
    /// First expected year
    pub expected_first: i64,
    /// Last expected year, inclusive
    pub expected_last: i64,
    /// Expected years with no records, ascending
    pub missing: Vec<i64>,
}

impl YearCoverage {
    pub fn min_year(&self) -> Option<i64> {
        self.counts.keys().next().copied()
    }

    pub fn max_year(&self) -> Option<i64> {
        self.counts.keys().next_back().copied()
    }

    /// `true` when every expected year has at least one record.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Counts for years at or after `threshold`.
    pub fn recent_years(&self, threshold: i64) -> BTreeMap<i64, usize> {
        self.counts
            .range(threshold..)
            .map(|(year, count)| (*year, *count))
            .collect()
    }
}

/// Result of [`analyze_year_coverage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum YearCoverageReport {
    /// The record list was empty.
    NoData,
    /// The first record has none of [`YEAR_FIELDS`].
    NoYearField,
    /// Years were counted.
    Counted(YearCoverage),
}

impl YearCoverageReport {
    pub fn coverage(&self) -> Option<&YearCoverage> {
        match self {
            YearCoverageReport::Counted(coverage) => Some(coverage),
            _ => None,
        }
    }

    /// Operator-facing summary, one line per fact.
    pub fn summary_lines(&self, data_type: &str) -> Vec<String> {
        let coverage = match self {
            YearCoverageReport::NoData => return vec![format!("No {data_type} data to analyze")],
            YearCoverageReport::NoYearField => {
                return vec![format!("No year field found in {data_type}")]
            }
            YearCoverageReport::Counted(coverage) => coverage,
        };

        let mut lines = Vec::new();
        match (coverage.min_year(), coverage.max_year()) {
            (Some(min), Some(max)) => lines.push(format!("Years: {min} - {max}")),
            _ => lines.push(format!("No values in '{}'", coverage.field)),
        }

        let recent = coverage.recent_years(RECENT_YEAR_THRESHOLD);
        if !recent.is_empty() {
            let parts: Vec<String> = recent
                .iter()
                .map(|(year, count)| format!("{year}: {count}"))
                .collect();
            lines.push(format!("Recent years: {{{}}}", parts.join(", ")));
        }

        if coverage.unparseable > 0 {
            lines.push(format!(
                "{} records with a non-numeric '{}'",
                coverage.unparseable, coverage.field
            ));
        }

        if coverage.is_complete() {
            lines.push(format!(
                "Complete coverage {}-{}",
                coverage.expected_first, coverage.expected_last
            ));
        } else {
            lines.push(format!("Missing years: {:?}", coverage.missing));
        }

        lines
    }
}

impl fmt::Display for YearCoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary_lines("records").join("; "))
    }
}

/// Count records per year and compare against `expected_range`.
///
/// The year field is detected from the first record only. Empty input gives
/// [`YearCoverageReport::NoData`]; no recognisable field gives
/// [`YearCoverageReport::NoYearField`].
///
/// # Examples
///
/// ```rust
/// use elgoose_fetch::{analyze_year_coverage, Record};
/// use serde_json::json;
///
/// let records: Vec<Record> = vec![json!({"show_year": 2021}), json!({"show_year": "2022"})]
///     .into_iter()
///     .filter_map(|v| v.as_object().cloned())
///     .collect();
///
/// let report = analyze_year_coverage(&records, 2020..=2022);
/// let coverage = report.coverage().unwrap();
/// assert_eq!(coverage.min_year(), Some(2021));
/// assert_eq!(coverage.missing, vec![2020]);
/// ```
pub fn analyze_year_coverage(
    records: &[Record],
    expected_range: RangeInclusive<i64>,
) -> YearCoverageReport {
    let Some(first) = records.first() else {
        return YearCoverageReport::NoData;
    };

    let Some(field) = YEAR_FIELDS.iter().find(|field| first.contains_key(**field)) else {
        log::debug!("No year field among {YEAR_FIELDS:?}");
        return YearCoverageReport::NoYearField;
    };

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut unparseable = 0;

    for value in records.iter().filter_map(|record| record.get(*field)) {
        if is_blank(value) {
            continue;
        }
        match coerce_year(value) {
            Some(year) => *counts.entry(year).or_insert(0) += 1,
            None => unparseable += 1,
        }
    }

    let observed: BTreeSet<i64> = counts.keys().copied().collect();
    let missing: Vec<i64> = expected_range
        .clone()
        .filter(|year| !observed.contains(year))
        .collect();

    YearCoverageReport::Counted(YearCoverage {
        field: field.to_string(),
        counts,
        unparseable,
        expected_first: *expected_range.start(),
        expected_last: *expected_range.end(),
        missing,
    })
}

/// Earliest and latest non-empty string value of `field`, compared as
/// strings (ISO dates sort correctly this way).
pub fn date_range(records: &[Record], field: &str) -> Option<(String, String)> {
    let mut dates = records
        .iter()
        .filter_map(|record| record.get(field))
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|date| !date.is_empty());

    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(min, max), date| {
        (min.min(date), max.max(date))
    });
    Some((min.to_string(), max.to_string()))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}
