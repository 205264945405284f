//! Usage summary over a window of readings.
//!
//! The summary compares the earliest and latest rows of a window. For each meter the total is the
//! difference of the two readings, the average is that total spread over the days between them,
//! and the estimate projects the average over a 31 day month.

use crate::model::ReadingRow;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

/// The number of days used for the monthly estimate.
pub const ESTIMATE_DAYS: i64 = 31;

/// Shown in place of every value of a meter whose usage could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// The row labels of the summary grid, in display order.
pub const METRICS: [&str; 5] = [
    "Start Date",
    "End Date",
    "Total Units",
    "Average/Day",
    "31 Day Estimate",
];

/// The usage figures of one meter.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Usage {
    total: Decimal,
    average_per_day: Decimal,
    estimate: Decimal,
}

impl Usage {
    /// `None` if the arithmetic overflows.
    fn compute(earliest: Decimal, latest: Decimal, days: i64) -> Option<Self> {
        let total = latest.checked_sub(earliest)?;
        let average_per_day = total.checked_div(Decimal::from(days))?;
        let estimate = average_per_day.checked_mul(Decimal::from(ESTIMATE_DAYS))?;
        Some(Self {
            total,
            average_per_day,
            estimate,
        })
    }

    /// Latest reading minus earliest reading. Negative if the meter went backwards.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn average_per_day(&self) -> Decimal {
        self.average_per_day
    }

    pub fn estimate(&self) -> Decimal {
        self.estimate
    }
}

/// The summary column for one meter. `usage` is `None` when either end of the window is missing a
/// valid reading for this meter.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MeterSummary {
    meter: String,
    usage: Option<Usage>,
}

impl MeterSummary {
    pub fn meter(&self) -> &str {
        &self.meter
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }
}

/// Summary of a window of readings, one column per meter.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: i64,
    meters: Vec<MeterSummary>,
}

impl Summary {
    /// Summarizes `rows` for each of `meters`. Returns `None` if `rows` is empty.
    ///
    /// The rows do not need to be sorted. When the first and last dates are the same, `days` is
    /// taken as 1.
    pub fn new<S: AsRef<str>>(rows: &[ReadingRow], meters: &[S]) -> Option<Self> {
        let mut sorted: Vec<&ReadingRow> = rows.iter().collect();
        sorted.sort_by_key(|row| row.date());
        let earliest = *sorted.first()?;
        let latest = *sorted.last()?;
        let days = (latest.date() - earliest.date()).num_days().max(1);

        let meters = meters
            .iter()
            .map(|meter| {
                let meter = meter.as_ref();
                let usage = meter_usage(earliest, latest, meter, days);
                if usage.is_none() {
                    debug!(
                        "Usage for '{meter}' is not available between {} and {}",
                        earliest.date(),
                        latest.date()
                    );
                }
                MeterSummary {
                    meter: meter.to_string(),
                    usage,
                }
            })
            .collect();

        Some(Self {
            start_date: earliest.date(),
            end_date: latest.date(),
            days,
            meters,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Whole days between the earliest and latest rows, at least 1.
    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn meters(&self) -> &[MeterSummary] {
        &self.meters
    }

    pub fn meter(&self, name: &str) -> Option<&MeterSummary> {
        self.meters.iter().find(|m| m.meter == name)
    }

    /// The summary as a grid of display strings: a header row of `Metric` followed by the meter
    /// names, then one row per entry of `METRICS`. Numbers have two decimal places.
    pub fn grid(&self) -> Vec<Vec<String>> {
        let mut header = vec!["Metric".to_string()];
        header.extend(self.meters.iter().map(|m| m.meter.clone()));

        let columns: Vec<[String; 5]> = self.meters.iter().map(|m| self.column(m)).collect();
        let mut grid = vec![header];
        for (ix, metric) in METRICS.iter().enumerate() {
            let mut row = vec![metric.to_string()];
            row.extend(columns.iter().map(|c| c[ix].clone()));
            grid.push(row);
        }
        grid
    }

    fn column(&self, meter: &MeterSummary) -> [String; 5] {
        match &meter.usage {
            Some(usage) => [
                self.start_date.to_string(),
                self.end_date.to_string(),
                two_places(usage.total),
                two_places(usage.average_per_day),
                two_places(usage.estimate),
            ],
            None => std::array::from_fn(|_| NOT_AVAILABLE.to_string()),
        }
    }
}

fn meter_usage(
    earliest: &ReadingRow,
    latest: &ReadingRow,
    meter: &str,
    days: i64,
) -> Option<Usage> {
    let first = earliest.value(meter)?.reading()?;
    let last = latest.value(meter)?.reading()?;
    Usage::compute(first.value(), last.value(), days)
}

/// Formats `value` with exactly two decimal places, rounding half away from zero.
pub(crate) fn two_places(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}
