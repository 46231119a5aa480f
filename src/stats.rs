use crate::models::{DailyPoint, StatsResponse, WeeklyAveragePoint, WeeklyPoint};
use crate::timestamps::{date_key, hours};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

pub const WEEK_COUNT: usize = 8;

/// One completed nap, reduced to the day it started on and its length.
#[derive(Debug, Clone, Copy)]
pub struct NapSpan {
    pub date: NaiveDate,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy)]
struct DayTotals {
    naps: u32,
    sleep: Duration,
}

impl Default for DayTotals {
    fn default() -> Self {
        Self {
            naps: 0,
            sleep: Duration::zero(),
        }
    }
}

/// First day covered by [`build_stats_at`] for `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    week_start(today) - Duration::weeks(WEEK_COUNT as i64 - 1)
}

pub fn build_stats_at(today: NaiveDate, naps: &[NapSpan]) -> StatsResponse {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for nap in naps {
        let entry = days.entry(nap.date).or_default();
        entry.naps = entry.naps.saturating_add(1);
        entry.sleep = entry.sleep + nap.duration;
    }
    let totals_on = |date: NaiveDate| days.get(&date).copied().unwrap_or_default();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let totals = totals_on(date);
        last_7_days.push(DailyPoint {
            date: date_key(date),
            nap_count: totals.naps,
            total_sleep_hours: round_hours(totals.sleep),
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    let mut weekly_averages = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut nap_sum = 0u32;
        let mut sleep_sum = Duration::zero();
        for day_offset in 0..7 {
            let totals = totals_on(start + Duration::days(day_offset));
            nap_sum = nap_sum.saturating_add(totals.naps);
            sleep_sum = sleep_sum + totals.sleep;
        }

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };

        let denom = if days_counted == 0 {
            1.0
        } else {
            f64::from(days_counted)
        };

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: date_key(start),
            end_date: date_key(end),
            nap_count: nap_sum,
            total_sleep_hours: round_hours(sleep_sum),
        });

        weekly_averages.push(WeeklyAveragePoint {
            week: week_label(start),
            days_counted,
            avg_naps: f64::from(nap_sum) / denom,
            avg_sleep_hours: round2(hours(sleep_sum) / denom),
        });
    }

    StatsResponse {
        last_7_days,
        weekly_totals,
        weekly_averages,
    }
}

fn round_hours(duration: Duration) -> f64 {
    round2(hours(duration))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
