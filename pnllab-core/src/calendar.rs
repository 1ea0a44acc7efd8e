//! Calendar roll-ups of a per-leg series: by month and by weekday.

use std::collections::HashMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::numeric::sum2;
use crate::series::PnlSeries;

/// Rendering hint for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PnlTag {
    Positive,
    Negative,
}

impl PnlTag {
    /// Zero is tagged negative.
    pub fn for_value(net_pnl: f64) -> Self {
        if net_pnl > 0.0 {
            PnlTag::Positive
        } else {
            PnlTag::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PnlTag::Positive => "positive",
            PnlTag::Negative => "negative",
        }
    }
}

/// Summed net PnL for one month or weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarBucket {
    pub label: String,
    pub net_pnl: f64,
    /// Series entries that fell in this bucket.
    pub periods: usize,
    pub tag: PnlTag,
}

/// Both roll-ups of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarBreakdown {
    pub monthly: Vec<CalendarBucket>,
    pub weekday: Vec<CalendarBucket>,
}

impl CalendarBreakdown {
    /// `None` for per-signal series, which have no trading-day identity.
    pub fn compute(series: &PnlSeries) -> Option<Self> {
        if !series.mode().has_calendar() {
            return None;
        }
        Some(Self {
            monthly: monthly(series),
            weekday: weekday(series),
        })
    }
}

/// Buckets keyed `"Jan 2024"`, in first-seen order of the series.
pub fn monthly(series: &PnlSeries) -> Vec<CalendarBucket> {
    let keys = series
        .points()
        .iter()
        .map(|p| (p.trade_date.format("%b %Y").to_string(), p.net_pnl));
    bucketize(keys)
}

/// Buckets keyed by weekday name, Monday first.
pub fn weekday(series: &PnlSeries) -> Vec<CalendarBucket> {
    let mut with_day: Vec<(Weekday, (String, f64))> = series
        .points()
        .iter()
        .map(|p| {
            let wd = p.trade_date.weekday();
            (wd, (weekday_name(wd).to_string(), p.net_pnl))
        })
        .collect();
    with_day.sort_by_key(|(wd, _)| wd.num_days_from_monday());
    bucketize(with_day.into_iter().map(|(_, kv)| kv))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn bucketize<I: IntoIterator<Item = (String, f64)>>(entries: I) -> Vec<CalendarBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

    for (label, net_pnl) in entries {
        match index.get(&label) {
            Some(&i) => groups[i].1.push(net_pnl),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push((label, vec![net_pnl]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(label, values)| {
            let periods = values.len();
            let net_pnl = sum2(values);
            CalendarBucket {
                label,
                net_pnl,
                periods,
                tag: PnlTag::for_value(net_pnl),
            }
        })
        .collect()
}
