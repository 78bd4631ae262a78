//! Trend smoothing and tracking series
//!
//! Derives the trailing average, the elapsed-week axis and the summary
//! indicators from a [`MeasurementLog`].

use crate::models::MeasurementLog;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Window of the trend average, in entries
pub const TREND_WINDOW: usize = 7;

/// Trailing moving average with a shrinking window at the start.
///
/// `out[i]` is the mean of `values[max(0, i - window + 1)..=i]`, so the
/// output has the same length as the input. A zero window yields an empty
/// series.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window == 0 {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let chunk = &values[start..=i];
        result.push(chunk.iter().sum::<f64>() / chunk.len() as f64);
    }
    result
}

/// Continuous week coordinate of each date relative to the first one
pub fn week_offsets(dates: &[NaiveDate]) -> Vec<f64> {
    let Some(&origin) = dates.first() else {
        return vec![];
    };
    dates
        .iter()
        .map(|d| (*d - origin).num_days() as f64 / 7.0)
        .collect()
}

/// Summary figures shown next to the tracking chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub last_weight_kg: f64,
    /// Last minus first measurement
    pub net_change_kg: f64,
    /// Only reported once a full window of entries exists
    pub trend_weight_kg: Option<f64>,
    pub entries_count: usize,
}

/// Compute the indicators from aligned weight and trend series
pub fn indicators(weights: &[f64], trend: &[f64]) -> Option<Indicators> {
    let (first, last) = (*weights.first()?, *weights.last()?);
    let trend_weight_kg = if weights.len() >= TREND_WINDOW {
        trend.last().copied()
    } else {
        None
    };

    Some(Indicators {
        last_weight_kg: last,
        net_change_kg: last - first,
        trend_weight_kg,
        entries_count: weights.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub date: NaiveDate,
    pub week: f64,
    pub weight_kg: f64,
    pub trend_kg: f64,
}

/// Measurements with trend and week axis, ready to plot against a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSeries {
    pub points: Vec<TrackedPoint>,
    pub indicators: Option<Indicators>,
}

pub fn build_tracking_series(log: &MeasurementLog) -> TrackingSeries {
    let weights = log.weights();
    let trend = rolling_average(&weights, TREND_WINDOW);
    let weeks = week_offsets(&log.dates());

    let points = log
        .iter()
        .zip(weeks)
        .zip(&trend)
        .map(|((m, week), trend_kg)| TrackedPoint {
            date: m.date,
            week,
            weight_kg: m.weight_kg,
            trend_kg: *trend_kg,
        })
        .collect();

    TrackingSeries {
        points,
        indicators: indicators(&weights, &trend),
    }
}
