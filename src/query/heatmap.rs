//! Activity heatmap reshaping
//!
//! Activity snapshots store one row per repository-week with a
//! `day_commits` JSON array of seven daily counts. The reshaper validates
//! those rows into [`WeekSample`]s and lays them onto a fixed calendar of
//! [`CALENDAR_DAYS`] days ending today.
//!
//! Two aggregation modes exist:
//! - [`HeatmapMode::Concat`] concatenates samples in row order and aligns the
//!   flattened sequence to the most recent days. Rows carry no dates in this
//!   mode, so "52 weeks of one repository" and "one week of 52 repositories"
//!   produce the same calendar.
//! - [`HeatmapMode::Weekly`] places each sample at its `week_start` and sums
//!   counts that land on the same day.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Length of the trailing calendar
pub const CALENDAR_DAYS: usize = 365;

/// Days per stored sample
pub const DAYS_PER_WEEK: usize = 7;

/// How weekly samples are combined into the calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapMode {
    /// Concatenate samples in row order, align to the newest day
    #[default]
    Concat,
    /// Place samples by `week_start` and sum overlapping days
    Weekly,
}

impl HeatmapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapMode::Concat => "concat",
            HeatmapMode::Weekly => "weekly",
        }
    }
}

impl FromStr for HeatmapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "concat" | "concatenate" | "rows" => Ok(HeatmapMode::Concat),
            "weekly" | "week" | "sum" => Ok(HeatmapMode::Weekly),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for HeatmapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One calendar cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub count: u64,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
}

impl HeatmapDay {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            count: 0,
            weekday: date.weekday().num_days_from_sunday(),
        }
    }
}

/// Raw activity row as read from the database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRow {
    pub day_commits: Option<String>,
    pub week_start: Option<String>,
    /// First column that held something other than TEXT or NULL, with the
    /// storage class SQLite reported for it
    pub non_text: Option<(&'static str, String)>,
}

impl ActivityRow {
    pub fn new(day_commits: impl Into<String>) -> Self {
        Self {
            day_commits: Some(day_commits.into()),
            ..Default::default()
        }
    }

    pub fn with_week_start(mut self, week_start: impl Into<String>) -> Self {
        self.week_start = Some(week_start.into());
        self
    }
}

/// Why an activity row was left out of the heatmap
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("row {row}: {column} holds {kind}, expected text")]
    NotText {
        row: usize,
        column: &'static str,
        kind: String,
    },

    #[error("row {row}: day_commits is null")]
    Missing { row: usize },

    #[error("row {row}: day_commits is not valid JSON: {message}")]
    InvalidJson { row: usize, message: String },

    #[error("row {row}: day_commits is not an array")]
    NotAnArray { row: usize },

    #[error("row {row}: expected 7 daily counts, found {len}")]
    WrongLength { row: usize, len: usize },

    #[error("row {row}: count at index {index} is not a non-negative integer")]
    InvalidCount { row: usize, index: usize },

    #[error("row {row}: week_start is missing")]
    MissingWeekStart { row: usize },

    #[error("row {row}: week_start {value:?} is not a YYYY-MM-DD date")]
    InvalidWeekStart { row: usize, value: String },
}

/// A validated week of daily commit counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSample {
    pub week_start: Option<NaiveDate>,
    pub daily_counts: [u64; DAYS_PER_WEEK],
}

impl WeekSample {
    /// Validate a stored `day_commits` value.
    ///
    /// `row` is only used to label errors.
    pub fn parse(row: usize, day_commits: Option<&str>) -> std::result::Result<Self, SampleError> {
        let raw = day_commits.ok_or(SampleError::Missing { row })?;

        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| SampleError::InvalidJson {
            row,
            message: e.to_string(),
        })?;

        let items = value.as_array().ok_or(SampleError::NotAnArray { row })?;
        if items.len() != DAYS_PER_WEEK {
            return Err(SampleError::WrongLength {
                row,
                len: items.len(),
            });
        }

        let mut daily_counts = [0u64; DAYS_PER_WEEK];
        for (index, item) in items.iter().enumerate() {
            daily_counts[index] = item.as_u64().ok_or(SampleError::InvalidCount { row, index })?;
        }

        Ok(Self {
            week_start: None,
            daily_counts,
        })
    }

    /// Validate a row that must also carry its week start date
    pub fn parse_dated(row: usize, activity: &ActivityRow) -> std::result::Result<Self, SampleError> {
        let mut sample = Self::parse(row, activity.day_commits.as_deref())?;
        let raw = activity
            .week_start
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SampleError::MissingWeekStart { row })?;

        // Accept plain dates and datetime strings by reading the date part.
        let date_part = raw.get(..10).unwrap_or(raw);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| SampleError::InvalidWeekStart {
            row,
            value: raw.to_string(),
        })?;

        sample.week_start = Some(date);
        Ok(sample)
    }
}

/// Calendar plus the rows that were discarded building it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeatmapReport {
    pub days: Vec<HeatmapDay>,
    pub discarded: Vec<SampleError>,
    /// Rows read from the activity table
    pub rows: usize,
}

/// `CALENDAR_DAYS` zero-count days ending at `today`, oldest first
pub fn empty_calendar(today: NaiveDate) -> Vec<HeatmapDay> {
    let start = today - Days::new((CALENDAR_DAYS - 1) as u64);
    start
        .iter_days()
        .take(CALENDAR_DAYS)
        .map(HeatmapDay::empty)
        .collect()
}

/// Concatenate samples into one per-day sequence, preserving order
pub fn flatten(samples: &[WeekSample]) -> Vec<u64> {
    samples
        .iter()
        .flat_map(|s| s.daily_counts.iter().copied())
        .collect()
}

/// Align a flattened sequence so its last element lands on `today`.
///
/// Longer sequences keep only their newest `CALENDAR_DAYS` entries; shorter
/// ones leave the leading days at zero.
pub fn align_to_calendar(flattened: &[u64], today: NaiveDate) -> Vec<HeatmapDay> {
    let mut days = empty_calendar(today);
    let tail = &flattened[flattened.len().saturating_sub(CALENDAR_DAYS)..];
    let offset = CALENDAR_DAYS - tail.len();

    for (day, count) in days[offset..].iter_mut().zip(tail) {
        day.count = *count;
    }

    days
}

/// Sum dated samples into the calendar; days outside the window are ignored
pub fn sum_by_week(samples: &[WeekSample], today: NaiveDate) -> Vec<HeatmapDay> {
    let mut days = empty_calendar(today);
    let start = days[0].date;

    for sample in samples {
        let Some(week_start) = sample.week_start else {
            continue;
        };
        for (i, count) in sample.daily_counts.iter().enumerate() {
            let Some(date) = week_start.checked_add_days(Days::new(i as u64)) else {
                continue;
            };
            if date < start || date > today {
                continue;
            }
            let index = (date - start).num_days() as usize;
            days[index].count = days[index].count.saturating_add(*count);
        }
    }

    days
}

/// Turn raw activity rows into a calendar.
///
/// No rows means no data: the report's `days` is empty rather than a
/// zero-filled calendar.
pub fn reshape(rows: &[ActivityRow], mode: HeatmapMode, today: NaiveDate) -> HeatmapReport {
    if rows.is_empty() {
        return HeatmapReport::default();
    }

    let mut samples = Vec::with_capacity(rows.len());
    let mut discarded = Vec::new();

    for (row, activity) in rows.iter().enumerate() {
        let parsed = match (&activity.non_text, mode) {
            (Some((column, kind)), _) => Err(SampleError::NotText {
                row,
                column: *column,
                kind: kind.clone(),
            }),
            (None, HeatmapMode::Concat) => WeekSample::parse(row, activity.day_commits.as_deref()),
            (None, HeatmapMode::Weekly) => WeekSample::parse_dated(row, activity),
        };
        match parsed {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                tracing::warn!("Skipping activity sample: {}", e);
                discarded.push(e);
            }
        }
    }

    let days = match mode {
        HeatmapMode::Concat => align_to_calendar(&flatten(&samples), today),
        HeatmapMode::Weekly => sum_by_week(&samples, today),
    };

    HeatmapReport {
        days,
        discarded,
        rows: rows.len(),
    }
}
