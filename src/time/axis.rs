//! Model time axis in matlab datenum convention.
//!
//! A datenum counts days since year 0; 1970-01-01T00:00:00 is day 719529.

use chrono::{DateTime, NaiveDateTime};
use log::debug;

use super::selector::{parse_timestamp, TimeSelector};
use crate::error::{FieldError, Result};

/// Datenum of the Unix epoch.
pub const UNIX_EPOCH_DATENUM: f64 = 719_529.0;

/// Offset between modified julian day (FVCOM `time_JD`) and datenum.
pub const JULIAN_TO_DATENUM: f64 = 678_942.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a UTC timestamp to a datenum.
pub fn datenum_from_datetime(t: &NaiveDateTime) -> f64 {
    let millis = t.and_utc().timestamp_millis() as f64;
    UNIX_EPOCH_DATENUM + millis / 1000.0 / SECONDS_PER_DAY
}

/// Convert a datenum back to UTC, rounded to the millisecond.
pub fn datetime_from_datenum(datenum: f64) -> Option<NaiveDateTime> {
    let millis = ((datenum - UNIX_EPOCH_DATENUM) * SECONDS_PER_DAY * 1000.0).round();
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|t| t.naive_utc())
}

/// Monotonically non-decreasing sequence of datenums.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    values: Vec<f64>,
}

impl TimeAxis {
    /// Wrap datenum values, rejecting decreasing or non-finite entries.
    pub fn from_datenums(values: Vec<f64>) -> Result<Self> {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(FieldError::InvalidSelector(format!(
                "time axis value at index {} is not finite",
                i
            )));
        }
        if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(FieldError::InvalidSelector(format!(
                "time axis decreases between index {} and {}",
                i,
                i + 1
            )));
        }
        Ok(Self { values })
    }

    /// Build from FVCOM's `time_JD` (integer days) and `time_second` pair.
    pub fn from_julian(days: &[f64], seconds: &[f64]) -> Result<Self> {
        if days.len() != seconds.len() {
            return Err(FieldError::shape(
                "time_second",
                days.len().to_string(),
                seconds.len().to_string(),
            ));
        }
        let values = days
            .iter()
            .zip(seconds)
            .map(|(&d, &s)| d + JULIAN_TO_DATENUM + s / SECONDS_PER_DAY)
            .collect();
        Self::from_datenums(values)
    }

    pub fn from_datetimes(times: &[NaiveDateTime]) -> Result<Self> {
        Self::from_datenums(times.iter().map(datenum_from_datetime).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn datetime_at(&self, index: usize) -> Option<NaiveDateTime> {
        self.get(index).and_then(datetime_from_datenum)
    }

    /// First and last datenum.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.values.first()?, *self.values.last()?))
    }

    /// Last index whose time is ≤ `t`.
    pub fn index_at_or_before(&self, t: f64) -> Option<usize> {
        self.values.partition_point(|&v| v <= t).checked_sub(1)
    }

    /// First index whose time is ≥ `t`.
    pub fn index_at_or_after(&self, t: f64) -> Option<usize> {
        let i = self.values.partition_point(|&v| v < t);
        (i < self.values.len()).then_some(i)
    }

    /// Resolve a selector to a sorted list of indices into this axis.
    pub fn resolve(&self, selector: &TimeSelector) -> Result<Vec<usize>> {
        let n = self.len();
        let (axis_start, axis_end) = self.span().unwrap_or((f64::NAN, f64::NAN));
        let indices = match selector {
            TimeSelector::All => (0..n).collect(),
            TimeSelector::Indices(list) => {
                if list.is_empty() {
                    return Err(FieldError::InvalidSelector("empty index list".into()));
                }
                if let Some(bad) = list.iter().find(|&&i| i >= n) {
                    return Err(FieldError::time_range(
                        format!("index {}", bad),
                        axis_start,
                        axis_end,
                    ));
                }
                let mut sorted = list.clone();
                sorted.sort_unstable();
                sorted.dedup();
                sorted
            }
            TimeSelector::IndexRange { start, end } => {
                if start >= end {
                    return Err(FieldError::InvalidSelector(format!(
                        "empty index range [{}, {})",
                        start, end
                    )));
                }
                if *end > n {
                    return Err(FieldError::time_range(
                        format!("indices [{}, {})", start, end),
                        axis_start,
                        axis_end,
                    ));
                }
                (*start..*end).collect()
            }
            TimeSelector::Timestamps { start, end } => {
                let t_start = datenum_from_datetime(&parse_timestamp(start)?);
                let t_end = datenum_from_datetime(&parse_timestamp(end)?);
                if t_start > t_end {
                    return Err(FieldError::InvalidSelector(format!(
                        "start '{}' is after end '{}'",
                        start, end
                    )));
                }
                let requested = || format!("{} to {}", start, end);
                let first = self
                    .index_at_or_before(t_start)
                    .ok_or_else(|| FieldError::time_range(requested(), axis_start, axis_end))?;
                let last = self
                    .index_at_or_after(t_end)
                    .ok_or_else(|| FieldError::time_range(requested(), axis_start, axis_end))?;
                (first..=last).collect()
            }
        };
        debug!("Time selector {:?} resolved to {} steps", selector, indices.len());
        Ok(indices)
    }
}
