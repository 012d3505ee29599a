//! Time range requests.

use chrono::NaiveDateTime;

use crate::error::{FieldError, Result};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse `yyyy-mm-ddThh:mm:ss` (a space separator is accepted too).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            FieldError::InvalidSelector(format!(
                "'{}' is not a timestamp of the form yyyy-mm-ddThh:mm:ss",
                s
            ))
        })
}

/// Which time steps an operation should use.
///
/// Exactly one mode is active; see [`TimeAxis::resolve`](super::TimeAxis::resolve).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TimeSelector {
    /// Every step.
    #[default]
    All,
    /// Explicit step indices (any order, duplicates ignored).
    Indices(Vec<usize>),
    /// Half-open index range `[start, end)`.
    IndexRange { start: usize, end: usize },
    /// Timestamp bracket, both ends inclusive after bracketing.
    Timestamps { start: String, end: String },
}

/// One end of a range given in keyword style: an index or a timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeBound {
    Index(usize),
    Timestamp(String),
}

impl From<usize> for TimeBound {
    fn from(i: usize) -> Self {
        TimeBound::Index(i)
    }
}

impl From<&str> for TimeBound {
    fn from(s: &str) -> Self {
        TimeBound::Timestamp(s.to_string())
    }
}

impl From<String> for TimeBound {
    fn from(s: String) -> Self {
        TimeBound::Timestamp(s)
    }
}

impl TimeSelector {
    pub fn timestamps(start: impl Into<String>, end: impl Into<String>) -> Self {
        TimeSelector::Timestamps {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn range(start: usize, end: usize) -> Self {
        TimeSelector::IndexRange { start, end }
    }

    /// Build a selector from `time_ind` / `t_start` / `t_end` keyword
    /// arguments. Giving none selects every step.
    ///
    /// ```
    /// use fvcom_rs::time::{TimeBound, TimeSelector};
    ///
    /// let sel = TimeSelector::from_parts(None, Some(TimeBound::Index(2)), Some(TimeBound::Index(5)))
    ///     .unwrap();
    /// assert_eq!(sel, TimeSelector::range(2, 5));
    ///
    /// let conflict = TimeSelector::from_parts(Some(vec![1]), Some("2013-06-01T00:00:00".into()), None);
    /// assert!(conflict.is_err());
    /// ```
    pub fn from_parts(
        time_ind: Option<Vec<usize>>,
        t_start: Option<TimeBound>,
        t_end: Option<TimeBound>,
    ) -> Result<Self> {
        match (time_ind, t_start, t_end) {
            (None, None, None) => Ok(TimeSelector::All),
            (Some(ind), None, None) => Ok(TimeSelector::Indices(ind)),
            (Some(_), _, _) => Err(FieldError::InvalidSelector(
                "use time_ind or t_start and t_end, not both".into(),
            )),
            (None, Some(TimeBound::Index(start)), Some(TimeBound::Index(end))) => {
                Ok(TimeSelector::IndexRange { start, end })
            }
            (None, Some(TimeBound::Timestamp(start)), Some(TimeBound::Timestamp(end))) => {
                Ok(TimeSelector::Timestamps { start, end })
            }
            (None, Some(_), Some(_)) => Err(FieldError::InvalidSelector(
                "t_start and t_end must both be indices or both be timestamps".into(),
            )),
            (None, _, _) => Err(FieldError::InvalidSelector(
                "t_start and t_end must be given together".into(),
            )),
        }
    }
}
