//! Model time axis and time-range selection.

mod axis;
mod selector;

pub use axis::{
    datenum_from_datetime, datetime_from_datenum, TimeAxis, JULIAN_TO_DATENUM, UNIX_EPOCH_DATENUM,
};
pub use selector::{parse_timestamp, TimeBound, TimeSelector};
