//! Vertical shear of the current.

use ndarray::{Array, ArrayView, Axis, Dimension, Slice, Zip};

use crate::error::{FieldError, Result};

/// Inclusive sigma layer range `[bot, top]`, 0 at the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelRange {
    pub bot: usize,
    pub top: usize,
}

impl LevelRange {
    pub fn new(bot: usize, top: usize) -> Self {
        Self { bot, top }
    }

    /// Every layer of an `n_levels` column.
    pub fn full(n_levels: usize) -> Self {
        Self {
            bot: 0,
            top: n_levels.saturating_sub(1),
        }
    }

    /// Build from optional bounds, defaulting to the full column.
    pub fn from_parts(bot: Option<usize>, top: Option<usize>, n_levels: usize) -> Result<Self> {
        let full = Self::full(n_levels);
        Self::new(bot.unwrap_or(full.bot), top.unwrap_or(full.top)).validate(n_levels)
    }

    /// Needs at least two layers inside `[0, n_levels)`.
    pub fn validate(self, n_levels: usize) -> Result<Self> {
        if self.bot < self.top && self.top < n_levels {
            Ok(self)
        } else {
            Err(FieldError::InvalidLevelRange {
                bot: self.bot,
                top: self.top,
                n_levels,
            })
        }
    }

    /// Number of layer intervals (shear values per column).
    pub fn n_intervals(self) -> usize {
        self.top - self.bot
    }

    pub fn is_full(self, n_levels: usize) -> bool {
        self == Self::full(n_levels)
    }
}

/// Shear between adjacent layers of `range` along `level_axis`.
///
/// `(speed[l+1] − speed[l]) / (depth[l+1] − depth[l])` for each interval.
/// Zero-thickness intervals yield NaN; their count is returned alongside.
pub fn vertical_shear<D: Dimension>(
    depth: ArrayView<'_, f64, D>,
    speed: ArrayView<'_, f64, D>,
    level_axis: Axis,
    range: LevelRange,
) -> (Array<f64, D>, usize) {
    let upper = Slice::from(range.bot + 1..range.top + 1);
    let lower = Slice::from(range.bot..range.top);

    let mut degenerate = 0;
    let shear = Zip::from(depth.slice_axis(level_axis, upper))
        .and(depth.slice_axis(level_axis, lower))
        .and(speed.slice_axis(level_axis, upper))
        .and(speed.slice_axis(level_axis, lower))
        .map_collect(|&z1, &z0, &s1, &s0| {
            let dz = z1 - z0;
            if dz == 0.0 {
                degenerate += 1;
                f64::NAN
            } else {
                (s1 - s0) / dz
            }
        });
    (shear, degenerate)
}

/// Mid-layer depth for each interval of `range`.
pub fn interval_midpoints<D: Dimension>(
    depth: ArrayView<'_, f64, D>,
    level_axis: Axis,
    range: LevelRange,
) -> Array<f64, D> {
    let upper = depth.slice_axis(level_axis, Slice::from(range.bot + 1..range.top + 1));
    let lower = depth.slice_axis(level_axis, Slice::from(range.bot..range.top));
    Zip::from(upper)
        .and(lower)
        .map_collect(|&z1, &z0| (z1 + z0) / 2.0)
}
