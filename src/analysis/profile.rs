//! Vertical profiles returned by point and station queries.

use ndarray::{Array1, Array2, Axis};

use super::plot::XyPlot;

/// Mean over the time axis (rows), NaN for an empty selection.
pub fn time_mean(values: &Array2<f64>) -> Array1<f64> {
    values
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::from_elem(values.ncols(), f64::NAN))
}

/// Vertical shear at one location.
#[derive(Clone, Debug, PartialEq)]
pub struct ShearProfile {
    /// `(T, n)` shear (1/s) for the selected steps and layer intervals.
    pub shear: Array2<f64>,
    /// Time-mean shear per interval.
    pub mean_shear: Array1<f64>,
    /// Time-mean mid-interval depth (m).
    pub mean_depth: Array1<f64>,
}

impl ShearProfile {
    /// Build from selected shear and interval mid-depths, both `(T, n)`.
    pub fn new(shear: Array2<f64>, mid_depth: &Array2<f64>) -> Self {
        Self {
            mean_shear: time_mean(&shear),
            mean_depth: time_mean(mid_depth),
            shear,
        }
    }

    pub fn to_plot(&self) -> XyPlot {
        XyPlot::new(
            self.mean_shear.clone(),
            self.mean_depth.clone(),
            "Shear profile",
            "Shear (1/s)",
            "Depth (m)",
        )
    }
}

/// Speed at one location.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityProfile {
    /// `(T, L)` speed (m/s).
    pub speed: Array2<f64>,
    pub mean_speed: Array1<f64>,
    pub mean_depth: Array1<f64>,
}

impl VelocityProfile {
    pub fn new(speed: Array2<f64>, depth: &Array2<f64>) -> Self {
        Self {
            mean_speed: time_mean(&speed),
            mean_depth: time_mean(depth),
            speed,
        }
    }

    pub fn to_plot(&self) -> XyPlot {
        XyPlot::new(
            self.mean_speed.clone(),
            self.mean_depth.clone(),
            "Velocity norm profile",
            "Velocity (m/s)",
            "Depth (m)",
        )
    }
}

/// Flow direction and the speed of the same velocity pair.
///
/// Directions are in degrees, (−180, 180]: 0 = East, 90 = North.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDirection {
    /// `(T, L)`, or `(T, 1)` for depth-averaged velocity.
    pub direction: Array2<f64>,
    pub speed: Array2<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shear_profile_means() {
        let shear = array![[0.1, 0.2], [0.3, 0.4]];
        let mid = array![[-1.0, -3.0], [-2.0, -4.0]];
        let profile = ShearProfile::new(shear, &mid);
        assert_eq!(profile.mean_shear.len(), 2);
        assert!((profile.mean_shear[0] - 0.2).abs() < 1e-12);
        assert_eq!(profile.mean_depth, array![-1.5, -3.5]);

        let plot = profile.to_plot();
        assert_eq!(plot.title, "Shear profile");
        assert_eq!(plot.x_label, "Shear (1/s)");
        assert_eq!(plot.y_label, "Depth (m)");
    }

    #[test]
    fn test_empty_selection_is_nan() {
        let empty = Array2::<f64>::zeros((0, 3));
        let mean = time_mean(&empty);
        assert_eq!(mean.len(), 3);
        assert!(mean.iter().all(|v| v.is_nan()));
    }
}
