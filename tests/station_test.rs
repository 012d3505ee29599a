//! Station output: lookup by name and the per-station profiles.

use approx::assert_relative_eq;
use fvcom_rs::{
    Coordinates, FieldError, LevelRange, StationRef, StationSeries, TimeAxis, TimeSelector,
};
use ndarray::{array, Array2, Array3};

const N_TIME: usize = 3;
const N_LEVELS: usize = 4;

/// Three stations with speed `2 − 0.5·l` flowing east; the third also has
/// an upward velocity of 1.5 m/s.
fn series(with_w: bool) -> StationSeries {
    let time = TimeAxis::from_datenums(vec![735385.0, 735385.5, 735386.0]).unwrap();
    let u = Array3::from_shape_fn((N_TIME, N_LEVELS, 3), |(_, l, _)| 2.0 - 0.5 * l as f64);
    let mut builder = StationSeries::builder()
        .with_stations(
            vec!["GP_BPa".into(), "GP_BPb".into(), "DG_DeepHole".into()],
            Coordinates::new(
                vec![-66.34, -66.33, -65.75],
                vec![44.26, 44.27, 44.69],
                vec![0.0, 800.0, 48000.0],
                vec![0.0, 1100.0, 47000.0],
            ),
        )
        .with_vertical_grid(
            array![8.0, 16.0, 40.0],
            Array2::from_shape_fn((N_LEVELS, 3), |(l, _)| -(l as f64 + 0.5) / N_LEVELS as f64),
        )
        .with_time(time)
        .with_elevation(Array2::zeros((N_TIME, 3)))
        .with_velocity(u, Array3::zeros((N_TIME, N_LEVELS, 3)))
        .with_depth_averaged_velocity(
            Array2::from_elem((N_TIME, 3), -1.0),
            Array2::zeros((N_TIME, 3)),
        );
    if with_w {
        let w = Array3::from_shape_fn((N_TIME, N_LEVELS, 3), |(_, _, s)| {
            if s == 2 {
                1.5
            } else {
                0.0
            }
        });
        builder = builder.with_vertical_velocity(w);
    }
    builder.build().unwrap()
}

#[test]
fn test_lookup() {
    let st = series(true);
    assert_eq!(st.n_stations(), 3);
    assert_eq!(st.search_index(&"gp_bpb".into()).unwrap().get(), 1);
    assert_eq!(st.search_index(&StationRef::from(2)).unwrap().get(), 2);
    assert!(matches!(
        st.search_index(&"GP_BPc".into()),
        Err(FieldError::StationNotFound(_))
    ));
    assert!(matches!(
        st.search_index(&StationRef::from(3)),
        Err(FieldError::StationNotFound(_))
    ));
}

#[test]
fn test_history_starts_with_grid() {
    let st = series(false);
    let first = &st.history()[0];
    assert_eq!(first.field_name, "grid");
    assert!(first.message.starts_with("Bounding box = "));
}

#[test]
fn test_depth_profile() {
    let st = series(false);
    let depth = st.depth(&"GP_BPa".into()).unwrap();
    assert_eq!(depth.dim(), (N_TIME, N_LEVELS));
    assert_eq!(depth.row(0).to_vec(), vec![-1.0, -3.0, -5.0, -7.0]);
}

#[test]
fn test_shear_full_and_sub_range() {
    let st = series(false);
    let station: StationRef = "GP_BPa".into();

    let full = st.verti_shear(&station, &TimeSelector::All, None).unwrap();
    assert_eq!(full.shear.dim(), (N_TIME, N_LEVELS - 1));
    for &value in full.shear.iter() {
        assert_relative_eq!(value, 0.25);
    }
    assert_eq!(full.mean_depth.to_vec(), vec![-2.0, -4.0, -6.0]);

    let sub = st
        .verti_shear(&station, &TimeSelector::range(0, 2), Some(LevelRange::new(1, 3)))
        .unwrap();
    assert_eq!(sub.shear.dim(), (2, 2));
    assert_eq!(sub.mean_depth.to_vec(), vec![-4.0, -6.0]);

    let plot = sub.to_plot();
    assert_eq!(plot.title, "Shear profile");
    assert_eq!(plot.x_label, "Shear (1/s)");

    assert!(matches!(
        st.verti_shear(&station, &TimeSelector::All, Some(LevelRange::new(2, 4))),
        Err(FieldError::InvalidLevelRange { .. })
    ));
}

#[test]
fn test_velo_norm_with_vertical_velocity() {
    let st = series(true);
    let profile = st
        .velo_norm(&"DG_DeepHole".into(), &TimeSelector::All)
        .unwrap();
    // (2, 0, 1.5) at the surface layer
    assert_relative_eq!(profile.speed[[0, 0]], 2.5);
    assert_relative_eq!(profile.mean_speed[0], 2.5);
    assert_eq!(profile.to_plot().title, "Velocity norm profile");

    let flat = st.velo_norm(&"GP_BPa".into(), &TimeSelector::All).unwrap();
    assert_eq!(flat.mean_speed.to_vec(), vec![2.0, 1.5, 1.0, 0.5]);
}

#[test]
fn test_flow_dir_layered_and_averaged() {
    let st = series(false);
    let station: StationRef = 0.into();

    let layered = st.flow_dir(&station, &TimeSelector::All, true).unwrap();
    assert_eq!(layered.direction.dim(), (N_TIME, N_LEVELS));
    assert!(layered.direction.iter().all(|&d| d == 0.0));

    let averaged = st.flow_dir(&station, &TimeSelector::All, false).unwrap();
    assert_eq!(averaged.direction.dim(), (N_TIME, 1));
    assert_relative_eq!(averaged.direction[[0, 0]], 180.0);
    assert_relative_eq!(averaged.speed[[0, 0]], 1.0);
}

#[test]
fn test_vertical_velocity_needs_layers() {
    let time = TimeAxis::from_datenums(vec![735385.0]).unwrap();
    let result = StationSeries::builder()
        .with_stations(
            vec!["A".into()],
            Coordinates::new(vec![-66.0], vec![44.0], vec![0.0], vec![0.0]),
        )
        .with_vertical_grid(array![10.0], array![[-0.5]])
        .with_time(time)
        .with_vertical_velocity(Array3::zeros((1, 1, 1)))
        .build();
    assert!(matches!(result, Err(FieldError::MissingField { .. })));
}
