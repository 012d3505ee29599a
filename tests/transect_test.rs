//! Transect path finding and section sampling on the rectangle fixture.

mod common;

use approx::assert_relative_eq;
use fvcom_rs::{FieldError, TimeSelector};
use ndarray::Axis;

use common::{dataset_3d, DX};

/// (lon, lat) of a point given in fixture metres.
fn at(x: f64, y: f64) -> (f64, f64) {
    (-66.0 + x * 1e-5, 44.0 + y * 1e-5)
}

const START: (f64, f64) = (DX / 3.0, DX / 3.0);
const END: (f64, f64) = (3.0 * DX + 2.0 * DX / 3.0, 2.0 * DX + 2.0 * DX / 3.0);

#[test]
fn test_path_across_rectangle() {
    let data = dataset_3d();
    let transect = data
        .transect(at(START.0, START.1), at(END.0, END.1))
        .unwrap();

    assert_eq!(transect.elements.first(), Some(&0));
    assert_eq!(transect.elements.last(), Some(&23));
    assert_eq!(transect.distance.len(), transect.len());
    assert_eq!(transect.distance[0], 0.0);
    assert!(transect.distance.windows(2).all(|w| w[1] >= w[0]));

    // consecutive elements share an edge
    for pair in transect.elements.windows(2) {
        assert!(data.mesh().neighbors(pair[0]).contains(&pair[1]));
    }

    // never shorter than the straight line between the end centroids
    let c = data.mesh().centroids();
    let straight = ((c.x[23] - c.x[0]).powi(2) + (c.y[23] - c.y[0]).powi(2)).sqrt();
    assert!(transect.total_length() >= straight - 1e-9);
}

#[test]
fn test_same_start_and_end() {
    let data = dataset_3d();
    let transect = data
        .transect(at(START.0, START.1), at(START.0, START.1))
        .unwrap();
    assert_eq!(transect.elements, vec![0]);
    assert_eq!(transect.total_length(), 0.0);
}

#[test]
fn test_velo_norm_section() {
    let mut data = dataset_3d();
    let section = data
        .sample_transect_named(
            "velo_norm",
            at(START.0, START.1),
            at(END.0, END.1),
            &TimeSelector::All,
        )
        .unwrap();

    let n_path = section.elements.len();
    assert_eq!(section.name, "velo_norm");
    assert_eq!(section.values.dim(), (5, n_path));
    assert_eq!(section.depth.dim(), (5, n_path));
    assert_eq!(section.distance.len(), n_path);
    assert!(section.depth.iter().all(|&d| d < 0.0));

    // the section is the time mean of the domain field on the path
    let speed = data.velo_norm().unwrap();
    let mean = speed.view3().unwrap().mean_axis(Axis(0)).unwrap();
    for (p, &e) in section.elements.iter().enumerate() {
        for l in 0..5 {
            assert_relative_eq!(section.values[[l, p]], mean[[l, e]], epsilon = 1e-12);
        }
    }

    let plot = section.to_plot("Velocity norm");
    assert_eq!(plot.levels.len(), 21);
    assert_eq!(plot.values, section.values);
    assert_eq!(plot.x_label, "Distance along line (m)");
}

#[test]
fn test_section_over_period() {
    let mut data = dataset_3d();
    let full = data
        .sample_transect_named(
            "u",
            at(START.0, START.1),
            at(END.0, END.1),
            &TimeSelector::All,
        )
        .unwrap();
    let first = data
        .sample_transect_named(
            "u",
            at(START.0, START.1),
            at(END.0, END.1),
            &TimeSelector::Indices(vec![0]),
        )
        .unwrap();

    let u = data.raw().u().unwrap().view3().unwrap().to_owned();
    for (p, &e) in first.elements.iter().enumerate() {
        assert_eq!(first.values[[0, p]], u[[0, 0, e]]);
    }
    assert_ne!(full.values, first.values);
}

#[test]
fn test_static_node_field_section() {
    let data = dataset_3d();
    let transect = data
        .transect(at(START.0, START.1), at(END.0, END.1))
        .unwrap();
    let section = data
        .sample_transect(data.mesh().siglay(), &transect, &TimeSelector::All)
        .unwrap();
    for l in 0..5 {
        let expected = -(l as f64 + 0.5) / 5.0;
        for p in 0..transect.len() {
            assert_relative_eq!(section.values[[l, p]], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_surface_field_rejected() {
    let mut data = dataset_3d();
    let result = data.sample_transect_named(
        "el",
        at(START.0, START.1),
        at(END.0, END.1),
        &TimeSelector::All,
    );
    assert!(matches!(result, Err(FieldError::ShapeMismatch { .. })));
}

#[test]
fn test_unknown_variable() {
    let mut data = dataset_3d();
    let result = data.sample_transect_named(
        "salinity",
        at(START.0, START.1),
        at(END.0, END.1),
        &TimeSelector::All,
    );
    assert!(matches!(result, Err(FieldError::MissingField { .. })));
}

#[test]
fn test_shear_section_grids_match() {
    let mut data = dataset_3d();
    let section = data
        .sample_transect_named(
            "verti_shear",
            at(START.0, START.1),
            at(END.0, END.1),
            &TimeSelector::All,
        )
        .unwrap();
    let n_path = section.elements.len();
    assert_eq!(section.values.dim(), (4, n_path));
    assert_eq!(section.values.dim(), section.depth.dim());

    // mid-interval depths sit between the layer depths
    let layers = data
        .sample_transect_named(
            "velo_norm",
            at(START.0, START.1),
            at(END.0, END.1),
            &TimeSelector::All,
        )
        .unwrap();
    for p in 0..n_path {
        for k in 0..4 {
            assert_relative_eq!(
                section.depth[[k, p]],
                0.5 * (layers.depth[[k, p]] + layers.depth[[k + 1, p]]),
                epsilon = 1e-9
            );
        }
    }

    let plot = section.to_plot("Shear");
    assert_eq!(plot.values.dim(), plot.depth.dim());
}

#[test]
fn test_extractor_reused_across_paths() {
    let data = dataset_3d();
    let extractor = data.transect_extractor();
    let forward = extractor
        .path(at(START.0, START.1), at(END.0, END.1))
        .unwrap();
    let back = extractor
        .path(at(END.0, END.1), at(START.0, START.1))
        .unwrap();
    assert_relative_eq!(forward.total_length(), back.total_length(), epsilon = 1e-9);
}
