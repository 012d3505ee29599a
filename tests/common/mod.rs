//! Synthetic FVCOM-like fixtures shared by the integration tests and benches.
#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDate;
use fvcom_rs::{
    Coordinates, EngineConfig, FvcomDataset, GridLocation, MeshIndex, NeighborEncoding, RawFields,
    StateField, TimeAxis,
};
use ndarray::{Array1, Array2, Array3};

/// Grid spacing of the rectangle fixtures (m).
pub const DX: f64 = 100.0;

/// Scale applied to the rotational test current (1/s).
pub const OMEGA: f64 = 1e-3;

/// Regular `nx × ny` grid of squares, each split into two triangles.
///
/// Node `(i, j)` sits at `x = i·DX`, `y = j·DX`; lon/lat are a small offset
/// from (−66, 44). Element `2·(j·nx + i)` is the lower-left triangle of cell
/// `(i, j)`, the next one the upper-right.
pub fn rectangle(nx: usize, ny: usize, n_levels: usize, with_coefficients: bool) -> MeshIndex {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            x.push(i as f64 * DX);
            y.push(j as f64 * DX);
        }
    }
    let lon: Vec<f64> = x.iter().map(|x| -66.0 + x * 1e-5).collect();
    let lat: Vec<f64> = y.iter().map(|y| 44.0 + y * 1e-5).collect();
    let n_nodes = x.len();

    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let mut trinodes = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            trinodes.push([node(i, j), node(i + 1, j), node(i, j + 1)]);
            trinodes.push([node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)]);
        }
    }
    let triele = one_based_neighbors(&trinodes);

    let siglay = Array2::from_shape_fn((n_levels, n_nodes), |(l, _)| {
        -(l as f64 + 0.5) / n_levels as f64
    });
    let siglev = Array2::from_shape_fn((n_levels + 1, n_nodes), |(l, _)| {
        -(l as f64) / n_levels as f64
    });
    let h = Array1::from_shape_fn(n_nodes, |n| 10.0 + x[n] / 100.0);

    let mut builder = MeshIndex::builder()
        .with_nodes(Coordinates::new(lon, lat, x, y))
        .with_trinodes(trinodes.clone())
        .with_triele(triele)
        .with_neighbor_encoding(NeighborEncoding::OneBased)
        .with_siglay(StateField::level_space("siglay", siglay, GridLocation::Node))
        .with_siglev(StateField::level_space("siglev", siglev, GridLocation::Node))
        .with_bathymetry(StateField::space("h", h, GridLocation::Node));

    if with_coefficients {
        // Centroids are needed for the weights; build once without them.
        let bare = builder.clone().build().expect("fixture mesh");
        let (a1u, a2u) = least_squares_coefficients(&bare);
        builder = builder.with_coefficients(a1u, a2u);
    }
    builder.build().expect("fixture mesh")
}

/// Elements sharing an edge, 1-based with 0 for "none".
fn one_based_neighbors(trinodes: &[[usize; 3]]) -> Vec<[usize; 3]> {
    let mut edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (e, tri) in trinodes.iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            edges.entry((a.min(b), a.max(b))).or_default().push(e);
        }
    }
    trinodes
        .iter()
        .enumerate()
        .map(|(e, tri)| {
            let mut row = [0; 3];
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                if let Some(other) = edges[&(a.min(b), a.max(b))].iter().find(|&&o| o != e) {
                    row[k] = other + 1;
                }
            }
            row
        })
        .collect()
}

/// Least-squares gradient weights from each element and its real neighbors.
///
/// Exact for linear fields wherever two non-collinear neighbors exist; zero
/// where the system is singular.
fn least_squares_coefficients(mesh: &MeshIndex) -> (Array2<f64>, Array2<f64>) {
    let n = mesh.n_elements();
    let c = mesh.centroids();
    let mut a1u = Array2::zeros((4, n));
    let mut a2u = Array2::zeros((4, n));
    for e in 0..n {
        let nb = mesh.neighbors(e);
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for &k in &nb {
            if mesh.is_ghost(k) {
                continue;
            }
            let (dx, dy) = (c.x[k] - c.x[e], c.y[k] - c.y[e]);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        let det = sxx * syy - sxy * sxy;
        if det.abs() < 1e-9 {
            continue;
        }
        let (i00, i01, i11) = (syy / det, -sxy / det, sxx / det);
        for (slot, &k) in nb.iter().enumerate() {
            if mesh.is_ghost(k) {
                continue;
            }
            let (dx, dy) = (c.x[k] - c.x[e], c.y[k] - c.y[e]);
            let wx = i00 * dx + i01 * dy;
            let wy = i01 * dx + i11 * dy;
            a1u[[slot + 1, e]] = wx;
            a2u[[slot + 1, e]] = wy;
            a1u[[0, e]] -= wx;
            a2u[[0, e]] -= wy;
        }
    }
    (a1u, a2u)
}

/// True when all three neighbor slots of `e` are real elements.
pub fn is_interior(mesh: &MeshIndex, e: usize) -> bool {
    !mesh.is_boundary(e)
}

/// Hourly axis starting 2013-06-01 00:00.
pub fn hourly(n: usize) -> TimeAxis {
    let t0 = NaiveDate::from_ymd_opt(2013, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date");
    let times: Vec<_> = (0..n)
        .map(|h| t0 + chrono::Duration::hours(h as i64))
        .collect();
    TimeAxis::from_datetimes(&times).expect("monotonic axis")
}

/// Strength of the rotational current at step `t` and layer `l`.
pub fn strength(t: usize, l: usize) -> f64 {
    (1.0 + 0.1 * t as f64) * (1.0 - 0.2 * l as f64)
}

/// Solid-body rotation `u = −ω·s·y`, `v = ω·s·x`: vorticity `2·ω·s`.
pub fn rotating_raw(mesh: &MeshIndex, n_time: usize, with_w: bool) -> RawFields {
    let n_levels = mesh.n_levels();
    let n_elements = mesh.n_elements();
    let c = mesh.centroids();
    let u = Array3::from_shape_fn((n_time, n_levels, n_elements), |(t, l, e)| {
        -OMEGA * strength(t, l) * c.y[e]
    });
    let v = Array3::from_shape_fn((n_time, n_levels, n_elements), |(t, l, e)| {
        OMEGA * strength(t, l) * c.x[e]
    });
    let ua = u.mean_axis(ndarray::Axis(1)).expect("levels");
    let va = v.mean_axis(ndarray::Axis(1)).expect("levels");
    let x = &mesh.nodes().x;
    let el = Array2::from_shape_fn((n_time, mesh.n_nodes()), |(t, n)| {
        0.5 * (t as f64 * 0.5).sin() + 1e-4 * x[n]
    });

    let mut raw = RawFields::new()
        .with_velocity(
            StateField::time_level_space("u", u, GridLocation::Element),
            StateField::time_level_space("v", v, GridLocation::Element),
        )
        .with_depth_averaged_velocity(
            StateField::time_space("ua", ua, GridLocation::Element),
            StateField::time_space("va", va, GridLocation::Element),
        )
        .with_elevation(StateField::time_space("zeta", el, GridLocation::Node));
    if with_w {
        raw = raw.with_vertical_velocity(StateField::time_level_space(
            "w",
            Array3::from_elem((n_time, n_levels, n_elements), 0.01),
            GridLocation::Element,
        ));
    }
    raw
}

/// Same current with only the depth-averaged pair and elevation.
pub fn depth_averaged_raw(mesh: &MeshIndex, n_time: usize) -> RawFields {
    let full = rotating_raw(mesh, n_time, false);
    let ua = full.ua().expect("ua").clone();
    let va = full.va().expect("va").clone();
    let el = full.el().expect("el").clone();
    RawFields::new()
        .with_depth_averaged_velocity(ua, va)
        .with_elevation(el)
}

/// 4×3 cells, 5 layers, 6 hourly steps, with `w` and coefficients.
pub fn dataset_3d() -> FvcomDataset {
    let mesh = rectangle(4, 3, 5, true);
    let raw = rotating_raw(&mesh, 6, true);
    FvcomDataset::new(mesh, hourly(6), raw, EngineConfig::default()).expect("fixture dataset")
}

/// Depth-averaged variant of [`dataset_3d`].
pub fn dataset_2d() -> FvcomDataset {
    let mesh = rectangle(4, 3, 5, true);
    let raw = depth_averaged_raw(&mesh, 6);
    FvcomDataset::new(mesh, hourly(6), raw, EngineConfig::default()).expect("fixture dataset")
}
