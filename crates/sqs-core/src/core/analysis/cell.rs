use crate::core::utils::linalg;
use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// Default tolerance on the dot products of lattice vectors considered
/// orthogonal.
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-8;

/// Geometric summary of a Cartesian cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellMetrics {
    pub volume: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Angle between `b` and `c`, in degrees.
    pub alpha: f64,
    /// Angle between `a` and `c`, in degrees.
    pub beta: f64,
    /// Angle between `a` and `b`, in degrees.
    pub gamma: f64,
}

impl CellMetrics {
    /// Computes the metrics of a lattice given as row vectors.
    pub fn from_lattice(lattice: &Matrix3<f64>) -> Self {
        let [a, b, c] = lattice_vectors(lattice);
        Self {
            volume: volume(lattice),
            a: a.norm(),
            b: b.norm(),
            c: c.norm(),
            alpha: angle_degrees(&b, &c),
            beta: angle_degrees(&a, &c),
            gamma: angle_degrees(&a, &b),
        }
    }
}

fn lattice_vectors(lattice: &Matrix3<f64>) -> [Vector3<f64>; 3] {
    [
        lattice.row(0).transpose(),
        lattice.row(1).transpose(),
        lattice.row(2).transpose(),
    ]
}

fn angle_degrees(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let denominator = u.norm() * v.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (u.dot(v) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Absolute cell volume, `|a · (b × c)|`.
pub fn volume(lattice: &Matrix3<f64>) -> f64 {
    lattice.determinant().abs()
}

/// Lengths of the three lattice vectors.
pub fn lattice_constants(lattice: &Matrix3<f64>) -> [f64; 3] {
    let [a, b, c] = lattice_vectors(lattice);
    [a.norm(), b.norm(), c.norm()]
}

/// Whether all three lattice vectors are pairwise orthogonal, judged by the
/// absolute value of their dot products.
pub fn is_orthogonal(lattice: &Matrix3<f64>, tolerance: f64) -> bool {
    let [a, b, c] = lattice_vectors(lattice);
    a.dot(&b).abs() < tolerance && b.dot(&c).abs() < tolerance && c.dot(&a).abs() < tolerance
}

/// Indices of the supercells whose Cartesian form `cell · coordinate_system`
/// is orthogonal.
pub fn find_orthogonal_cells(
    coordinate_system: &Matrix3<f64>,
    cells: &[Matrix3<f64>],
    tolerance: f64,
) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| is_orthogonal(&linalg::multiply(cell, coordinate_system), tolerance))
        .map(|(i, _)| i)
        .collect()
}

/// Builds a coordinate system from cell parameters (lengths and angles in
/// degrees), with `a` along x and `b` in the xy plane.
pub fn coordinate_system_from_parameters(
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Matrix3<f64> {
    let (alpha, beta, gamma) = (alpha.to_radians(), beta.to_radians(), gamma.to_radians());
    let cx = c * beta.cos();
    let cy = c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
    let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();
    linalg::from_rows(&[
        [a, 0.0, 0.0],
        [b * gamma.cos(), b * gamma.sin(), 0.0],
        [cx, cy, cz],
    ])
}
