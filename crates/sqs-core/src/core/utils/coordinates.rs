use super::linalg::{self, LinalgError};
use nalgebra::{Matrix3, Vector3};

/// Expresses a vector given in the search tool's internal basis in the
/// physical Cartesian frame.
///
/// The rows of `coordinate_system` are the internal basis vectors, so the
/// Cartesian vector is `coordinate_systemᵀ · original`.
pub fn to_cartesian(coordinate_system: &Matrix3<f64>, original: &Vector3<f64>) -> Vector3<f64> {
    linalg::apply(&linalg::transpose(coordinate_system), original)
}

/// The matrix mapping Cartesian vectors onto multiples of the lattice vectors,
/// `(latticeᵀ)⁻¹`.
///
/// Exposed separately so that a serializer can invert once per structure
/// rather than once per atom.
///
/// # Errors
///
/// Returns [`LinalgError::SingularMatrix`] for a degenerate lattice.
pub fn fractional_transform(lattice_cartesian: &Matrix3<f64>) -> Result<Matrix3<f64>, LinalgError> {
    linalg::inverse(&linalg::transpose(lattice_cartesian))
}

/// Converts a Cartesian vector to fractional (direct) coordinates of the
/// given Cartesian lattice.
///
/// # Errors
///
/// Returns [`LinalgError::SingularMatrix`] for a degenerate lattice and
/// [`LinalgError::NonFinite`] if the result is not representable.
pub fn to_fractional(
    lattice_cartesian: &Matrix3<f64>,
    cartesian: &Vector3<f64>,
) -> Result<Vector3<f64>, LinalgError> {
    let transform = fractional_transform(lattice_cartesian)?;
    let fractional = linalg::apply(&transform, cartesian);
    linalg::ensure_finite_vector(&fractional, "fractional coordinates")?;
    Ok(fractional)
}
