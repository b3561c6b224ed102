use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Relative threshold below which a determinant is treated as zero.
///
/// The determinant is compared against `DETERMINANT_EPSILON * scale`, where
/// `scale` is the product of the row norms, so the test does not depend on the
/// unit the lattice happens to be expressed in.
const DETERMINANT_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f64 },
    #[error("Non-finite value in {context}")]
    NonFinite { context: &'static str },
}

pub fn multiply(a: &Matrix3<f64>, b: &Matrix3<f64>) -> Matrix3<f64> {
    a * b
}

pub fn apply(m: &Matrix3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    m * v
}

pub fn transpose(m: &Matrix3<f64>) -> Matrix3<f64> {
    m.transpose()
}

/// Builds a matrix whose rows are the given vectors.
pub fn from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_row_slice(&[
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
        rows[2][1], rows[2][2],
    ])
}

pub fn is_singular(m: &Matrix3<f64>) -> bool {
    let determinant = m.determinant();
    let scale: f64 = m.row_iter().map(|row| row.norm()).product();
    !determinant.is_finite() || determinant.abs() <= DETERMINANT_EPSILON * scale
}

/// Inverts a general real 3x3 matrix.
///
/// # Errors
///
/// Returns [`LinalgError::SingularMatrix`] when the rows are (numerically)
/// linearly dependent, and [`LinalgError::NonFinite`] if the input contains
/// NaN or infinite entries.
pub fn inverse(m: &Matrix3<f64>) -> Result<Matrix3<f64>, LinalgError> {
    ensure_finite_matrix(m, "matrix to invert")?;
    if is_singular(m) {
        return Err(LinalgError::SingularMatrix {
            determinant: m.determinant(),
        });
    }
    let inv = m.try_inverse().ok_or(LinalgError::SingularMatrix {
        determinant: m.determinant(),
    })?;
    ensure_finite_matrix(&inv, "matrix inverse")?;
    Ok(inv)
}

pub fn ensure_finite_matrix(m: &Matrix3<f64>, context: &'static str) -> Result<(), LinalgError> {
    if m.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(LinalgError::NonFinite { context })
    }
}

pub fn ensure_finite_vector(v: &Vector3<f64>, context: &'static str) -> Result<(), LinalgError> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(LinalgError::NonFinite { context })
    }
}
