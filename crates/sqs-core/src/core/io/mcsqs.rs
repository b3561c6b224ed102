use crate::core::io::ordering::{self, UnlistedSpecies};
use crate::core::models::structure::{Atom, Structure};
use crate::core::utils::linalg::{self, LinalgError};
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Number of header lines preceding the atom list: three coordinate-system
/// rows followed by three lattice rows.
pub const HEADER_LINES: usize = 6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("Malformed header on line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },
    #[error("Malformed atom entry on line {line}: '{content}' (expected 'x y z label')")]
    MalformedAtomLine { line: usize, content: String },
    #[error("Record contains no atoms")]
    EmptyStructure,
    #[error(
        "Length of order specification ({expected}) is different from number of atom types found in record ({found})"
    )]
    TypeCountMismatch { expected: usize, found: usize },
    #[error("Atom type '{label}' found in record is missing from the order specification")]
    UnknownSpecies { label: String },
    #[error(
        "Lattice is degenerate (determinant {determinant:e}), fractional coordinates are undefined"
    )]
    SingularMatrix { determinant: f64 },
    #[error("Non-finite value in {context}")]
    NonFinite { context: &'static str },
}

impl From<LinalgError> for RecordError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::SingularMatrix { determinant } => Self::SingularMatrix { determinant },
            LinalgError::NonFinite { context } => Self::NonFinite { context },
        }
    }
}

impl From<UnlistedSpecies> for RecordError {
    fn from(err: UnlistedSpecies) -> Self {
        Self::UnknownSpecies { label: err.0 }
    }
}

fn parse_header_row(line: &str, line_num: usize) -> Result<[f64; 3], RecordError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(RecordError::MalformedHeader {
            line: line_num,
            reason: format!("expected 3 values, found {}", tokens.len()),
        });
    }
    let mut row = [0.0; 3];
    for (slot, token) in row.iter_mut().zip(&tokens) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RecordError::MalformedHeader {
                line: line_num,
                reason: format!("invalid number '{}'", token),
            })?;
    }
    Ok(row)
}

fn parse_matrix<S: AsRef<str>>(rows: &[S], first_line: usize) -> Result<Matrix3<f64>, RecordError> {
    let mut parsed = [[0.0; 3]; 3];
    for (i, row) in parsed.iter_mut().enumerate() {
        let line = rows.get(i).ok_or_else(|| RecordError::MalformedHeader {
            line: first_line + i,
            reason: "record ends before the header is complete".to_string(),
        })?;
        *row = parse_header_row(line.as_ref(), first_line + i)?;
    }
    Ok(linalg::from_rows(&parsed))
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, RecordError> {
    let malformed = || RecordError::MalformedAtomLine {
        line: line_num,
        content: line.trim().to_string(),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(malformed());
    }
    let mut coords = [0.0; 3];
    for (slot, token) in coords.iter_mut().zip(&tokens[..3]) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(malformed)?;
    }
    Ok(Atom::new(tokens[3], Vector3::from(coords)))
}

/// Parses one structure record of an `mcsqs` output stream.
///
/// `lines` holds the record without its terminator: three coordinate-system
/// rows, three lattice rows, then one `x y z label` line per atom. Line
/// numbers in errors are 1-based and relative to the start of the record.
///
/// Atom types default to the distinct labels in order of first appearance;
/// `type_order` overrides that order but must name exactly as many types as
/// the record contains.
///
/// # Errors
///
/// - [`RecordError::MalformedHeader`] if a header row does not hold exactly
///   three finite numbers, or the record is shorter than its header.
/// - [`RecordError::EmptyStructure`] if no atom lines follow the header.
/// - [`RecordError::TypeCountMismatch`] if `type_order` has the wrong arity.
/// - [`RecordError::MalformedAtomLine`] for an atom line that is not
///   three numbers followed by a label.
/// - [`RecordError::UnknownSpecies`] if a label is absent from `type_order`.
pub fn parse_record<S: AsRef<str>>(
    lines: &[S],
    type_order: Option<&[String]>,
) -> Result<Structure, RecordError> {
    let coordinate_system = parse_matrix(lines, 1)?;
    let lattice = parse_matrix(lines.get(3..).unwrap_or_default(), 4)?;

    let atom_lines = lines.get(HEADER_LINES..).unwrap_or_default();
    if atom_lines.is_empty() {
        return Err(RecordError::EmptyStructure);
    }

    let discovered = ordering::discover_species(
        atom_lines
            .iter()
            .filter_map(|line| line.as_ref().split_whitespace().last()),
    );
    let order = match type_order {
        Some(order) if order.len() != discovered.len() => {
            return Err(RecordError::TypeCountMismatch {
                expected: order.len(),
                found: discovered.len(),
            });
        }
        Some(order) => order.to_vec(),
        None => discovered,
    };

    let atoms = atom_lines
        .iter()
        .enumerate()
        .map(|(i, line)| parse_atom_line(line.as_ref(), HEADER_LINES + i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let grouped = ordering::group_by_species(atoms, &order)?;
    Ok(Structure::new(
        coordinate_system,
        lattice,
        grouped.atom_types,
        grouped.atoms,
    )?)
}
