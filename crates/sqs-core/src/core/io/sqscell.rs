use crate::core::analysis::cell;
use crate::core::io::traits::CellFile;
use crate::core::utils::linalg;
use nalgebra::Matrix3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqsCellError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("Header announces {expected} cell(s) but {found} were found")]
    CountMismatch { expected: usize, found: usize },
}

fn parse_numbers(line: &str, line_num: usize) -> Result<Vec<f64>, SqsCellError> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SqsCellError::Parse {
            line: line_num,
            reason: format!("invalid number in '{}'", line.trim()),
        })
}

fn row_of_three(values: &[f64], line_num: usize) -> Result<[f64; 3], SqsCellError> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(SqsCellError::Parse {
            line: line_num,
            reason: format!("expected 3 values, found {}", values.len()),
        }),
    }
}

/// Reads the coordinate system of an ATAT `lat.in` file.
///
/// The coordinate system is either three rows of three numbers, or a single
/// `a b c alpha beta gamma` line (angles in degrees).
pub struct LatInFile;

impl CellFile for LatInFile {
    type Cell = Matrix3<f64>;
    type Error = SqsCellError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Cell, Self::Error> {
        let mut rows = Vec::with_capacity(3);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;
            let values = parse_numbers(&line, line_num)?;

            if line_num == 1 && values.len() == 6 {
                return Ok(cell::coordinate_system_from_parameters(
                    values[0], values[1], values[2], values[3], values[4], values[5],
                ));
            }
            rows.push(row_of_three(&values, line_num)?);
            if rows.len() == 3 {
                return Ok(linalg::from_rows(&[rows[0], rows[1], rows[2]]));
            }
        }
        Err(SqsCellError::Parse {
            line: rows.len() + 1,
            reason: "file ends before the coordinate system is complete".to_string(),
        })
    }
}

/// Reads the candidate supercells listed in an `mcsqs` `sqscell.out` file.
///
/// The first line holds the number of cells; each cell follows as three rows
/// of lattice vectors in units of the `lat.in` coordinate system, separated
/// by blank lines.
pub struct SqsCellFile;

impl CellFile for SqsCellFile {
    type Cell = Vec<Matrix3<f64>>;
    type Error = SqsCellError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Cell, Self::Error> {
        let mut lines = reader.lines().enumerate();

        let expected = loop {
            match lines.next() {
                Some((i, line)) => {
                    let line = line?;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    break trimmed.parse::<usize>().map_err(|_| SqsCellError::Parse {
                        line: i + 1,
                        reason: format!("expected number of cells, found '{}'", trimmed),
                    })?;
                }
                None => return Ok(Vec::new()),
            }
        };

        let mut cells = Vec::with_capacity(expected);
        let mut pending: Vec<[f64; 3]> = Vec::with_capacity(3);
        for (i, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let values = parse_numbers(&line, i + 1)?;
            pending.push(row_of_three(&values, i + 1)?);
            if pending.len() == 3 {
                cells.push(linalg::from_rows(&[pending[0], pending[1], pending[2]]));
                pending.clear();
            }
        }

        if !pending.is_empty() || cells.len() != expected {
            return Err(SqsCellError::CountMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(cells)
    }
}
