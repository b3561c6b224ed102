use crate::core::io::traits::{CellFile, StructureFile};
use crate::core::models::structure::Structure;
use crate::core::utils::linalg::{self, LinalgError};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// How atom positions are expressed in a POSCAR file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Physical Cartesian coordinates (`Cartesian` tag).
    #[default]
    #[serde(alias = "car")]
    Cartesian,
    /// Multiples of the lattice vectors (`Direct` tag).
    #[serde(alias = "dir", alias = "direct", alias = "frac")]
    Fractional,
}

impl Representation {
    /// The mode line VASP expects in front of the atom positions.
    pub fn tag(self) -> &'static str {
        match self {
            Representation::Cartesian => "Cartesian",
            Representation::Fractional => "Direct",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Cartesian => write!(f, "cartesian"),
            Representation::Fractional => write!(f, "fractional"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown representation '{0}'. Expected 'cartesian' (car) or 'fractional' (dir, direct).")]
pub struct ParseRepresentationError(pub String);

impl FromStr for Representation {
    type Err = ParseRepresentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "cartesian" => Ok(Representation::Cartesian),
            "dir" | "direct" | "frac" | "fractional" => Ok(Representation::Fractional),
            _ => Err(ParseRepresentationError(s.to_string())),
        }
    }
}

/// Settings for one written POSCAR file.
#[derive(Debug, Clone, PartialEq)]
pub struct PoscarOptions {
    /// Free text placed on the comment line.
    pub name: String,
    /// 1-based number of the record the structure came from.
    pub record_index: usize,
    pub representation: Representation,
}

/// The header of an existing POSCAR/CONTCAR file.
#[derive(Debug, Clone, PartialEq)]
pub struct PoscarCell {
    pub comment: String,
    /// Universal scaling factor; a negative value is the target cell volume.
    pub scale: f64,
    /// Lattice vectors (rows) as written, before scaling.
    pub lattice: Matrix3<f64>,
    /// Species labels, empty for VASP 4 files without a species line.
    pub species: Vec<String>,
    pub counts: Vec<usize>,
}

impl PoscarCell {
    /// Lattice vectors with the scaling factor applied.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if a volume scaling factor is
    /// given for a degenerate lattice.
    pub fn scaled_lattice(&self) -> Result<Matrix3<f64>, LinalgError> {
        if self.scale >= 0.0 {
            return Ok(self.lattice * self.scale);
        }
        if linalg::is_singular(&self.lattice) {
            return Err(LinalgError::SingularMatrix {
                determinant: self.lattice.determinant(),
            });
        }
        let factor = (self.scale.abs() / self.lattice.determinant().abs()).cbrt();
        Ok(self.lattice * factor)
    }
}

#[derive(Debug, Error)]
pub enum PoscarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot compute atom positions: {0}")]
    Numeric(#[from] LinalgError),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

fn write_coordinate_line(writer: &mut impl Write, v: &Vector3<f64>) -> io::Result<()> {
    write!(writer, " ")?;
    for value in v.iter() {
        write!(writer, "  {:20.16}", value)?;
    }
    writeln!(writer)
}

pub struct PoscarFile;

impl StructureFile for PoscarFile {
    type Options = PoscarOptions;
    type Error = PoscarError;

    fn write_to(
        structure: &Structure,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let positions = match options.representation {
            Representation::Cartesian => {
                let positions = structure.cartesian_positions();
                for p in &positions {
                    linalg::ensure_finite_vector(p, "Cartesian coordinates")?;
                }
                positions
            }
            Representation::Fractional => structure.fractional_positions()?,
        };

        writeln!(
            writer,
            "{} (record number {})",
            options.name, options.record_index
        )?;
        writeln!(writer, " 1.0")?;

        let lattice = structure.lattice_cartesian();
        for row in lattice.row_iter() {
            write!(writer, " ")?;
            for value in row.iter() {
                write!(writer, "  {:12.8}", value)?;
            }
            writeln!(writer)?;
        }

        write!(writer, " ")?;
        for atom_type in structure.atom_types() {
            write!(writer, "  {:<4}", atom_type.label)?;
        }
        writeln!(writer)?;

        write!(writer, " ")?;
        for atom_type in structure.atom_types() {
            write!(writer, "  {:>4}", atom_type.multiplicity)?;
        }
        writeln!(writer)?;

        writeln!(writer, "{}", options.representation.tag())?;
        for position in &positions {
            write_coordinate_line(writer, position)?;
        }
        Ok(())
    }
}

fn next_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    line_num: usize,
    what: &str,
) -> Result<String, PoscarError> {
    lines.next().transpose()?.ok_or_else(|| PoscarError::Parse {
        line: line_num,
        reason: format!("unexpected end of file, expected {}", what),
    })
}

fn parse_vector_line(line: &str, line_num: usize) -> Result<[f64; 3], PoscarError> {
    let values: Vec<f64> = line
        .split_whitespace()
        .take(3)
        .map(|token| token.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| PoscarError::Parse {
            line: line_num,
            reason: format!("invalid lattice vector '{}'", line.trim()),
        })?;
    match values.as_slice() {
        [x, y, z] if values.iter().all(|v| v.is_finite()) => Ok([*x, *y, *z]),
        _ => Err(PoscarError::Parse {
            line: line_num,
            reason: format!("expected 3 lattice components in '{}'", line.trim()),
        }),
    }
}

fn parse_counts(line: &str, line_num: usize) -> Result<Vec<usize>, PoscarError> {
    line.split_whitespace()
        .map(|token| token.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| PoscarError::Parse {
            line: line_num,
            reason: format!("invalid atom counts '{}'", line.trim()),
        })
}

impl CellFile for PoscarFile {
    type Cell = PoscarCell;
    type Error = PoscarError;

    /// Reads the comment, scaling factor, lattice and composition lines.
    ///
    /// Atom positions are not read; only the cell description is needed by
    /// the analysis tools.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Cell, Self::Error> {
        let mut lines = reader.lines();

        let comment = next_line(&mut lines, 1, "comment line")?.trim().to_string();

        let scale_line = next_line(&mut lines, 2, "scaling factor")?;
        let scale = scale_line
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v != 0.0)
            .ok_or_else(|| PoscarError::Parse {
                line: 2,
                reason: format!("invalid scaling factor '{}'", scale_line.trim()),
            })?;

        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            let line = next_line(&mut lines, 3 + i, "lattice vector")?;
            *row = parse_vector_line(&line, 3 + i)?;
        }

        let mut species = Vec::new();
        let mut counts = Vec::new();
        if let Some(line) = lines.next().transpose()? {
            let starts_alphabetic = line
                .trim_start()
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic());
            if starts_alphabetic {
                species = line.split_whitespace().map(str::to_string).collect();
                let counts_line = next_line(&mut lines, 7, "atom counts")?;
                counts = parse_counts(&counts_line, 7)?;
            } else {
                counts = parse_counts(&line, 6)?;
            }
        }

        Ok(PoscarCell {
            comment,
            scale,
            lattice: linalg::from_rows(&rows),
            species,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::mcsqs::parse_record;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn two_atom_structure(lattice_rows: [&str; 3]) -> Structure {
        let mut lines = vec!["1 0 0", "0 1 0", "0 0 1"];
        lines.extend(lattice_rows);
        lines.extend(["0.0 0.0 0.0 A", "1.0 1.0 1.0 B"]);
        parse_record(&lines, None).unwrap()
    }

    fn options(representation: Representation) -> PoscarOptions {
        PoscarOptions {
            name: "LiNbO3".to_string(),
            record_index: 1,
            representation,
        }
    }

    fn render(structure: &Structure, representation: Representation) -> String {
        let mut out = Vec::new();
        PoscarFile::write_to(structure, &options(representation), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cartesian_output_has_exact_layout() {
        let structure = two_atom_structure(["2 0 0", "0 2 0", "0 0 2"]);
        let expected = "\
LiNbO3 (record number 1)
 1.0
     2.00000000    0.00000000    0.00000000
     0.00000000    2.00000000    0.00000000
     0.00000000    0.00000000    2.00000000
   A     B   
      1     1
Cartesian
     0.0000000000000000    0.0000000000000000    0.0000000000000000
     1.0000000000000000    1.0000000000000000    1.0000000000000000
";
        assert_eq!(render(&structure, Representation::Cartesian), expected);
    }

    #[test]
    fn fractional_output_uses_direct_tag() {
        let structure = two_atom_structure(["2 0 0", "0 2 0", "0 0 2"]);
        let text = render(&structure, Representation::Fractional);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[7], "Direct");
        assert_eq!(
            lines[9],
            "     0.5000000000000000    0.5000000000000000    0.5000000000000000"
        );
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn degenerate_lattice_fails_only_in_fractional_mode() {
        let structure = two_atom_structure(["1 1 0", "2 2 0", "3 3 0"]);
        let mut out = Vec::new();
        let opts = options(Representation::Fractional);
        let result = PoscarFile::write_to(&structure, &opts, &mut out);
        assert!(matches!(
            result,
            Err(PoscarError::Numeric(LinalgError::SingularMatrix { .. }))
        ));
        assert!(out.is_empty());

        let text = render(&structure, Representation::Cartesian);
        assert!(text.contains("Cartesian"));
    }

    #[test]
    fn write_to_path_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("POSCAR");
        let structure = two_atom_structure(["2 0 0", "0 2 0", "0 0 2"]);
        let opts = options(Representation::Cartesian);

        PoscarFile::write_to_path(&structure, &opts, &path).unwrap();
        let result = PoscarFile::write_to_path(&structure, &opts, &path);
        assert!(matches!(
            result,
            Err(PoscarError::Io(ref e)) if e.kind() == io::ErrorKind::AlreadyExists
        ));
    }

    #[test]
    fn failed_serialization_creates_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("POSCAR");
        let structure = two_atom_structure(["1 1 0", "2 2 0", "3 3 0"]);
        let result =
            PoscarFile::write_to_path(&structure, &options(Representation::Fractional), &path);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn representation_parses_aliases() {
        assert_eq!("car".parse::<Representation>(), Ok(Representation::Cartesian));
        assert_eq!("Cartesian".parse::<Representation>(), Ok(Representation::Cartesian));
        assert_eq!("dir".parse::<Representation>(), Ok(Representation::Fractional));
        assert_eq!("direct".parse::<Representation>(), Ok(Representation::Fractional));
        assert_eq!("fractional".parse::<Representation>(), Ok(Representation::Fractional));
        assert!("polar".parse::<Representation>().is_err());
    }

    #[test]
    fn read_from_parses_vasp5_header() {
        let text = "\
written (record number 3)
 1.5
    2.00000000    0.00000000    0.00000000
    0.00000000    2.00000000    0.00000000
    0.00000000    0.00000000    4.00000000
   Li    O
      2     6
Direct
";
        let cell = PoscarFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(cell.comment, "written (record number 3)");
        assert_eq!(cell.scale, 1.5);
        assert_eq!(cell.lattice[(2, 2)], 4.0);
        assert_eq!(cell.species, vec!["Li".to_string(), "O".to_string()]);
        assert_eq!(cell.counts, vec![2, 6]);
        assert_eq!(cell.scaled_lattice().unwrap()[(0, 0)], 3.0);
    }

    #[test]
    fn read_from_accepts_vasp4_counts_line() {
        let text = "c\n1.0\n1 0 0\n0 1 0\n0 0 1\n4 4\nDirect\n";
        let cell = PoscarFile::read_from(&mut Cursor::new(text)).unwrap();
        assert!(cell.species.is_empty());
        assert_eq!(cell.counts, vec![4, 4]);
    }

    #[test]
    fn negative_scale_sets_cell_volume() {
        let text = "c\n-27.0\n1 0 0\n0 1 0\n0 0 1\n";
        let cell = PoscarFile::read_from(&mut Cursor::new(text)).unwrap();
        let lattice = cell.scaled_lattice().unwrap();
        assert!((lattice.determinant() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn read_from_reports_bad_lattice_line() {
        let text = "c\n1.0\n1 0 0\n0 1\n0 0 1\n";
        let result = PoscarFile::read_from(&mut Cursor::new(text));
        assert!(matches!(result, Err(PoscarError::Parse { line: 4, .. })));
    }

    #[test]
    fn read_from_reports_truncated_file() {
        let text = "c\n1.0\n1 0 0\n";
        let result = PoscarFile::read_from(&mut Cursor::new(text));
        assert!(matches!(result, Err(PoscarError::Parse { line: 4, .. })));
    }

    #[test]
    fn written_file_reads_back() {
        let structure = two_atom_structure(["2 0 0", "0 2 0", "0 0 2"]);
        let text = render(&structure, Representation::Cartesian);
        let cell = PoscarFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(cell.lattice, *structure.lattice_cartesian());
        assert_eq!(cell.species, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(cell.counts, vec![1, 1]);
    }
}
