use crate::core::utils::coordinates;
use crate::core::utils::linalg::{self, LinalgError};
use nalgebra::{Matrix3, Vector3};

/// A species label together with the number of atoms carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomType {
    /// The species label exactly as it appears in the record (e.g. "Li").
    pub label: String,
    /// Number of atoms of this species in the structure.
    pub multiplicity: usize,
}

/// A single atom of a structure record.
///
/// Only the coordinates in the search tool's internal basis are stored; the
/// Cartesian and fractional views are derived from the owning [`Structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The species label of the atom.
    pub species: String,
    /// Position in the internal ("original") basis of the search tool.
    pub original: Vector3<f64>,
}

impl Atom {
    pub fn new(species: &str, original: Vector3<f64>) -> Self {
        Self {
            species: species.to_string(),
            original,
        }
    }
}

/// One parsed structure record.
///
/// A `Structure` owns its coordinate system and its Cartesian lattice, the
/// record's lattice rows mapped through that system. Atoms are stored in canonical
/// order: one contiguous block per entry of [`Structure::atom_types`], each
/// block as long as that type's multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    coordinate_system: Matrix3<f64>,
    lattice_cartesian: Matrix3<f64>,
    atom_types: Vec<AtomType>,
    atoms: Vec<Atom>,
}

impl Structure {
    /// Assembles a structure from already canonically ordered parts.
    ///
    /// The Cartesian lattice `lattice · coordinate_system` is computed here
    /// once and cached for the lifetime of the structure.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NonFinite`] if the derived Cartesian lattice
    /// contains NaN or infinite entries.
    pub(crate) fn new(
        coordinate_system: Matrix3<f64>,
        lattice: Matrix3<f64>,
        atom_types: Vec<AtomType>,
        atoms: Vec<Atom>,
    ) -> Result<Self, LinalgError> {
        let lattice_cartesian = linalg::multiply(&lattice, &coordinate_system);
        linalg::ensure_finite_matrix(&lattice_cartesian, "Cartesian lattice")?;
        debug_assert_eq!(
            atoms.len(),
            atom_types.iter().map(|t| t.multiplicity).sum::<usize>()
        );
        Ok(Self {
            coordinate_system,
            lattice_cartesian,
            atom_types,
            atoms,
        })
    }

    pub fn coordinate_system(&self) -> &Matrix3<f64> {
        &self.coordinate_system
    }

    /// Lattice vectors (rows) in the physical Cartesian frame.
    pub fn lattice_cartesian(&self) -> &Matrix3<f64> {
        &self.lattice_cartesian
    }

    pub fn atom_types(&self) -> &[AtomType] {
        &self.atom_types
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn total_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn cartesian_position(&self, atom: &Atom) -> Vector3<f64> {
        coordinates::to_cartesian(&self.coordinate_system, &atom.original)
    }

    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if the lattice is degenerate.
    pub fn fractional_position(&self, atom: &Atom) -> Result<Vector3<f64>, LinalgError> {
        coordinates::to_fractional(&self.lattice_cartesian, &self.cartesian_position(atom))
    }

    /// Cartesian positions of all atoms, in canonical order.
    pub fn cartesian_positions(&self) -> Vec<Vector3<f64>> {
        self.atoms
            .iter()
            .map(|atom| self.cartesian_position(atom))
            .collect()
    }

    /// Fractional positions of all atoms, in canonical order.
    ///
    /// The lattice is inverted once for the whole structure.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::SingularMatrix`] if the lattice is degenerate and
    /// [`LinalgError::NonFinite`] if any resulting coordinate is not finite.
    pub fn fractional_positions(&self) -> Result<Vec<Vector3<f64>>, LinalgError> {
        let transform = coordinates::fractional_transform(&self.lattice_cartesian)?;
        self.atoms
            .iter()
            .map(|atom| {
                let fractional = linalg::apply(&transform, &self.cartesian_position(atom));
                linalg::ensure_finite_vector(&fractional, "fractional coordinates")?;
                Ok(fractional)
            })
            .collect()
    }

    /// Absolute volume of the Cartesian cell.
    pub fn cell_volume(&self) -> f64 {
        self.lattice_cartesian.determinant().abs()
    }
}
