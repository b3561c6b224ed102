use crate::core::analysis::cell::{self, CellMetrics};
use crate::core::io::poscar::PoscarFile;
use crate::core::io::sqscell::{LatInFile, SqsCellFile};
use crate::core::io::traits::CellFile;
use crate::engine::error::EngineError;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Volume and lattice constants of the cell stored in a POSCAR/CONTCAR.
///
/// # Errors
///
/// Returns [`EngineError::CellFile`] if the file cannot be read or its
/// scaling factor cannot be applied.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn inspect_poscar(path: &Path) -> Result<CellMetrics, EngineError> {
    let cell = PoscarFile::read_from_path(path).map_err(|e| EngineError::cell_file(path, e))?;
    let lattice = cell
        .scaled_lattice()
        .map_err(|e| EngineError::cell_file(path, e))?;
    let metrics = CellMetrics::from_lattice(&lattice);
    debug!(
        "Cell volume {:.6}, a={:.6} b={:.6} c={:.6}",
        metrics.volume, metrics.a, metrics.b, metrics.c
    );
    Ok(metrics)
}

/// Lists the 0-based indices of the `mcsqs` candidate supercells that are
/// orthogonal in the Cartesian frame of `lat.in`.
///
/// # Errors
///
/// Returns [`EngineError::CellFile`] if either file cannot be read.
#[instrument(skip_all, name = "orthogonal_cells_workflow")]
pub fn find_orthogonal_cells(
    lat_in: &Path,
    sqscell: &Path,
    tolerance: f64,
) -> Result<Vec<usize>, EngineError> {
    let coordinate_system =
        LatInFile::read_from_path(lat_in).map_err(|e| EngineError::cell_file(lat_in, e))?;
    let cells =
        SqsCellFile::read_from_path(sqscell).map_err(|e| EngineError::cell_file(sqscell, e))?;

    let found = cell::find_orthogonal_cells(&coordinate_system, &cells, tolerance);
    info!(
        "{} of {} candidate cell(s) are orthogonal",
        found.len(),
        cells.len()
    );
    Ok(found)
}
