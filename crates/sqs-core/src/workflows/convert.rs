use crate::core::io::mcsqs::parse_record;
use crate::core::io::poscar::{PoscarError, PoscarFile, PoscarOptions};
use crate::core::io::stream::{RawRecord, split_records};
use crate::core::io::traits::{StructureFile, write_new_file};
use crate::core::models::structure::{AtomType, Structure};
use crate::engine::config::ConversionConfig;
use crate::engine::context::ConversionContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name of the POSCAR written into each record directory.
pub const POSCAR_FILE_NAME: &str = "POSCAR";

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    /// Number of records converted.
    pub records: usize,
    /// Non-blank lines after the last terminator that were not converted.
    pub discarded_lines: usize,
    pub output_dir: PathBuf,
    /// Atom types and multiplicities of the first record.
    pub composition: Vec<AtomType>,
}

/// Converts every record of an `mcsqs` output file into a POSCAR.
///
/// Each record `n` is written to `<output_dir>/poscar_<n>/POSCAR`. The run
/// stops at the first record that cannot be parsed or written; POSCARs of
/// earlier records are kept.
///
/// # Errors
///
/// Returns [`EngineError::Input`] if the input cannot be opened, and any error
/// of [`run_from_reader`].
#[instrument(skip_all, name = "conversion_workflow")]
pub fn run(
    input: &Path,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<ConversionSummary, EngineError> {
    info!("Reading structures from {:?}", input);
    let file = File::open(input).map_err(|e| EngineError::Input {
        path: input.to_path_buf(),
        source: e,
    })?;
    run_from_reader(BufReader::new(file), config, reporter)
}

/// Converts every record read from `reader`.
///
/// # Errors
///
/// - [`EngineError::OutputNotEmpty`] if the output directory holds entries.
/// - [`EngineError::Record`] for the first record that fails to parse, or
///   whose lattice is degenerate when fractional output is requested.
/// - [`EngineError::Write`] for the first record whose POSCAR cannot be
///   written.
/// - [`EngineError::OutputCollision`] if a record directory already exists.
pub fn run_from_reader<R: BufRead>(
    reader: R,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<ConversionSummary, EngineError> {
    let mut context = ConversionContext::prepare(&config.output_dir)?;
    let mut composition = Vec::new();

    reporter.report(Progress::PhaseStart {
        name: "Converting records",
    });

    let split = split_records(reader, |record: RawRecord| {
        let structure = convert_record(&mut context, &record, config)?;
        if record.index == 1 {
            composition = structure.atom_types().to_vec();
            let message = describe_composition(&composition);
            info!("{}", message);
            reporter.report(Progress::Message(message));
        }
        reporter.report(Progress::RecordFinish {
            index: record.index,
            atoms: structure.total_atoms(),
        });
        Ok::<(), EngineError>(())
    })?;

    if split.discarded_lines > 0 {
        let message = format!(
            "Ignored {} line(s) after the last 'end' terminator; the final record is incomplete.",
            split.discarded_lines
        );
        reporter.report(Progress::Message(message));
    }

    reporter.report(Progress::PhaseFinish);
    info!(
        "Converted {} record(s) into {:?}",
        context.records_written(),
        context.output_dir()
    );

    Ok(ConversionSummary {
        records: context.records_written(),
        discarded_lines: split.discarded_lines,
        output_dir: context.output_dir().to_path_buf(),
        composition,
    })
}

fn convert_record(
    context: &mut ConversionContext,
    record: &RawRecord,
    config: &ConversionConfig,
) -> Result<Structure, EngineError> {
    let index = record.index;
    let structure = parse_record(&record.lines, config.type_order.as_deref())
        .map_err(|e| EngineError::Record { index, source: e })?;
    debug!(
        "Record {} parsed: {} atom(s) of {} type(s), cell volume {:.4}",
        index,
        structure.total_atoms(),
        structure.atom_types().len(),
        structure.cell_volume()
    );

    let options = PoscarOptions {
        name: config.name.clone(),
        record_index: index,
        representation: config.representation,
    };
    let mut rendered = Vec::new();
    PoscarFile::write_to(&structure, &options, &mut rendered).map_err(|e| match e {
        PoscarError::Numeric(err) => EngineError::Record {
            index,
            source: err.into(),
        },
        other => EngineError::Write {
            index,
            path: context.record_dir(index).join(POSCAR_FILE_NAME),
            source: other,
        },
    })?;

    let path = context.create_record_dir(index)?.join(POSCAR_FILE_NAME);
    write_new_file(&path, &rendered).map_err(|e| EngineError::Write {
        index,
        path: path.clone(),
        source: e.into(),
    })?;
    context.mark_written(index);
    Ok(structure)
}

/// One-line summary such as `Atom types (quantity):  Li (8)  O (24)`.
pub fn describe_composition(atom_types: &[AtomType]) -> String {
    let mut line = String::from("Atom types (quantity):");
    for atom_type in atom_types {
        line.push_str(&format!("  {} ({})", atom_type.label, atom_type.multiplicity));
    }
    line
}
