use clap::{Args, Parser, Subcommand};
use sqspost::core::analysis::cell::ORTHOGONALITY_TOLERANCE;
use sqspost::core::io::poscar::Representation;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "SQS post-processing contributors",
    version,
    about = "sqs - Post-processing tools for mcsqs output: POSCAR conversion and cell analysis.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every structure of an mcsqs output file into a POSCAR.
    Convert(ConvertArgs),
    /// Report cell volume and lattice constants of POSCAR/CONTCAR files.
    Cell(CellArgs),
    /// List the orthogonal candidate supercells of an mcsqs run.
    Orth(OrthArgs),
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the mcsqs output file. Defaults to 'best_sqs.out'.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory receiving one 'poscar_<n>' sub-directory per structure.
    /// An existing directory is moved to '<dir>~'. Defaults to 'output_files'.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional configuration file in TOML format with a [convert] table.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name written on the comment line of every POSCAR.
    #[arg(short, long, value_name = "TEXT")]
    pub name: Option<String>,

    /// Atom type order, e.g. '--order Li Nb Ta O'.
    /// Must list exactly the species present in each structure.
    #[arg(long, value_name = "LABEL", num_args = 1..)]
    pub order: Option<Vec<String>>,

    /// Coordinate representation of the atom positions.
    /// Accepts 'cartesian' (or 'car') and 'fractional' (or 'dir', 'direct').
    #[arg(short, long, value_name = "MODE")]
    pub representation: Option<Representation>,
}

/// Arguments for the `cell` subcommand.
#[derive(Args, Debug)]
pub struct CellArgs {
    /// POSCAR or CONTCAR files to inspect.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Also write the results as a CSV report.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `orth` subcommand.
#[derive(Args, Debug)]
pub struct OrthArgs {
    /// Path to the lat.in file holding the coordinate system.
    #[arg(long, default_value = "lat.in", value_name = "PATH")]
    pub lattice: PathBuf,

    /// Path to the sqscell.out file listing the candidate supercells.
    #[arg(long, default_value = "sqscell.out", value_name = "PATH")]
    pub cells: PathBuf,

    /// Tolerance on the dot products of lattice vectors.
    #[arg(long, default_value_t = ORTHOGONALITY_TOLERANCE, value_name = "FLOAT")]
    pub tol: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_accepts_order_list_and_representation_alias() {
        let cli = Cli::parse_from([
            "sqs",
            "-vv",
            "convert",
            "--order",
            "Li",
            "Nb",
            "O",
            "-r",
            "direct",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(
                    args.order,
                    Some(vec!["Li".to_string(), "Nb".to_string(), "O".to_string()])
                );
                assert_eq!(args.representation, Some(Representation::Fractional));
                assert!(args.input.is_none());
            }
            _ => panic!("Expected 'convert' subcommand"),
        }
    }

    #[test]
    fn unknown_representation_is_rejected() {
        let result = Cli::try_parse_from(["sqs", "convert", "-r", "polar"]);
        assert!(result.is_err());
    }

    #[test]
    fn orth_uses_default_paths_and_tolerance() {
        let cli = Cli::parse_from(["sqs", "orth"]);
        match cli.command {
            Commands::Orth(args) => {
                assert_eq!(args.lattice, PathBuf::from("lat.in"));
                assert_eq!(args.cells, PathBuf::from("sqscell.out"));
                assert_eq!(args.tol, ORTHOGONALITY_TOLERANCE);
            }
            _ => panic!("Expected 'orth' subcommand"),
        }
    }

    #[test]
    fn cell_requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["sqs", "cell"]).is_err());
        let cli = Cli::parse_from(["sqs", "cell", "POSCAR", "CONTCAR", "--csv", "cells.csv"]);
        match cli.command {
            Commands::Cell(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.csv, Some(PathBuf::from("cells.csv")));
            }
            _ => panic!("Expected 'cell' subcommand"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["sqs", "-q", "-v", "orth"]).is_err());
    }
}
