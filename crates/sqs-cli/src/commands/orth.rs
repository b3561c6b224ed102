use crate::cli::OrthArgs;
use crate::error::{CliError, Result};
use sqspost::workflows;
use tracing::info;

pub fn run(args: OrthArgs) -> Result<()> {
    if args.tol.is_nan() || args.tol <= 0.0 {
        return Err(CliError::Argument(format!(
            "Tolerance must be positive, got {}.",
            args.tol
        )));
    }

    info!(
        "Searching {:?} for cells orthogonal in the frame of {:?}",
        args.cells, args.lattice
    );
    let found = workflows::cells::find_orthogonal_cells(&args.lattice, &args.cells, args.tol)?;

    if found.is_empty() {
        println!("No orthogonal cell found.");
    } else {
        println!("Orthogonal cell(s) found at index:");
        for index in &found {
            println!("  {}", index);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let args = OrthArgs {
            lattice: PathBuf::from("lat.in"),
            cells: PathBuf::from("sqscell.out"),
            tol: 0.0,
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
