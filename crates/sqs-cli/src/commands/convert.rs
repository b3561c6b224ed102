use crate::cli::ConvertArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::output;
use crate::utils::progress::CliProgressHandler;
use sqspost::{engine::progress::ProgressReporter, workflows};
use tracing::{info, warn};

pub fn run(args: ConvertArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let plan = partial_config.merge_with_cli(&args)?;

    if !plan.input.is_file() {
        return Err(CliError::Argument(format!(
            "Input file '{}' does not exist.",
            plan.input.display()
        )));
    }

    if let Some(backup) = output::rotate_previous_output(&plan.config.output_dir)? {
        println!(
            "Previous results moved to: {}",
            backup.display()
        );
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Converting structures from {} ({} coordinates)...",
        plan.input.display(),
        plan.config.representation
    );
    info!("Invoking the core conversion workflow...");

    let summary = workflows::convert::run(&plan.input, &plan.config, &reporter)?;

    if summary.records == 0 {
        warn!("No complete structure found in {:?}.", plan.input);
        println!("Warning: no complete structure (terminated by 'end') was found.");
    } else {
        println!(
            "✓ {} POSCAR file(s) written to: {}",
            summary.records,
            summary.output_dir.display()
        );
    }
    if summary.discarded_lines > 0 {
        println!(
            "Warning: {} trailing line(s) without a closing 'end' were ignored.",
            summary.discarded_lines
        );
    }

    Ok(())
}
