//! # sqspost
//!
//! Post-processing of special-quasirandom-structure (SQS) searches: turns the
//! structure stream written by ATAT's `mcsqs` into VASP POSCAR files and
//! provides a few cell-level checks on the results.
//!
//! ## Architecture
//!
//! The library follows the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`), the
//!   3x3 algebra and coordinate transforms, and readers/writers for the
//!   `mcsqs`, POSCAR, `lat.in` and `sqscell.out` formats.
//!
//! - **[`engine`]: Run State.** Configuration, the explicit per-run context
//!   (output directory and record counter), progress reporting and the error
//!   type that attaches record numbers to failures.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the
//!   two layers below, such as converting a whole `mcsqs` output file.

pub mod core;
pub mod engine;
pub mod workflows;
