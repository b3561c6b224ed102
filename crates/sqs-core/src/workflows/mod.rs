//! # Workflows Module
//!
//! Top-level entry points combining the `core` and `engine` layers.
//!
//! - **Conversion** ([`convert`]) - `mcsqs` output stream to one POSCAR per record
//! - **Cell checks** ([`cells`]) - POSCAR cell metrics and orthogonal supercell search

pub mod cells;
pub mod convert;
