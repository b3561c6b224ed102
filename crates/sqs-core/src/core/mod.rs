//! # Core Module
//!
//! Stateless building blocks of the conversion pipeline.
//!
//! - **Structures** ([`models`]) - parsed records with canonically ordered atoms
//! - **Algebra** ([`utils`]) - 3x3 matrix operations and coordinate transforms
//! - **File I/O** ([`io`]) - the `mcsqs` stream, POSCAR, `lat.in` and `sqscell.out`
//! - **Cell analysis** ([`analysis`]) - volumes, lattice constants, orthogonality

pub mod analysis;
pub mod io;
pub mod models;
pub mod utils;
