//! Readers and writers for the file formats handled by the toolkit.
//!
//! The `mcsqs` output stream is split into records by [`stream`], each record
//! is parsed by [`mcsqs`] (with atoms grouped by [`ordering`]) and written
//! out through [`poscar`]. The [`sqscell`] readers feed the supercell checks.

pub mod mcsqs;
pub(crate) mod ordering;
pub mod poscar;
pub mod sqscell;
pub mod stream;
pub mod traits;

pub use ordering::discover_species;
