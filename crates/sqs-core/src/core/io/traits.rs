use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Defines the interface for serializing a [`Structure`] into a file format.
///
/// Implementors handle format-specific layout; the provided path helper
/// guarantees that an existing file is never overwritten.
pub trait StructureFile {
    /// Per-file settings such as the title or the coordinate representation.
    type Options;

    /// The error type for I/O and formatting failures.
    type Error: Error + From<io::Error>;

    /// Writes a structure to a writer.
    ///
    /// # Arguments
    ///
    /// * `structure` - The structure to serialize.
    /// * `options` - Format-specific settings.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure cannot be expressed in the requested
    /// form or writing fails.
    fn write_to(
        structure: &Structure,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a structure to a new file at `path`.
    ///
    /// The content is rendered fully before the file is created, so a
    /// structure that cannot be serialized leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, if `path` already exists, or
    /// if the file cannot be written.
    fn write_to_path<P: AsRef<Path>>(
        structure: &Structure,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let mut rendered = Vec::new();
        Self::write_to(structure, options, &mut rendered)?;
        write_new_file(path.as_ref(), &rendered)?;
        Ok(())
    }
}

/// Writes `contents` to a file that must not exist yet.
///
/// # Errors
///
/// Fails with [`io::ErrorKind::AlreadyExists`] if `path` exists.
pub fn write_new_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(contents)?;
    file.flush()
}

/// Defines the interface for reading cell descriptions from a file format.
pub trait CellFile {
    /// The parsed representation of the file.
    type Cell;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads a cell description from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Cell, Self::Error>;

    /// Reads a cell description from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Cell, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
