use crate::core::io::poscar::Representation;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_NAME: &str = "Comment (name of structure).";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Atom type '{0}' is listed more than once in the order specification")]
    DuplicateAtomType(String),
    #[error("Atom type labels in the order specification cannot be empty")]
    EmptyAtomType,
}

/// Settings for converting one `mcsqs` output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Directory receiving one `poscar_<n>` sub-directory per record.
    pub output_dir: PathBuf,
    /// Free text for the comment line of every POSCAR.
    pub name: String,
    /// Explicit atom type order; `None` keeps the order of first appearance.
    pub type_order: Option<Vec<String>>,
    pub representation: Representation,
}

#[derive(Default)]
pub struct ConversionConfigBuilder {
    output_dir: Option<PathBuf>,
    name: Option<String>,
    type_order: Option<Vec<String>>,
    representation: Option<Representation>,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn type_order(mut self, order: Option<Vec<String>>) -> Self {
        self.type_order = order;
        self
    }
    pub fn representation(mut self, representation: Representation) -> Self {
        self.representation = Some(representation);
        self
    }

    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        if let Some(order) = &self.type_order {
            for (i, label) in order.iter().enumerate() {
                if label.trim().is_empty() {
                    return Err(ConfigError::EmptyAtomType);
                }
                if order[..i].contains(label) {
                    return Err(ConfigError::DuplicateAtomType(label.clone()));
                }
            }
        }

        Ok(ConversionConfig {
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            type_order: self.type_order,
            representation: self.representation.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let config = ConversionConfigBuilder::new()
            .output_dir(PathBuf::from("out"))
            .build()
            .unwrap();
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.representation, Representation::Cartesian);
        assert!(config.type_order.is_none());
    }

    #[test]
    fn build_requires_output_dir() {
        let result = ConversionConfigBuilder::new().name("x").build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("output_dir")
        );
    }

    #[test]
    fn build_rejects_duplicate_atom_types() {
        let result = ConversionConfigBuilder::new()
            .output_dir(PathBuf::from("out"))
            .type_order(Some(vec!["Li".into(), "O".into(), "Li".into()]))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateAtomType("Li".to_string())
        );
    }

    #[test]
    fn build_rejects_blank_atom_type() {
        let result = ConversionConfigBuilder::new()
            .output_dir(PathBuf::from("out"))
            .type_order(Some(vec!["Li".into(), " ".into()]))
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::EmptyAtomType);
    }

    #[test]
    fn build_keeps_explicit_values() {
        let config = ConversionConfigBuilder::new()
            .output_dir(PathBuf::from("results"))
            .name("LiNb0.5Ta0.5O3")
            .type_order(Some(vec!["Li".into(), "Nb".into(), "Ta".into(), "O".into()]))
            .representation(Representation::Fractional)
            .build()
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.name, "LiNb0.5Ta0.5O3");
        assert_eq!(config.type_order.as_ref().map(Vec::len), Some(4));
        assert_eq!(config.representation, Representation::Fractional);
    }
}
