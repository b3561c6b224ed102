use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use sqspost::core::io::poscar::Representation;
use sqspost::engine::config::{ConversionConfig, ConversionConfigBuilder};
use sqspost::engine::error::EngineError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_INPUT: &str = "best_sqs.out";
pub const DEFAULT_OUTPUT_DIR: &str = "output_files";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialConvertConfig {
    name: Option<String>,
    order: Option<Vec<String>>,
    representation: Option<Representation>,
    output_dir: Option<PathBuf>,
}

/// Contents of an optional TOML configuration file.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    convert: Option<PartialConvertConfig>,
}

/// A fully resolved `convert` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertPlan {
    pub input: PathBuf,
    pub config: ConversionConfig,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the file named by `--config`, or an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Combines file values with command-line arguments; arguments win, and
    /// built-in defaults fill whatever neither provides.
    pub fn merge_with_cli(self, args: &ConvertArgs) -> Result<ConvertPlan> {
        let file = self.convert.unwrap_or_default();

        let input = args
            .input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
        let output_dir = args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let mut builder = ConversionConfigBuilder::new()
            .output_dir(output_dir)
            .type_order(args.order.clone().or(file.order));
        if let Some(name) = args.name.clone().or(file.name) {
            builder = builder.name(name);
        }
        if let Some(representation) = args.representation.or(file.representation) {
            builder = builder.representation(representation);
        }

        let config = builder.build().map_err(EngineError::from)?;
        debug!("Resolved conversion configuration: {:?}", config);
        Ok(ConvertPlan { input, config })
    }
}
