//! Parser configuration file types.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

fn default_batch_size() -> usize {
    256
}

#[derive(Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Config {
    pub parser: Parser,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Parser {
    /// Transition system: `arcstandard`, `arceager`, or `stackproj`.
    pub system: String,

    /// Whether the model was trained on projectivized input.
    #[serde(default)]
    pub pproj: bool,

    /// The feature-template file.
    pub features: String,

    /// The transitions file defining the label numbering.
    pub transitions: String,

    /// The linear model file.
    pub model: String,

    /// Size of the hash kernel the model was trained with.
    pub hash_kernel_size: u32,

    /// Sentences per parallel batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open configuration file {}", path.display()))?;
        let mut config: Config = serde_yaml::from_reader(file)
            .with_context(|| format!("Cannot parse configuration file {}", path.display()))?;
        config.relativize_paths(path)?;
        Ok(config)
    }

    /// Resolve relative file names against the configuration file's
    /// directory.
    pub fn relativize_paths(&mut self, config_path: &Path) -> Result<()> {
        self.parser.features = relativize_path(config_path, &self.parser.features)?;
        self.parser.transitions = relativize_path(config_path, &self.parser.transitions)?;
        self.parser.model = relativize_path(config_path, &self.parser.model)?;
        Ok(())
    }
}

fn relativize_path(config_path: &Path, filename: &str) -> Result<String> {
    if filename.is_empty() {
        return Ok(filename.to_owned());
    }

    let path = Path::new(&filename);

    // Don't touch absolute paths.
    if path.is_absolute() {
        return Ok(filename.to_owned());
    }

    let abs_config_path = config_path.canonicalize().with_context(|| {
        format!(
            "Cannot canonicalize configuration path {}",
            config_path.display()
        )
    })?;
    Ok(abs_config_path
        .parent()
        .ok_or_else(|| {
            anyhow!(
                "Cannot get the parent path of the configuration file {}",
                config_path.display()
            )
        })?
        .join(path)
        .to_str()
        .ok_or_else(|| {
            anyhow!(
                "Cannot convert a path relative to {} to a string",
                config_path.display()
            )
        })?
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "parser:\n\
                          \x20 system: arcstandard\n\
                          \x20 features: parser.features\n\
                          \x20 transitions: parser.transitions\n\
                          \x20 model: parser.model\n\
                          \x20 hash_kernel_size: 2000003\n";

    #[test]
    fn test_parse_with_defaults() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.parser.system, "arcstandard");
        assert!(!config.parser.pproj);
        assert_eq!(config.parser.hash_kernel_size, 2_000_003);
        assert_eq!(config.parser.batch_size, 256);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("parser:\n  system: arcstandard\n").is_err());
    }

    #[test]
    fn test_absolute_paths_are_untouched() {
        let mut config: Config = serde_yaml::from_str(CONFIG).unwrap();
        config.parser.model = "/models/parser.model".to_string();
        // The configuration file itself must exist for canonicalization;
        // absolute entries never reach that step.
        config.parser.features = "/features".to_string();
        config.parser.transitions = "/transitions".to_string();
        config.relativize_paths(Path::new("/nonexistent/parser.yaml")).unwrap();
        assert_eq!(config.parser.model, "/models/parser.model");
    }
}
