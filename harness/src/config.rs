use std::path::{Path, PathBuf};

use fence::FenceTags;
use fence::tags::{DEFAULT_END_TAG, DEFAULT_START_TAG};
use serde::Deserialize;

use crate::error::{HarnessError, Result};

/// File looked up in the documentation root when no config is given explicitly.
pub const CONFIG_FILE_NAME: &str = "lpg-doc.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Tag that opens an example, e.g. "```lpg".
    pub start_tag: String,

    /// Tag that closes an example.
    pub end_tag: String,

    /// Only files whose name ends with this suffix are scanned.
    pub suffix: String,

    /// Destination of the aggregate artifact.
    pub output: PathBuf,

    /// Directory receiving one file per example in split mode.
    pub split_dir: PathBuf,

    /// Extension of split files and temporary compilation units.
    pub unit_extension: String,

    /// Precede each aggregated example with a `// <file> : <index>` line.
    pub annotate: bool,

    /// Compiler executable.
    pub compiler: PathBuf,

    /// Subcommand that makes the compiler check a file without running it.
    pub compile_command: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            start_tag: DEFAULT_START_TAG.to_string(),
            end_tag: DEFAULT_END_TAG.to_string(),
            suffix: ".md".to_string(),
            output: PathBuf::from("documentation.lpg"),
            split_dir: PathBuf::from("documentation"),
            unit_extension: "lpg".to_string(),
            annotate: true,
            compiler: PathBuf::from("lpg"),
            compile_command: "compile".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Parse a TOML config. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: HarnessConfig = toml::from_str(source)
            .map_err(|e| HarnessError::Config(format!("TOML parse error: {}", e)))?;
        config.tags()?;
        if config.suffix.is_empty() {
            return Err(HarnessError::Config("suffix must not be empty".into()));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| HarnessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Load `path` if given, else `<root>/lpg-doc.toml` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn tags(&self) -> Result<FenceTags> {
        Ok(FenceTags::new(self.start_tag.clone(), self.end_tag.clone())?)
    }
}
