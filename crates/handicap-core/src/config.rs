//! Configuration loaded from `handicap.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::validate::ScoreParsing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the per-player score files
    pub data_dir: PathBuf,
    /// Score file extension, without the leading dot
    pub extension: String,
    /// Handling of score input that is not an integer
    pub score_parsing: ScoreParsing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            extension: "csv".to_string(),
            score_parsing: ScoreParsing::Strict,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load config from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path).map_err(Error::from) {
            Ok(c) => c,
            Err(e) if e.is_not_found() => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ext = self.extension.as_str();
        if ext.is_empty() {
            return Err(Error::Config("extension must not be empty".to_string()));
        }
        if ext.contains(['.', '/', '\\']) {
            return Err(Error::Config(format!(
                "extension {:?} must not contain '.' or path separators",
                ext
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    extension: Option<String>,
    score_parsing: Option<ScoreParsing>,
}

impl ConfigBuilder {
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn extension<S: Into<String>>(mut self, ext: S) -> Self {
        self.extension = Some(ext.into());
        self
    }

    pub fn score_parsing(mut self, mode: ScoreParsing) -> Self {
        self.score_parsing = Some(mode);
        self
    }

    pub fn build(self) -> Result<Config> {
        let default = Config::default();
        let config = Config {
            data_dir: self.data_dir.unwrap_or(default.data_dir),
            extension: self.extension.unwrap_or(default.extension),
            score_parsing: self.score_parsing.unwrap_or(default.score_parsing),
        };
        config.validate()?;
        Ok(config)
    }
}
