use super::{Config, LoadError, Loader};
use anyhow::anyhow;
use std::path::{Path, PathBuf};

/// Document formats a [`FileStore`] understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    #[cfg(feature = "config-toml")]
    Toml,
}

impl Format {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            #[cfg(feature = "config-toml")]
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
    pub fn parse(self, document: &str) -> core::result::Result<Config, LoadError> {
        match self {
            Self::Json => Ok(serde_json::from_str(document)?),
            #[cfg(feature = "config-toml")]
            Self::Toml => Ok(toml::from_str(document)?),
        }
    }
}

/// A [`Loader`] reading a configuration file whose format follows its
/// extension: `.json`, or `.toml` with the `config-toml` feature.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(&self) -> core::result::Result<Config, LoadError> {
        let format = Format::from_path(&self.path)
            .ok_or_else(|| anyhow!("unsupported config file: {}", self.path.display()))?;
        let document = std::fs::read_to_string(&self.path)?;
        format.parse(&document)
    }
}
