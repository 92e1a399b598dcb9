//! Persisted CLI state: stored credentials, the selected account and client settings.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use crate::core::{GpError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "./gpcli.config";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Raw auth strings, in the order they were added
    pub credentials: Vec<String>,

    /// Email of the active account, empty when none is selected
    pub selected: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Config> {
        toml::from_str(text).map_err(|err| GpError::ConfigUnreadable {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn to_toml(&self, path: &Path) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| GpError::PersistFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

/// Where the config bytes live
pub trait ConfigBackend: Send + Sync {
    fn path(&self) -> &Path;

    /// `Ok(None)` when nothing has been stored yet
    fn read(&self) -> std::io::Result<Option<String>>;

    fn write(&self, contents: &str) -> std::io::Result<()>;
}

pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigBackend for FileBackend {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target, then rename into place
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)
    }
}

/// Keeps the config in memory, for tests
pub struct MemoryBackend {
    path: PathBuf,
    contents: Mutex<Option<String>>,
    read_only: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("<memory>"),
            contents: Mutex::new(None),
            read_only: false,
        }
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            ..Self::new()
        }
    }

    /// Every write fails with `PermissionDenied`
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBackend for MemoryBackend {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> std::io::Result<()> {
        if self.read_only {
            return Err(std::io::Error::new(ErrorKind::PermissionDenied, "read-only backend"));
        }
        *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}
