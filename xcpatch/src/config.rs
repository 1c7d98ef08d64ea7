//! Optional `xcpatch.toml` project configuration.
//!
//! ```toml
//! [project]
//! path = "App.xcodeproj/project.pbxproj"
//! source_root = "App"
//! keep_shared = true
//!
//! [catalog]
//! path = "App/Resources/Localizable.xcstrings"
//! languages = ["es", "ko"]
//! translations = "translations.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

pub const CONFIG_FILE_NAME: &str = "xcpatch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub project: ProjectConfig,
    pub catalog: CatalogConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub path: Option<PathBuf>,
    pub source_root: Option<PathBuf>,
    pub default_group: Option<String>,
    pub create_groups: bool,
    /// Let `dedup` keep a file built into more than one target.
    pub keep_shared: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
    pub languages: Vec<String>,
    pub translations: Option<PathBuf>,
    pub skip_format_keys: bool,
    pub source_root: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&data)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `xcpatch.toml` from `dir` if it exists.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Option<Self>, Error> {
        let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            return Ok(None);
        }
        Self::load_from_file(candidate).map(Some)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(lang) = self.catalog.languages.iter().find(|l| l.trim().is_empty()) {
            return Err(Error::validation_error(format!(
                "catalog.languages contains an empty language code: {:?}",
                lang
            )));
        }
        for pattern in self.project.include.iter().chain(&self.project.exclude) {
            if pattern.trim().is_empty() {
                return Err(Error::validation_error(
                    "project.include/exclude patterns must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Resolves a configured path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn project_path(&self) -> Option<PathBuf> {
        self.project.path.as_deref().map(|p| self.resolve(p))
    }

    pub fn project_source_root(&self) -> Option<PathBuf> {
        self.project.source_root.as_deref().map(|p| self.resolve(p))
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_deref().map(|p| self.resolve(p))
    }

    pub fn translations_path(&self) -> Option<PathBuf> {
        self.catalog.translations.as_deref().map(|p| self.resolve(p))
    }

    pub fn catalog_source_root(&self) -> Option<PathBuf> {
        self.catalog.source_root.as_deref().map(|p| self.resolve(p))
    }
}
