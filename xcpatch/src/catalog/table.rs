//! Static bilingual lookup table: source text -> language -> translation.
//!
//! ```json
//! { "Cancel": { "es": "Cancelar", "ko": "취소" } }
//! ```
//!
//! The same shape is accepted as YAML or TOML.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table, picking the parser from the file extension
    /// (`json`, `yaml`/`yml`, `toml`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text = fs::read_to_string(path)?;
        match ext.as_str() {
            "json" => Self::from_json(&text),
            "yaml" | "yml" => Self::from_yaml(&text),
            "toml" => Self::from_toml(&text),
            _ => Err(Error::UnsupportedFormat(format!(
                "translation table must be .json, .yaml or .toml: {}",
                path.display()
            ))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn insert(
        &mut self,
        source: impl Into<String>,
        language: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.entries
            .entry(source.into())
            .or_default()
            .insert(language.into(), translation.into());
    }

    /// Exact-match lookup. Empty translations count as missing.
    pub fn lookup(&self, source: &str, language: &str) -> Option<&str> {
        self.entries
            .get(source)?
            .get(language)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Every language mentioned anywhere in the table, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .entries
            .values()
            .flat_map(|m| m.keys().cloned())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
