use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
    str::FromStr,
};

use crate::{catalog::formatter::XcodeFormatter, error::Error, traits::Document};

/// A `.xcstrings` string catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub source_language: String,
    #[serde(default)]
    pub strings: BTreeMap<String, Item>,
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document for Catalog {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the catalog the way Xcode does: sorted keys, two-space indent
    /// and `" : "` between keys and values.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let value = serde_json::to_value(self)?;
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, XcodeFormatter::new());
        value.serialize(&mut ser)?;
        Ok(())
    }
}

impl Catalog {
    pub fn new(source_language: impl Into<String>) -> Self {
        Catalog {
            source_language: source_language.into(),
            strings: BTreeMap::new(),
            version: "1.0".to_string(),
            extra: Map::new(),
        }
    }

    /// Every language that has at least one localization.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .strings
            .values()
            .flat_map(|item| item.localizations.keys().cloned())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<ExtractionState>,
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub localizations: BTreeMap<String, Localization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_translate: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn is_translatable(&self) -> bool {
        self.should_translate.unwrap_or(true)
    }

    /// Source text for this item: the source-language string value if there
    /// is a non-empty one.
    pub fn source_value(&self, source_language: &str) -> Option<&str> {
        self.localizations
            .get(source_language)
            .and_then(|l| l.value())
            .filter(|v| !v.is_empty())
    }

    /// True if `language` has neither a non-empty string value nor variations.
    pub fn lacks(&self, language: &str) -> bool {
        self.localizations
            .get(language)
            .is_none_or(|l| l.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionState {
    Manual,
    Stale,
    ExtractedWithValue,
    Migrated,
}

impl ExtractionState {
    const ALL: [ExtractionState; 4] = [
        ExtractionState::Manual,
        ExtractionState::Stale,
        ExtractionState::ExtractedWithValue,
        ExtractionState::Migrated,
    ];

    /// The spelling used in the catalog file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionState::Manual => "manual",
            ExtractionState::Stale => "stale",
            ExtractionState::ExtractedWithValue => "extracted_with_value",
            ExtractionState::Migrated => "migrated",
        }
    }
}

impl std::fmt::Display for ExtractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtractionState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::validation_error(format!("unknown extractionState `{}`", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_unit: Option<StringUnit>,
    /// Plural or device variations, kept as raw JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variations: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<StringUnit> for Localization {
    fn from(string_unit: StringUnit) -> Self {
        Localization {
            string_unit: Some(string_unit),
            ..Default::default()
        }
    }
}

impl Localization {
    pub fn value(&self) -> Option<&str> {
        self.string_unit.as_ref().map(|u| u.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_none() && self.value().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringUnit {
    pub state: TranslationState,
    pub value: String,
}

impl StringUnit {
    pub fn new(state: TranslationState, value: impl Into<String>) -> Self {
        StringUnit {
            state,
            value: value.into(),
        }
    }

    pub fn translated(value: impl Into<String>) -> Self {
        StringUnit::new(TranslationState::Translated, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationState {
    New,
    Translated,
    NeedsReview,
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const CATALOG: &str = indoc! {r#"
        {
          "sourceLanguage" : "en",
          "strings" : {
            "Cancel" : {
              "extractionState" : "manual",
              "localizations" : {
                "en" : {
                  "stringUnit" : {
                    "state" : "translated",
                    "value" : "Cancel"
                  }
                },
                "es" : {
                  "stringUnit" : {
                    "state" : "translated",
                    "value" : "Cancelar"
                  }
                }
              }
            },
            "Version" : {
              "shouldTranslate" : false
            }
          },
          "version" : "1.0"
        }"#};

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        assert_eq!(catalog.source_language, "en");
        assert_eq!(catalog.strings.len(), 2);
        let cancel = &catalog.strings["Cancel"];
        assert_eq!(cancel.extraction_state, Some(ExtractionState::Manual));
        assert_eq!(cancel.source_value("en"), Some("Cancel"));
        assert!(!cancel.lacks("es"));
        assert!(cancel.lacks("ko"));
        assert!(!catalog.strings["Version"].is_translatable());
        assert_eq!(catalog.languages(), vec!["en", "es"]);
    }

    #[test]
    fn test_writes_xcode_layout() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        let out = catalog.to_bytes().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), CATALOG);
    }

    #[test]
    fn test_unknown_fields_survive() {
        let text = r#"{"sourceLanguage":"en","strings":{"k":{"isCommentAutoGenerated":true,"localizations":{"en":{"substitutions":{"x":1},"stringUnit":{"state":"new","value":"v"}}}}},"version":"1.0","custom":2}"#;
        let catalog = Catalog::parse(text).unwrap();
        assert_eq!(catalog.extra["custom"], 2);
        let item = &catalog.strings["k"];
        assert_eq!(item.extra["isCommentAutoGenerated"], true);
        assert!(item.localizations["en"].extra.contains_key("substitutions"));
    }

    #[test]
    fn test_extraction_state_from_str() {
        assert_eq!(
            "extracted_with_value".parse::<ExtractionState>().unwrap(),
            ExtractionState::ExtractedWithValue
        );
        assert!("bogus".parse::<ExtractionState>().is_err());
    }
}
