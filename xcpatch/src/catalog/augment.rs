//! Fills missing languages in a catalog from a translation table.
//!
//! For every translatable key, each required language that has no usable
//! localization gets one: the table's translation of the source text when
//! there is one, otherwise a verbatim copy of the source text. Both are
//! marked `translated`, so copied source text is indistinguishable from a
//! real translation in Xcode.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::{
    format::{Catalog, Localization, StringUnit},
    table::TranslationTable,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AugmentOptions {
    /// Languages every key must end up with.
    pub languages: Vec<String>,
    /// Leave keys starting with `%` or `#` alone.
    pub skip_format_keys: bool,
}

impl AugmentOptions {
    pub fn new(languages: Vec<String>) -> Self {
        AugmentOptions {
            languages,
            skip_format_keys: false,
        }
    }

    pub fn with_skip_format_keys(mut self, skip: bool) -> Self {
        self.skip_format_keys = skip;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LanguageCounts {
    pub from_table: usize,
    pub fallback: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCause {
    DoNotTranslate,
    FormatKey,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedKey {
    pub key: String,
    pub cause: SkipCause,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AugmentReport {
    /// Keys that received at least one new localization.
    pub keys_updated: usize,
    /// Keys that had no source-language localization and got one.
    pub source_inserted: usize,
    pub languages: BTreeMap<String, LanguageCounts>,
    pub skipped: Vec<SkippedKey>,
}

impl AugmentReport {
    pub fn changed(&self) -> bool {
        self.keys_updated > 0
    }

    pub fn total_from_table(&self) -> usize {
        self.languages.values().map(|c| c.from_table).sum()
    }

    pub fn total_fallback(&self) -> usize {
        self.languages.values().map(|c| c.fallback).sum()
    }
}

fn is_format_key(key: &str) -> bool {
    key.starts_with('%') || key.starts_with('#')
}

/// Adds the missing localizations in place.
pub fn augment(
    catalog: &mut Catalog,
    table: &TranslationTable,
    options: &AugmentOptions,
) -> AugmentReport {
    let source_language = catalog.source_language.clone();
    let mut report = AugmentReport::default();
    for language in &options.languages {
        if *language != source_language {
            report.languages.insert(language.clone(), LanguageCounts::default());
        }
    }

    for (key, item) in catalog.strings.iter_mut() {
        let cause = if !item.is_translatable() {
            Some(SkipCause::DoNotTranslate)
        } else if options.skip_format_keys && is_format_key(key) {
            Some(SkipCause::FormatKey)
        } else {
            None
        };
        if let Some(cause) = cause {
            trace!(key = %key, ?cause, "skipping key");
            report.skipped.push(SkippedKey {
                key: key.clone(),
                cause,
            });
            continue;
        }

        let source_value = item
            .source_value(&source_language)
            .unwrap_or(key.as_str())
            .to_string();
        if source_value.is_empty() {
            report.skipped.push(SkippedKey {
                key: key.clone(),
                cause: SkipCause::Empty,
            });
            continue;
        }

        let mut updated = false;
        if item.lacks(&source_language) {
            item.localizations.insert(
                source_language.clone(),
                StringUnit::translated(source_value.as_str()).into(),
            );
            report.source_inserted += 1;
            updated = true;
        }
        let source_localization = item.localizations.get(&source_language).cloned();

        for (language, counts) in report.languages.iter_mut() {
            if !item.lacks(language) {
                continue;
            }
            let translated = table
                .lookup(&source_value, language)
                .or_else(|| table.lookup(key, language));
            let localization = match (translated, &source_localization) {
                (Some(text), _) => {
                    counts.from_table += 1;
                    Localization::from(StringUnit::translated(text))
                }
                (None, Some(source)) if source.variations.is_some() => {
                    counts.fallback += 1;
                    source.clone()
                }
                (None, _) => {
                    counts.fallback += 1;
                    Localization::from(StringUnit::translated(source_value.as_str()))
                }
            };
            debug!(key = %key, language = %language, from_table = translated.is_some(), "filled");
            item.localizations.insert(language.clone(), localization);
            updated = true;
        }

        if updated {
            report.keys_updated += 1;
        }
    }

    report
}
