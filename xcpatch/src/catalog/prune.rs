//! Removal of catalog keys that no source file mentions.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;

use super::format::Catalog;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PruneReport {
    pub kept: usize,
    pub removed: Vec<String>,
}

impl PruneReport {
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Drops every key that is not a substring of any of `sources`.
pub fn prune_unreferenced(catalog: &mut Catalog, sources: &[String]) -> PruneReport {
    let referenced: Vec<(String, bool)> = catalog
        .strings
        .keys()
        .cloned()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|key| {
            let found = sources.iter().any(|text| text.contains(key.as_str()));
            (key, found)
        })
        .collect();

    let mut report = PruneReport::default();
    for (key, found) in referenced {
        if found {
            report.kept += 1;
        } else {
            debug!(key = %key, "unreferenced, removing");
            catalog.strings.remove(&key);
            report.removed.push(key);
        }
    }
    report
}

/// `<catalog>.backup` next to the catalog.
pub fn backup_path(catalog_path: &Path) -> PathBuf {
    let mut name = catalog_path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Copies the catalog to its backup path unless a backup already exists.
/// Returns the backup path when one was written.
pub fn write_backup(catalog_path: &Path) -> Result<Option<PathBuf>, Error> {
    let backup = backup_path(catalog_path);
    if backup.exists() {
        return Ok(None);
    }
    fs::copy(catalog_path, &backup)?;
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::format::Item;
    use tempfile::TempDir;

    #[test]
    fn test_prunes_keys_absent_from_sources() {
        let mut catalog = Catalog::new("en");
        for key in ["Cancel", "Old Banner", "Ride %@"] {
            catalog.strings.insert(key.to_string(), Item::default());
        }
        let sources = vec![
            "Button(\"Cancel\") { }".to_string(),
            "Text(\"Ride \\(name)\")\n// Ride %@".to_string(),
        ];
        let report = prune_unreferenced(&mut catalog, &sources);
        assert_eq!(report.removed, vec!["Old Banner".to_string()]);
        assert_eq!(report.kept, 2);
        assert!(!catalog.strings.contains_key("Old Banner"));
    }

    #[test]
    fn test_backup_written_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Localizable.xcstrings");
        fs::write(&path, "first").unwrap();
        let backup = write_backup(&path).unwrap().unwrap();
        assert!(backup.ends_with("Localizable.xcstrings.backup"));

        fs::write(&path, "second").unwrap();
        assert_eq!(write_backup(&path).unwrap(), None);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "first");
    }
}
