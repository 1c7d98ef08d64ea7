//! Gitignore-aware discovery of source files.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::Error;

/// Include and exclude globs, matched against `/`-separated paths relative
/// to the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions {
            include: vec!["**/*.swift".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl WalkOptions {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        WalkOptions { include, exclude }
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// A file found under a walk root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path relative to the root it was found under, `/`-separated.
    pub relative: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn file_name(&self) -> &str {
        self.relative
            .rsplit_once('/')
            .map_or(self.relative.as_str(), |(_, name)| name)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::glob_error(pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::glob_error(patterns.join(", "), e))
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Walks each root and returns the files matching `options`, sorted by
/// relative path. Hidden entries and anything ignored by `.gitignore` are
/// skipped.
pub fn collect_files(roots: &[PathBuf], options: &WalkOptions) -> Result<Vec<SourceFile>, Error> {
    let include = build_set(&options.include)?;
    let exclude = build_set(&options.exclude)?;

    let per_root: Vec<Vec<SourceFile>> = roots
        .par_iter()
        .map(|root| -> Result<Vec<SourceFile>, Error> {
            if !root.is_dir() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("source root not found: {}", root.display()),
                )));
            }
            let mut out = Vec::new();
            let walker = WalkBuilder::new(root)
                .git_ignore(true)
                .git_exclude(true)
                .require_git(false)
                .hidden(true)
                .ignore(true)
                .parents(true)
                .build();

            for dent in walker {
                let dent = match dent {
                    Ok(d) => d,
                    Err(e) if e.depth() == Some(0) => return Err(e.into()),
                    Err(e) => {
                        debug!(error = %e, "skipping unreadable entry");
                        continue;
                    }
                };
                if !dent.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let Some(relative) = relative_path(root, dent.path()) else {
                    continue;
                };
                if !include.is_match(&relative) || exclude.is_match(&relative) {
                    continue;
                }
                trace!(path = %relative, "matched");
                out.push(SourceFile {
                    relative,
                    path: dent.path().to_path_buf(),
                });
            }
            Ok(out)
        })
        .collect::<Result<_, _>>()?;

    let mut files: Vec<SourceFile> = per_root.into_iter().flatten().collect();
    files.sort();
    files.dedup();
    Ok(files)
}

/// Reads every file in parallel. Files that are not valid UTF-8 are read
/// lossily; unreadable files are an error.
pub fn read_sources(files: &[SourceFile]) -> Result<Vec<String>, Error> {
    files
        .par_iter()
        .map(|file| {
            let bytes = std::fs::read(&file.path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })
        .collect()
}
