//! Source files on disk that no file reference in the manifest names, and
//! the requests that register them.

use std::collections::HashSet;

use serde::Serialize;

use crate::walk::SourceFile;

use super::{Manifest, mutator::AddFileRequest, scanner::base_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnregisteredFile {
    pub relative_path: String,
    pub file_name: String,
}

impl UnregisteredFile {
    /// Registers the file under the group matching its directory. Paths
    /// naming a `Tests` or `UITests` directory go to the test targets.
    pub fn to_request(&self) -> AddFileRequest {
        AddFileRequest::new(self.relative_path.as_str())
    }
}

/// Returns the files in `files` whose name matches no file reference, in the
/// order given.
pub fn find_unregistered(manifest: &Manifest, files: &[SourceFile]) -> Vec<UnregisteredFile> {
    let mut known: HashSet<String> = HashSet::new();
    for reference in manifest.file_references() {
        if let Some(path) = &reference.path {
            known.insert(base_name(path).to_string());
        }
        known.insert(reference.name);
    }

    files
        .iter()
        .filter(|file| !known.contains(file.file_name()))
        .map(|file| UnregisteredFile {
            relative_path: file.relative.clone(),
            file_name: file.file_name().to_string(),
        })
        .collect()
}

/// Plain-text report listing each unregistered file by relative path.
pub fn render_report(files: &[UnregisteredFile]) -> String {
    let mut out = String::from("Files missing from the Xcode project\n");
    out.push_str(&"=".repeat(36));
    out.push('\n');
    if files.is_empty() {
        out.push_str("(none)\n");
    }
    for file in files {
        out.push_str(&file.relative_path);
        out.push('\n');
    }
    out.push_str(&format!("\nTotal: {}\n", files.len()));
    out
}
