//! The Xcode project manifest (`project.pbxproj`) held as raw text.
//!
//! Queries re-scan the text each time, so they always reflect the latest
//! edit. Edits splice fragments into the buffer and never touch bytes outside
//! the spliced range.

pub mod dedup;
pub mod entry;
pub mod missing;
pub mod mutator;
pub mod scanner;

use std::{
    collections::HashSet,
    io::{BufRead, Read, Write},
};

use crate::{error::Error, identifier::ObjectId, traits::Document};

pub use entry::{
    BuildFile, BuildPhase, EntryKind, FileReference, FileType, Group, ManifestEntry, NativeTarget,
    PhaseKind,
};
pub use scanner::Section;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    text: String,
}

impl Document for Manifest {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Manifest::new(text)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(self.text.as_bytes())?;
        Ok(())
    }
}

impl Manifest {
    /// Wraps manifest text. Only checks that the text has an `objects`
    /// dictionary; everything else is tolerated.
    pub fn new(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        if !text.contains("objects = {") {
            return Err(Error::InvalidManifest(
                "no `objects = {` dictionary found".to_string(),
            ));
        }
        Ok(Manifest { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn section(&self, name: &str) -> Option<Section> {
        scanner::find_section(&self.text, name)
    }

    pub fn file_references(&self) -> Vec<FileReference> {
        scanner::file_references(&self.text)
    }

    pub fn build_files(&self) -> Vec<BuildFile> {
        scanner::build_files(&self.text)
    }

    pub fn groups(&self) -> Vec<Group> {
        scanner::groups(&self.text)
    }

    pub fn build_phases(&self, kind: PhaseKind) -> Vec<BuildPhase> {
        scanner::build_phases(&self.text, kind)
    }

    /// Members of every build phase, keyed by phase identifier, in file order.
    pub fn phase_memberships(&self) -> Vec<(ObjectId, Vec<ManifestEntry>)> {
        scanner::phase_memberships(&self.text)
    }

    pub fn native_targets(&self) -> Vec<NativeTarget> {
        scanner::native_targets(&self.text)
    }

    pub fn main_group(&self) -> Option<ObjectId> {
        scanner::main_group(&self.text)
    }

    /// Every identifier-shaped token currently in the manifest.
    pub fn object_ids(&self) -> HashSet<ObjectId> {
        scanner::object_ids(&self.text)
    }

    /// True if some file reference is named `file_name` or has it as the
    /// last path component.
    pub fn contains_file(&self, file_name: &str) -> bool {
        self.file_references()
            .iter()
            .any(|r| r.matches_file_name(file_name))
    }

    pub(crate) fn insert(&mut self, at: usize, fragment: &str) {
        self.text.insert_str(at, fragment);
    }

    pub(crate) fn replace_text(&mut self, text: String) {
        self.text = text;
    }
}
