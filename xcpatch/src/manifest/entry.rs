//! Typed views of manifest objects and the text fragments that declare them.

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

use crate::identifier::ObjectId;

/// Where an identifier appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    FileReference,
    BuildFile,
    GroupChild,
    BuildPhaseMember,
}

/// An identifier together with its trailing `/* comment */`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: ObjectId,
    pub comment: Option<String>,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub id: ObjectId,
    /// Display name, taken from the comment when present.
    pub name: String,
    pub path: Option<String>,
}

impl FileReference {
    /// True if this reference points at a file called `file_name`.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        self.name == file_name
            || self
                .path
                .as_deref()
                .is_some_and(|p| super::scanner::base_name(p) == file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFile {
    pub id: ObjectId,
    /// File name from the `"<name> in <Phase>"` comment.
    pub file_name: String,
    /// Phase label from the comment (`Sources`, `Resources`, ...).
    pub phase: Option<String>,
    pub file_ref: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: ObjectId,
    pub name: Option<String>,
    pub path: Option<String>,
    pub children: Vec<ManifestEntry>,
}

impl Group {
    /// Name shown in the project navigator.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

/// Build phase kinds that take file members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Sources,
    Resources,
    Frameworks,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [PhaseKind::Sources, PhaseKind::Resources, PhaseKind::Frameworks];

    /// Name of the manifest section holding phases of this kind.
    pub fn section_name(&self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
            PhaseKind::Frameworks => "PBXFrameworksBuildPhase",
        }
    }
}

impl Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::Sources => write!(f, "Sources"),
            PhaseKind::Resources => write!(f, "Resources"),
            PhaseKind::Frameworks => write!(f, "Frameworks"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPhase {
    pub id: ObjectId,
    pub kind: PhaseKind,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTarget {
    pub id: ObjectId,
    pub name: String,
    pub build_phases: Vec<ManifestEntry>,
}

impl NativeTarget {
    pub fn is_test_target(&self) -> bool {
        self.name.ends_with("Tests")
    }

    pub fn is_ui_test_target(&self) -> bool {
        self.name.ends_with("UITests")
    }
}

/// What Xcode records for a file of a given extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub last_known_file_type: &'static str,
    pub phase: Option<PhaseKind>,
}

impl FileType {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let (last_known_file_type, phase) = match ext.as_str() {
            "swift" => ("sourcecode.swift", Some(PhaseKind::Sources)),
            "m" => ("sourcecode.c.objc", Some(PhaseKind::Sources)),
            "mm" => ("sourcecode.cpp.objcpp", Some(PhaseKind::Sources)),
            "c" => ("sourcecode.c.c", Some(PhaseKind::Sources)),
            "cpp" | "cc" => ("sourcecode.cpp.cpp", Some(PhaseKind::Sources)),
            "metal" => ("sourcecode.metal", Some(PhaseKind::Sources)),
            "h" => ("sourcecode.c.h", None),
            "xcassets" => ("folder.assetcatalog", Some(PhaseKind::Resources)),
            "xcstrings" => ("text.json.xcstrings", Some(PhaseKind::Resources)),
            "strings" => ("text.plist.strings", Some(PhaseKind::Resources)),
            "storyboard" => ("file.storyboard", Some(PhaseKind::Resources)),
            "xib" => ("file.xib", Some(PhaseKind::Resources)),
            "json" => ("text.json", Some(PhaseKind::Resources)),
            "png" => ("image.png", Some(PhaseKind::Resources)),
            "plist" => ("text.plist.xml", None),
            "entitlements" => ("text.plist.entitlements", None),
            "md" => ("net.daringfireball.markdown", None),
            _ => ("text", None),
        };
        FileType {
            last_known_file_type,
            phase,
        }
    }
}

/// Quotes a value when the manifest syntax requires it.
pub fn quote(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.' | '-'));
    if bare {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub fn render_file_reference(id: &ObjectId, name: &str, file_type: FileType) -> String {
    format!(
        "\t\t{id} /* {name} */ = {{isa = PBXFileReference; lastKnownFileType = {ty}; path = {path}; sourceTree = \"<group>\"; }};\n",
        ty = file_type.last_known_file_type,
        path = quote(name),
    )
}

pub fn render_build_file(id: &ObjectId, name: &str, phase: PhaseKind, file_ref: &ObjectId) -> String {
    format!(
        "\t\t{id} /* {name} in {phase} */ = {{isa = PBXBuildFile; fileRef = {file_ref} /* {name} */; }};\n"
    )
}

pub fn render_list_item(indent: &str, id: &ObjectId, comment: &str) -> String {
    format!("{indent}{id} /* {comment} */,\n")
}

/// An empty `PBXGroup` whose on-disk folder is `name`.
pub fn render_group(id: &ObjectId, name: &str) -> String {
    format!(
        "\t\t{id} /* {name} */ = {{\n\t\t\tisa = PBXGroup;\n\t\t\tchildren = (\n\t\t\t);\n\t\t\tpath = {path};\n\t\t\tsourceTree = \"<group>\";\n\t\t}};\n",
        path = quote(name),
    )
}
