//! Delimiter-bounded scanning of manifest text.
//!
//! Nothing here parses the full property-list grammar. Sections are found by
//! their `/* Begin X section */` / `/* End X section */` markers, objects by an
//! identifier at the start of a line followed by `= {`, and lists by
//! `key = (` up to the first line starting with `);`. All ranges are byte
//! offsets into the text they were computed from and go stale after any edit.

use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::identifier::ObjectId;

use super::entry::{
    BuildFile, BuildPhase, EntryKind, FileReference, Group, ManifestEntry, NativeTarget, PhaseKind,
};

lazy_static! {
    static ref OBJECT_START: Regex =
        Regex::new(r"(?m)^[ \t]*([0-9A-F]{24})(?: /\* (.*?) \*/)? = \{").unwrap();
    static ref LIST_ITEM: Regex =
        Regex::new(r"^[ \t]*([0-9A-F]{24})(?: /\* (.*?) \*/)?\s*,?\s*$").unwrap();
    static ref ANY_ID: Regex = Regex::new(r"\b[0-9A-F]{24}\b").unwrap();
    static ref PHASE_SECTION: Regex =
        Regex::new(r"/\* Begin (PBX\w+BuildPhase) section \*/").unwrap();
}

/// A `/* Begin X section */ ... /* End X section */` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// From the begin marker to the end of the end marker.
    pub range: Range<usize>,
    /// Whole lines between the two marker lines. `body.end` is the start of
    /// the end marker's line, which is where appended entries go.
    pub body: Range<usize>,
}

/// One object declaration, single- or multi-line, including its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBlock {
    pub id: ObjectId,
    pub comment: Option<String>,
    pub range: Range<usize>,
}

impl ObjectBlock {
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range.clone()]
    }
}

/// A parenthesized list such as `children = ( ... );`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpan {
    pub key: String,
    /// Start of the line holding the closing `);`.
    pub insert_at: usize,
    /// Leading whitespace used for items of this list.
    pub item_indent: String,
    pub items: Vec<ListItem>,
}

/// One line of a list. `id` is `None` for items that are not identifiers
/// (string values, for example).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: Option<ObjectId>,
    pub comment: Option<String>,
    pub range: Range<usize>,
}

fn line_start(text: &str, idx: usize) -> usize {
    text[..idx].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, idx: usize) -> usize {
    text[idx..]
        .find('\n')
        .map(|i| idx + i + 1)
        .unwrap_or(text.len())
}

/// Locates a section by name. Returns `None` when either marker is missing.
pub fn find_section(text: &str, name: &str) -> Option<Section> {
    let begin = format!("/* Begin {} section */", name);
    let end = format!("/* End {} section */", name);

    let start = text.find(&begin)?;
    let body_start = line_end(text, start + begin.len());
    let end_at = body_start + text[body_start..].find(&end)?;
    let body_end = line_start(text, end_at).max(body_start);

    Some(Section {
        name: name.to_string(),
        range: start..end_at + end.len(),
        body: body_start..body_end,
    })
}

/// Finds the `}` matching the `{` at `open`, skipping quoted strings and
/// comments.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = text[i + 2..].find("*/")?;
                i += 2 + close + 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Lists the top-level objects declared in a section, in file order.
pub fn object_blocks(text: &str, section: &Section) -> Vec<ObjectBlock> {
    let body = &text[section.body.clone()];
    let offset = section.body.start;
    let mut blocks = Vec::new();
    let mut cursor = 0usize;

    for caps in OBJECT_START.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() < cursor {
            // Nested dictionary keyed by an identifier (TargetAttributes and friends).
            continue;
        }
        let Ok(id) = caps[1].parse::<ObjectId>() else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = matching_brace(body, open) else {
            break;
        };
        let end = line_end(body, close);
        blocks.push(ObjectBlock {
            id,
            comment: caps.get(2).map(|m| m.as_str().to_string()),
            range: offset + whole.start()..offset + end,
        });
        cursor = end;
    }

    blocks
}

/// Locates the list `key = ( ... );` inside `within`.
pub fn find_list(text: &str, within: Range<usize>, key: &str) -> Option<ListSpan> {
    let pattern = format!(r"(?:^|[\s{{;]){} = \(", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let found = re.find(&text[within.clone()])?;
    let open_end = within.start + found.end();

    // Lists written inline (`files = ( );`) have no line to append before.
    if !text[open_end..].starts_with('\n') && !text[open_end..].starts_with("\r\n") {
        return None;
    }

    let mut pos = line_end(text, open_end);
    let mut items = Vec::new();
    while pos < within.end {
        let end = line_end(text, pos);
        let line = &text[pos..end];
        let trimmed = line.trim_start();
        if trimmed.starts_with(')') {
            let close_indent = &line[..line.len() - trimmed.len()];
            let item_indent = match items.first() {
                Some(ListItem { range, .. }) => leading_whitespace(&text[range.clone()]).to_string(),
                None => format!("{}\t", close_indent),
            };
            return Some(ListSpan {
                key: key.to_string(),
                insert_at: pos,
                item_indent,
                items,
            });
        }
        let (id, comment) = match LIST_ITEM.captures(line.trim_end_matches(['\n', '\r'])) {
            Some(caps) => (
                caps[1].parse::<ObjectId>().ok(),
                caps.get(2).map(|m| m.as_str().to_string()),
            ),
            None => (None, None),
        };
        items.push(ListItem {
            id,
            comment,
            range: pos..end,
        });
        pos = end;
    }
    None
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Reads the first `key = value;` attribute of an object, unquoting the value.
pub fn attribute(block_text: &str, key: &str) -> Option<String> {
    let needle = format!("{} = ", key);
    for (at, _) in block_text.match_indices(&needle) {
        let delimited = block_text[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || c == '{' || c == ';');
        if !delimited {
            continue;
        }
        let rest = &block_text[at + needle.len()..];
        let raw = if rest.starts_with('"') {
            let bytes = rest.as_bytes();
            let mut i = 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            &rest[..(i + 1).min(rest.len())]
        } else {
            let end = rest
                .find(|c: char| c == ';' || c.is_whitespace())
                .unwrap_or(rest.len());
            &rest[..end]
        };
        return Some(unquote(raw));
    }
    None
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Every identifier-shaped token in the text.
pub fn object_ids(text: &str) -> HashSet<ObjectId> {
    ANY_ID
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

fn list_entries(list: Option<ListSpan>, kind: EntryKind) -> Vec<ManifestEntry> {
    let Some(list) = list else {
        return Vec::new();
    };
    list.items
        .into_iter()
        .filter_map(|item| {
            Some(ManifestEntry {
                id: item.id?,
                comment: item.comment,
                kind,
            })
        })
        .collect()
}

pub fn file_references(text: &str) -> Vec<FileReference> {
    let Some(section) = find_section(text, "PBXFileReference") else {
        return Vec::new();
    };
    object_blocks(text, &section)
        .into_iter()
        .map(|block| {
            let body = block.text(text);
            let path = attribute(body, "path");
            let name = block
                .comment
                .clone()
                .or_else(|| attribute(body, "name"))
                .or_else(|| path.as_deref().map(base_name).map(str::to_string))
                .unwrap_or_default();
            FileReference {
                id: block.id,
                name,
                path,
            }
        })
        .collect()
}

pub fn build_files(text: &str) -> Vec<BuildFile> {
    let Some(section) = find_section(text, "PBXBuildFile") else {
        return Vec::new();
    };
    let mut ref_names: Option<HashMap<ObjectId, String>> = None;
    let mut files = Vec::new();
    for block in object_blocks(text, &section) {
        let body = block.text(text);
        let file_ref: Option<ObjectId> = attribute(body, "fileRef").and_then(|s| s.parse().ok());
        let comment = block.comment.unwrap_or_default();
        let (mut file_name, phase) = match comment.rsplit_once(" in ") {
            Some((name, phase)) => (name.to_string(), Some(phase.to_string())),
            None => (comment.clone(), None),
        };
        // Without a comment the name comes from the referenced file.
        if file_name.is_empty()
            && let Some(file_ref) = &file_ref
        {
            let names = ref_names.get_or_insert_with(|| {
                file_references(text)
                    .into_iter()
                    .map(|r| (r.id, r.name))
                    .collect()
            });
            if let Some(name) = names.get(file_ref) {
                file_name = name.clone();
            }
        }
        files.push(BuildFile {
            id: block.id,
            file_name,
            phase,
            file_ref,
        });
    }
    files
}

pub fn groups(text: &str) -> Vec<Group> {
    let Some(section) = find_section(text, "PBXGroup") else {
        return Vec::new();
    };
    object_blocks(text, &section)
        .into_iter()
        .map(|block| {
            let body = block.text(text);
            let children = find_list(text, block.range.clone(), "children");
            Group {
                name: block.comment.clone().or_else(|| attribute(body, "name")),
                path: attribute(body, "path"),
                children: list_entries(children, EntryKind::GroupChild),
                id: block.id,
            }
        })
        .collect()
}

pub fn build_phases(text: &str, kind: PhaseKind) -> Vec<BuildPhase> {
    let Some(section) = find_section(text, kind.section_name()) else {
        return Vec::new();
    };
    object_blocks(text, &section)
        .into_iter()
        .map(|block| {
            let files = find_list(text, block.range.clone(), "files");
            BuildPhase {
                id: block.id,
                kind,
                files: list_entries(files, EntryKind::BuildPhaseMember),
            }
        })
        .collect()
}

/// Every build phase object in file order with the members of its `files`
/// list, whatever its kind. Copy-files, headers and script phases are
/// included alongside the kinds [`PhaseKind`] names.
pub fn phase_memberships(text: &str) -> Vec<(ObjectId, Vec<ManifestEntry>)> {
    let mut phases = Vec::new();
    for caps in PHASE_SECTION.captures_iter(text) {
        let Some(section) = find_section(text, &caps[1]) else {
            continue;
        };
        for block in object_blocks(text, &section) {
            let files = find_list(text, block.range.clone(), "files");
            phases.push((block.id, list_entries(files, EntryKind::BuildPhaseMember)));
        }
    }
    phases
}

pub fn native_targets(text: &str) -> Vec<NativeTarget> {
    let Some(section) = find_section(text, "PBXNativeTarget") else {
        return Vec::new();
    };
    object_blocks(text, &section)
        .into_iter()
        .map(|block| {
            let body = block.text(text);
            let phases = find_list(text, block.range.clone(), "buildPhases");
            NativeTarget {
                name: attribute(body, "name")
                    .or_else(|| block.comment.clone())
                    .unwrap_or_default(),
                build_phases: list_entries(phases, EntryKind::BuildPhaseMember),
                id: block.id,
            }
        })
        .collect()
}

/// The root group of the project navigator, from the `PBXProject` object.
pub fn main_group(text: &str) -> Option<ObjectId> {
    let section = find_section(text, "PBXProject")?;
    let block = object_blocks(text, &section).into_iter().next()?;
    attribute(block.text(text), "mainGroup")?.parse().ok()
}

/// Finds the declaration block of `id` inside the named section.
pub fn find_object(text: &str, section_name: &str, id: &ObjectId) -> Option<ObjectBlock> {
    let section = find_section(text, section_name)?;
    object_blocks(text, &section)
        .into_iter()
        .find(|block| &block.id == id)
}

pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
