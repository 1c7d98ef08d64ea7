//! Removal of doubly registered build files.
//!
//! Build files are grouped by file name and phase label (`A.swift in
//! Sources`). An entry without a comment is named after the file its
//! `fileRef` points at; entries that still have no name are left alone. The
//! first of each group in file order survives and later ones are deleted from
//! the `PBXBuildFile` section and from every list that mentions them.
//!
//! With [`DedupOptions::keep_shared`], a later entry that is the first member
//! of a different build phase than the survivor's is kept as well. Every
//! phase kind counts, copy-files and headers phases included.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::identifier::{ID_LEN, ObjectId};

use super::{Manifest, entry::BuildFile, scanner::base_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub file_name: String,
    pub phase: Option<String>,
    pub kept: ObjectId,
    pub removed: Vec<ObjectId>,
    /// The removed entries point at a different file reference than the kept one.
    pub divergent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DedupReport {
    pub groups: Vec<DuplicateGroup>,
    /// `PBXBuildFile` declarations deleted.
    pub removed_declarations: usize,
    /// List lines deleted because they referenced a removed build file.
    pub removed_references: usize,
    /// Repeated identifiers dropped from a single `files` list.
    pub collapsed_repeats: usize,
}

impl DedupReport {
    pub fn changed(&self) -> bool {
        self.removed_declarations + self.removed_references + self.collapsed_repeats > 0
    }
}

/// Options for [`deduplicate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupOptions {
    /// Keep a same-named entry that leads a different build phase, i.e. the
    /// same file built into a second target.
    pub keep_shared: bool,
}

impl DedupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_shared(mut self, keep_shared: bool) -> Self {
        self.keep_shared = keep_shared;
        self
    }
}

type GroupKey = (String, Option<String>);

/// Build phase that lists each build file first, across all phase kinds.
fn phase_owners(manifest: &Manifest) -> HashMap<ObjectId, ObjectId> {
    let mut owner = HashMap::new();
    for (phase, members) in manifest.phase_memberships() {
        for member in members {
            owner.entry(member.id).or_insert_with(|| phase.clone());
        }
    }
    owner
}

/// Deduplicates build files in place, leaving one entry per file name and
/// phase label.
pub fn deduplicate(manifest: &mut Manifest) -> DedupReport {
    deduplicate_with(manifest, &DedupOptions::new())
}

pub fn deduplicate_with(manifest: &mut Manifest, options: &DedupOptions) -> DedupReport {
    let build_files = manifest.build_files();
    let owner = if options.keep_shared {
        phase_owners(manifest)
    } else {
        HashMap::new()
    };

    let mut order: Vec<GroupKey> = Vec::new();
    let mut buckets: HashMap<GroupKey, Vec<&BuildFile>> = HashMap::new();
    for build_file in &build_files {
        if build_file.file_name.is_empty() {
            debug!(id = %build_file.id, "build file has no resolvable name, leaving it");
            continue;
        }
        let key = (
            base_name(&build_file.file_name).to_string(),
            build_file.phase.clone(),
        );
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(build_file);
    }

    let mut report = DedupReport::default();
    let mut to_remove: HashSet<ObjectId> = HashSet::new();

    for key in order {
        let entries = &buckets[&key];
        let Some((kept, rest)) = entries.split_first() else {
            continue;
        };
        let kept_owner = owner.get(&kept.id);
        let mut seen_phases: HashSet<&ObjectId> = kept_owner.into_iter().collect();

        let mut removed = Vec::new();
        let mut divergent = false;
        for candidate in rest {
            let candidate_owner = owner.get(&candidate.id);
            if let (Some(_), Some(phase)) = (kept_owner, candidate_owner)
                && seen_phases.insert(phase)
            {
                debug!(file = %key.0, id = %candidate.id, "same file in another target, keeping");
                continue;
            }
            divergent |= candidate.file_ref != kept.file_ref;
            removed.push(candidate.id.clone());
        }
        if removed.is_empty() {
            continue;
        }

        if divergent {
            warn!(
                file = %key.0,
                kept = %kept.id,
                "duplicates reference different files; keeping the first"
            );
        }
        to_remove.extend(removed.iter().cloned());
        report.groups.push(DuplicateGroup {
            file_name: key.0.clone(),
            phase: key.1.clone(),
            kept: kept.id.clone(),
            removed,
            divergent,
        });
    }

    let rewritten = strip_lines(manifest.as_str(), &to_remove, &mut report);
    if report.changed() {
        manifest.replace_text(rewritten);
    }
    report
}

/// Identifier at the start of a line, if the line starts with one.
fn leading_id(trimmed: &str) -> Option<ObjectId> {
    let head = trimmed.get(..ID_LEN)?;
    let tail = &trimmed[ID_LEN..];
    if !(tail.is_empty() || tail.starts_with([' ', ',', '\n', '\r'])) {
        return None;
    }
    head.parse().ok()
}

struct OpenList {
    is_files: bool,
    seen: HashSet<ObjectId>,
}

fn strip_lines(text: &str, to_remove: &HashSet<ObjectId>, report: &mut DedupReport) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open: Option<OpenList> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let id = leading_id(trimmed);

        if let Some(list) = open.as_mut() {
            if trimmed.starts_with(')') {
                open = None;
            } else if let Some(id) = id {
                if to_remove.contains(&id) {
                    report.removed_references += 1;
                    continue;
                }
                if list.is_files && !list.seen.insert(id) {
                    report.collapsed_repeats += 1;
                    continue;
                }
            }
        } else if let Some(id) = &id
            && to_remove.contains(id)
            && trimmed.contains("isa = PBXBuildFile")
        {
            report.removed_declarations += 1;
            continue;
        }

        let content = trimmed.trim_end();
        if content.ends_with("= (") {
            open = Some(OpenList {
                is_files: content == "files = (",
                seen: HashSet::new(),
            });
        }
        out.push_str(line);
    }
    out
}
