//! Registering new files in a manifest.
//!
//! For each file this writes up to four fragments: the file reference, the
//! build file, the group child and the build phase member. A fragment whose
//! destination cannot be located is skipped with a warning and the others are
//! still written.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::identifier::{IdGenerator, ObjectId};

use super::{
    Manifest,
    entry::{
        FileType, Group, NativeTarget, PhaseKind, render_build_file, render_file_reference,
        render_group, render_list_item,
    },
    scanner,
};

/// One file to register.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddFileRequest {
    /// Path of the file relative to the source root; its last component is
    /// the name recorded in the manifest.
    pub path: String,
    /// Slash-separated group path. Defaults to the parent directory of `path`.
    pub group: Option<String>,
    /// Native target whose build phase receives the file.
    pub target: Option<String>,
}

impl AddFileRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    pub fn file_name(&self) -> &str {
        scanner::base_name(self.path.trim_end_matches('/'))
    }

    fn group_components(&self) -> (Vec<&str>, bool) {
        match &self.group {
            Some(group) => (split_path(group), true),
            None => {
                let trimmed = self.path.trim_end_matches('/');
                let parent = trimmed.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
                (split_path(parent), false)
            }
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

/// Options for [`add_files`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddOptions {
    /// Create missing groups instead of skipping group membership.
    pub create_groups: bool,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_groups(mut self, create_groups: bool) -> Self {
        self.create_groups = create_groups;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedFile {
    pub file_name: String,
    pub file_ref: ObjectId,
    pub build_file: Option<ObjectId>,
    pub group: Option<ObjectId>,
    pub build_phase: Option<ObjectId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyPresent,
    NoFileReferenceSection,
    InvalidPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedGroup {
    pub id: ObjectId,
    pub name: String,
}

/// What [`add_files`] did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AddReport {
    pub added: Vec<AddedFile>,
    pub skipped: Vec<SkippedFile>,
    pub created_groups: Vec<CreatedGroup>,
    pub warnings: Vec<String>,
}

impl AddReport {
    /// True if the manifest text was modified.
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.created_groups.is_empty()
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Registers every requested file that is not already in the manifest.
pub fn add_files(
    manifest: &mut Manifest,
    requests: &[AddFileRequest],
    ids: &mut IdGenerator,
    options: &AddOptions,
) -> AddReport {
    let mut report = AddReport::default();
    for request in requests {
        add_file(manifest, request, ids, options, &mut report);
    }
    report
}

fn add_file(
    manifest: &mut Manifest,
    request: &AddFileRequest,
    ids: &mut IdGenerator,
    options: &AddOptions,
    report: &mut AddReport,
) {
    let file_name = request.file_name().to_string();
    if file_name.is_empty() {
        report.skipped.push(SkippedFile {
            file_name: request.path.clone(),
            reason: SkipReason::InvalidPath,
        });
        return;
    }
    if manifest.contains_file(&file_name) {
        warn!(file = %file_name, "already in project");
        report.skipped.push(SkippedFile {
            file_name,
            reason: SkipReason::AlreadyPresent,
        });
        return;
    }
    let Some(file_refs) = manifest.section("PBXFileReference") else {
        report.warn(format!(
            "PBXFileReference section not found; {} not added",
            file_name
        ));
        report.skipped.push(SkippedFile {
            file_name,
            reason: SkipReason::NoFileReferenceSection,
        });
        return;
    };

    let file_type = FileType::from_path(&request.path);
    let mut taken = manifest.object_ids();

    let file_ref = ids.next_unique(&taken);
    taken.insert(file_ref.clone());
    manifest.insert(
        file_refs.body.end,
        &render_file_reference(&file_ref, &file_name, file_type),
    );
    debug!(file = %file_name, id = %file_ref, "added file reference");

    let mut added = AddedFile {
        file_name: file_name.clone(),
        file_ref: file_ref.clone(),
        build_file: None,
        group: None,
        build_phase: None,
    };

    if let Some(phase) = file_type.phase {
        match manifest.section("PBXBuildFile") {
            Some(build_files) => {
                let build_id = ids.next_unique(&taken);
                taken.insert(build_id.clone());
                manifest.insert(
                    build_files.body.end,
                    &render_build_file(&build_id, &file_name, phase, &file_ref),
                );
                debug!(file = %file_name, id = %build_id, "added build file");
                added.build_file = Some(build_id);
            }
            None => report.warn(format!(
                "PBXBuildFile section not found; {} is not part of any build phase",
                file_name
            )),
        }

        if let Some(build_id) = added.build_file.clone() {
            match resolve_phase(manifest, request, phase) {
                Some(phase_id) => {
                    let comment = format!("{} in {}", file_name, phase);
                    if insert_list_item(
                        manifest,
                        phase.section_name(),
                        &phase_id,
                        "files",
                        &build_id,
                        &comment,
                    ) {
                        debug!(file = %file_name, phase = %phase_id, "added to build phase");
                        added.build_phase = Some(phase_id);
                    } else {
                        report.warn(format!(
                            "files list of {} phase {} not found; {} not added to it",
                            phase, phase_id, file_name
                        ));
                    }
                }
                None => report.warn(format!(
                    "no {} build phase found for {}",
                    phase, request.path
                )),
            }
        }
    }

    let (components, explicit) = request.group_components();
    let group = if components.is_empty() {
        manifest.main_group()
    } else if options.create_groups {
        ensure_group(manifest, &components, ids, &mut taken, report)
    } else {
        find_group(&manifest.groups(), &components, explicit)
    };
    match group {
        Some(group_id) => {
            if insert_list_item(
                manifest, "PBXGroup", &group_id, "children", &file_ref, &file_name,
            ) {
                debug!(file = %file_name, group = %group_id, "added to group");
                added.group = Some(group_id);
            } else {
                report.warn(format!(
                    "children list of group {} not found; {} not added to it",
                    group_id, file_name
                ));
            }
        }
        None => report.warn(format!(
            "group {} not found; {} not added to any group",
            if components.is_empty() {
                "<main>".to_string()
            } else {
                components.join("/")
            },
            file_name
        )),
    }

    report.added.push(added);
}

/// Appends `item` to the list `key` of object `owner`. Returns false when the
/// object or the list cannot be located. An item already in the list counts
/// as success.
fn insert_list_item(
    manifest: &mut Manifest,
    section_name: &str,
    owner: &ObjectId,
    key: &str,
    item: &ObjectId,
    comment: &str,
) -> bool {
    let text = manifest.as_str();
    let Some(block) = scanner::find_object(text, section_name, owner) else {
        return false;
    };
    let Some(list) = scanner::find_list(text, block.range, key) else {
        return false;
    };
    if list.items.iter().any(|i| i.id.as_ref() == Some(item)) {
        return true;
    }
    let line = render_list_item(&list.item_indent, item, comment);
    manifest.insert(list.insert_at, &line);
    true
}

fn pick_target<'a>(targets: &'a [NativeTarget], path: &str) -> Option<&'a NativeTarget> {
    if path.contains("UITests")
        && let Some(target) = targets.iter().find(|t| t.is_ui_test_target())
    {
        return Some(target);
    }
    if path.contains("Tests")
        && let Some(target) = targets
            .iter()
            .find(|t| t.is_test_target() && !t.is_ui_test_target())
    {
        return Some(target);
    }
    targets
        .iter()
        .find(|t| !t.is_test_target())
        .or(targets.first())
}

fn resolve_phase(manifest: &Manifest, request: &AddFileRequest, kind: PhaseKind) -> Option<ObjectId> {
    let phases = manifest.build_phases(kind);
    let first = phases.first()?.id.clone();
    let targets = manifest.native_targets();

    let target = match &request.target {
        Some(name) => Some(targets.iter().find(|t| &t.name == name)?),
        None => pick_target(&targets, &request.path),
    };

    if let Some(target) = target {
        let owned = target
            .build_phases
            .iter()
            .find(|entry| phases.iter().any(|p| p.id == entry.id))
            .map(|entry| entry.id.clone());
        if owned.is_some() || request.target.is_some() {
            return owned;
        }
    }
    Some(first)
}

/// Finds the first group (in file order) whose trailing ancestor names match
/// `components`. Inferred paths also try dropping leading components.
fn find_group(groups: &[Group], components: &[&str], explicit: bool) -> Option<ObjectId> {
    if explicit {
        return resolve_group(groups, components);
    }
    (0..components.len()).find_map(|skip| resolve_group(groups, &components[skip..]))
}

fn resolve_group(groups: &[Group], components: &[&str]) -> Option<ObjectId> {
    let (last, ancestors) = components.split_last()?;
    let by_id: HashMap<&ObjectId, &Group> = groups.iter().map(|g| (&g.id, g)).collect();
    let mut parents: HashMap<&ObjectId, &ObjectId> = HashMap::new();
    for group in groups {
        for child in &group.children {
            parents.entry(&child.id).or_insert(&group.id);
        }
    }

    groups
        .iter()
        .filter(|g| g.display_name() == Some(*last))
        .find(|candidate| {
            let mut current: &ObjectId = &candidate.id;
            ancestors.iter().rev().all(|expected| {
                let Some(parent) = parents.get(current).and_then(|id| by_id.get(*id)).copied()
                else {
                    return false;
                };
                current = &parent.id;
                parent.display_name() == Some(*expected)
            })
        })
        .map(|g| g.id.clone())
}

/// Resolves `components`, creating whatever trailing groups are missing
/// under the deepest existing one (or the main group).
fn ensure_group(
    manifest: &mut Manifest,
    components: &[&str],
    ids: &mut IdGenerator,
    taken: &mut HashSet<ObjectId>,
    report: &mut AddReport,
) -> Option<ObjectId> {
    let groups = manifest.groups();
    let (mut parent, existing) = (1..=components.len())
        .rev()
        .find_map(|len| resolve_group(&groups, &components[..len]).map(|id| (id, len)))
        .or_else(|| manifest.main_group().map(|id| (id, 0)))?;

    for name in &components[existing..] {
        let section = manifest.section("PBXGroup")?;
        let id = ids.next_unique(taken);
        taken.insert(id.clone());
        manifest.insert(section.body.end, &render_group(&id, name));
        if !insert_list_item(manifest, "PBXGroup", &parent, "children", &id, name) {
            report.warn(format!(
                "children list of group {} not found; new group {} is detached",
                parent, name
            ));
        }
        debug!(group = %name, id = %id, "created group");
        report.created_groups.push(CreatedGroup {
            id: id.clone(),
            name: name.to_string(),
        });
        parent = id;
    }
    Some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_group_defaults_to_parent_dir() {
        let request = AddFileRequest::new("Features/Prompts/PromptQueue.swift");
        assert_eq!(request.file_name(), "PromptQueue.swift");
        assert_eq!(request.group_components(), (vec!["Features", "Prompts"], false));

        let request = AddFileRequest::new("Root.swift").with_group(Some("App/Map".into()));
        assert_eq!(request.group_components(), (vec!["App", "Map"], true));
    }

    #[test]
    fn test_lone_file_reference_section() {
        let x_line = "\t\tF10000000000000000000001 /* X.swift */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = X.swift; sourceTree = \"<group>\"; };\n";
        let text = format!(
            "{{\n\tobjects = {{\n\n/* Begin PBXFileReference section */\n{x_line}/* End PBXFileReference section */\n\t}};\n}}\n"
        );
        let mut manifest = Manifest::new(text.clone()).unwrap();
        let report = add_files(
            &mut manifest,
            &[AddFileRequest::new("Y.swift")],
            &mut IdGenerator::seeded(1),
            &AddOptions::new(),
        );

        let refs = manifest.file_references();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["X.swift", "Y.swift"]);
        assert!(manifest.as_str().contains(x_line));
        let y_line = render_file_reference(&refs[1].id, "Y.swift", FileType::from_path("Y.swift"));
        assert_eq!(manifest.as_str().replacen(&y_line, "", 1), text);
        // Missing build-file section and missing main group.
        assert_eq!(report.warnings.len(), 2);
        assert!(report.added[0].build_file.is_none());
    }

    #[test]
    fn test_pick_target_routes_tests() {
        let target = |name: &str| NativeTarget {
            id: IdGenerator::seeded(name.len() as u64).next_id(),
            name: name.to_string(),
            build_phases: Vec::new(),
        };
        let targets = vec![target("App"), target("AppTests"), target("AppUITests")];
        assert_eq!(pick_target(&targets, "Features/Map.swift").unwrap().name, "App");
        assert_eq!(
            pick_target(&targets, "AppTests/MapTests.swift").unwrap().name,
            "AppTests"
        );
        assert_eq!(
            pick_target(&targets, "AppUITests/LaunchTests.swift").unwrap().name,
            "AppUITests"
        );
    }
}
