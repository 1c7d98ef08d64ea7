use xcpatch::manifest::mutator::SkipReason;
use xcpatch::traits::Document;
use xcpatch::{AddFileRequest, AddOptions, AddReport, Config, IdGenerator, Manifest, add_files};

use crate::settings::require_path;
use crate::validation::validate_file_path;

#[derive(Debug, Clone, Default)]
pub struct AddFileOptions {
    pub project: Option<String>,
    pub files: Vec<String>,
    pub group: Option<String>,
    pub target: Option<String>,
    pub create_groups: bool,
    pub dry_run: bool,
    pub json: bool,
}

pub fn print_report(report: &AddReport) {
    for group in &report.created_groups {
        println!("📁 Created group {} ({})", group.name, group.id);
    }
    for added in &report.added {
        println!("✅ Added {} ({})", added.file_name, added.file_ref);
    }
    for skipped in &report.skipped {
        match skipped.reason {
            SkipReason::AlreadyPresent => {
                println!("⏭️  {} is already in the project", skipped.file_name)
            }
            SkipReason::NoFileReferenceSection => println!(
                "❌ {} not added: no PBXFileReference section",
                skipped.file_name
            ),
            SkipReason::InvalidPath => println!("❌ Invalid file path: {}", skipped.file_name),
        }
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
    println!(
        "Added: {}, skipped: {}, groups created: {}",
        report.added.len(),
        report.skipped.len(),
        report.created_groups.len()
    );
}

pub fn run_add_file_command(opts: AddFileOptions, config: &Config) -> Result<(), String> {
    if opts.files.is_empty() {
        return Err("At least one file is required".to_string());
    }
    let project = require_path(
        opts.project.clone(),
        config.project_path(),
        "project",
        "--project",
        "project.path",
    )?;
    validate_file_path(&project)?;

    let mut manifest = Manifest::read_from(&project)
        .map_err(|e| format!("Failed to read project '{}': {}", project, e))?;

    let requests: Vec<AddFileRequest> = opts
        .files
        .iter()
        .map(|path| {
            // Bare file names fall back to the configured default group.
            let group = opts.group.clone().or_else(|| {
                if path.contains('/') {
                    None
                } else {
                    config.project.default_group.clone()
                }
            });
            AddFileRequest::new(path.as_str())
                .with_group(group)
                .with_target(opts.target.clone())
        })
        .collect();

    let options =
        AddOptions::new().with_create_groups(opts.create_groups || config.project.create_groups);
    let report = add_files(&mut manifest, &requests, &mut IdGenerator::new(), &options);

    if opts.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
        println!("{}", text);
    } else {
        print_report(&report);
    }

    if !report.changed() {
        return Ok(());
    }
    if opts.dry_run {
        if !opts.json {
            println!("Dry-run mode: no files were written");
        }
        return Ok(());
    }
    manifest
        .write_to(&project)
        .map_err(|e| format!("Failed to write project '{}': {}", project, e))?;
    if !opts.json {
        println!("✅ Project updated: {}", project);
    }
    Ok(())
}
