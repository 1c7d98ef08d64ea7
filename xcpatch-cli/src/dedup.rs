use xcpatch::traits::Document;
use xcpatch::{Config, DedupReport, Manifest, deduplicate_with};

use crate::settings::require_path;
use crate::validation::validate_file_path;

#[derive(Debug, Clone, Default)]
pub struct DedupOptions {
    pub project: Option<String>,
    pub keep_shared: bool,
    pub dry_run: bool,
    pub json: bool,
}

fn print_report(report: &DedupReport) {
    if report.groups.is_empty() && report.collapsed_repeats == 0 {
        println!("✅ No duplicate build files found");
        return;
    }
    for group in &report.groups {
        println!(
            "🔁 {} in {}: kept {}, removed {}",
            group.file_name,
            group.phase.as_deref().unwrap_or("?"),
            group.kept,
            group
                .removed
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if group.divergent {
            println!("⚠️  {} duplicates point at different files; check which one you meant", group.file_name);
        }
    }
    println!(
        "Removed declarations: {}, list references: {}, repeated list entries: {}",
        report.removed_declarations, report.removed_references, report.collapsed_repeats
    );
}

pub fn run_dedup_command(opts: DedupOptions, config: &Config) -> Result<(), String> {
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
    let options = xcpatch::DedupOptions::new()
        .with_keep_shared(opts.keep_shared || config.project.keep_shared);
    let report = deduplicate_with(&mut manifest, &options);

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
