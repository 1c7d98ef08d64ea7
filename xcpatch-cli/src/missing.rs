use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use xcpatch::manifest::missing::render_report;
use xcpatch::traits::Document;
use xcpatch::{
    AddFileRequest, AddOptions, Config, IdGenerator, Manifest, UnregisteredFile, WalkOptions,
    add_files, collect_files, find_unregistered,
};

use crate::add_file::print_report;
use crate::settings::{project_dir, require_path};
use crate::validation::{validate_dir_path, validate_file_path, validate_output_path};

#[derive(Debug, Clone, Default)]
pub struct MissingOptions {
    pub project: Option<String>,
    pub source_root: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: Option<String>,
    pub add: bool,
    pub create_groups: bool,
    pub dry_run: bool,
    pub json: bool,
}

pub fn run_missing_command(opts: MissingOptions, config: &Config) -> Result<(), String> {
    let project = require_path(
        opts.project.clone(),
        config.project_path(),
        "project",
        "--project",
        "project.path",
    )?;
    validate_file_path(&project)?;

    let source_root: PathBuf = opts
        .source_root
        .clone()
        .map(PathBuf::from)
        .or_else(|| config.project_source_root())
        .unwrap_or_else(|| project_dir(&project));
    validate_dir_path(&source_root)?;
    if let Some(output) = &opts.output {
        validate_output_path(output)?;
    }

    let mut walk = WalkOptions::default();
    if !opts.include.is_empty() {
        walk.include = opts.include.clone();
    } else if !config.project.include.is_empty() {
        walk.include = config.project.include.clone();
    }
    walk.exclude = if opts.exclude.is_empty() {
        config.project.exclude.clone()
    } else {
        opts.exclude.clone()
    };

    let mut manifest = Manifest::read_from(&project)
        .map_err(|e| format!("Failed to read project '{}': {}", project, e))?;

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?,
    );
    progress_bar.set_message(format!("Scanning {}...", source_root.display()));
    let files = match collect_files(std::slice::from_ref(&source_root), &walk) {
        Ok(files) => files,
        Err(e) => {
            progress_bar.finish_with_message("❌ Scan failed");
            return Err(format!("Failed to scan '{}': {}", source_root.display(), e));
        }
    };
    progress_bar.finish_and_clear();

    let missing = find_unregistered(&manifest, &files);

    if let Some(output) = &opts.output {
        std::fs::write(output, render_report(&missing))
            .map_err(|e| format!("Failed to write report '{}': {}", output, e))?;
    }

    if !opts.add {
        if opts.json {
            let text = serde_json::to_string_pretty(&missing)
                .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
            println!("{}", text);
        } else {
            print_missing(&missing, files.len());
            if let Some(output) = &opts.output {
                println!("Report written: {}", output);
            }
        }
        return Ok(());
    }

    let requests: Vec<AddFileRequest> = missing
        .iter()
        .map(|file| {
            let request = file.to_request();
            if file.relative_path.contains('/') {
                request
            } else {
                request.with_group(config.project.default_group.clone())
            }
        })
        .collect();
    let options =
        AddOptions::new().with_create_groups(opts.create_groups || config.project.create_groups);
    let report = add_files(&mut manifest, &requests, &mut IdGenerator::new(), &options);

    if opts.json {
        let value = serde_json::json!({ "missing": missing, "report": report });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
        println!("{}", text);
    } else {
        print_missing(&missing, files.len());
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

fn print_missing(missing: &[UnregisteredFile], scanned: usize) {
    if missing.is_empty() {
        println!("✅ All {} source files are in the project", scanned);
        return;
    }
    for file in missing {
        println!("➕ {}", file.relative_path);
    }
    println!(
        "Found {} of {} source files missing from the project",
        missing.len(),
        scanned
    );
}
