use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use xcpatch::catalog::prune::write_backup;
use xcpatch::traits::Document;
use xcpatch::walk::read_sources;
use xcpatch::{Catalog, Config, WalkOptions, collect_files, prune_unreferenced};

use crate::settings::require_path;
use crate::validation::{validate_dir_path, validate_file_path};

#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    pub catalog: Option<String>,
    pub source_root: Option<String>,
    pub include: Vec<String>,
    pub no_backup: bool,
    pub dry_run: bool,
    pub json: bool,
}

fn default_include() -> Vec<String> {
    vec!["**/*.swift".to_string(), "**/*.plist".to_string()]
}

pub fn run_prune_command(opts: PruneOptions, config: &Config) -> Result<(), String> {
    let catalog_path = require_path(
        opts.catalog.clone(),
        config.catalog_path(),
        "catalog",
        "--catalog",
        "catalog.path",
    )?;
    validate_file_path(&catalog_path)?;

    let source_root: PathBuf = opts
        .source_root
        .clone()
        .map(PathBuf::from)
        .or_else(|| config.catalog_source_root())
        .unwrap_or_else(|| {
            Path::new(&catalog_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
    validate_dir_path(&source_root)?;

    let include = if opts.include.is_empty() {
        default_include()
    } else {
        opts.include.clone()
    };
    let walk = WalkOptions::default().with_include(include);

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?,
    );
    progress_bar.set_message(format!("Reading sources under {}...", source_root.display()));
    let sources = collect_files(std::slice::from_ref(&source_root), &walk)
        .and_then(|files| read_sources(&files));
    let sources = match sources {
        Ok(sources) => sources,
        Err(e) => {
            progress_bar.finish_with_message("❌ Reading sources failed");
            return Err(format!("Failed to read sources under '{}': {}", source_root.display(), e));
        }
    };
    progress_bar.finish_and_clear();

    if sources.is_empty() {
        return Err(format!(
            "No source files found under '{}'; refusing to prune every key",
            source_root.display()
        ));
    }

    let mut catalog = Catalog::read_from(&catalog_path)
        .map_err(|e| format!("Failed to read catalog '{}': {}", catalog_path, e))?;
    let report = prune_unreferenced(&mut catalog, &sources);

    if opts.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
        println!("{}", text);
    } else {
        for key in &report.removed {
            println!("🗑️  {}", key);
        }
        println!(
            "Kept {} keys, removed {} (searched {} source files)",
            report.kept,
            report.removed.len(),
            sources.len()
        );
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
    if !opts.no_backup
        && let Some(backup) = write_backup(Path::new(&catalog_path))
            .map_err(|e| format!("Failed to write backup: {}", e))?
        && !opts.json
    {
        println!("Backup written: {}", backup.display());
    }
    catalog
        .write_to(&catalog_path)
        .map_err(|e| format!("Failed to write catalog '{}': {}", catalog_path, e))?;
    if !opts.json {
        println!("✅ Catalog updated: {}", catalog_path);
    }
    Ok(())
}
