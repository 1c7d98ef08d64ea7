use xcpatch::traits::Document;
use xcpatch::{AugmentOptions, AugmentReport, Catalog, Config, TranslationTable, augment};

use crate::settings::require_path;
use crate::validation::{validate_file_path, validate_languages, validate_output_path};

#[derive(Debug, Clone, Default)]
pub struct LocalizeOptions {
    pub catalog: Option<String>,
    pub translations: Option<String>,
    pub languages: Vec<String>,
    pub skip_format_keys: bool,
    pub output: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

fn print_report(report: &AugmentReport) {
    for (language, counts) in &report.languages {
        println!(
            "🌐 {}: {} from table, {} copied from source",
            language, counts.from_table, counts.fallback
        );
    }
    if report.source_inserted > 0 {
        println!("Source-language entries added: {}", report.source_inserted);
    }
    if !report.skipped.is_empty() {
        println!("Skipped keys: {}", report.skipped.len());
    }
    println!("Updated {} strings", report.keys_updated);
}

pub fn run_localize_command(opts: LocalizeOptions, config: &Config) -> Result<(), String> {
    let catalog_path = require_path(
        opts.catalog.clone(),
        config.catalog_path(),
        "catalog",
        "--catalog",
        "catalog.path",
    )?;
    validate_file_path(&catalog_path)?;

    let languages = if opts.languages.is_empty() {
        config.catalog.languages.clone()
    } else {
        opts.languages.clone()
    };
    validate_languages(&languages)?;

    let table_path = opts
        .translations
        .clone()
        .or_else(|| {
            config
                .translations_path()
                .map(|p| p.to_string_lossy().into_owned())
        });
    let table = match &table_path {
        Some(path) => {
            validate_file_path(path)?;
            TranslationTable::load(path)
                .map_err(|e| format!("Failed to read translations '{}': {}", path, e))?
        }
        None => {
            tracing::warn!("no translation table given; every missing language copies the source text");
            TranslationTable::new()
        }
    };

    if let Some(output) = &opts.output {
        validate_output_path(output)?;
    }

    let mut catalog = Catalog::read_from(&catalog_path)
        .map_err(|e| format!("Failed to read catalog '{}': {}", catalog_path, e))?;
    let options = AugmentOptions::new(languages)
        .with_skip_format_keys(opts.skip_format_keys || config.catalog.skip_format_keys);
    let report = augment(&mut catalog, &table, &options);

    if opts.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
        println!("{}", text);
    } else {
        print_report(&report);
    }

    let out = opts.output.as_deref().unwrap_or(&catalog_path);
    if !report.changed() && out == catalog_path {
        return Ok(());
    }
    if opts.dry_run {
        if !opts.json {
            println!("Dry-run mode: no files were written");
        }
        return Ok(());
    }
    catalog
        .write_to(out)
        .map_err(|e| format!("Failed to write catalog '{}': {}", out, e))?;
    if !opts.json {
        println!("✅ Translations written: {}", out);
    }
    Ok(())
}
