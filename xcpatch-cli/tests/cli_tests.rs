use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn xcpatch_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("xcpatch"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../xcpatch/tests/data")
        .join(name)
}

/// Lays out `Demo.xcodeproj/project.pbxproj` inside a fresh temp dir.
fn project_in(temp_dir: &TempDir, fixture_name: &str) -> PathBuf {
    let bundle = temp_dir.path().join("Demo.xcodeproj");
    fs::create_dir_all(&bundle).unwrap();
    let project = bundle.join("project.pbxproj");
    fs::copy(fixture(fixture_name), &project).unwrap();
    project
}

fn catalog_in(temp_dir: &TempDir) -> PathBuf {
    let catalog = temp_dir.path().join("Localizable.xcstrings");
    fs::copy(fixture("Localizable.xcstrings"), &catalog).unwrap();
    catalog
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_add_file_writes_project_once() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "add-file",
            "-p",
            project.to_str().unwrap(),
            "Demo/Features/Rides/RideMap.swift",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added RideMap.swift"));
    assert!(stdout.contains("Project updated"));

    let text = fs::read_to_string(&project).unwrap();
    assert_eq!(count(&text, "/* RideMap.swift */ = {isa = PBXFileReference;"), 1);
    assert_eq!(count(&text, "/* RideMap.swift in Sources */,"), 1);

    // Second run leaves the file alone.
    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "add-file",
            "-p",
            project.to_str().unwrap(),
            "Demo/Features/Rides/RideMap.swift",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("already in the project"));
    assert_eq!(fs::read_to_string(&project).unwrap(), text);
}

#[test]
fn test_add_file_dry_run_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    let before = fs::read_to_string(&project).unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "add-file",
            "--dry-run",
            "-p",
            project.to_str().unwrap(),
            "Demo/Settings.swift",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Dry-run mode"));
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_add_file_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "add-file",
            "--json",
            "-p",
            project.to_str().unwrap(),
            "Demo/Settings.swift",
            "Demo/AppDelegate.swift",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["added"].as_array().unwrap().len(), 1);
    assert_eq!(report["added"][0]["file_name"], "Settings.swift");
    assert_eq!(report["skipped"][0]["reason"], "already_present");
}

#[test]
fn test_add_file_missing_project_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["add-file", "-p", "nope/project.pbxproj", "A.swift"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_add_file_without_project_names_the_flag() {
    let temp_dir = TempDir::new().unwrap();
    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["add-file", "A.swift"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--project"));
}

#[test]
fn test_dedup_removes_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "duplicates.pbxproj");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["dedup", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("A.swift"));
    assert!(stdout.contains("point at different files"));

    let text = fs::read_to_string(&project).unwrap();
    assert!(!text.contains("222222222222222222222222"));

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["dedup", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No duplicate build files found"));
    assert_eq!(fs::read_to_string(&project).unwrap(), text);
}

#[test]
fn test_dedup_clean_project_is_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    let before = fs::read_to_string(&project).unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["dedup", "--json", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["groups"].as_array().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_missing_lists_unregistered_sources() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    let demo = temp_dir.path().join("Demo");
    fs::create_dir_all(&demo).unwrap();
    fs::write(demo.join("AppDelegate.swift"), "import UIKit\n").unwrap();
    fs::write(demo.join("Onboarding.swift"), "import SwiftUI\n").unwrap();
    let report_path = temp_dir.path().join("missing.txt");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "missing",
            "-p",
            project.to_str().unwrap(),
            "-o",
            report_path.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Demo/Onboarding.swift"));
    assert!(!stdout.contains("AppDelegate.swift"));

    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("Demo/Onboarding.swift"));
    assert!(report.contains("Total: 1"));
}

#[test]
fn test_missing_add_registers_files() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    for (dir, name) in [("Demo", "Onboarding.swift"), ("DemoTests", "SignInTests.swift")] {
        let dir = temp_dir.path().join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), "import Foundation\n").unwrap();
    }

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["missing", "--add", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added Onboarding.swift"));
    assert!(stdout.contains("Added SignInTests.swift"));
    assert!(stdout.contains("Project updated"));

    let text = fs::read_to_string(&project).unwrap();
    assert_eq!(count(&text, "/* Onboarding.swift in Sources */,"), 1);
    assert_eq!(count(&text, "/* SignInTests.swift in Sources */,"), 1);

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["missing", "--json", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let missing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(missing.as_array().unwrap().is_empty());
}

#[test]
fn test_missing_add_dry_run_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    let before = fs::read_to_string(&project).unwrap();
    let demo = temp_dir.path().join("Demo");
    fs::create_dir_all(&demo).unwrap();
    fs::write(demo.join("Onboarding.swift"), "import SwiftUI\n").unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "missing",
            "--add",
            "--dry-run",
            "--json",
            "-p",
            project.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["missing"].as_array().unwrap().len(), 1);
    assert_eq!(report["report"]["added"][0]["file_name"], "Onboarding.swift");
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_dedup_keep_shared_flag() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "duplicates.pbxproj");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["dedup", "--keep-shared", "-p", project.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = fs::read_to_string(&project).unwrap();
    assert!(text.contains("444444444444444444444444"));
    assert!(!text.contains("222222222222222222222222"));
}

#[test]
fn test_missing_with_explicit_source_root_json() {
    let temp_dir = TempDir::new().unwrap();
    let project = project_in(&temp_dir, "project.pbxproj");
    let sources = temp_dir.path().join("elsewhere");
    fs::create_dir_all(&sources).unwrap();
    fs::write(sources.join("RideCard.swift"), "struct RideCard {}\n").unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "missing",
            "--json",
            "-p",
            project.to_str().unwrap(),
            "-s",
            sources.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let missing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(missing.as_array().unwrap().is_empty());
}

#[test]
fn test_localize_fills_languages() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = catalog_in(&temp_dir);

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "localize",
            "-c",
            catalog.to_str().unwrap(),
            "-t",
            fixture("translations.json").to_str().unwrap(),
            "--lang",
            "es,zh-Hans",
            "--lang",
            "ko",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Translations written"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&catalog).unwrap()).unwrap();
    let settings = &written["strings"]["Settings"]["localizations"];
    assert_eq!(settings["es"]["stringUnit"]["value"], "Configuración");
    assert_eq!(settings["ko"]["stringUnit"]["state"], "translated");
    assert!(written["strings"]["Version"]["localizations"]["ko"].is_null());
}

#[test]
fn test_localize_output_leaves_source_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = catalog_in(&temp_dir);
    let before = fs::read_to_string(&catalog).unwrap();
    let out = temp_dir.path().join("out.xcstrings");

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "localize",
            "-c",
            catalog.to_str().unwrap(),
            "--lang",
            "fr",
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&catalog).unwrap(), before);
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"fr\" : {"));
}

#[test]
fn test_localize_rejects_invalid_language() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = catalog_in(&temp_dir);

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args([
            "localize",
            "-c",
            catalog.to_str().unwrap(),
            "--lang",
            "not a language",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_prune_removes_unused_keys_with_backup() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = catalog_in(&temp_dir);
    let original = fs::read_to_string(&catalog).unwrap();
    let sources = temp_dir.path().join("Sources");
    fs::create_dir_all(&sources).unwrap();
    for name in ["SettingsView.swift", "RideList.swift"] {
        fs::copy(fixture(&format!("Sources/{}", name)), sources.join(name)).unwrap();
    }

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["prune", "-c", catalog.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Legacy Banner"));

    let backup = temp_dir.path().join("Localizable.xcstrings.backup");
    assert_eq!(fs::read_to_string(&backup).unwrap(), original);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&catalog).unwrap()).unwrap();
    assert!(written["strings"]["Legacy Banner"].is_null());
    assert!(!written["strings"]["Cancel"].is_null());
}

#[test]
fn test_prune_without_sources_refuses() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = catalog_in(&temp_dir);
    let before = fs::read_to_string(&catalog).unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["prune", "-c", catalog.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No source files found"));
    assert_eq!(fs::read_to_string(&catalog).unwrap(), before);
}

#[test]
fn test_config_file_supplies_paths() {
    let temp_dir = TempDir::new().unwrap();
    project_in(&temp_dir, "project.pbxproj");
    let catalog = catalog_in(&temp_dir);
    fs::write(
        temp_dir.path().join("xcpatch.toml"),
        "[project]\npath = \"Demo.xcodeproj/project.pbxproj\"\ndefault_group = \"Demo\"\n\n\
         [catalog]\npath = \"Localizable.xcstrings\"\nlanguages = [\"de\"]\n",
    )
    .unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["add-file", "Profile.swift"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = fs::read_to_string(temp_dir.path().join("Demo.xcodeproj/project.pbxproj")).unwrap();
    assert!(text.contains("/* Profile.swift in Sources */"));

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["localize"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(fs::read_to_string(&catalog).unwrap().contains("\"de\" : {"));
}

#[test]
fn test_explicit_config_with_unknown_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("custom.toml");
    fs::write(&config, "[project]\nbogus = true\n").unwrap();

    let output = xcpatch_cmd()
        .current_dir(temp_dir.path())
        .args(["--config", config.to_str().unwrap(), "dedup"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}

#[test]
fn test_completions_generate_script() {
    let output = xcpatch_cmd()
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("xcpatch"));
    assert!(stdout.contains("add-file"));
}
