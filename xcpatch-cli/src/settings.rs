use std::path::{Path, PathBuf};

use xcpatch::Config;

use crate::validation::validate_file_path;

/// Loads `--config` when given, else `xcpatch.toml` from the working
/// directory, else defaults.
pub fn load_config(explicit: Option<&str>) -> Result<Config, String> {
    if let Some(path) = explicit {
        validate_file_path(path)?;
        return Config::load_from_file(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path, e));
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Cannot read working directory: {}", e))?;
    Config::discover(&cwd)
        .map(Option::unwrap_or_default)
        .map_err(|e| format!("Failed to load xcpatch.toml: {}", e))
}

/// Flag value, else config value, else an error naming both.
pub fn require_path(
    flag: Option<String>,
    configured: Option<PathBuf>,
    what: &str,
    flag_name: &str,
    config_key: &str,
) -> Result<String, String> {
    flag.or_else(|| configured.map(|p| p.to_string_lossy().into_owned()))
        .ok_or_else(|| {
            format!(
                "No {} specified; pass {} or set {} in xcpatch.toml",
                what, flag_name, config_key
            )
        })
}

/// Directory holding the `.xcodeproj` bundle of a `project.pbxproj` path.
pub fn project_dir(project: &str) -> PathBuf {
    Path::new(project)
        .parent()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_path_prefers_flag() {
        let got = require_path(
            Some("a".into()),
            Some(PathBuf::from("b")),
            "project",
            "--project",
            "project.path",
        );
        assert_eq!(got.unwrap(), "a");
        let got = require_path(None, Some(PathBuf::from("b")), "project", "--project", "project.path");
        assert_eq!(got.unwrap(), "b");
        let err = require_path(None, None, "project", "--project", "project.path").unwrap_err();
        assert!(err.contains("--project"));
    }

    #[test]
    fn test_project_dir() {
        assert_eq!(
            project_dir("ios/App.xcodeproj/project.pbxproj"),
            PathBuf::from("ios")
        );
        assert_eq!(project_dir("App.xcodeproj/project.pbxproj"), PathBuf::from("."));
    }
}
