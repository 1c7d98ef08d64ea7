use std::path::Path;

use unic_langid::LanguageIdentifier;

/// An existing regular file.
pub fn validate_file_path(path: impl AsRef<Path>) -> Result<(), String> {
    let path = path.as_ref();
    match path.metadata() {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(format!("Not a file: {}", path.display())),
        Err(_) => Err(format!("No such file: {}", path.display())),
    }
}

/// An existing directory.
pub fn validate_dir_path(path: impl AsRef<Path>) -> Result<(), String> {
    let path = path.as_ref();
    match path.metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!("Not a directory: {}", path.display())),
        Err(_) => Err(format!("No such directory: {}", path.display())),
    }
}

/// Creates the parent directory of an output file when it is missing.
pub fn validate_output_path(path: impl AsRef<Path>) -> Result<(), String> {
    let Some(parent) = path.as_ref().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
        .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))
}

/// A BCP 47 tag as Xcode writes it (`es`, `zh-Hans`, `pt-BR`). Tags the
/// parser would have to rewrite, such as `en_US`, are rejected.
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    let invalid = || format!("'{}' is not a language code such as es, zh-Hans or pt-BR", lang);
    let parsed: LanguageIdentifier = lang.parse().map_err(|_| invalid())?;
    if parsed.to_string().eq_ignore_ascii_case(lang) {
        Ok(())
    } else {
        Err(invalid())
    }
}

pub fn validate_languages(languages: &[String]) -> Result<(), String> {
    if languages.is_empty() {
        return Err(
            "No target languages given; pass --lang or set catalog.languages in xcpatch.toml"
                .to_string(),
        );
    }
    languages
        .iter()
        .try_for_each(|lang| validate_language_code(lang))
}
