use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn ensure_dir_exists(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
        log::info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Files directly or transitively under `dir` with the given extension, sorted.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| format!("Error reading directory entry: {}", e))?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == extension) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, contents).map_err(|e| format!("Failed to write {:?}: {}", path, e))?;
    log::trace!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn lists_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("wasm_example.js"), "").unwrap();
        write_file(&dir.path().join("wasm_example_bg.wasm"), "").unwrap();
        write_file(&dir.path().join("snippets/x/inline0.js"), "").unwrap();

        let js = list_files_with_extension(dir.path(), "js").unwrap();
        assert_eq!(
            js,
            vec![dir.path().join("snippets/x/inline0.js"), dir.path().join("wasm_example.js")]
        );
    }

    #[test]
    fn listing_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files_with_extension(&dir.path().join("nope"), "js").is_err());
    }
}
