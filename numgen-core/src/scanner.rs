use numgen_common::Result;
use std::path::{Path, PathBuf};

fn is_parquet(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("parquet")
}

pub fn scan_directory(base: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    scan_recursive(base, &mut results)?;
    results.sort();
    Ok(results)
}

fn scan_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_recursive(&path, out)?;
        } else if is_parquet(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// resolve a path string: single file, directory (recursive), or glob pattern
pub fn resolve_paths(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if path.is_dir() {
        return scan_directory(path);
    }
    let mut results = Vec::new();
    if let Ok(entries) = glob::glob(input) {
        for entry in entries.flatten() {
            if entry.is_file() && is_parquet(&entry) {
                results.push(entry);
            }
        }
    }
    results.sort();
    Ok(results)
}
