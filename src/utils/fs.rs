use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MARKDOWN_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Markdown files under `path`, sorted. A file path is returned as-is.
pub fn find_markdown_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut results = Vec::new();
    for entry in WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let n = e.file_name().to_string_lossy();
            !n.starts_with('.')
                && n != "node_modules"
                && n != "vendor"
                && n != "target"
        })
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            results.push(entry.into_path());
        }
    }
    results.sort();
    results
}
