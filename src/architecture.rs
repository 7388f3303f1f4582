//! Human-readable structural overview of a loaded codebase.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::deps::DependencyRecord;
use crate::loader::LoadedFile;

/// Heading used for files that live directly in the root directory.
pub const ROOT_HEADING: &str = "Root";

/// Returns the file-type key of a path: the lowercase text after the last `.`
/// of its file name, or `unknown`.
#[must_use]
pub fn file_type(path: &str) -> String {
    let name = crate::tree::base_name(path);
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "unknown".to_string(),
    }
}

/// Counts files per [`file_type`], in first-seen order.
#[must_use]
pub fn file_type_counts<'a>(paths: impl IntoIterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for path in paths {
        *counts.entry(file_type(path)).or_insert(0) += 1;
    }
    counts
}

/// Renders the architecture overview for `files`.
///
/// Files are grouped by containing directory in first-seen order, each line
/// annotated with imports and dependents from `deps` when present, followed
/// by a per-type count. Output is a pure function of its inputs.
#[must_use]
pub fn summarize(files: &[LoadedFile], deps: &DependencyRecord) -> String {
    let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for file in files {
        let dir = file.path.rsplit_once('/').map_or("", |(dir, _)| dir);
        groups.entry(dir).or_default().push(&file.path);
    }

    let mut out = String::from("# Architecture Overview\n\n");
    for (dir, paths) in &groups {
        let heading = if dir.is_empty() { ROOT_HEADING } else { dir };
        let _ = writeln!(out, "## {heading}\n");
        for path in paths {
            let _ = writeln!(out, "- {path}");
            if let Some(entry) = deps.get(*path) {
                if !entry.imports.is_empty() {
                    let _ = writeln!(out, "  - Imports: {}", entry.imports.join(", "));
                }
                if !entry.used_by.is_empty() {
                    let _ = writeln!(out, "  - Used by: {}", entry.used_by.join(", "));
                }
            }
        }
        out.push('\n');
    }

    let counts = file_type_counts(files.iter().map(|f| f.path.as_str()));
    if !counts.is_empty() {
        out.push_str("## File Types Summary\n\n");
        for (ext, count) in &counts {
            let _ = writeln!(out, "- {ext}: {count} files");
        }
        out.push('\n');
    }

    out
}
