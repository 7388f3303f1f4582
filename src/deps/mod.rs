//! Approximate cross-file dependency graph built from import specifiers.
//!
//! Resolution is textual. Specifiers that start with `.` are kept in the
//! importing file's `imports` but never resolved to a target, and a
//! specifier that matches nothing is simply left unresolved.

pub mod specifier;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::loader::LoadedFile;

pub use specifier::{default_extractors, DynamicImport, RequireCall, SpecifierExtractor, StaticImport};

/// Languages whose content is scanned for specifiers.
pub const SCANNED_LANGUAGES: [&str; 4] = ["javascript", "jsx", "typescript", "tsx"];

const STRIPPED_EXTENSIONS: [&str; 4] = [".tsx", ".jsx", ".ts", ".js"];

/// Imports and reverse edges of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDependencies {
    /// Raw specifiers in first-seen order, without duplicates.
    pub imports: Vec<String>,
    /// Paths of files whose specifiers resolved to this file.
    pub used_by: Vec<String>,
}

impl FileDependencies {
    /// Returns `true` if the file has neither imports nor dependents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.used_by.is_empty()
    }
}

/// Dependency information keyed by path, in load order.
pub type DependencyRecord = IndexMap<String, FileDependencies>;

/// Builds a [`DependencyRecord`] from loaded files.
pub struct DependencyExtractor {
    extractors: Vec<Box<dyn SpecifierExtractor>>,
}

impl Default for DependencyExtractor {
    fn default() -> Self {
        Self::new(default_extractors())
    }
}

impl DependencyExtractor {
    /// Creates an extractor running `extractors` in order.
    #[must_use]
    pub fn new(extractors: Vec<Box<dyn SpecifierExtractor>>) -> Self {
        Self { extractors }
    }

    /// Returns the deduplicated specifiers found in `content`.
    #[must_use]
    pub fn specifiers(&self, content: &str) -> Vec<String> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for extractor in &self.extractors {
            for spec in extractor.extract(content) {
                if seen.insert(spec) {
                    trace!(extractor = extractor.name(), specifier = spec, "found specifier");
                }
            }
        }
        seen.into_iter().map(str::to_string).collect()
    }

    /// Builds the dependency graph for `files`.
    ///
    /// Every file gets an entry; only [`SCANNED_LANGUAGES`] are scanned.
    #[must_use]
    pub fn extract(&self, files: &[LoadedFile]) -> DependencyRecord {
        let mut record = DependencyRecord::with_capacity(files.len());
        let mut index: IndexMap<String, String> = IndexMap::with_capacity(files.len());

        for file in files {
            index.insert(normalize(&file.path), file.path.clone());
            let imports = if SCANNED_LANGUAGES.contains(&file.language.as_str()) {
                self.specifiers(&file.content)
            } else {
                Vec::new()
            };
            record.insert(file.path.clone(), FileDependencies { imports, used_by: Vec::new() });
        }

        let mut dependents: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for (importer, deps) in &record {
            for spec in &deps.imports {
                if let Some(target) = resolve(spec, &index) {
                    dependents.entry(target.to_string()).or_default().insert(importer.clone());
                }
            }
        }

        for (target, importers) in dependents {
            if let Some(deps) = record.get_mut(&target) {
                deps.used_by = importers.into_iter().collect();
            }
        }

        record
    }
}

/// Normalizes separators and strips a JavaScript or TypeScript extension.
#[must_use]
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .map_or_else(|| path.clone(), str::to_string)
}

/// Resolves a non-relative specifier against the normalized path index.
///
/// The first indexed path that equals the specifier or ends with it after a
/// `/` wins.
fn resolve<'a>(spec: &str, index: &'a IndexMap<String, String>) -> Option<&'a str> {
    if spec.starts_with('.') {
        return None;
    }
    let spec = normalize(spec);
    let suffix = format!("/{spec}");
    index
        .iter()
        .find(|(normalized, _)| normalized.ends_with(&suffix) || **normalized == spec)
        .map(|(_, path)| path.as_str())
}
