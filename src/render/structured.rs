//! JSON rendering with per-file content previews.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::{preview_text, ContextModel, Renderer};
use crate::architecture::file_type_counts;

/// Renders the model as a single JSON object, pretty-printed unless `minify` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredRenderer {
    /// Emit compact JSON.
    pub minify: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total_files: usize,
    file_types: IndexMap<String, usize>,
    total_size: usize,
}

#[derive(Serialize)]
struct FileEntry<'a> {
    path: &'a str,
    language: &'a str,
    size: usize,
    content: String,
}

#[derive(Serialize)]
struct Document<'a> {
    metadata: Value,
    summary: Summary,
    architecture: &'a str,
    dependencies: Value,
    files: Vec<FileEntry<'a>>,
}

impl Renderer for StructuredRenderer {
    fn render(&self, model: &ContextModel<'_>) -> Result<String, serde_json::Error> {
        let empty = || Value::Object(serde_json::Map::new());

        let files: Vec<FileEntry<'_>> = model
            .files
            .iter()
            .map(|file| FileEntry {
                path: &file.path,
                language: &file.language,
                size: file.char_len(),
                content: preview_text(&file.content),
            })
            .collect();

        let document = Document {
            metadata: model.metadata.map(serde_json::to_value).transpose()?.unwrap_or_else(empty),
            summary: Summary {
                total_files: model.files.len(),
                file_types: file_type_counts(model.files.iter().map(|f| f.path.as_str())),
                total_size: files.iter().map(|f| f.size).sum(),
            },
            architecture: model.architecture.unwrap_or_default(),
            dependencies: model
                .dependencies
                .map(serde_json::to_value)
                .transpose()?
                .unwrap_or_else(empty),
            files,
        };

        if self.minify {
            serde_json::to_string(&document)
        } else {
            serde_json::to_string_pretty(&document)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadedFile;
    use crate::render::Metadata;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn loaded(path: &str, content: &str) -> LoadedFile {
        LoadedFile {
            path: path.into(),
            content: content.into(),
            language: "typescript".into(),
            truncated: false,
            binary: false,
        }
    }

    #[test]
    fn absent_sections_render_as_empty_values() {
        let files = vec![loaded("a.ts", "x=1")];
        let out = StructuredRenderer { minify: true }.render(&ContextModel::files_only(&files)).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "metadata": {},
                "summary": { "totalFiles": 1, "fileTypes": { "ts": 1 }, "totalSize": 3 },
                "architecture": "",
                "dependencies": {},
                "files": [{ "path": "a.ts", "language": "typescript", "size": 3, "content": "x=1" }]
            })
        );
        assert!(!out.contains('\n'));
    }

    #[test]
    fn long_content_is_previewed_with_ellipsis() {
        let files = vec![loaded("big.ts", &"b".repeat(800))];
        let out = StructuredRenderer::default().render(&ContextModel::files_only(&files)).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let content = value["files"][0]["content"].as_str().unwrap();
        assert_eq!(content.len(), 503);
        assert!(content.ends_with("..."));
        assert_eq!(value["files"][0]["size"], 800);
        assert!(out.contains("\n  \"summary\""));
    }

    #[test]
    fn metadata_uses_camel_case_keys() {
        let files = vec![loaded("a.ts", "x")];
        let metadata = Metadata {
            total_files: 1,
            total_size: 1,
            languages: vec!["typescript".into()],
            timestamp: "2024-01-02T03:04:05.000Z".into(),
            target_model: "gpt-4o".into(),
        };
        let model = ContextModel { metadata: Some(&metadata), ..ContextModel::files_only(&files) };
        let value: Value =
            serde_json::from_str(&StructuredRenderer::default().render(&model).unwrap()).unwrap();
        assert_eq!(value["metadata"]["targetModel"], "gpt-4o");
        assert_eq!(value["metadata"]["totalFiles"], 1);
    }
}
