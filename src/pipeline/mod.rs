//! Orchestration of one context generation request.
//!
//! [`ContextPipeline::generate`] walks the state machine
//! `Validating → Counting → Loading → Analyzing → Serializing → Done`, or
//! stops in `Failed`. All mutable state (progress, the load accumulator,
//! warnings) is owned by the call, so overlapping requests cannot mix
//! results and an abandoned request's late loads go nowhere.

pub mod progress;

use chrono::SecondsFormat;
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::architecture;
use crate::deps::{DependencyExtractor, DependencyRecord};
use crate::error::{LoadError, PipelineError};
use crate::loader::{ContentLoader, LoadedFile};
use crate::ports::{Clock, FileSource};
use crate::prompt::{context_window, DEFAULT_TARGET_MODEL};
use crate::render::{preview_text, ContextModel, Metadata, OutputFormat};
use crate::tokens;
use crate::tree::{flatten, reachable_size, ExclusionFilter, FileNode};

pub use progress::{PipelineState, ProgressObserver};
use progress::RequestProgress;

/// Token budget used when the caller does not pick one.
pub const DEFAULT_MAX_TOKENS: usize = 128_000;

/// Per-request generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Output format name; resolved when serialization starts.
    pub format: String,
    /// Requested maximum tokens before the safety margin.
    pub max_tokens: usize,
    /// Model the artifact is prepared for.
    pub target_model: String,
    /// Skip the per-file character limit.
    pub full_content: bool,
    /// Include the metadata section.
    pub include_metadata: bool,
    /// Emit compact JSON for the structured format.
    pub minify: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json.as_str().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            full_content: false,
            include_metadata: true,
            minify: false,
        }
    }
}

/// Summary of one file included in an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Root-relative path.
    pub path: String,
    /// Language tag.
    pub language: String,
    /// Loaded content length in characters.
    pub size: usize,
    /// First 500 characters of the loaded content, with `...` when cut.
    pub content: String,
    /// Whether the content was cut at the per-file limit.
    pub truncated: bool,
    /// Whether the content is a binary placeholder.
    pub binary: bool,
}

impl From<&LoadedFile> for FileSummary {
    fn from(file: &LoadedFile) -> Self {
        Self {
            path: file.path.clone(),
            language: file.language.clone(),
            size: file.char_len(),
            content: preview_text(&file.content),
            truncated: file.truncated,
            binary: file.binary,
        }
    }
}

/// A file that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadWarning {
    /// Root-relative path of the skipped file.
    pub path: String,
    /// Why it was skipped.
    pub reason: String,
}

/// The finished product of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextArtifact {
    /// Identifier of the request that produced this artifact.
    pub request_id: Uuid,
    /// Included files in traversal order.
    pub files: Vec<FileSummary>,
    /// Metadata, when requested.
    pub metadata: Option<Metadata>,
    /// Dependency graph over the included files.
    pub dependencies: DependencyRecord,
    /// Architecture overview text.
    pub architecture: String,
    /// Rendered output.
    pub body: String,
    /// Format of `body`.
    pub format: OutputFormat,
    /// Token estimate of `body`.
    pub estimated_tokens: usize,
    /// Files skipped while loading.
    pub warnings: Vec<LoadWarning>,
    /// Whether `body` was cut to fit the budget.
    pub degraded: bool,
    /// Suggested download name, `codebase-context-<model>-<date>.<ext>`.
    pub suggested_file_name: String,
}

/// Pre-generation size estimate for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeEstimate {
    /// Files the flattener would visit.
    pub files: usize,
    /// Sum of their known sizes.
    pub total_size: u64,
    /// `ceil(total_size / 4)`.
    pub estimated_tokens: usize,
    /// Context window of the target model.
    pub context_window: usize,
}

impl SizeEstimate {
    /// Returns `true` if the estimate exceeds the context window.
    #[must_use]
    pub fn over_limit(&self) -> bool {
        self.estimated_tokens > self.context_window
    }
}

/// Estimates the size of a tree before loading any content.
#[must_use]
pub fn estimate_tree(root: &FileNode, filter: &ExclusionFilter, model: &str) -> SizeEstimate {
    let (files, total_size) = reachable_size(root, filter);
    let estimated_tokens = usize::try_from(total_size.div_ceil(4)).unwrap_or(usize::MAX);
    SizeEstimate { files, total_size, estimated_tokens, context_window: context_window(model) }
}

/// Runs generation requests against a [`FileSource`].
pub struct ContextPipeline<'a> {
    source: &'a dyn FileSource,
    clock: &'a dyn Clock,
    observer: Option<&'a dyn ProgressObserver>,
    extractor: DependencyExtractor,
}

impl<'a> ContextPipeline<'a> {
    /// Creates a pipeline reading content from `source` and stamping with `clock`.
    #[must_use]
    pub fn new(source: &'a dyn FileSource, clock: &'a dyn Clock) -> Self {
        Self { source, clock, observer: None, extractor: DependencyExtractor::default() }
    }

    /// Reports state transitions of every request to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replaces the dependency extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: DependencyExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Generates an artifact for the files under `root`.
    ///
    /// Per-file failures are recorded as warnings on the artifact and never
    /// fail the request.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] when the tree has no files or none could be loaded.
    /// - [`PipelineError::Format`] when `options.format` is unknown.
    /// - [`PipelineError::BudgetExceeded`] when the rendered body is over 90% of
    ///   `options.max_tokens`; the error carries a truncated artifact that fits.
    /// - [`PipelineError::Render`] when structured rendering fails.
    pub async fn generate(
        &self,
        root: &FileNode,
        filter: &ExclusionFilter,
        options: &GenerateOptions,
    ) -> Result<ContextArtifact, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("generate", request_id = %request_id, format = %options.format);
        self.run(request_id, root, filter, options).instrument(span).await
    }

    async fn run(
        &self,
        request_id: Uuid,
        root: &FileNode,
        filter: &ExclusionFilter,
        options: &GenerateOptions,
    ) -> Result<ContextArtifact, PipelineError> {
        let mut progress = RequestProgress::new(request_id, self.observer);

        progress.enter(PipelineState::Validating);
        if !root.has_files() {
            return Err(progress.fail(PipelineError::Validation(
                "No valid files found in the selected directory".to_string(),
            )));
        }

        progress.enter(PipelineState::Counting);
        let entries = flatten(root, filter);
        let total = entries.len();

        progress.enter(PipelineState::Loading { current: 0, total });
        let loader = ContentLoader::new(self.source, options.full_content);
        let mut slots: Vec<Option<Result<LoadedFile, LoadError>>> = vec![None; total];
        let mut pending: FuturesUnordered<_> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| async move { (index, loader.load(*entry).await) })
            .collect();
        while let Some((index, result)) = pending.next().await {
            slots[index] = Some(result);
            progress.advance();
        }
        drop(pending);

        let mut files = Vec::with_capacity(total);
        let mut warnings = Vec::new();
        for (entry, slot) in entries.iter().zip(slots) {
            match slot {
                Some(Ok(file)) => files.push(file),
                Some(Err(err)) => {
                    warn!(path = %entry.path, error = %err, "skipping file");
                    warnings.push(LoadWarning { path: entry.path.to_string(), reason: err.to_string() });
                }
                None => {}
            }
        }
        info!(loaded = files.len(), skipped = warnings.len(), "content loaded");

        if files.is_empty() {
            return Err(progress.fail(PipelineError::Validation(
                "No readable files found in the selected directory".to_string(),
            )));
        }

        progress.enter(PipelineState::Analyzing);
        let dependencies = self.extractor.extract(&files);
        let architecture = architecture::summarize(&files, &dependencies);
        let now = self.clock.now();
        let metadata = options.include_metadata.then(|| Metadata {
            total_files: files.len(),
            total_size: files.iter().map(LoadedFile::char_len).sum(),
            languages: distinct_languages(&files),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            target_model: options.target_model.clone(),
        });

        progress.enter(PipelineState::Serializing);
        let format = match options.format.parse::<OutputFormat>() {
            Ok(format) => format,
            Err(err) => return Err(progress.fail(err)),
        };
        let model = ContextModel {
            files: &files,
            metadata: metadata.as_ref(),
            dependencies: Some(&dependencies),
            architecture: Some(&architecture),
        };
        let body = match format.renderer(options.minify).render(&model) {
            Ok(body) => body,
            Err(err) => return Err(progress.fail(PipelineError::Render(err))),
        };

        let estimated_tokens = tokens::estimate(&body);
        let budget = tokens::effective_budget(options.max_tokens);
        let mut artifact = ContextArtifact {
            request_id,
            files: files.iter().map(FileSummary::from).collect(),
            metadata,
            dependencies,
            architecture,
            body,
            format,
            estimated_tokens,
            warnings,
            degraded: false,
            suggested_file_name: format!(
                "codebase-context-{}-{}.{}",
                options.target_model,
                now.format("%Y-%m-%d"),
                format.extension()
            ),
        };

        if estimated_tokens > budget {
            artifact.body = tokens::truncate_to_limit(&artifact.body, budget);
            artifact.estimated_tokens = tokens::estimate(&artifact.body);
            artifact.degraded = true;
            return Err(progress.fail(PipelineError::BudgetExceeded {
                estimated: estimated_tokens,
                budget,
                partial: Box::new(artifact),
            }));
        }

        progress.enter(PipelineState::Done);
        info!(tokens = estimated_tokens, budget, "context generated");
        Ok(artifact)
    }
}

fn distinct_languages(files: &[LoadedFile]) -> Vec<String> {
    let languages: IndexSet<&str> = files.iter().map(|file| file.language.as_str()).collect();
    languages.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSource;
    use crate::error::ErrorKind;
    use crate::ports::FixedClock;
    use crate::tree::ExclusionConfig;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn clock() -> FixedClock {
        FixedClock(chrono::Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap())
    }

    fn filter() -> ExclusionFilter {
        ExclusionFilter::new(&ExclusionConfig::default()).unwrap()
    }

    fn tree(paths: &[&str]) -> FileNode {
        let mut root = FileNode::root();
        for path in paths {
            root.insert_file(path);
        }
        root
    }

    #[derive(Default)]
    struct Log(Mutex<Vec<PipelineState>>);

    impl ProgressObserver for Log {
        fn on_transition(&self, _request_id: Uuid, state: PipelineState) {
            self.0.lock().unwrap().push(state);
        }
    }

    #[tokio::test]
    async fn walks_every_state_in_order() {
        let source = MemoryFileSource::new().with_file("a.ts", "x=1").with_file("b.ts", "y=2");
        let clock = clock();
        let log = Log::default();
        let pipeline = ContextPipeline::new(&source, &clock).with_observer(&log);

        let artifact = pipeline
            .generate(&tree(&["a.ts", "b.ts"]), &filter(), &GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(artifact.suggested_file_name, "codebase-context-gpt-4o-2024-03-09.json");
        assert_eq!(artifact.metadata.unwrap().timestamp, "2024-03-09T12:00:00.000Z");
        let states = log.0.lock().unwrap().clone();
        assert_eq!(
            states,
            vec![
                PipelineState::Validating,
                PipelineState::Counting,
                PipelineState::Loading { current: 0, total: 2 },
                PipelineState::Loading { current: 1, total: 2 },
                PipelineState::Loading { current: 2, total: 2 },
                PipelineState::Analyzing,
                PipelineState::Serializing,
                PipelineState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn unknown_format_fails_while_serializing() {
        let source = MemoryFileSource::new().with_file("a.ts", "x=1");
        let clock = clock();
        let log = Log::default();
        let options = GenerateOptions { format: "xml".into(), ..GenerateOptions::default() };
        let err = ContextPipeline::new(&source, &clock)
            .with_observer(&log)
            .generate(&tree(&["a.ts"]), &filter(), &options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let states = log.0.lock().unwrap().clone();
        assert_eq!(states[states.len() - 2], PipelineState::Serializing);
        assert_eq!(states[states.len() - 1], PipelineState::Failed { kind: ErrorKind::Format });
    }

    #[tokio::test]
    async fn all_reads_failing_is_a_validation_error() {
        let source = MemoryFileSource::new().with_unreadable("a.ts", "gone");
        let clock = clock();
        let err = ContextPipeline::new(&source, &clock)
            .generate(&tree(&["a.ts"]), &filter(), &GenerateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No readable files found in the selected directory");
    }

    #[tokio::test]
    async fn metadata_can_be_left_out() {
        let source = MemoryFileSource::new().with_file("a.ts", "x=1");
        let clock = clock();
        let options = GenerateOptions { include_metadata: false, ..GenerateOptions::default() };
        let artifact = ContextPipeline::new(&source, &clock)
            .generate(&tree(&["a.ts"]), &filter(), &options)
            .await
            .unwrap();
        assert!(artifact.metadata.is_none());
        let body: serde_json::Value = serde_json::from_str(&artifact.body).unwrap();
        assert_eq!(body["metadata"], serde_json::json!({}));
    }

    #[test]
    fn estimate_tree_uses_four_chars_per_token() {
        let mut root = FileNode::root();
        root.insert_file("a.ts").size = Some(10);
        root.insert_file("node_modules/x.js").size = Some(1_000);
        let estimate = estimate_tree(&root, &filter(), "gpt-4o");
        assert_eq!(estimate.files, 1);
        assert_eq!(estimate.total_size, 10);
        assert_eq!(estimate.estimated_tokens, 3);
        assert!(!estimate.over_limit());
    }
}
