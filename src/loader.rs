//! Content loading: binary detection, text reads and size truncation.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::ports::FileSource;
use crate::tree::{base_name, FlatEntry};

/// Files larger than this are treated as binary without being read.
pub const BINARY_SIZE_THRESHOLD: u64 = 1024 * 1024;

/// Character limit applied to text files unless full content is requested.
pub const CONTENT_CHAR_LIMIT: usize = 5_000;

/// Marker appended to content cut at [`CONTENT_CHAR_LIMIT`].
pub const CONTENT_TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

const BINARY_EXTENSIONS: [&str; 20] = [
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "webp", "mp3", "mp4", "mov", "pdf", "zip", "tar",
    "gz", "exe", "dll", "woff", "woff2", "eot", "ttf",
];

/// A file whose content has been resolved for the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedFile {
    /// Root-relative path.
    pub path: String,
    /// Text content, a binary placeholder, or a truncated prefix.
    pub content: String,
    /// Language tag.
    pub language: String,
    /// Whether `content` was cut at the character limit.
    pub truncated: bool,
    /// Whether `content` is a binary placeholder.
    pub binary: bool,
}

impl LoadedFile {
    /// Content length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Resolves flattened entries to [`LoadedFile`]s through a [`FileSource`].
#[derive(Clone, Copy)]
pub struct ContentLoader<'a> {
    source: &'a dyn FileSource,
    full_content: bool,
}

impl<'a> ContentLoader<'a> {
    /// Creates a loader reading from `source`.
    ///
    /// With `full_content` set, text is never cut at [`CONTENT_CHAR_LIMIT`].
    #[must_use]
    pub fn new(source: &'a dyn FileSource, full_content: bool) -> Self {
        Self { source, full_content }
    }

    /// Loads one file.
    ///
    /// Binary detection runs before any read: a known binary extension or a
    /// size over [`BINARY_SIZE_THRESHOLD`] yields a placeholder instead of
    /// content.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the file cannot be inspected or read. The
    /// caller is expected to skip the file and continue.
    pub async fn load(&self, entry: FlatEntry<'_>) -> Result<LoadedFile, LoadError> {
        if let Some(error) = &entry.node.error {
            return Err(LoadError::Snapshot(error.clone()));
        }

        let name = base_name(entry.path);
        let size = match entry.node.size {
            Some(size) => size,
            None => self.source.stat_file(entry.path)?.size,
        };

        if is_binary(name, size) {
            return Ok(LoadedFile {
                path: entry.path.to_string(),
                content: format!("[Binary file: {name}, {}]", format_size(size)),
                language: entry.node.language.clone(),
                truncated: false,
                binary: true,
            });
        }

        let text = self.source.read_file(entry.path).await?;
        let (content, truncated) = if self.full_content {
            (text, false)
        } else {
            truncate_content(text)
        };

        Ok(LoadedFile {
            path: entry.path.to_string(),
            content,
            language: entry.node.language.clone(),
            truncated,
            binary: false,
        })
    }
}

/// Returns `true` if a file should be represented by a placeholder.
#[must_use]
pub fn is_binary(name: &str, size: u64) -> bool {
    let has_binary_extension = name.rsplit_once('.').is_some_and(|(_, ext)| {
        BINARY_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
    });
    has_binary_extension || size > BINARY_SIZE_THRESHOLD
}

/// Formats a byte count as `N bytes`, `x.y KB`, `x.y MB` or `x.y GB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match bytes {
        b if b < KB => format!("{b} bytes"),
        b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        b if b < GB => format!("{:.1} MB", b as f64 / MB as f64),
        b => format!("{:.1} GB", b as f64 / GB as f64),
    }
}

fn truncate_content(text: String) -> (String, bool) {
    match text.char_indices().nth(CONTENT_CHAR_LIMIT) {
        Some((cut, _)) => {
            let mut content = text;
            content.truncate(cut);
            content.push_str(CONTENT_TRUNCATION_MARKER);
            (content, true)
        }
        None => (text, false),
    }
}
