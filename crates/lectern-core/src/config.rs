//! Persisted per-document reading state and the storage seam.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading state persisted alongside one source document.
///
/// Field order is the wire order; the sidecar is written with these keys in
/// exactly this sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Absolute path of the source document. Identity key.
    pub source_path: PathBuf,
    /// Last known file name, display-only.
    pub display_name: String,
    /// Line index of the reading position. Not strictly bounded by
    /// `total_lines`; navigation clamps on use.
    pub progress: usize,
    /// Line count as of the last save.
    pub total_lines: usize,
    /// Refreshed on every save.
    pub last_read_time: DateTime<Utc>,
    /// Per-document override of the chapter-detection pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_pattern: Option<String>,
    /// Ascending, deduplicated bookmark lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<usize>>,
}

impl DocumentConfig {
    /// Default config for a document that has no sidecar yet.
    pub fn synthesized(source: &Path, last_read_time: DateTime<Utc>) -> Self {
        Self {
            source_path: source.to_path_buf(),
            display_name: display_name_of(source),
            progress: 0,
            total_lines: 0,
            last_read_time,
            chapter_pattern: None,
            bookmarks: None,
        }
    }
}

/// File name of `source` as shown to the reader.
pub fn display_name_of(source: &Path) -> String {
    source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Abstract sidecar persistence backend.
///
/// `load` fails soft: any read or parse problem is logged by the
/// implementation and collapses to `None`. Only write-side failures carry an
/// error, and callers report them without retrying.
pub trait ConfigStore {
    type Error: fmt::Display;

    /// Prior config for `source`, or `None` when absent or unreadable.
    fn load(&mut self, source: &Path) -> Option<DocumentConfig>;

    /// Overwrites the sidecar for `config.source_path`.
    fn save(&mut self, config: &DocumentConfig) -> Result<(), Self::Error>;

    /// Sole mutation path for the reading position: load or synthesize,
    /// set `progress`/`total_lines`, refresh `last_read_time`, save.
    fn update_progress(
        &mut self,
        source: &Path,
        progress: usize,
        total_lines: usize,
    ) -> Result<(), Self::Error>;

    /// Sets the per-document chapter pattern. `total_lines_hint` supplies
    /// the real line count when the caller has the document open, so a
    /// synthesized config is not created with a stale count of 0.
    fn update_chapter_pattern(
        &mut self,
        source: &Path,
        pattern: &str,
        total_lines_hint: Option<usize>,
    ) -> Result<(), Self::Error>;

    /// Replaces the persisted bookmark set for `source`.
    fn update_bookmarks(&mut self, source: &Path, bookmarks: &[usize]) -> Result<(), Self::Error>;

    /// Configs for every document in `dir`, most recently read first.
    /// An unreadable directory yields an empty list, not an error.
    fn list_directory(&mut self, dir: &Path) -> Vec<DocumentConfig>;
}
