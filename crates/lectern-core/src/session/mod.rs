//! One open document: decoded lines, cursor, chapters, search, progress.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

use crate::config::{ConfigStore, DocumentConfig, display_name_of};
use crate::decode::decode_document;

mod progress;

pub use progress::ProgressSync;

#[cfg(test)]
mod tests;

/// One detected chapter heading.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Chapter {
    pub line: usize,
    pub name: String,
}

/// One search hit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SearchResult {
    pub line: usize,
    pub content: String,
}

/// The active chapter pattern failed to compile. The session stays usable;
/// only the chapter index is affected.
#[derive(Debug, thiserror::Error)]
#[error("invalid chapter pattern {pattern:?}: {source}")]
pub struct ChapterPatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// In-memory view over one decoded document.
///
/// `lines` is immutable after load. `current_line` is authoritative in
/// memory and may start out of range when resumed from a stale config;
/// navigation clamps it on the next move. `chapters` is replaced wholesale
/// on every rescan.
pub struct DocumentSession {
    source_path: PathBuf,
    display_name: String,
    lines: Vec<String>,
    encoding: &'static str,
    current_line: usize,
    chapters: Vec<Chapter>,
    chapter_pattern: Option<String>,
    bookmarks: Vec<usize>,
    progress_sync: ProgressSync,
}

impl DocumentSession {
    /// Builds a session over raw document bytes, resuming from `config`
    /// when one exists. Lines split on `\n` only; a trailing `\r` stays in
    /// the line content.
    pub fn open(
        source_path: &Path,
        bytes: &[u8],
        config: Option<&DocumentConfig>,
        save_quiet_ms: u64,
    ) -> Self {
        let decoded = decode_document(bytes);
        let lines: Vec<String> = decoded.text.split('\n').map(str::to_owned).collect();
        let current_line = config.map(|config| config.progress).unwrap_or(0);
        let chapter_pattern = config.and_then(|config| config.chapter_pattern.clone());
        let mut bookmarks = config
            .and_then(|config| config.bookmarks.clone())
            .unwrap_or_default();
        bookmarks.sort_unstable();
        bookmarks.dedup();

        debug!(
            "session: open {} lines={} encoding={} resume_line={}",
            source_path.display(),
            lines.len(),
            decoded.encoding,
            current_line
        );

        Self {
            source_path: source_path.to_path_buf(),
            display_name: display_name_of(source_path),
            lines,
            encoding: decoded.encoding,
            current_line,
            chapters: Vec::new(),
            chapter_pattern,
            bookmarks,
            progress_sync: ProgressSync::new(save_quiet_ms),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn bookmarks(&self) -> &[usize] {
        &self.bookmarks
    }

    /// Drives the debounce slot; the collaborator loop calls this with the
    /// current tick. `Some(Err(..))` reports a failed save.
    pub fn tick<S: ConfigStore>(
        &mut self,
        store: &mut S,
        now_ms: u64,
    ) -> Option<Result<(), S::Error>> {
        self.progress_sync
            .flush_if_due(store, &self.source_path, now_ms)
    }

    /// Cancels any pending debounced write and synchronously saves the
    /// final position. The session must not be used afterwards.
    pub fn close<S: ConfigStore>(&mut self, store: &mut S) -> Result<(), S::Error> {
        let line = self.current_line;
        let total_lines = self.lines.len();
        self.progress_sync
            .flush_now(store, &self.source_path, line, total_lines)
    }
}

include!("navigation.rs");
include!("search.rs");
include!("chapters.rs");
include!("bookmarks.rs");
