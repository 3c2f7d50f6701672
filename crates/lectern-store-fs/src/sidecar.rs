//! JSON sidecar persistence, one file per document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use lectern_core::config::{ConfigStore, DocumentConfig};
use log::{debug, warn};

/// Suffix a file must carry to count as a library document. Case-sensitive.
pub const DOCUMENT_SUFFIX: &str = ".txt";

/// Extension of the per-document sidecar file.
pub const SIDECAR_EXTENSION: &str = "lectern.json";

/// Sidecar path for `source`: same directory, same base name, fixed
/// extension. Documents with the same base name but different extensions in
/// one directory share a sidecar; one config per logical book.
pub fn derive_sidecar_path(source: &Path) -> PathBuf {
    source.with_extension(SIDECAR_EXTENSION)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot write sidecar {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode sidecar {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// [`ConfigStore`] over JSON sidecar files.
///
/// Reads fail soft: a missing or corrupt sidecar is treated as absent.
/// Writes are plain read-modify-write with no locking; the single-threaded
/// engine serializes them, and a concurrent external writer loses silently.
#[derive(Debug, Default)]
pub struct FsConfigStore;

impl FsConfigStore {
    pub fn new() -> Self {
        Self
    }

    fn load_or_synthesize(&mut self, source: &Path) -> DocumentConfig {
        self.load(source)
            .unwrap_or_else(|| DocumentConfig::synthesized(source, Utc::now()))
    }
}

impl ConfigStore for FsConfigStore {
    type Error = StoreError;

    fn load(&mut self, source: &Path) -> Option<DocumentConfig> {
        let path = derive_sidecar_path(source);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != io::ErrorKind::NotFound {
                    warn!("store: cannot read sidecar {}: {error}", path.display());
                }
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(error) => {
                warn!("store: sidecar {} is corrupt, ignoring: {error}", path.display());
                None
            }
        }
    }

    fn save(&mut self, config: &DocumentConfig) -> Result<(), StoreError> {
        let path = derive_sidecar_path(&config.source_path);
        let body = serde_json::to_string_pretty(config).map_err(|source| StoreError::Encode {
            path: path.clone(),
            source,
        })?;
        debug!("store: writing {}", path.display());
        fs::write(&path, body).map_err(|source| StoreError::Write { path, source })
    }

    fn update_progress(
        &mut self,
        source: &Path,
        progress: usize,
        total_lines: usize,
    ) -> Result<(), StoreError> {
        let mut config = self.load_or_synthesize(source);
        config.progress = progress;
        config.total_lines = total_lines;
        config.last_read_time = Utc::now();
        self.save(&config)
    }

    fn update_chapter_pattern(
        &mut self,
        source: &Path,
        pattern: &str,
        total_lines_hint: Option<usize>,
    ) -> Result<(), StoreError> {
        let mut config = self.load(source).unwrap_or_else(|| {
            let mut fresh = DocumentConfig::synthesized(source, Utc::now());
            fresh.total_lines = total_lines_hint.unwrap_or(0);
            fresh
        });
        config.chapter_pattern = Some(pattern.to_owned());
        config.last_read_time = Utc::now();
        self.save(&config)
    }

    fn update_bookmarks(&mut self, source: &Path, bookmarks: &[usize]) -> Result<(), StoreError> {
        let mut sorted = bookmarks.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut config = self.load_or_synthesize(source);
        config.bookmarks = if sorted.is_empty() { None } else { Some(sorted) };
        config.last_read_time = Utc::now();
        self.save(&config)
    }

    fn list_directory(&mut self, dir: &Path) -> Vec<DocumentConfig> {
        crate::library::scan(self, dir)
    }
}
