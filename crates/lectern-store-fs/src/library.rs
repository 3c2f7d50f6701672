//! Library directory enumeration.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use lectern_core::config::{ConfigStore, DocumentConfig};
use log::warn;

use crate::sidecar::{DOCUMENT_SUFFIX, FsConfigStore};

/// Collects a config for every document in `dir`, most recently read first.
///
/// Only entries whose name ends with [`DOCUMENT_SUFFIX`] (exact case) count;
/// everything else is skipped without error. A document without a sidecar
/// gets a default config stamped with its modification time, so fresh files
/// sort among the recently-read ones.
pub(crate) fn scan(store: &mut FsConfigStore, dir: &Path) -> Vec<DocumentConfig> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            warn!("library: cannot read {}: {error}", dir.display());
            return Vec::new();
        }
    };

    let mut configs = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.ends_with(DOCUMENT_SUFFIX) {
            continue;
        }

        let config = store.load(&path).unwrap_or_else(|| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|metadata| metadata.modified().ok())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(Utc::now);
            DocumentConfig::synthesized(&path, modified)
        });
        configs.push(config);
    }

    configs.sort_by(|a, b| b.last_read_time.cmp(&a.last_read_time));
    configs
}
