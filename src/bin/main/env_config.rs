//! Environment-driven collaborator configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use lectern_core::dispatch::{
    DEFAULT_CHAPTER_PATTERN, DEFAULT_SAVE_QUIET_MS, DEFAULT_SCROLL_STEP, EngineSettings,
};
use log::warn;

pub(crate) fn engine_settings_from_env() -> EngineSettings {
    EngineSettings {
        default_chapter_pattern: env::var("LECTERN_CHAPTER_PATTERN")
            .unwrap_or_else(|_| DEFAULT_CHAPTER_PATTERN.to_owned()),
        scroll_step: parsed_var("LECTERN_SCROLL_STEP", DEFAULT_SCROLL_STEP).max(1),
        save_quiet_ms: parsed_var("LECTERN_SAVE_DEBOUNCE_MS", DEFAULT_SAVE_QUIET_MS),
    }
}

pub(crate) fn library_dir_from_env() -> PathBuf {
    env::var("LECTERN_LIBRARY_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn parsed_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("config: ignoring unparsable {name}={raw:?}");
                default
            }
        },
        Err(_) => default,
    }
}
