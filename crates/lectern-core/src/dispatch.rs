//! The operation surface collaborators drive.
//!
//! Requests arrive as an operation name plus loosely-typed JSON arguments
//! and resolve through a handler map at a single dispatch point. Every
//! handler runs to completion before the next request is looked at; the
//! collaborator's loop is the only driver.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::config::{ConfigStore, DocumentConfig};
use crate::session::{Chapter, DocumentSession, SearchResult};

/// Abstract reader of raw document bytes.
pub trait DocumentSource {
    type Error: fmt::Display;

    fn read_bytes(&mut self, path: &Path) -> Result<Vec<u8>, Self::Error>;
}

/// Chapter headings like `第12章 ...` / `第三节 ...`, the common convention
/// in the plain-text novels this reader targets.
pub const DEFAULT_CHAPTER_PATTERN: &str = "^第[0-9一二三四五六七八九十百千]+[章节].*";
pub const DEFAULT_SCROLL_STEP: usize = 1;
pub const DEFAULT_SAVE_QUIET_MS: u64 = 1_000;

const NO_DOCUMENT: &str = "no document is open";

/// Collaborator-owned knobs, validated before they reach the engine.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub default_chapter_pattern: String,
    pub scroll_step: usize,
    pub save_quiet_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_chapter_pattern: DEFAULT_CHAPTER_PATTERN.to_owned(),
            scroll_step: DEFAULT_SCROLL_STEP,
            save_quiet_ms: DEFAULT_SAVE_QUIET_MS,
        }
    }
}

/// Structured result a collaborator renders. The engine never renders.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Payload {
    /// Snapshot of a freshly opened document.
    #[serde(rename_all = "camelCase")]
    Document {
        source_path: PathBuf,
        display_name: String,
        total_lines: usize,
        current_line: usize,
        encoding: &'static str,
        lines: Vec<String>,
        chapters: Vec<Chapter>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern_error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Position { current_line: usize },
    Chapters { chapters: Vec<Chapter> },
    SearchResults {
        term: String,
        count: usize,
        results: Vec<SearchResult>,
    },
    Library { configs: Vec<DocumentConfig> },
    Bookmarks { bookmarks: Vec<usize> },
    /// The operation succeeded with nothing further to render.
    Ack,
    Closed,
    Error { message: String },
}

/// Session lifecycle and dispatch over one injected store and byte source.
pub struct Engine<S, D> {
    store: S,
    source: D,
    settings: EngineSettings,
    session: Option<DocumentSession>,
}

type Handler<S, D> = fn(&mut Engine<S, D>, &Value, u64) -> Payload;

impl<S: ConfigStore, D: DocumentSource> Engine<S, D> {
    pub fn new(store: S, source: D, settings: EngineSettings) -> Self {
        Self {
            store,
            source,
            settings,
            session: None,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&DocumentSession> {
        self.session.as_ref()
    }

    pub fn has_open_document(&self) -> bool {
        self.session.is_some()
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The single dispatch point: resolves `op` through the handler map and
    /// runs it to completion.
    pub fn dispatch(&mut self, op: &str, args: &Value, now_ms: u64) -> Payload {
        match Self::handler_for(op) {
            Some(handler) => handler(self, args, now_ms),
            None => Payload::Error {
                message: format!("unknown operation {op:?}"),
            },
        }
    }

    /// Handler map keyed by operation name.
    fn handler_for(op: &str) -> Option<Handler<S, D>> {
        let table: &[(&str, Handler<S, D>)] = &[
            ("openDocument", Self::op_open_document),
            ("scrollUp", Self::op_scroll_up),
            ("scrollDown", Self::op_scroll_down),
            ("jumpToLine", Self::op_jump_to_line),
            ("search", Self::op_search),
            ("requestChapters", Self::op_request_chapters),
            ("reportProgress", Self::op_report_progress),
            ("reconfigureChapterPattern", Self::op_reconfigure_chapter_pattern),
            ("addBookmark", Self::op_add_bookmark),
            ("removeBookmark", Self::op_remove_bookmark),
            ("listBookmarks", Self::op_list_bookmarks),
            ("closeDocument", Self::op_close_document),
            ("listLibrary", Self::op_list_library),
        ];
        table
            .iter()
            .find(|(name, _)| *name == op)
            .map(|(_, handler)| *handler)
    }

    /// Drives pending debounced persistence. `Some` carries a failure
    /// notice; successful flushes are silent.
    pub fn tick(&mut self, now_ms: u64) -> Option<Payload> {
        let session = self.session.as_mut()?;
        match session.tick(&mut self.store, now_ms)? {
            Ok(()) => None,
            Err(error) => Some(Payload::Error {
                message: format!("cannot save progress: {error}"),
            }),
        }
    }

    /// Opens `path`, closing (and flushing) any previous session first.
    pub fn open_document(&mut self, path: &Path) -> Payload {
        if let Some(mut previous) = self.session.take() {
            if let Err(error) = previous.close(&mut self.store) {
                warn!(
                    "engine: cannot save progress for {}: {error}",
                    previous.source_path().display()
                );
            }
        }

        let bytes = match self.source.read_bytes(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                return Payload::Error {
                    message: format!("cannot open {}: {error}", path.display()),
                };
            }
        };

        let config = self.store.load(path);
        let mut session = DocumentSession::open(
            path,
            &bytes,
            config.as_ref(),
            self.settings.save_quiet_ms,
        );
        let pattern_error = session
            .rescan_chapters(&self.settings.default_chapter_pattern)
            .err()
            .map(|error| error.to_string());

        info!(
            "engine: opened {} lines={} chapters={}",
            path.display(),
            session.total_lines(),
            session.chapters().len()
        );

        let payload = Payload::Document {
            source_path: session.source_path().to_path_buf(),
            display_name: session.display_name().to_owned(),
            total_lines: session.total_lines(),
            current_line: session.current_line(),
            encoding: session.encoding(),
            lines: session.lines().to_vec(),
            chapters: session.chapters().to_vec(),
            pattern_error,
        };
        self.session = Some(session);
        payload
    }

    pub fn scroll_up(&mut self) -> Payload {
        let step = self.settings.scroll_step;
        match self.session.as_mut() {
            Some(session) => Payload::Position {
                current_line: session.scroll_up(step),
            },
            None => no_document(),
        }
    }

    pub fn scroll_down(&mut self) -> Payload {
        let step = self.settings.scroll_step;
        match self.session.as_mut() {
            Some(session) => Payload::Position {
                current_line: session.scroll_down(step),
            },
            None => no_document(),
        }
    }

    pub fn jump_to_line(&mut self, line: usize) -> Payload {
        match self.session.as_mut() {
            Some(session) => Payload::Position {
                current_line: session.jump_to_line(line),
            },
            None => no_document(),
        }
    }

    pub fn search(&mut self, term: &str) -> Payload {
        match self.session.as_ref() {
            Some(session) => {
                let results = session.search(term);
                Payload::SearchResults {
                    term: term.to_owned(),
                    count: results.len(),
                    results,
                }
            }
            None => no_document(),
        }
    }

    pub fn request_chapters(&mut self) -> Payload {
        match self.session.as_ref() {
            Some(session) => Payload::Chapters {
                chapters: session.chapters().to_vec(),
            },
            None => no_document(),
        }
    }

    pub fn report_progress(&mut self, line: usize, now_ms: u64) -> Payload {
        match self.session.as_mut() {
            Some(session) => {
                session.report_progress(line, now_ms);
                Payload::Position {
                    current_line: session.current_line(),
                }
            }
            None => no_document(),
        }
    }

    /// Persists a new chapter pattern for `path` and, when that document is
    /// open, rescans with it.
    pub fn reconfigure_chapter_pattern(&mut self, path: &Path, pattern: &str) -> Payload {
        let total_lines_hint = self
            .session
            .as_ref()
            .filter(|session| session.source_path() == path)
            .map(|session| session.total_lines());

        if let Err(error) = self
            .store
            .update_chapter_pattern(path, pattern, total_lines_hint)
        {
            return Payload::Error {
                message: format!("cannot save chapter pattern: {error}"),
            };
        }

        let default_pattern = self.settings.default_chapter_pattern.clone();
        match self
            .session
            .as_mut()
            .filter(|session| session.source_path() == path)
        {
            Some(session) => match session.set_chapter_pattern(pattern, &default_pattern) {
                Ok(_) => Payload::Chapters {
                    chapters: session.chapters().to_vec(),
                },
                Err(error) => Payload::Error {
                    message: error.to_string(),
                },
            },
            None => Payload::Ack,
        }
    }

    pub fn add_bookmark(&mut self, line: usize) -> Payload {
        let Some(session) = self.session.as_mut() else {
            return no_document();
        };
        if session.add_bookmark(line) {
            if let Err(error) = self
                .store
                .update_bookmarks(session.source_path(), session.bookmarks())
            {
                return Payload::Error {
                    message: format!("cannot save bookmarks: {error}"),
                };
            }
        }
        Payload::Bookmarks {
            bookmarks: session.bookmarks().to_vec(),
        }
    }

    pub fn remove_bookmark(&mut self, line: usize) -> Payload {
        let Some(session) = self.session.as_mut() else {
            return no_document();
        };
        if session.remove_bookmark(line) {
            if let Err(error) = self
                .store
                .update_bookmarks(session.source_path(), session.bookmarks())
            {
                return Payload::Error {
                    message: format!("cannot save bookmarks: {error}"),
                };
            }
        }
        Payload::Bookmarks {
            bookmarks: session.bookmarks().to_vec(),
        }
    }

    pub fn list_bookmarks(&mut self) -> Payload {
        match self.session.as_ref() {
            Some(session) => Payload::Bookmarks {
                bookmarks: session.bookmarks().to_vec(),
            },
            None => no_document(),
        }
    }

    /// Closes the open session with a final synchronous flush.
    pub fn close_document(&mut self) -> Payload {
        match self.session.take() {
            Some(mut session) => {
                info!(
                    "engine: closing {} at line {}",
                    session.source_path().display(),
                    session.current_line()
                );
                if let Err(error) = session.close(&mut self.store) {
                    return Payload::Error {
                        message: format!("cannot save progress: {error}"),
                    };
                }
                Payload::Closed
            }
            None => no_document(),
        }
    }

    pub fn list_library(&mut self, dir: &Path) -> Payload {
        Payload::Library {
            configs: self.store.list_directory(dir),
        }
    }

    fn op_open_document(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match required_str(args, "path", "openDocument") {
            Ok(path) => self.open_document(Path::new(path)),
            Err(payload) => payload,
        }
    }

    fn op_scroll_up(&mut self, _args: &Value, _now_ms: u64) -> Payload {
        self.scroll_up()
    }

    fn op_scroll_down(&mut self, _args: &Value, _now_ms: u64) -> Payload {
        self.scroll_down()
    }

    fn op_jump_to_line(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match lenient_line(args, "jumpToLine") {
            Ok(Some(line)) => self.jump_to_line(line),
            // A negative index is ignored like any other out-of-range jump.
            Ok(None) => match self.session.as_ref() {
                Some(session) => Payload::Position {
                    current_line: session.current_line(),
                },
                None => no_document(),
            },
            Err(payload) => payload,
        }
    }

    fn op_search(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match required_str(args, "term", "search") {
            Ok(term) => self.search(term),
            Err(payload) => payload,
        }
    }

    fn op_request_chapters(&mut self, _args: &Value, _now_ms: u64) -> Payload {
        self.request_chapters()
    }

    fn op_report_progress(&mut self, args: &Value, now_ms: u64) -> Payload {
        match required_line(args, "reportProgress") {
            Ok(line) => self.report_progress(line, now_ms),
            Err(payload) => payload,
        }
    }

    fn op_reconfigure_chapter_pattern(&mut self, args: &Value, _now_ms: u64) -> Payload {
        let path = match required_str(args, "path", "reconfigureChapterPattern") {
            Ok(path) => path,
            Err(payload) => return payload,
        };
        let pattern = match required_str(args, "pattern", "reconfigureChapterPattern") {
            Ok(pattern) => pattern,
            Err(payload) => return payload,
        };
        self.reconfigure_chapter_pattern(Path::new(path), pattern)
    }

    fn op_add_bookmark(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match lenient_line(args, "addBookmark") {
            Ok(Some(line)) => self.add_bookmark(line),
            Ok(None) => self.list_bookmarks(),
            Err(payload) => payload,
        }
    }

    fn op_remove_bookmark(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match lenient_line(args, "removeBookmark") {
            Ok(Some(line)) => self.remove_bookmark(line),
            Ok(None) => self.list_bookmarks(),
            Err(payload) => payload,
        }
    }

    fn op_list_bookmarks(&mut self, _args: &Value, _now_ms: u64) -> Payload {
        self.list_bookmarks()
    }

    fn op_close_document(&mut self, _args: &Value, _now_ms: u64) -> Payload {
        self.close_document()
    }

    fn op_list_library(&mut self, args: &Value, _now_ms: u64) -> Payload {
        match required_str(args, "dir", "listLibrary") {
            Ok(dir) => self.list_library(Path::new(dir)),
            Err(payload) => payload,
        }
    }
}

fn no_document() -> Payload {
    Payload::Error {
        message: NO_DOCUMENT.to_owned(),
    }
}

fn required_str<'a>(args: &'a Value, key: &str, op: &str) -> Result<&'a str, Payload> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| Payload::Error {
        message: format!("{op} requires a string {key:?}"),
    })
}

fn required_line(args: &Value, op: &str) -> Result<usize, Payload> {
    args.get("line")
        .and_then(Value::as_u64)
        .map(|line| line as usize)
        .ok_or_else(|| Payload::Error {
            message: format!("{op} requires a non-negative integer \"line\""),
        })
}

/// `Ok(None)` when `line` is present but negative: those requests are
/// silently ignored rather than rejected, because stale payloads from the
/// presentation layer are expected.
fn lenient_line(args: &Value, op: &str) -> Result<Option<usize>, Payload> {
    let Some(value) = args.get("line") else {
        return Err(Payload::Error {
            message: format!("{op} requires an integer \"line\""),
        });
    };
    match value.as_u64() {
        Some(line) => Ok(Some(line as usize)),
        None if value.is_i64() => Ok(None),
        None => Err(Payload::Error {
            message: format!("{op} requires an integer \"line\""),
        }),
    }
}
