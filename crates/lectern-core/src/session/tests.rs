use std::path::{Path, PathBuf};

use chrono::Utc;

use super::*;
use crate::config::{ConfigStore, DocumentConfig};

const QUIET_MS: u64 = 300;
const SOURCE: &str = "/books/sample.txt";

#[derive(Default)]
struct RecordingStore {
    progress_writes: Vec<(PathBuf, usize, usize)>,
    fail_saves: bool,
}

impl ConfigStore for RecordingStore {
    type Error = String;

    fn load(&mut self, _source: &Path) -> Option<DocumentConfig> {
        None
    }

    fn save(&mut self, _config: &DocumentConfig) -> Result<(), String> {
        Ok(())
    }

    fn update_progress(
        &mut self,
        source: &Path,
        progress: usize,
        total_lines: usize,
    ) -> Result<(), String> {
        if self.fail_saves {
            return Err("disk full".to_owned());
        }
        self.progress_writes
            .push((source.to_path_buf(), progress, total_lines));
        Ok(())
    }

    fn update_chapter_pattern(
        &mut self,
        _source: &Path,
        _pattern: &str,
        _total_lines_hint: Option<usize>,
    ) -> Result<(), String> {
        Ok(())
    }

    fn update_bookmarks(&mut self, _source: &Path, _bookmarks: &[usize]) -> Result<(), String> {
        Ok(())
    }

    fn list_directory(&mut self, _dir: &Path) -> Vec<DocumentConfig> {
        Vec::new()
    }
}

fn open_lines(lines: &[&str]) -> DocumentSession {
    let text = lines.join("\n");
    DocumentSession::open(Path::new(SOURCE), text.as_bytes(), None, QUIET_MS)
}

fn resumed_config(progress: usize) -> DocumentConfig {
    let mut config = DocumentConfig::synthesized(Path::new(SOURCE), Utc::now());
    config.progress = progress;
    config
}

#[test]
fn lines_split_on_line_feed_keeping_carriage_returns() {
    let session = DocumentSession::open(
        Path::new(SOURCE),
        b"first\r\nsecond\nthird",
        None,
        QUIET_MS,
    );
    assert_eq!(session.total_lines(), 3);
    assert_eq!(session.lines()[0], "first\r");
    assert_eq!(session.lines()[1], "second");
    assert_eq!(session.lines()[2], "third");
}

#[test]
fn chapter_scan_matches_trimmed_heading_lines() {
    let mut session = open_lines(&["第一章 标题", "正文", "第二章 标题2"]);
    let found = session
        .rescan_chapters("^第[0-9一二三四五六七八九十百千]+[章节]\\s+.+$")
        .unwrap();

    assert_eq!(found, 2);
    assert_eq!(
        session.chapters(),
        &[
            Chapter {
                line: 0,
                name: "第一章 标题".to_owned()
            },
            Chapter {
                line: 2,
                name: "第二章 标题2".to_owned()
            },
        ]
    );
}

#[test]
fn per_document_pattern_overrides_the_default() {
    let config = {
        let mut config = resumed_config(0);
        config.chapter_pattern = Some("^CHAPTER .+$".to_owned());
        config
    };
    let mut session = DocumentSession::open(
        Path::new(SOURCE),
        b"CHAPTER ONE\nbody\nCHAPTER TWO",
        Some(&config),
        QUIET_MS,
    );

    session.rescan_chapters("^第.+$").unwrap();
    assert_eq!(session.chapters().len(), 2);
    assert_eq!(session.chapters()[1].line, 2);
}

#[test]
fn invalid_pattern_clears_chapters_and_keeps_the_session_usable() {
    let mut session = open_lines(&["第一章 标题", "abc"]);
    session.rescan_chapters("^第.+$").unwrap();
    assert_eq!(session.chapters().len(), 1);

    let error = session.set_chapter_pattern("(", "^第.+$").unwrap_err();
    assert!(error.to_string().contains("invalid chapter pattern"));
    assert!(session.chapters().is_empty());

    // Reading and search are unaffected.
    assert_eq!(session.search("abc").len(), 1);
    assert_eq!(session.scroll_down(1), 1);
}

#[test]
fn scrolling_saturates_at_both_boundaries() {
    let mut session = open_lines(&["a", "b", "c"]);

    assert_eq!(session.scroll_up(1), 0);
    assert_eq!(session.scroll_down(1), 1);
    assert_eq!(session.scroll_down(1), 2);
    assert_eq!(session.scroll_down(1), 2);
    assert_eq!(session.scroll_up(5), 0);
}

#[test]
fn jump_to_line_ignores_out_of_range_targets() {
    let mut session = open_lines(&["a", "b", "c"]);

    assert_eq!(session.jump_to_line(2), 2);
    assert_eq!(session.jump_to_line(3), 2);
    assert_eq!(session.jump_to_line(usize::MAX), 2);
}

#[test]
fn stale_resume_position_is_clamped_by_the_next_scroll() {
    let config = resumed_config(40);
    let session_bytes = b"a\nb\nc";
    let mut session =
        DocumentSession::open(Path::new(SOURCE), session_bytes, Some(&config), QUIET_MS);

    // Resume is taken as stored, out of range or not.
    assert_eq!(session.current_line(), 40);
    assert_eq!(session.scroll_down(1), 2);
}

#[test]
fn search_returns_ascending_trimmed_matches() {
    let session = open_lines(&["abc", "xabcx", "def"]);

    let results = session.search("abc");
    assert_eq!(
        results,
        vec![
            SearchResult {
                line: 0,
                content: "abc".to_owned()
            },
            SearchResult {
                line: 1,
                content: "xabcx".to_owned()
            },
        ]
    );

    assert!(session.search("missing").is_empty());
}

#[test]
fn search_is_case_sensitive_and_trims_result_content() {
    let session = open_lines(&["  padded ABC  ", "abc"]);

    let results = session.search("ABC");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line, 0);
    assert_eq!(results[0].content, "padded ABC");
}

#[test]
fn burst_of_reports_persists_exactly_one_write_with_the_last_value() {
    let mut store = RecordingStore::default();
    let mut session = open_lines(&["a", "b", "c", "d", "e"]);

    session.report_progress(1, 0);
    session.report_progress(2, 50);
    session.report_progress(3, 100);

    // Still inside the quiet interval of the last report.
    assert!(session.tick(&mut store, 100 + QUIET_MS - 1).is_none());
    assert!(store.progress_writes.is_empty());

    assert!(session.tick(&mut store, 100 + QUIET_MS).unwrap().is_ok());
    assert_eq!(
        store.progress_writes,
        vec![(PathBuf::from(SOURCE), 3, 5)]
    );

    // The slot is spent; nothing further flushes.
    assert!(session.tick(&mut store, 10_000).is_none());
}

#[test]
fn every_report_rearms_the_quiet_deadline() {
    let mut store = RecordingStore::default();
    let mut session = open_lines(&["a", "b", "c"]);

    session.report_progress(1, 0);
    session.report_progress(2, 200);

    // The first report's deadline has passed, but the second re-armed it.
    assert!(session.tick(&mut store, 450).is_none());
    assert!(session.tick(&mut store, 500).unwrap().is_ok());
    assert_eq!(store.progress_writes, vec![(PathBuf::from(SOURCE), 2, 3)]);
}

#[test]
fn close_flushes_immediately_without_waiting_for_the_interval() {
    let mut store = RecordingStore::default();
    let mut session = open_lines(&["a", "b", "c"]);

    session.report_progress(2, 0);
    session.close(&mut store).unwrap();

    assert_eq!(store.progress_writes, vec![(PathBuf::from(SOURCE), 2, 3)]);
}

#[test]
fn close_saves_the_current_position_even_with_nothing_pending() {
    let mut store = RecordingStore::default();
    let mut session = open_lines(&["a", "b", "c"]);

    session.jump_to_line(1);
    session.close(&mut store).unwrap();

    assert_eq!(store.progress_writes, vec![(PathBuf::from(SOURCE), 1, 3)]);
}

#[test]
fn report_updates_the_cursor_before_any_flush_happens() {
    let mut session = open_lines(&["a", "b", "c"]);

    session.report_progress(2, 0);
    assert_eq!(session.current_line(), 2);
}

#[test]
fn failed_flush_is_reported_and_not_retried() {
    let mut store = RecordingStore {
        fail_saves: true,
        ..RecordingStore::default()
    };
    let mut session = open_lines(&["a", "b"]);

    session.report_progress(1, 0);
    assert!(session.tick(&mut store, QUIET_MS).unwrap().is_err());

    store.fail_saves = false;
    assert!(session.tick(&mut store, QUIET_MS * 10).is_none());
    assert!(store.progress_writes.is_empty());
}

#[test]
fn progress_sync_cancel_is_unconditional_and_idempotent() {
    let mut sync = ProgressSync::new(QUIET_MS);
    let mut store = RecordingStore::default();

    sync.cancel();
    sync.cancel();

    sync.schedule(4, 10, 0);
    assert!(sync.has_pending());
    sync.cancel();
    sync.cancel();
    assert!(!sync.has_pending());
    assert!(
        sync.flush_if_due(&mut store, Path::new(SOURCE), u64::MAX)
            .is_none()
    );
}

#[test]
fn bookmarks_stay_sorted_and_deduplicated() {
    let mut session = open_lines(&["a", "b", "c", "d"]);

    assert!(session.add_bookmark(3));
    assert!(session.add_bookmark(1));
    assert!(!session.add_bookmark(3));
    assert_eq!(session.bookmarks(), &[1, 3]);

    // Out of range: ignored like an out-of-range jump.
    assert!(!session.add_bookmark(99));
    assert_eq!(session.bookmarks(), &[1, 3]);

    assert!(session.remove_bookmark(1));
    assert!(!session.remove_bookmark(1));
    assert_eq!(session.bookmarks(), &[3]);
}

#[test]
fn bookmarks_from_a_config_are_normalized_on_load() {
    let config = {
        let mut config = resumed_config(0);
        config.bookmarks = Some(vec![5, 1, 5, 3]);
        config
    };
    let session = DocumentSession::open(
        Path::new(SOURCE),
        b"a\nb\nc\nd\ne\nf",
        Some(&config),
        QUIET_MS,
    );

    assert_eq!(session.bookmarks(), &[1, 3, 5]);
}
