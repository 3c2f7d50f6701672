//! Debounced, single-slot progress persistence.

use std::path::Path;

use log::debug;

use crate::config::ConfigStore;

/// Trailing-edge debounce over the most recent reported position.
///
/// One pending slot per session. Every `schedule` replaces the slot's value
/// and re-arms its deadline, so only a quiet interval of `quiet_ms` (or an
/// explicit flush) produces a write, and the value written is always the
/// most recent one. Time is injected as millisecond ticks; nothing here
/// reads a real clock.
pub struct ProgressSync {
    quiet_ms: u64,
    pending: Option<PendingWrite>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PendingWrite {
    line: usize,
    total_lines: usize,
    due_ms: u64,
}

impl ProgressSync {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
        }
    }

    /// Replaces any pending write and re-arms the quiet deadline.
    pub fn schedule(&mut self, line: usize, total_lines: usize, now_ms: u64) {
        self.pending = Some(PendingWrite {
            line,
            total_lines,
            due_ms: now_ms.saturating_add(self.quiet_ms),
        });
    }

    /// Drops the pending write. Unconditional and idempotent.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Writes the pending value through `store` once its deadline has
    /// passed. The slot is cleared whether the save succeeds or not; a
    /// failed save is reported to the caller and never retried.
    pub fn flush_if_due<S: ConfigStore>(
        &mut self,
        store: &mut S,
        source: &Path,
        now_ms: u64,
    ) -> Option<Result<(), S::Error>> {
        let write = self.pending?;
        if now_ms < write.due_ms {
            return None;
        }
        self.pending = None;
        debug!(
            "progress: flushing line={} total_lines={} for {}",
            write.line,
            write.total_lines,
            source.display()
        );
        Some(store.update_progress(source, write.line, write.total_lines))
    }

    /// Immediately writes `line`/`total_lines`, bypassing the deadline and
    /// discarding any pending slot. Used on close so no update is lost even
    /// when the document closes inside the quiet interval.
    pub fn flush_now<S: ConfigStore>(
        &mut self,
        store: &mut S,
        source: &Path,
        line: usize,
        total_lines: usize,
    ) -> Result<(), S::Error> {
        self.pending = None;
        store.update_progress(source, line, total_lines)
    }
}
